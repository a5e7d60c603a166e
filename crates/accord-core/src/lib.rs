//! # accord-core
//!
//! Deterministic case scoring, settlement prediction, and negotiation planning.
//!
//! This crate answers, for one case:
//! - How much leverage is there, and where is it concentrated?
//! - What is the case likely to settle for?
//! - How should concessions be paced?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same facts always produce the same scores
//! 2. **No provider calls**: Everything here is arithmetic over typed records
//! 3. **Total**: Scoring never fails; missing numbers score zero
//! 4. **Bounded**: Factors and overall in [0, 100], probabilities capped at 0.95
//!
//! ## Example
//!
//! ```rust,ignore
//! use accord_core::{assess, CaseFacts, IntelligenceSummary, NegotiationPlanner};
//!
//! let case = CaseFacts::from_yaml_file("case.yaml")?;
//! let assessment = assess(&case, &IntelligenceSummary::default());
//! let framework = NegotiationPlanner::new()
//!     .build_framework(&assessment.settlement, &assessment.leverage);
//!
//! println!("{} leverage, demand ${:.0}", assessment.leverage.risk_tier, framework.opening);
//! ```

pub mod assessment;
pub mod case;
pub mod factors;
pub mod intelligence;
pub mod leverage;
pub mod negotiation;
pub mod scoring;
pub mod settlement;
pub mod synthesizer;
pub mod types;

// Re-export main types at crate root
pub use assessment::{ActionItem, CaseStrength, PrimaryStrategy, Priority, StrategicAssessment};
pub use case::{CaseError, CaseFacts, ClaimType, LegalContext};
pub use factors::{FactorKind, LeverageFactors};
pub use intelligence::{
    Evidence, EvidenceSummary, IntelligenceSummary, ResearchFindings, Severity, Violation,
    ViolationStatus, ViolationSummary,
};
pub use leverage::{Impact, LeverageScore, Posture, PressurePoint, RiskTier, Timing};
pub use negotiation::{
    ConcessionStep, NegotiationFramework, NegotiationPlanner, PressureTactic, Rationale,
};
pub use scoring::ScoringEngine;
pub use settlement::{NegotiationStance, Scenario, SettlementPrediction, SettlementRange};
pub use synthesizer::{FailureNote, Insight, ResultSynthesizer, Synthesis, SynthesisSummary};
pub use types::{ErrorKind, PhaseResult, ProviderId, TaskResult, TaskSpec};

/// Score a case and derive its strategic assessment.
///
/// This is the main offline entry point: no providers, no I/O.
pub fn assess(case: &CaseFacts, intelligence: &IntelligenceSummary) -> StrategicAssessment {
    let engine = ScoringEngine::new();
    let leverage = engine.score_leverage(case, intelligence);
    let settlement = engine.predict_settlement(case, &leverage);
    StrategicAssessment::new(leverage, settlement)
}

/// Build the negotiation framework for an assessment.
pub fn plan_negotiation(assessment: &StrategicAssessment) -> NegotiationFramework {
    NegotiationPlanner::new().build_framework(&assessment.settlement, &assessment.leverage)
}
