//! The six leverage factors.
//!
//! Each factor is a pure function of the case facts and the intelligence
//! summary, clamped to [0, 100]. Factors are independent of one another; the
//! leverage score combines them through the fixed [`FactorKind::weight`] table.

mod evidence_strength;
mod financial_impact;
mod legal_precedent;
mod public_exposure;
mod regulatory_risk;
mod violations;

pub use evidence_strength::EvidenceStrengthFactor;
pub use financial_impact::FinancialImpactFactor;
pub use legal_precedent::LegalPrecedentFactor;
pub use public_exposure::PublicExposureFactor;
pub use regulatory_risk::RegulatoryRiskFactor;
pub use violations::ViolationsFactor;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::case::CaseFacts;
use crate::intelligence::IntelligenceSummary;

/// Everything a factor may read.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub case: &'a CaseFacts,
    pub intelligence: &'a IntelligenceSummary,
}

impl<'a> ScoringInput<'a> {
    pub fn new(case: &'a CaseFacts, intelligence: &'a IntelligenceSummary) -> Self {
        Self { case, intelligence }
    }
}

/// Identifies a factor. Declaration order is the tie-break order for
/// pressure-point ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Violations,
    EvidenceStrength,
    LegalPrecedent,
    PublicExposure,
    RegulatoryRisk,
    FinancialImpact,
}

impl FactorKind {
    pub const ALL: [FactorKind; 6] = [
        FactorKind::Violations,
        FactorKind::EvidenceStrength,
        FactorKind::LegalPrecedent,
        FactorKind::PublicExposure,
        FactorKind::RegulatoryRisk,
        FactorKind::FinancialImpact,
    ];

    /// Contribution to the overall score. The six weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            FactorKind::Violations => 0.25,
            FactorKind::EvidenceStrength => 0.20,
            FactorKind::LegalPrecedent => 0.15,
            FactorKind::PublicExposure => 0.15,
            FactorKind::RegulatoryRisk => 0.15,
            FactorKind::FinancialImpact => 0.10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FactorKind::Violations => "violations",
            FactorKind::EvidenceStrength => "evidence_strength",
            FactorKind::LegalPrecedent => "legal_precedent",
            FactorKind::PublicExposure => "public_exposure",
            FactorKind::RegulatoryRisk => "regulatory_risk",
            FactorKind::FinancialImpact => "financial_impact",
        }
    }

    /// Tactical recommendation when this factor is a pressure point.
    pub fn recommendation(&self) -> &'static str {
        match self {
            FactorKind::Violations => {
                "Emphasize regulatory compliance failures and potential agency action"
            }
            FactorKind::EvidenceStrength => {
                "Present documentary evidence systematically to demonstrate case strength"
            }
            FactorKind::LegalPrecedent => "Cite favorable precedents and settlement ranges",
            FactorKind::PublicExposure => {
                "Leverage media interest and public attention strategically"
            }
            FactorKind::RegulatoryRisk => {
                "Highlight potential for regulatory investigation and penalties"
            }
            FactorKind::FinancialImpact => {
                "Demonstrate full scope of damages and potential liability"
            }
        }
    }

    /// The scorer for this factor.
    pub fn factor(&self) -> &'static dyn Factor {
        match self {
            FactorKind::Violations => &ViolationsFactor,
            FactorKind::EvidenceStrength => &EvidenceStrengthFactor,
            FactorKind::LegalPrecedent => &LegalPrecedentFactor,
            FactorKind::PublicExposure => &PublicExposureFactor,
            FactorKind::RegulatoryRisk => &RegulatoryRiskFactor,
            FactorKind::FinancialImpact => &FinancialImpactFactor,
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single leverage factor.
pub trait Factor: Send + Sync {
    fn kind(&self) -> FactorKind;

    /// Unclamped raw score.
    fn raw_score(&self, input: &ScoringInput<'_>) -> f64;

    /// Score clamped to [0, 100].
    fn score(&self, input: &ScoringInput<'_>) -> f64 {
        clamp_score(self.raw_score(input))
    }
}

/// Clamp into [0, 100]; non-finite input scores zero.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Per-factor scores for one case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeverageFactors {
    pub violations: f64,
    pub evidence_strength: f64,
    pub legal_precedent: f64,
    pub public_exposure: f64,
    pub regulatory_risk: f64,
    pub financial_impact: f64,
}

impl LeverageFactors {
    /// Score every factor.
    pub fn compute(input: &ScoringInput<'_>) -> Self {
        let mut factors = Self::default();
        for kind in FactorKind::ALL {
            factors.set(kind, kind.factor().score(input));
        }
        factors
    }

    pub fn get(&self, kind: FactorKind) -> f64 {
        match kind {
            FactorKind::Violations => self.violations,
            FactorKind::EvidenceStrength => self.evidence_strength,
            FactorKind::LegalPrecedent => self.legal_precedent,
            FactorKind::PublicExposure => self.public_exposure,
            FactorKind::RegulatoryRisk => self.regulatory_risk,
            FactorKind::FinancialImpact => self.financial_impact,
        }
    }

    fn set(&mut self, kind: FactorKind, value: f64) {
        match kind {
            FactorKind::Violations => self.violations = value,
            FactorKind::EvidenceStrength => self.evidence_strength = value,
            FactorKind::LegalPrecedent => self.legal_precedent = value,
            FactorKind::PublicExposure => self.public_exposure = value,
            FactorKind::RegulatoryRisk => self.regulatory_risk = value,
            FactorKind::FinancialImpact => self.financial_impact = value,
        }
    }

    /// Factors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FactorKind, f64)> + '_ {
        FactorKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    /// Weighted sum, in [0, 100].
    pub fn weighted_total(&self) -> f64 {
        clamp_score(self.iter().map(|(k, v)| v * k.weight()).sum())
    }

    /// Unweighted mean of the six factors.
    pub fn mean(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum::<f64>() / FactorKind::ALL.len() as f64
    }
}
