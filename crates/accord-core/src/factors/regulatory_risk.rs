//! Regulatory risk factor
//!
//! **Question**: How likely is an agency to act if this goes public?

use super::{Factor, FactorKind, ScoringInput};

/// Violation count plus a heavy premium for critical findings.
pub struct RegulatoryRiskFactor;

impl Factor for RegulatoryRiskFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::RegulatoryRisk
    }

    fn raw_score(&self, input: &ScoringInput<'_>) -> f64 {
        let v = &input.intelligence.violations;
        (5.0 * v.total() as f64).min(50.0) + 20.0 * v.critical as f64
    }
}
