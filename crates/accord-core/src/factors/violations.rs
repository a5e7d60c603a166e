//! Violations factor
//!
//! **Question**: How much documented wrongdoing can be put on the table?

use super::{Factor, FactorKind, ScoringInput};

/// Weighs violations by severity, openness, and fines.
pub struct ViolationsFactor;

impl Factor for ViolationsFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::Violations
    }

    fn raw_score(&self, input: &ScoringInput<'_>) -> f64 {
        let v = &input.intelligence.violations;

        15.0 * v.critical as f64
            + 8.0 * v.major as f64
            + 3.0 * v.minor as f64
            + 5.0 * v.open as f64
            + 10.0 * (v.total_fines / 10_000.0)
    }
}
