//! Financial impact factor

use super::{Factor, FactorKind, ScoringInput};

/// Damages at stake plus accumulated fines.
pub struct FinancialImpactFactor;

impl Factor for FinancialImpactFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::FinancialImpact
    }

    fn raw_score(&self, input: &ScoringInput<'_>) -> f64 {
        let damages = input.case.damages_at_stake();
        let fines = input.intelligence.violations.total_fines;

        (20.0 * (damages / 100_000.0)).min(50.0) + (15.0 * (fines / 50_000.0)).min(50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseFacts;
    use crate::intelligence::IntelligenceSummary;

    #[test]
    fn test_damages_and_fines() {
        let mut case = CaseFacts::new("c-1");
        case.economic_damages = 100_000.0;
        let mut intel = IntelligenceSummary::default();
        intel.violations.total_fines = 50_000.0;

        let score = FinancialImpactFactor.score(&ScoringInput::new(&case, &intel));
        assert!((score - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_claimed_damages_preferred() {
        let mut case = CaseFacts::new("c-1");
        case.economic_damages = 10_000.0;
        case.claimed_damages = Some(1_000_000.0);
        let intel = IntelligenceSummary::default();

        let score = FinancialImpactFactor.score(&ScoringInput::new(&case, &intel));
        assert_eq!(score, 50.0);
    }
}
