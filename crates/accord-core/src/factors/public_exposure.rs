//! Public exposure factor

use super::{Factor, FactorKind, ScoringInput};

/// Scales the 0–10 public interest rating to 0–100.
pub struct PublicExposureFactor;

impl Factor for PublicExposureFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::PublicExposure
    }

    fn raw_score(&self, input: &ScoringInput<'_>) -> f64 {
        (10.0 * input.case.public_interest).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseFacts;
    use crate::intelligence::IntelligenceSummary;

    #[test]
    fn test_scales_rating() {
        let mut case = CaseFacts::new("c-1");
        case.public_interest = 6.0;
        let intel = IntelligenceSummary::default();
        assert_eq!(PublicExposureFactor.score(&ScoringInput::new(&case, &intel)), 60.0);
    }
}
