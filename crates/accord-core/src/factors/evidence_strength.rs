//! Evidence strength factor
//!
//! **Question**: How well can the claims be proven?

use super::{Factor, FactorKind, ScoringInput};

/// Rewards volume, verification, and relevance of evidence.
pub struct EvidenceStrengthFactor;

impl Factor for EvidenceStrengthFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::EvidenceStrength
    }

    fn raw_score(&self, input: &ScoringInput<'_>) -> f64 {
        let e = &input.intelligence.evidence;

        let volume = (5.0 * e.total as f64).min(30.0);
        let verified = (8.0 * e.verified as f64).min(40.0);
        let relevance = 30.0 * e.average_relevance.clamp(0.0, 1.0);

        volume + verified + relevance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseFacts;
    use crate::intelligence::IntelligenceSummary;

    #[test]
    fn test_components_cap_independently() {
        let case = CaseFacts::new("c-1");
        let mut intel = IntelligenceSummary::default();
        intel.evidence.total = 12;
        intel.evidence.verified = 2;
        intel.evidence.average_relevance = 0.5;

        // 30 (capped) + 16 + 15
        let score = EvidenceStrengthFactor.score(&ScoringInput::new(&case, &intel));
        assert_eq!(score, 61.0);
    }

    #[test]
    fn test_full_marks() {
        let case = CaseFacts::new("c-1");
        let mut intel = IntelligenceSummary::default();
        intel.evidence.total = 20;
        intel.evidence.verified = 20;
        intel.evidence.average_relevance = 1.0;

        let score = EvidenceStrengthFactor.score(&ScoringInput::new(&case, &intel));
        assert_eq!(score, 100.0);
    }
}
