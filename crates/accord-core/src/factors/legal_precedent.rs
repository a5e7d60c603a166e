//! Legal precedent factor

use super::{Factor, FactorKind, ScoringInput};

/// Favorable precedents plus the going rate for comparable settlements.
pub struct LegalPrecedentFactor;

impl Factor for LegalPrecedentFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::LegalPrecedent
    }

    fn raw_score(&self, input: &ScoringInput<'_>) -> f64 {
        let ctx = &input.case.legal_context;

        let precedents = (15.0 * ctx.favorable_precedents as f64).min(60.0);
        let market = (10.0 * (ctx.average_settlement / 100_000.0)).min(40.0);

        precedents + market
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseFacts;
    use crate::intelligence::IntelligenceSummary;

    #[test]
    fn test_precedents_and_market() {
        let mut case = CaseFacts::new("c-1");
        case.legal_context.favorable_precedents = 3;
        case.legal_context.average_settlement = 150_000.0;
        let intel = IntelligenceSummary::default();

        let score = LegalPrecedentFactor.score(&ScoringInput::new(&case, &intel));
        assert!((score - 60.0).abs() < 1e-9);
    }
}
