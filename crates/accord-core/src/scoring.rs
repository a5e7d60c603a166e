//! ScoringEngine: case facts and intelligence in, leverage and settlement out.

use crate::case::CaseFacts;
use crate::factors::{LeverageFactors, ScoringInput};
use crate::intelligence::IntelligenceSummary;
use crate::leverage::LeverageScore;
use crate::settlement::{self, Scenario, SettlementPrediction};

/// Pure scoring over case facts. Holds no state; every call returns fresh values.
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score_leverage(
        &self,
        case: &CaseFacts,
        intelligence: &IntelligenceSummary,
    ) -> LeverageScore {
        let factors = LeverageFactors::compute(&ScoringInput::new(case, intelligence));
        let score = LeverageScore::from_factors(factors);

        tracing::debug!(
            case_id = %case.case_id,
            overall = score.overall,
            risk_tier = %score.risk_tier,
            "Leverage scored"
        );

        score
    }

    pub fn predict_settlement(
        &self,
        case: &CaseFacts,
        leverage: &LeverageScore,
    ) -> SettlementPrediction {
        settlement::predict(case, leverage)
    }

    pub fn model_scenarios(&self, prediction: &SettlementPrediction) -> Vec<Scenario> {
        settlement::model_scenarios(prediction)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
