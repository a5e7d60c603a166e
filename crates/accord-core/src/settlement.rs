//! Settlement prediction: a three-point range plus demand and floor.
//!
//! Ordering guarantees:
//! - `low <= mid <= high`
//! - `recommended_floor <= recommended_demand`
//! - `recommended_demand >= high`

use serde::{Deserialize, Serialize};

use crate::case::CaseFacts;
use crate::leverage::LeverageScore;

/// Minimum base value of any case.
pub const BASE_VALUE_FLOOR: f64 = 25_000.0;

/// Base value per point of emotional distress severity.
pub const DISTRESS_VALUE_PER_POINT: f64 = 10_000.0;

/// Added to economic damages when computing the walk-away floor.
pub const FLOOR_MARGIN: f64 = 15_000.0;

pub const MAX_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlementRange {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// Per-source contributions to case value, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueFactors {
    pub economic_damages: f64,
    pub evidence_strength: f64,
    pub violations_impact: f64,
    pub emotional_distress: f64,
    pub public_exposure: f64,
}

impl ValueFactors {
    pub fn total(&self) -> f64 {
        self.economic_damages
            + self.evidence_strength
            + self.violations_impact
            + self.emotional_distress
            + self.public_exposure
    }
}

/// How to open negotiations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStance {
    AggressiveAnchoring,
    Principled,
    Collaborative,
    Exploratory,
}

impl NegotiationStance {
    pub fn select(overall: f64, confidence: f64) -> Self {
        if overall > 75.0 && confidence > 0.7 {
            NegotiationStance::AggressiveAnchoring
        } else if overall > 60.0 && confidence > 0.6 {
            NegotiationStance::Principled
        } else if overall > 45.0 {
            NegotiationStance::Collaborative
        } else {
            NegotiationStance::Exploratory
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NegotiationStance::AggressiveAnchoring => "AGGRESSIVE ANCHORING",
            NegotiationStance::Principled => "PRINCIPLED NEGOTIATION",
            NegotiationStance::Collaborative => "COLLABORATIVE APPROACH",
            NegotiationStance::Exploratory => "EXPLORATORY NEGOTIATION",
        }
    }

    pub fn guidance(&self) -> &'static [&'static str] {
        match self {
            NegotiationStance::AggressiveAnchoring => &[
                "Lead with high demand backed by evidence",
                "Set tight negotiation timeline",
                "Emphasize regulatory and media risks",
                "Minimal initial concessions",
            ],
            NegotiationStance::Principled => &[
                "Present justified demand with comparables",
                "Structured negotiation phases",
                "Evidence-based concessions only",
                "Multiple pressure points",
            ],
            NegotiationStance::Collaborative => &[
                "Reasonable opening position",
                "Focus on mutual resolution",
                "Gradual concession strategy",
                "Emphasize cost of litigation",
            ],
            NegotiationStance::Exploratory => &[
                "Gather information on the opposing position",
                "Build leverage through discovery",
                "Flexible positioning",
                "Keep options open",
            ],
        }
    }
}

/// Predicted settlement outcome for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementPrediction {
    pub range: SettlementRange,

    /// [0, 0.95]
    pub confidence: f64,
    pub recommended_demand: f64,
    pub recommended_floor: f64,
    pub base_value: f64,
    pub leverage_multiplier: f64,
    pub comparable_case_count: u32,
    pub value_factors: ValueFactors,
    pub stance: NegotiationStance,
}

/// A modeled way the negotiation could end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub rounds: u32,
    pub final_amount: f64,
    pub probability: f64,
    pub timeline: String,
}

/// Base value before leverage: damages, claims, distress, punitive uplift.
pub fn base_value(case: &CaseFacts) -> f64 {
    let claims: f64 = case.claim_types.iter().map(|c| c.base_value()).sum();
    let distress = DISTRESS_VALUE_PER_POINT * case.emotional_distress_severity.clamp(0.0, 10.0);

    let mut base = case.economic_damages.max(0.0) + claims + distress;
    if case.punitive_damages_viable {
        base *= 1.5;
    }

    base.max(BASE_VALUE_FLOOR)
}

/// Maps overall leverage [0, 100] onto [0.5, 2.0].
pub fn leverage_multiplier(overall: f64) -> f64 {
    0.5 + (overall.clamp(0.0, 100.0) / 100.0) * 1.5
}

fn demand_multiplier(overall: f64) -> f64 {
    if overall > 75.0 {
        1.4
    } else if overall > 60.0 {
        1.3
    } else if overall > 45.0 {
        1.2
    } else {
        1.1
    }
}

fn confidence(leverage: &LeverageScore, comparable_cases: u32) -> f64 {
    let mut confidence = 0.5 + 0.2 * (leverage.factors.evidence_strength / 100.0);
    confidence += (0.1 * comparable_cases as f64).min(0.2);
    if leverage.overall > 70.0 {
        confidence += 0.1;
    }
    confidence.min(MAX_CONFIDENCE)
}

fn value_factors(case: &CaseFacts, leverage: &LeverageScore) -> ValueFactors {
    ValueFactors {
        economic_damages: ((case.economic_damages / 100_000.0) * 20.0).clamp(0.0, 30.0),
        evidence_strength: leverage.factors.evidence_strength * 0.25,
        violations_impact: leverage.factors.violations * 0.30,
        emotional_distress: case.emotional_distress_severity * 2.5,
        public_exposure: leverage.factors.public_exposure * 0.15,
    }
}

/// Predict the settlement range for a scored case.
pub fn predict(case: &CaseFacts, leverage: &LeverageScore) -> SettlementPrediction {
    let base = base_value(case);
    let multiplier = leverage_multiplier(leverage.overall);

    let range = SettlementRange {
        low: 0.5 * base * multiplier,
        mid: base * multiplier,
        high: 1.5 * base * multiplier,
    };

    let comparable_case_count = case.legal_context.comparable_cases;
    let confidence = confidence(leverage, comparable_case_count);

    let floor = (0.8 * range.low).max(case.economic_damages.max(0.0) + FLOOR_MARGIN);
    let demand = (range.high * demand_multiplier(leverage.overall)).max(floor);

    SettlementPrediction {
        range,
        confidence,
        recommended_demand: demand,
        recommended_floor: floor,
        base_value: base,
        leverage_multiplier: multiplier,
        comparable_case_count,
        value_factors: value_factors(case, leverage),
        stance: NegotiationStance::select(leverage.overall, confidence),
    }
}

/// Four canonical outcomes, from quick settlement to trial.
pub fn model_scenarios(prediction: &SettlementPrediction) -> Vec<Scenario> {
    let scenario = |name: &str, rounds, final_amount, probability, timeline: &str| Scenario {
        name: name.to_string(),
        rounds,
        final_amount,
        probability,
        timeline: timeline.to_string(),
    };

    vec![
        scenario(
            "Quick Settlement",
            2,
            prediction.recommended_demand * 0.85,
            0.30,
            "2-4 weeks",
        ),
        scenario(
            "Standard Negotiation",
            4,
            prediction.range.mid,
            0.50,
            "6-12 weeks",
        ),
        scenario(
            "Extended Negotiation",
            6,
            prediction.range.mid * 0.9,
            0.15,
            "3-6 months",
        ),
        scenario("Trial", 0, prediction.range.high * 1.2, 0.05, "12-24 months"),
    ]
}
