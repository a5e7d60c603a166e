//! Strategic assessment: the executive view over a leverage score and prediction.

use serde::{Deserialize, Serialize};

use crate::leverage::LeverageScore;
use crate::settlement::{model_scenarios, Scenario, SettlementPrediction};

/// Overall approach to the matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryStrategy {
    /// Maximum pressure for rapid resolution
    AggressiveSettlement,
    /// Systematic pressure application
    StructuredNegotiation,
    /// Build leverage while negotiating
    Balanced,
    /// Strengthen position before major demands
    EvidenceBuilding,
}

impl PrimaryStrategy {
    pub fn select(overall: f64, confidence: f64) -> Self {
        if overall > 75.0 && confidence > 0.7 {
            PrimaryStrategy::AggressiveSettlement
        } else if overall > 60.0 {
            PrimaryStrategy::StructuredNegotiation
        } else if overall > 45.0 {
            PrimaryStrategy::Balanced
        } else {
            PrimaryStrategy::EvidenceBuilding
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStrength {
    Weak,
    Developing,
    Moderate,
    Strong,
    Excellent,
}

impl CaseStrength {
    pub fn rate(overall: f64) -> Self {
        if overall > 80.0 {
            CaseStrength::Excellent
        } else if overall > 65.0 {
            CaseStrength::Strong
        } else if overall > 50.0 {
            CaseStrength::Moderate
        } else if overall > 35.0 {
            CaseStrength::Developing
        } else {
            CaseStrength::Weak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Immediate,
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub priority: Priority,
    pub action: String,
    pub rationale: String,
}

/// Everything the analysis phase concludes about a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicAssessment {
    pub leverage: LeverageScore,
    pub settlement: SettlementPrediction,
    pub scenarios: Vec<Scenario>,
    pub primary_strategy: PrimaryStrategy,
    pub case_strength: CaseStrength,
    pub action_plan: Vec<ActionItem>,
    pub risk_mitigation: Vec<String>,
}

impl StrategicAssessment {
    pub fn new(leverage: LeverageScore, settlement: SettlementPrediction) -> Self {
        Self {
            scenarios: model_scenarios(&settlement),
            primary_strategy: PrimaryStrategy::select(leverage.overall, settlement.confidence),
            case_strength: CaseStrength::rate(leverage.overall),
            action_plan: action_plan(&leverage, &settlement),
            risk_mitigation: risk_mitigation(&leverage),
            leverage,
            settlement,
        }
    }
}

fn action_plan(leverage: &LeverageScore, settlement: &SettlementPrediction) -> Vec<ActionItem> {
    let mut actions: Vec<ActionItem> = leverage
        .pressure_points
        .iter()
        .take(2)
        .map(|p| ActionItem {
            priority: Priority::Immediate,
            action: format!("Apply pressure via {}", p.factor),
            rationale: p.recommendation.clone(),
        })
        .collect();

    actions.push(ActionItem {
        priority: Priority::High,
        action: format!(
            "Present settlement demand of ${:.0}",
            settlement.recommended_demand
        ),
        rationale: format!(
            "Based on {:.0}% confidence prediction",
            settlement.confidence * 100.0
        ),
    });

    if leverage.factors.regulatory_risk > 50.0 {
        actions.push(ActionItem {
            priority: Priority::High,
            action: "File regulatory complaints with appropriate agencies".to_string(),
            rationale: "High regulatory leverage identified".to_string(),
        });
    }

    if leverage.factors.public_exposure > 50.0 {
        actions.push(ActionItem {
            priority: Priority::Medium,
            action: "Prepare media outreach strategy".to_string(),
            rationale: "Significant public interest potential".to_string(),
        });
    }

    actions
}

fn risk_mitigation(leverage: &LeverageScore) -> Vec<String> {
    let mut mitigations = vec![
        "Document all communications and maintain detailed records".to_string(),
        "Preserve and authenticate all evidence".to_string(),
        "Monitor the opposing party's responses for counter-strategies".to_string(),
    ];

    if leverage.overall < 60.0 {
        mitigations.push("Continue evidence gathering to strengthen position".to_string());
    }
    if leverage.settlement_probability < 0.6 {
        mitigations.push("Prepare for potential litigation while negotiating".to_string());
    }

    mitigations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseFacts;
    use crate::factors::LeverageFactors;
    use crate::settlement::predict;

    #[test]
    fn test_case_strength_bands() {
        assert_eq!(CaseStrength::rate(85.0), CaseStrength::Excellent);
        assert_eq!(CaseStrength::rate(80.0), CaseStrength::Strong);
        assert_eq!(CaseStrength::rate(55.0), CaseStrength::Moderate);
        assert_eq!(CaseStrength::rate(36.0), CaseStrength::Developing);
        assert_eq!(CaseStrength::rate(10.0), CaseStrength::Weak);
    }

    #[test]
    fn test_primary_strategy() {
        assert_eq!(PrimaryStrategy::select(80.0, 0.8), PrimaryStrategy::AggressiveSettlement);
        assert_eq!(PrimaryStrategy::select(80.0, 0.5), PrimaryStrategy::StructuredNegotiation);
        assert_eq!(PrimaryStrategy::select(50.0, 0.9), PrimaryStrategy::Balanced);
        assert_eq!(PrimaryStrategy::select(20.0, 0.9), PrimaryStrategy::EvidenceBuilding);
    }

    #[test]
    fn test_action_plan_for_strong_case() {
        let leverage = LeverageScore::from_factors(LeverageFactors {
            violations: 90.0,
            evidence_strength: 80.0,
            legal_precedent: 60.0,
            public_exposure: 70.0,
            regulatory_risk: 70.0,
            financial_impact: 40.0,
        });
        let mut case = CaseFacts::new("c-1");
        case.economic_damages = 50_000.0;
        let prediction = predict(&case, &leverage);

        let assessment = StrategicAssessment::new(leverage, prediction);
        let priorities: Vec<Priority> = assessment.action_plan.iter().map(|a| a.priority).collect();
        assert_eq!(
            priorities,
            vec![
                Priority::Immediate,
                Priority::Immediate,
                Priority::High,
                Priority::High,
                Priority::Medium,
            ]
        );
        assert_eq!(assessment.action_plan[0].action, "Apply pressure via violations");
        assert_eq!(assessment.scenarios.len(), 4);
        assert_eq!(assessment.risk_mitigation.len(), 3);
    }

    #[test]
    fn test_weak_case_mitigations() {
        let leverage = LeverageScore::from_factors(LeverageFactors::default());
        let prediction = predict(&CaseFacts::new("c-1"), &leverage);
        let assessment = StrategicAssessment::new(leverage, prediction);

        assert_eq!(assessment.case_strength, CaseStrength::Weak);
        assert_eq!(assessment.action_plan.len(), 1);
        assert_eq!(assessment.risk_mitigation.len(), 5);
    }
}
