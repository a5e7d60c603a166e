//! Leverage score: the six factors combined into one bounded position.
//!
//! Scoring never fails. Missing inputs score zero, so a sparse case simply
//! lands in the LOW tier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::factors::{FactorKind, LeverageFactors};

/// Factors scoring above this become pressure points.
pub const PRESSURE_POINT_THRESHOLD: f64 = 50.0;

/// Pressure points above this are HIGH impact.
pub const HIGH_IMPACT_THRESHOLD: f64 = 75.0;

/// At most this many pressure points are reported.
pub const MAX_PRESSURE_POINTS: usize = 3;

/// Ceiling on settlement probability.
pub const MAX_SETTLEMENT_PROBABILITY: f64 = 0.95;

/// Overall risk the case poses to the opposing party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn from_overall(overall: f64) -> Self {
        if overall > 75.0 {
            RiskTier::Critical
        } else if overall > 60.0 {
            RiskTier::High
        } else if overall > 40.0 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Impact {
    High,
    Medium,
}

/// A factor strong enough to press on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressurePoint {
    pub factor: FactorKind,
    pub score: f64,
    pub impact: Impact,
    pub recommendation: String,
}

/// Negotiating posture suggested by the average factor strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    /// Immediate settlement demand
    Aggressive,
    /// Structured negotiation with deadlines
    Assertive,
    /// Information gathering and position building
    Measured,
}

impl Posture {
    pub fn description(&self) -> &'static str {
        match self {
            Posture::Aggressive => "Immediate settlement demand",
            Posture::Assertive => "Structured negotiation with deadlines",
            Posture::Measured => "Information gathering and position building",
        }
    }
}

/// When and how hard to engage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Violations alone justify acting now
    pub immediate_action: bool,
    pub posture: Posture,
}

impl Timing {
    fn from_factors(factors: &LeverageFactors) -> Self {
        let mean = factors.mean();
        let posture = if mean > 70.0 {
            Posture::Aggressive
        } else if mean > 50.0 {
            Posture::Assertive
        } else {
            Posture::Measured
        };

        Self {
            immediate_action: factors.violations > 70.0,
            posture,
        }
    }
}

/// Bounded leverage position for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageScore {
    /// Weighted factor total, [0, 100]
    pub overall: f64,
    pub factors: LeverageFactors,

    /// Descending by score, ties in factor declaration order
    pub pressure_points: Vec<PressurePoint>,
    pub risk_tier: RiskTier,

    /// [0, 0.95]
    pub settlement_probability: f64,
    pub timing: Timing,
}

impl LeverageScore {
    /// Derive the full score from computed factors.
    pub fn from_factors(factors: LeverageFactors) -> Self {
        let overall = factors.weighted_total();

        Self {
            overall,
            pressure_points: pressure_points(&factors),
            risk_tier: RiskTier::from_overall(overall),
            settlement_probability: settlement_probability(overall, &factors),
            timing: Timing::from_factors(&factors),
            factors,
        }
    }
}

fn pressure_points(factors: &LeverageFactors) -> Vec<PressurePoint> {
    let mut candidates: Vec<(FactorKind, f64)> = factors
        .iter()
        .filter(|(_, score)| *score > PRESSURE_POINT_THRESHOLD)
        .collect();

    // Stable sort keeps declaration order among equal scores.
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    candidates
        .into_iter()
        .take(MAX_PRESSURE_POINTS)
        .map(|(factor, score)| PressurePoint {
            factor,
            score,
            impact: if score > HIGH_IMPACT_THRESHOLD {
                Impact::High
            } else {
                Impact::Medium
            },
            recommendation: factor.recommendation().to_string(),
        })
        .collect()
}

fn settlement_probability(overall: f64, factors: &LeverageFactors) -> f64 {
    let mut probability = overall / 100.0;

    if factors.evidence_strength > 70.0 {
        probability += 0.10;
    }
    if factors.violations > 70.0 {
        probability += 0.15;
    }

    probability.clamp(0.0, MAX_SETTLEMENT_PROBABILITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(values: [f64; 6]) -> LeverageFactors {
        LeverageFactors {
            violations: values[0],
            evidence_strength: values[1],
            legal_precedent: values[2],
            public_exposure: values[3],
            regulatory_risk: values[4],
            financial_impact: values[5],
        }
    }

    #[test]
    fn test_risk_tier_boundaries() {
        assert_eq!(RiskTier::from_overall(80.0), RiskTier::Critical);
        assert_eq!(RiskTier::from_overall(75.0), RiskTier::High);
        assert_eq!(RiskTier::from_overall(60.5), RiskTier::High);
        assert_eq!(RiskTier::from_overall(60.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_overall(40.0), RiskTier::Low);
        assert_eq!(RiskTier::from_overall(0.0), RiskTier::Low);
    }

    #[test]
    fn test_uniform_factors() {
        let score = LeverageScore::from_factors(factors([80.0; 6]));
        assert!((score.overall - 80.0).abs() < 1e-9);
        assert_eq!(score.risk_tier, RiskTier::Critical);
        assert_eq!(score.pressure_points.len(), 3);
        assert!(score.timing.immediate_action);
        assert_eq!(score.timing.posture, Posture::Aggressive);
    }

    #[test]
    fn test_pressure_points_ranked_with_stable_ties() {
        let score = LeverageScore::from_factors(factors([60.0, 90.0, 60.0, 40.0, 60.0, 76.0]));
        let ranked: Vec<(FactorKind, Impact)> = score
            .pressure_points
            .iter()
            .map(|p| (p.factor, p.impact))
            .collect();

        assert_eq!(
            ranked,
            vec![
                (FactorKind::EvidenceStrength, Impact::High),
                (FactorKind::FinancialImpact, Impact::High),
                (FactorKind::Violations, Impact::Medium),
            ]
        );
    }

    #[test]
    fn test_no_pressure_points_at_threshold() {
        let score = LeverageScore::from_factors(factors([50.0; 6]));
        assert!(score.pressure_points.is_empty());
        assert_eq!(score.timing.posture, Posture::Measured);
    }

    #[test]
    fn test_probability_bonuses_and_cap() {
        let base = LeverageScore::from_factors(factors([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(base.settlement_probability, 0.0);

        let boosted = LeverageScore::from_factors(factors([71.0, 71.0, 0.0, 0.0, 0.0, 0.0]));
        let expected = boosted.overall / 100.0 + 0.25;
        assert!((boosted.settlement_probability - expected).abs() < 1e-9);

        let capped = LeverageScore::from_factors(factors([100.0; 6]));
        assert_eq!(capped.settlement_probability, MAX_SETTLEMENT_PROBABILITY);
    }
}
