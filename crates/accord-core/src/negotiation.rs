//! NegotiationPlanner: opening, target, floor, and a bounded concession schedule.
//!
//! Schedule invariants:
//! - positions never increase from one round to the next
//! - no position drops below the floor
//! - the schedule never exceeds the round cap

use serde::{Deserialize, Serialize};

use crate::factors::FactorKind;
use crate::leverage::LeverageScore;
use crate::settlement::{NegotiationStance, SettlementPrediction};

/// Positions within a cent of the target count as at target.
pub const AT_TARGET_TOLERANCE: f64 = 0.01;

/// Why a round's position was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rationale {
    Initial,
    TowardTarget,
    AtTarget,
    BelowTarget,
}

impl Rationale {
    fn classify(round: u32, position: f64, target: f64) -> Self {
        if round == 1 {
            Rationale::Initial
        } else if position > target + AT_TARGET_TOLERANCE {
            Rationale::TowardTarget
        } else if (position - target).abs() <= AT_TARGET_TOLERANCE {
            Rationale::AtTarget
        } else {
            Rationale::BelowTarget
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rationale::Initial => "Initial negotiation positioning",
            Rationale::TowardTarget => {
                "Moving toward middle ground, require substantial counter-offer"
            }
            Rationale::AtTarget => "At target settlement point, final offer",
            Rationale::BelowTarget => "Below target, approaching floor",
        }
    }
}

/// One round of the concession schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcessionStep {
    pub round: u32,
    pub position: f64,
    pub concession: f64,
    pub rationale: Rationale,

    /// Whether a counter-offer is required before conceding
    pub require_reciprocal: bool,
}

/// A lever to pull during negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureTactic {
    pub name: String,
    pub timing: String,
    pub action: String,
    pub impact: String,
}

impl PressureTactic {
    fn new(name: &str, timing: &str, action: &str, impact: &str) -> Self {
        Self {
            name: name.to_string(),
            timing: timing.to_string(),
            action: action.to_string(),
            impact: impact.to_string(),
        }
    }
}

/// The full negotiation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationFramework {
    pub opening: f64,
    pub target: f64,
    pub floor: f64,
    pub concession_rate: f64,
    pub round_cap: u32,
    pub schedule: Vec<ConcessionStep>,
    pub stance: NegotiationStance,
    pub pressure_tactics: Vec<PressureTactic>,
    pub deal_breakers: Vec<String>,
    pub contingency_plans: Vec<String>,
}

impl NegotiationFramework {
    /// Final scheduled position, or the opening if the schedule is empty.
    pub fn final_position(&self) -> f64 {
        self.schedule.last().map_or(self.opening, |s| s.position)
    }
}

const DEAL_BREAKERS: &[&str] = &[
    "Non-disclosure that prevents regulatory complaints",
    "Admission of fault by complainant",
    "Non-compete restrictions",
    "Waiver of statutory rights",
];

const CONTINGENCY_PLANS: &[&str] = &[
    "If lowball offer: reiterate evidence and comparable settlements, set a short deadline for a serious offer",
    "If no response: file regulatory complaints and follow up with a final deadline",
    "If denial of liability: present key evidence, offer mediation with a neutral third party",
    "If negotiations stall: escalate pressure through regulatory or media channels",
    "If unreasonable demands: walk away and proceed to litigation",
    "If partial agreement: document agreed terms, continue negotiating disputed issues",
];

/// Builds negotiation frameworks from a prediction and leverage score.
pub struct NegotiationPlanner;

impl NegotiationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Concession rate and round cap for a leverage level.
    ///
    /// Stronger leverage concedes less, over fewer rounds.
    pub fn concession_terms(overall: f64) -> (f64, u32) {
        if overall > 75.0 {
            (0.05, 3)
        } else if overall > 60.0 {
            (0.08, 4)
        } else {
            (0.10, 5)
        }
    }

    pub fn build_framework(
        &self,
        prediction: &SettlementPrediction,
        leverage: &LeverageScore,
    ) -> NegotiationFramework {
        let floor = prediction.recommended_floor.max(0.0);
        let opening = prediction.recommended_demand.max(floor);
        let target = prediction.range.mid.clamp(floor, opening);
        let (concession_rate, round_cap) = Self::concession_terms(leverage.overall);

        NegotiationFramework {
            opening,
            target,
            floor,
            concession_rate,
            round_cap,
            schedule: concession_schedule(opening, target, floor, concession_rate, round_cap),
            stance: prediction.stance,
            pressure_tactics: pressure_tactics(leverage),
            deal_breakers: DEAL_BREAKERS.iter().map(|s| s.to_string()).collect(),
            contingency_plans: CONTINGENCY_PLANS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for NegotiationPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Concede `rate` of the current position each round, never below `floor`,
/// stopping once the target or floor is reached or after `round_cap` rounds.
pub fn concession_schedule(
    opening: f64,
    target: f64,
    floor: f64,
    rate: f64,
    round_cap: u32,
) -> Vec<ConcessionStep> {
    let mut schedule = Vec::with_capacity(round_cap as usize);
    let mut current = opening;

    for round in 1..=round_cap {
        let position = (current - current * rate).max(floor).min(current);

        schedule.push(ConcessionStep {
            round,
            position,
            concession: current - position,
            rationale: Rationale::classify(round, position, target),
            require_reciprocal: round > 1,
        });

        current = position;
        if position <= target + AT_TARGET_TOLERANCE || position <= floor {
            break;
        }
    }

    schedule
}

fn pressure_tactics(leverage: &LeverageScore) -> Vec<PressureTactic> {
    let mut tactics = Vec::new();

    for point in &leverage.pressure_points {
        match point.factor {
            FactorKind::Violations if point.score > 60.0 => tactics.push(PressureTactic::new(
                "Regulatory Filing Pressure",
                "If no response within deadline",
                "File OSHA, EEOC, and other regulatory complaints",
                "Triggers investigations, increases defense costs",
            )),
            FactorKind::PublicExposure if point.score > 50.0 => tactics.push(PressureTactic::new(
                "Media Pressure",
                "If negotiations stall",
                "Release information to media",
                "Reputational damage, public scrutiny",
            )),
            FactorKind::RegulatoryRisk if point.score > 60.0 => tactics.push(PressureTactic::new(
                "Escalating Regulatory Action",
                "Progressive throughout negotiation",
                "Follow up with agencies, provide additional evidence",
                "Increases likelihood of enforcement action",
            )),
            _ => {}
        }
    }

    tactics.push(PressureTactic::new(
        "Litigation Threat",
        "If settlement negotiations fail",
        "File civil lawsuit",
        "Discovery, depositions, trial risk, attorney fees",
    ));
    tactics.push(PressureTactic::new(
        "Deadline Pressure",
        "Throughout negotiation",
        "Impose and enforce response deadlines",
        "Forces decision-making, prevents delay tactics",
    ));

    tactics
}
