//! Prompt templates for the three mission phases.
//!
//! Every prompt has the same shape:
//! 1. Phase preamble (shared by all providers in a phase)
//! 2. Case block built from the case facts
//! 3. Context carried from earlier phases (digest, leverage, negotiation)
//! 4. Focus instructions chosen from the provider's capabilities

use std::fmt::{self, Write as _};

use accord_core::{CaseFacts, LeverageScore, NegotiationFramework};
use serde::{Deserialize, Serialize};

use crate::providers::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Research,
    Analysis,
    Execution,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Research, Phase::Analysis, Phase::Execution];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Research => "research",
            Phase::Analysis => "analysis",
            Phase::Execution => "execution",
        }
    }

    fn preamble(&self) -> &'static str {
        match self {
            Phase::Research => RESEARCH_PREAMBLE,
            Phase::Analysis => ANALYSIS_PREAMBLE,
            Phase::Execution => EXECUTION_PREAMBLE,
        }
    }

    /// Capability-to-focus table, checked in order; the first capability the
    /// provider has wins.
    fn focus_table(&self) -> &'static [(Capability, Focus)] {
        match self {
            Phase::Research => &[
                (Capability::RealTimeResearch, Focus::PublicRecords),
                (Capability::AdvancedModeling, Focus::LegalPrecedents),
                (Capability::CommunicationOptimization, Focus::RegulatoryProcedures),
                (Capability::NarrativeDevelopment, Focus::Narrative),
                (Capability::LegalAnalysis, Focus::LegalPrecedents),
            ],
            Phase::Analysis => &[
                (Capability::AdvancedModeling, Focus::RiskModeling),
                (Capability::RealTimeResearch, Focus::SettlementTrends),
                (Capability::CommunicationOptimization, Focus::CommunicationStrategy),
                (Capability::StrategicReasoning, Focus::LeverageAnalysis),
            ],
            Phase::Execution => &[
                (Capability::AdvancedModeling, Focus::SettlementFramework),
                (Capability::RealTimeResearch, Focus::CoordinationTimeline),
                (Capability::CommunicationOptimization, Focus::MediaPackage),
                (Capability::NarrativeDevelopment, Focus::ComplaintDraft),
                (Capability::LegalAnalysis, Focus::ComplaintDraft),
            ],
        }
    }

    fn default_focus(&self) -> Focus {
        match self {
            Phase::Research => Focus::LegalPrecedents,
            Phase::Analysis => Focus::LeverageAnalysis,
            Phase::Execution => Focus::ComplaintDraft,
        }
    }

    /// Pick the focus for a provider with the given capabilities.
    pub fn focus_for(&self, capabilities: &[Capability]) -> Focus {
        self.focus_table()
            .iter()
            .find(|(capability, _)| capabilities.contains(capability))
            .map_or_else(|| self.default_focus(), |(_, focus)| *focus)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one provider is asked to concentrate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    PublicRecords,
    LegalPrecedents,
    RegulatoryProcedures,
    Narrative,
    RiskModeling,
    LeverageAnalysis,
    CommunicationStrategy,
    SettlementTrends,
    ComplaintDraft,
    MediaPackage,
    SettlementFramework,
    CoordinationTimeline,
}

impl Focus {
    pub fn instructions(&self) -> &'static str {
        match self {
            Focus::PublicRecords => PUBLIC_RECORDS_FOCUS,
            Focus::LegalPrecedents => LEGAL_PRECEDENTS_FOCUS,
            Focus::RegulatoryProcedures => REGULATORY_PROCEDURES_FOCUS,
            Focus::Narrative => NARRATIVE_FOCUS,
            Focus::RiskModeling => RISK_MODELING_FOCUS,
            Focus::LeverageAnalysis => LEVERAGE_ANALYSIS_FOCUS,
            Focus::CommunicationStrategy => COMMUNICATION_STRATEGY_FOCUS,
            Focus::SettlementTrends => SETTLEMENT_TRENDS_FOCUS,
            Focus::ComplaintDraft => COMPLAINT_DRAFT_FOCUS,
            Focus::MediaPackage => MEDIA_PACKAGE_FOCUS,
            Focus::SettlementFramework => SETTLEMENT_FRAMEWORK_FOCUS,
            Focus::CoordinationTimeline => COORDINATION_TIMELINE_FOCUS,
        }
    }
}

pub const RESEARCH_PREAMBLE: &str = r#"
# Phase 1: Research

You are one of several independent researchers working the same case.
Report what you can find and cite where it came from.
Do not speculate about outcomes; later phases handle strategy.
"#;

pub const ANALYSIS_PREAMBLE: &str = r#"
# Phase 2: Strategic Analysis

Research is complete. Build on the findings below.
Quantify where you can and say how confident you are.
"#;

pub const EXECUTION_PREAMBLE: &str = r#"
# Phase 3: Execution Planning

Analysis is complete. Produce working material that can be used as-is
or with light editing. Stay consistent with the figures below.
"#;

pub const PUBLIC_RECORDS_FOCUS: &str = r#"
## Focus: Real-Time Records
- Building violations and safety records
- Recent regulatory actions
- Public records and databases
- Current status of any violations

Provide detailed findings with sources.
"#;

pub const LEGAL_PRECEDENTS_FOCUS: &str = r#"
## Focus: Legal Precedents
- Similar cases and outcomes
- Settlement ranges and patterns
- Key legal arguments that succeeded
- Jurisdiction-specific considerations

Provide strategic legal analysis.
"#;

pub const REGULATORY_PROCEDURES_FOCUS: &str = r#"
## Focus: Regulatory Procedures
- Filing requirements and deadlines
- Documentation formats
- Agency contacts
- Procedural pitfalls

Provide actionable procedural guidance.
"#;

pub const NARRATIVE_FOCUS: &str = r#"
## Focus: Narrative
- Human impact and story arc
- Key emotional and factual elements
- Messaging themes
- Consistency across channels

Provide a narrative structure grounded in the facts.
"#;

pub const RISK_MODELING_FOCUS: &str = r#"
## Focus: Opponent Risk
- Legal vulnerabilities
- Potential liability ranges
- Risk factors
- Defensive strategies they might employ

Provide a quantitative risk assessment.
"#;

pub const LEVERAGE_ANALYSIS_FOCUS: &str = r#"
## Focus: Leverage
- Strongest leverage points
- Settlement optimization
- Negotiation pressure points
- Timing considerations

Provide a tactical leverage analysis.
"#;

pub const COMMUNICATION_STRATEGY_FOCUS: &str = r#"
## Focus: Communication Strategy
- Key messages for each audience
- Media recommendations
- Stakeholder communication plan
- Crisis communication protocol

Provide a communication framework.
"#;

pub const SETTLEMENT_TRENDS_FOCUS: &str = r#"
## Focus: Settlement Trends
- Recent settlement amounts for this case type
- Industry benchmarks
- Trending legal strategies
- Conditions affecting settlements

Provide current market intelligence.
"#;

pub const COMPLAINT_DRAFT_FOCUS: &str = r#"
## Focus: Complaint
- Statement of facts
- Legal claims and theories
- Requested relief
- Supporting documentation requirements

Provide a complete complaint framework.
"#;

pub const MEDIA_PACKAGE_FOCUS: &str = r#"
## Focus: Media Package
- Press release draft
- Talking points
- FAQ for press inquiries
- Social media plan

Provide a complete media package.
"#;

pub const SETTLEMENT_FRAMEWORK_FOCUS: &str = r#"
## Focus: Settlement Framework
- Settlement range and justification
- Non-monetary terms to request
- Negotiation phases
- Deal-breakers

Provide a settlement strategy consistent with the negotiation figures.
"#;

pub const COORDINATION_TIMELINE_FOCUS: &str = r#"
## Focus: Coordination Timeline
- Filing deadlines and milestones
- Media timing
- Negotiation windows
- Escalation triggers

Provide a dated coordination timeline.
"#;

/// Everything a prompt may draw on. Later phases fill in more fields.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub case: &'a CaseFacts,

    /// Digest of the previous phase's successful output
    pub prior_digest: Option<&'a str>,

    pub leverage: Option<&'a LeverageScore>,
    pub framework: Option<&'a NegotiationFramework>,
}

impl<'a> PromptContext<'a> {
    pub fn new(case: &'a CaseFacts) -> Self {
        Self {
            case,
            prior_digest: None,
            leverage: None,
            framework: None,
        }
    }

    pub fn with_digest(mut self, digest: &'a str) -> Self {
        self.prior_digest = Some(digest);
        self
    }

    pub fn with_leverage(mut self, leverage: &'a LeverageScore) -> Self {
        self.leverage = Some(leverage);
        self
    }

    pub fn with_framework(mut self, framework: &'a NegotiationFramework) -> Self {
        self.framework = Some(framework);
        self
    }
}

/// Render the prompt for one provider in one phase.
pub fn build_prompt(phase: Phase, focus: Focus, ctx: &PromptContext<'_>) -> String {
    let mut prompt = String::new();
    prompt.push_str(phase.preamble().trim_start());
    prompt.push('\n');
    write_case(&mut prompt, ctx.case);

    if phase != Phase::Research {
        let heading = match phase {
            Phase::Analysis => "Research Findings",
            _ => "Strategic Analysis",
        };
        let digest = ctx
            .prior_digest
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No findings were returned by the previous phase.");
        let _ = write!(prompt, "\n## {}\n{}\n", heading, digest);
    }

    if let Some(leverage) = ctx.leverage {
        write_leverage(&mut prompt, leverage);
    }
    if let Some(framework) = ctx.framework {
        write_framework(&mut prompt, framework);
    }

    prompt.push_str(focus.instructions());
    prompt
}

fn write_case(out: &mut String, case: &CaseFacts) {
    let _ = write!(out, "\n## Case: {}\n", case.display_name());
    if !case.summary.trim().is_empty() {
        let _ = writeln!(out, "Summary: {}", case.summary.trim());
    }
    if !case.legal_issues.is_empty() {
        let _ = writeln!(out, "Legal issues: {}", case.legal_issues.join("; "));
    }
    if !case.regulatory_context.is_empty() {
        let _ = writeln!(out, "Regulatory context: {}", case.regulatory_context.join("; "));
    }
    if let Some(story) = case.human_story.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "Human story: {}", story.trim());
    }
    if let Some(jurisdiction) = &case.jurisdiction {
        let _ = writeln!(out, "Jurisdiction: {}", jurisdiction);
    }
    if !case.claim_types.is_empty() {
        let claims: Vec<&str> = case.claim_types.iter().map(|c| c.as_str()).collect();
        let _ = writeln!(out, "Claims: {}", claims.join(", "));
    }
    if case.economic_damages > 0.0 {
        let _ = writeln!(out, "Economic damages: ${:.0}", case.economic_damages);
    }
}

fn write_leverage(out: &mut String, leverage: &LeverageScore) {
    let _ = write!(
        out,
        "\n## Leverage\nOverall: {:.1}/100 ({})\nSettlement probability: {:.0}%\n",
        leverage.overall,
        leverage.risk_tier,
        leverage.settlement_probability * 100.0
    );
    for point in &leverage.pressure_points {
        let _ = writeln!(out, "- {} at {:.0}: {}", point.factor, point.score, point.recommendation);
    }
}

fn write_framework(out: &mut String, framework: &NegotiationFramework) {
    let _ = write!(
        out,
        "\n## Negotiation\nOpening: ${:.0}\nTarget: ${:.0}\nFloor: ${:.0}\nStance: {}\n",
        framework.opening,
        framework.target,
        framework.floor,
        framework.stance.label()
    );
}
