//! Plain-text rendering of assessments and mission reports.

use std::fmt::Write as _;

use accord_core::{CaseFacts, NegotiationFramework, StrategicAssessment, Synthesis};
use accord_runtime::{MissionReport, Phase};

fn money(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

pub fn assessment(
    case: &CaseFacts,
    assessment: &StrategicAssessment,
    framework: &NegotiationFramework,
) -> String {
    let mut out = String::new();
    let leverage = &assessment.leverage;
    let settlement = &assessment.settlement;

    let _ = writeln!(out, "{}", case.display_name());
    let _ = writeln!(out, "{}", "=".repeat(case.display_name().chars().count()));
    let _ = writeln!(
        out,
        "Leverage:        {:.1}/100 ({}, {:?})",
        leverage.overall, leverage.risk_tier, assessment.case_strength
    );
    let _ = writeln!(out, "Strategy:        {:?}", assessment.primary_strategy);
    let _ = writeln!(
        out,
        "Settlement odds: {:.0}%",
        leverage.settlement_probability * 100.0
    );

    let _ = writeln!(out, "\nFactors");
    for (kind, score) in leverage.factors.iter() {
        let _ = writeln!(out, "  {:<18} {:>5.1}", kind.as_str(), score);
    }

    if !leverage.pressure_points.is_empty() {
        let _ = writeln!(out, "\nPressure points");
        for point in &leverage.pressure_points {
            let _ = writeln!(
                out,
                "  {} ({:.0}, {:?}): {}",
                point.factor, point.score, point.impact, point.recommendation
            );
        }
    }

    let _ = writeln!(out, "\nSettlement");
    let _ = writeln!(
        out,
        "  Range:   {} / {} / {}",
        money(settlement.range.low),
        money(settlement.range.mid),
        money(settlement.range.high)
    );
    let _ = writeln!(out, "  Demand:  {}", money(settlement.recommended_demand));
    let _ = writeln!(out, "  Floor:   {}", money(settlement.recommended_floor));
    let _ = writeln!(out, "  Confidence: {:.0}%", settlement.confidence * 100.0);
    let _ = writeln!(out, "  Stance:  {}", settlement.stance.label());

    let _ = writeln!(
        out,
        "\nConcession schedule ({:.0}% per round, cap {})",
        framework.concession_rate * 100.0,
        framework.round_cap
    );
    for step in &framework.schedule {
        let _ = writeln!(
            out,
            "  Round {}: {:>12}  {}",
            step.round,
            money(step.position),
            step.rationale.description()
        );
    }

    if !assessment.action_plan.is_empty() {
        let _ = writeln!(out, "\nAction plan");
        for item in &assessment.action_plan {
            let _ = writeln!(out, "  [{:?}] {}", item.priority, item.action);
        }
    }

    out
}

fn phase_line(phase: Phase, synthesis: &Synthesis) -> String {
    let summary = &synthesis.summary;
    let mut line = format!(
        "  {:<10} {}/{} succeeded",
        phase.as_str(),
        summary.success_count,
        summary.total
    );
    if !synthesis.common_themes.is_empty() {
        let _ = write!(line, "  themes: {}", synthesis.common_themes.join(", "));
    }
    line
}

pub fn mission(case: &CaseFacts, report: &MissionReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Mission {} ({:?})", report.mission_id, report.state);
    for phase in Phase::ALL {
        let _ = writeln!(out, "{}", phase_line(phase, report.phase(phase)));
    }
    let _ = writeln!(
        out,
        "  Success rate: {:.0}%",
        report.success_rate() * 100.0
    );

    if !report.shortfalls.is_empty() {
        let _ = writeln!(out, "\nShortfalls");
        for shortfall in &report.shortfalls {
            let failed: Vec<String> = shortfall
                .failures
                .iter()
                .map(|(id, kind)| format!("{} ({})", id, kind))
                .collect();
            let _ = writeln!(
                out,
                "  {}: {}/{} failed {}",
                shortfall.phase,
                shortfall.failed,
                shortfall.total,
                failed.join(", ")
            );
        }
    }

    if !report.key_findings.is_empty() {
        let _ = writeln!(out, "\nKey findings");
        for finding in &report.key_findings {
            let _ = writeln!(out, "  {}", finding);
        }
    }

    let intel = &report.intelligence;
    let _ = writeln!(
        out,
        "\nLedger: {} evidence ({} verified), {} violations\n",
        intel.evidence.total,
        intel.evidence.verified,
        intel.violations.total()
    );

    out.push_str(&assessment(case, &report.assessment, &report.framework));
    out
}
