//! Synthesizer: merges one phase's results into a single structured summary.
//!
//! The synthesizer is pure. It never calls a provider and never reorders
//! anything except by provider id, so the same [`PhaseResult`] always yields
//! the same [`Synthesis`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ErrorKind, PhaseResult, ProviderId, TaskResult};

/// Themes looked for across successful provider outputs.
pub const THEME_KEYWORDS: &[&str] = &[
    "violation",
    "discrimination",
    "safety",
    "accommodation",
    "retaliation",
    "settlement",
];

/// Counts for a synthesized phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisSummary {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,

    /// Sorted
    pub provider_ids: Vec<ProviderId>,
}

/// Successful output attributed to its provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub source: ProviderId,
    pub content: String,
}

/// A failed task, as reported in a synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureNote {
    pub source: ProviderId,
    pub error_kind: ErrorKind,
    pub message: String,
}

/// The merged view of a [`PhaseResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub summary: SynthesisSummary,
    pub results_by_provider: BTreeMap<ProviderId, TaskResult>,
    pub combined_insights: Vec<Insight>,
    pub errors: Vec<FailureNote>,
    pub common_themes: Vec<String>,
}

impl Synthesis {
    /// Fraction of tasks that succeeded; 0.0 for an empty phase.
    pub fn success_rate(&self) -> f64 {
        if self.summary.total == 0 {
            0.0
        } else {
            self.summary.success_count as f64 / self.summary.total as f64
        }
    }

    /// True when the phase had at least one task and none succeeded.
    pub fn is_total_failure(&self) -> bool {
        self.summary.total > 0 && self.summary.success_count == 0
    }

    /// Condense the insights into prompt context for the next phase.
    ///
    /// Each insight becomes `"SOURCE: <first max_chars chars>..."`, joined by
    /// blank lines. Truncation counts characters, not bytes.
    pub fn context_digest(&self, max_chars: usize) -> String {
        self.combined_insights
            .iter()
            .map(|insight| {
                let excerpt: String = insight.content.chars().take(max_chars).collect();
                format!("{}: {}...", insight.source.as_str().to_uppercase(), excerpt)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The ResultSynthesizer merges a phase into a [`Synthesis`].
pub struct ResultSynthesizer;

impl ResultSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Synthesize a phase.
    ///
    /// `success_count + failure_count == total == phase.len()` always holds.
    pub fn synthesize(&self, phase: &PhaseResult) -> Synthesis {
        let provider_ids: Vec<ProviderId> = phase.provider_ids().cloned().collect();

        let combined_insights: Vec<Insight> = phase
            .successes()
            .map(|r| Insight {
                source: r.provider_id.clone(),
                content: r.content.clone().unwrap_or_default(),
            })
            .collect();

        let errors: Vec<FailureNote> = phase
            .failures()
            .map(|r| FailureNote {
                source: r.provider_id.clone(),
                error_kind: r.error_kind.unwrap_or(ErrorKind::ProviderError),
                message: r.error.clone().unwrap_or_else(|| "unknown error".to_string()),
            })
            .collect();

        let common_themes = self.common_themes(&combined_insights);

        Synthesis {
            summary: SynthesisSummary {
                total: phase.len(),
                success_count: combined_insights.len(),
                failure_count: errors.len(),
                provider_ids,
            },
            results_by_provider: phase.clone().into_inner(),
            combined_insights,
            errors,
            common_themes,
        }
    }

    /// A theme is common when it appears in at least half of the successful outputs.
    fn common_themes(&self, insights: &[Insight]) -> Vec<String> {
        if insights.is_empty() {
            return Vec::new();
        }

        let lowered: Vec<String> = insights.iter().map(|i| i.content.to_lowercase()).collect();

        THEME_KEYWORDS
            .iter()
            .filter(|theme| {
                let hits = lowered.iter().filter(|c| c.contains(*theme)).count();
                hits * 2 >= lowered.len()
            })
            .map(|theme| theme.to_string())
            .collect()
    }
}

impl Default for ResultSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskSpec;
    use proptest::prelude::*;

    fn ok(provider: &str, content: &str) -> TaskResult {
        TaskResult::succeeded(&TaskSpec::new(provider, "p"), content, 1)
    }

    fn failed(provider: &str, kind: ErrorKind) -> TaskResult {
        TaskResult::failed(&TaskSpec::new(provider, "p"), kind, "boom", 1)
    }

    #[test]
    fn test_counts_partition_total() {
        let phase: PhaseResult = vec![
            ok("claude", "narrative"),
            failed("deepseek", ErrorKind::ProviderError),
            ok("gemini", "research"),
        ]
        .into_iter()
        .collect();

        let synthesis = ResultSynthesizer::new().synthesize(&phase);
        assert_eq!(synthesis.summary.total, 3);
        assert_eq!(synthesis.summary.success_count, 2);
        assert_eq!(synthesis.summary.failure_count, 1);
        assert_eq!(synthesis.errors[0].source, ProviderId::from("deepseek"));
        assert_eq!(synthesis.errors[0].error_kind, ErrorKind::ProviderError);
    }

    #[test]
    fn test_insights_follow_provider_order() {
        let phase: PhaseResult = vec![ok("gemini", "g"), ok("chatgpt", "c"), ok("claude", "k")]
            .into_iter()
            .collect();

        let synthesis = ResultSynthesizer::new().synthesize(&phase);
        let sources: Vec<&str> = synthesis
            .combined_insights
            .iter()
            .map(|i| i.source.as_str())
            .collect();
        assert_eq!(sources, vec!["chatgpt", "claude", "gemini"]);
    }

    #[test]
    fn test_empty_phase() {
        let synthesis = ResultSynthesizer::new().synthesize(&PhaseResult::new());
        assert_eq!(synthesis.summary.total, 0);
        assert_eq!(synthesis.success_rate(), 0.0);
        assert!(!synthesis.is_total_failure());
        assert!(synthesis.common_themes.is_empty());
    }

    #[test]
    fn test_total_failure_detected() {
        let phase: PhaseResult = vec![failed("claude", ErrorKind::Timeout)].into_iter().collect();
        let synthesis = ResultSynthesizer::new().synthesize(&phase);
        assert!(synthesis.is_total_failure());
    }

    #[test]
    fn test_common_themes_need_half_of_outputs() {
        let phase: PhaseResult = vec![
            ok("a", "Repeated Safety failures and retaliation"),
            ok("b", "safety inspections overdue"),
            ok("c", "retaliation after complaint"),
            ok("d", "accommodation denied"),
        ]
        .into_iter()
        .collect();

        let synthesis = ResultSynthesizer::new().synthesize(&phase);
        assert_eq!(synthesis.common_themes, vec!["safety", "retaliation"]);
    }

    #[test]
    fn test_context_digest_truncates_by_chars() {
        let phase: PhaseResult = vec![ok("claude", "abcdef"), ok("gemini", "ééééé")]
            .into_iter()
            .collect();

        let digest = ResultSynthesizer::new().synthesize(&phase).context_digest(3);
        assert_eq!(digest, "CLAUDE: abc...\n\nGEMINI: ééé...");
    }

    const KINDS: [ErrorKind; 5] = [
        ErrorKind::ProviderUnavailable,
        ErrorKind::ValidationFailed,
        ErrorKind::ProviderError,
        ErrorKind::Timeout,
        ErrorKind::CircuitOpen,
    ];

    proptest! {
        #[test]
        fn prop_counts_partition_total(
            entries in prop::collection::vec(
                ("[a-z]{1,6}", any::<bool>(), "[ -~]{0,40}", 0usize..5),
                0..12,
            ),
        ) {
            let phase: PhaseResult = entries
                .iter()
                .map(|(provider, success, content, kind)| {
                    if *success {
                        ok(provider, content)
                    } else {
                        failed(provider, KINDS[*kind])
                    }
                })
                .collect();

            let synthesis = ResultSynthesizer::new().synthesize(&phase);
            let summary = &synthesis.summary;
            prop_assert_eq!(summary.total, phase.len());
            prop_assert_eq!(summary.success_count + summary.failure_count, summary.total);
            prop_assert_eq!(summary.success_count, phase.successes().count());
            prop_assert_eq!(synthesis.errors.len(), summary.failure_count);
            prop_assert!(summary.provider_ids.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
