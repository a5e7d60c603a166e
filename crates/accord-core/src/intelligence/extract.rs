//! Keyword extraction of evidence and violations from research output.
//!
//! Research content is split into sentences on `.`; a sentence that mentions
//! an indicator keyword becomes one candidate record. This is deliberately
//! shallow: records come out unverified with a flat relevance.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Evidence, Severity, Violation};

/// Relevance assigned to keyword-extracted evidence.
pub const EXTRACTED_RELEVANCE: f64 = 0.7;

/// Longest description kept for an extracted record, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

lazy_static! {
    /// Sentences worth keeping as evidence
    pub static ref EVIDENCE_PATTERN: Regex = Regex::new(
        r"(?i)violation|citation|complaint|inspection|document|record|testimony|report"
    ).unwrap();

    /// Sentences describing a violation
    pub static ref VIOLATION_PATTERN: Regex = Regex::new(
        r"(?i)safety violation|building code|osha|ada violation|non-compliance|citation|fine"
    ).unwrap();

    pub static ref CRITICAL_PATTERN: Regex = Regex::new(
        r"(?i)critical|severe|serious"
    ).unwrap();

    pub static ref MAJOR_PATTERN: Regex = Regex::new(
        r"(?i)major|significant"
    ).unwrap();
}

/// Candidate records pulled from one provider's research output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchFindings {
    pub evidence: Vec<Evidence>,
    pub violations: Vec<Violation>,
    pub key_findings: Vec<String>,
}

impl ResearchFindings {
    /// Run every extractor over `content`.
    pub fn extract(case_id: &str, source: &str, content: &str) -> Self {
        Self {
            evidence: extract_evidence(case_id, source, content),
            violations: extract_violations(case_id, source, content),
            key_findings: extract_key_findings(source, content).into_iter().collect(),
        }
    }
}

fn sentences(content: &str) -> impl Iterator<Item = &str> {
    content.split('.').map(str::trim).filter(|s| !s.is_empty())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Grade a violation sentence by its wording.
pub fn classify_severity(sentence: &str) -> Severity {
    if CRITICAL_PATTERN.is_match(sentence) {
        Severity::Critical
    } else if MAJOR_PATTERN.is_match(sentence) {
        Severity::Major
    } else {
        Severity::Minor
    }
}

/// One unverified evidence record per sentence mentioning an evidence keyword.
pub fn extract_evidence(case_id: &str, source: &str, content: &str) -> Vec<Evidence> {
    sentences(content)
        .filter(|s| EVIDENCE_PATTERN.is_match(s))
        .map(|s| {
            Evidence::new(
                case_id,
                "research_finding",
                truncate(s, MAX_DESCRIPTION_CHARS),
                format!("research:{}", source),
                EXTRACTED_RELEVANCE,
            )
            .with_tags([source, "research"])
        })
        .collect()
}

/// One open violation per sentence mentioning a violation keyword.
pub fn extract_violations(case_id: &str, source: &str, content: &str) -> Vec<Violation> {
    sentences(content)
        .filter(|s| VIOLATION_PATTERN.is_match(s))
        .map(|s| {
            Violation::new(
                case_id,
                format!("identified_by:{}", source),
                classify_severity(s),
                truncate(s, MAX_DESCRIPTION_CHARS),
            )
        })
        .collect()
}

/// The first substantive sentence (over 50 chars), prefixed by its source.
pub fn extract_key_findings(source: &str, content: &str) -> Option<String> {
    sentences(content)
        .find(|s| s.chars().count() > 50)
        .map(|s| format!("{}: {}...", source.to_uppercase(), truncate(s, 200)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::ViolationStatus;

    const RESEARCH: &str = "The county issued a citation for a serious OSHA breach in 2023. \
        Staff were not trained. A significant building code problem was noted in the inspection report. \
        Management filed a complaint response late.";

    #[test]
    fn test_evidence_per_matching_sentence() {
        let evidence = extract_evidence("c-1", "gemini", RESEARCH);
        assert_eq!(evidence.len(), 3);
        assert!(evidence.iter().all(|e| !e.verified));
        assert!(evidence.iter().all(|e| e.relevance_score == EXTRACTED_RELEVANCE));
        assert_eq!(evidence[0].source, "research:gemini");
        assert_eq!(evidence[0].tags, vec!["gemini", "research"]);
    }

    #[test]
    fn test_violation_severity_from_wording() {
        let violations = extract_violations("c-1", "gemini", RESEARCH);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].severity, Severity::Critical);
        assert_eq!(violations[1].severity, Severity::Major);
        assert!(violations.iter().all(|v| v.status == ViolationStatus::Open));
    }

    #[test]
    fn test_minor_by_default() {
        assert_eq!(classify_severity("A fine was issued"), Severity::Minor);
    }

    #[test]
    fn test_no_matches() {
        let findings = ResearchFindings::extract("c-1", "claude", "Nothing to see here. Move along.");
        assert!(findings.evidence.is_empty());
        assert!(findings.violations.is_empty());
        assert!(findings.key_findings.is_empty());
    }

    #[test]
    fn test_description_truncated() {
        let long = format!("inspection {}", "x".repeat(800));
        let evidence = extract_evidence("c-1", "claude", &long);
        assert_eq!(evidence[0].description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_key_finding_skips_short_sentences() {
        let finding = extract_key_findings("claude", RESEARCH).unwrap();
        assert!(finding.starts_with("CLAUDE: The county issued a citation"));
        assert!(finding.ends_with("..."));
    }
}
