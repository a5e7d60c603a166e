//! Intelligence records gathered about a case and the counters scoring reads.
//!
//! [`Evidence`] and [`Violation`] records are append-only once stored; only
//! their verification, relevance, and status fields change afterwards. The
//! scoring engine never sees records directly, only an [`IntelligenceSummary`].

mod extract;

pub use extract::{extract_evidence, extract_key_findings, extract_violations, ResearchFindings};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How serious a violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Lifecycle of a violation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStatus {
    Open,
    InProgress,
    Resolved,
    Ignored,
}

impl ViolationStatus {
    /// Resolved and ignored are final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ViolationStatus::Resolved | ViolationStatus::Ignored)
    }
}

impl fmt::Display for ViolationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationStatus::Open => "open",
            ViolationStatus::InProgress => "in_progress",
            ViolationStatus::Resolved => "resolved",
            ViolationStatus::Ignored => "ignored",
        };
        f.write_str(s)
    }
}

/// A piece of evidence supporting the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub case_id: String,

    /// Free-form category (e.g. "research_finding", "document")
    pub kind: String,

    pub description: String,
    pub source: String,
    pub collected_at: DateTime<Utc>,

    /// 0.0–1.0
    pub relevance_score: f64,

    #[serde(default)]
    pub verified: bool,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Evidence {
    /// New unverified evidence with a generated id.
    pub fn new(
        case_id: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
        relevance_score: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            case_id: case_id.into(),
            kind: kind.into(),
            description: description.into(),
            source: source.into(),
            collected_at: Utc::now(),
            relevance_score: relevance_score.clamp(0.0, 1.0),
            verified: false,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A regulatory or legal violation attributed to the opposing party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub id: String,
    pub case_id: String,
    pub kind: String,
    pub severity: Severity,
    pub status: ViolationStatus,
    pub description: String,

    #[serde(default)]
    pub fine_amount: f64,

    /// Ids of supporting evidence
    #[serde(default)]
    pub evidence_ids: Vec<String>,

    pub reported_at: DateTime<Utc>,
}

impl Violation {
    /// New open violation with a generated id.
    pub fn new(
        case_id: impl Into<String>,
        kind: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            case_id: case_id.into(),
            kind: kind.into(),
            severity,
            status: ViolationStatus::Open,
            description: description.into(),
            fine_amount: 0.0,
            evidence_ids: Vec::new(),
            reported_at: Utc::now(),
        }
    }

    pub fn with_fine(mut self, amount: f64) -> Self {
        self.fine_amount = amount.max(0.0);
        self
    }
}

/// Evidence counters consumed by scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSummary {
    #[serde(default)]
    pub total: u32,

    #[serde(default)]
    pub verified: u32,

    #[serde(default)]
    pub average_relevance: f64,
}

/// Violation counters consumed by scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationSummary {
    /// Explicit total; when absent the severity counts are summed
    #[serde(default)]
    pub total_violations: Option<u32>,

    #[serde(default)]
    pub critical: u32,

    #[serde(default)]
    pub major: u32,

    #[serde(default)]
    pub minor: u32,

    /// Violations still open
    #[serde(default)]
    pub open: u32,

    #[serde(default)]
    pub total_fines: f64,
}

impl ViolationSummary {
    pub fn total(&self) -> u32 {
        self.total_violations.unwrap_or_else(|| {
            self.critical
                .saturating_add(self.major)
                .saturating_add(self.minor)
        })
    }
}

/// Everything scoring knows about gathered intelligence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceSummary {
    #[serde(default)]
    pub evidence: EvidenceSummary,

    #[serde(default)]
    pub violations: ViolationSummary,
}

impl IntelligenceSummary {
    /// Summarize stored records.
    pub fn from_records(evidence: &[Evidence], violations: &[Violation]) -> Self {
        let total = evidence.len() as u32;
        let verified = evidence.iter().filter(|e| e.verified).count() as u32;
        let average_relevance = if evidence.is_empty() {
            0.0
        } else {
            evidence.iter().map(|e| e.relevance_score).sum::<f64>() / evidence.len() as f64
        };

        let count = |severity: Severity| {
            violations.iter().filter(|v| v.severity == severity).count() as u32
        };

        Self {
            evidence: EvidenceSummary {
                total,
                verified,
                average_relevance,
            },
            violations: ViolationSummary {
                total_violations: Some(violations.len() as u32),
                critical: count(Severity::Critical),
                major: count(Severity::Major),
                minor: count(Severity::Minor),
                open: violations
                    .iter()
                    .filter(|v| v.status == ViolationStatus::Open)
                    .count() as u32,
                total_fines: violations.iter().map(|v| v.fine_amount).sum(),
            },
        }
    }
}
