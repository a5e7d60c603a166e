//! Case ledger: the append-only evidence and violation store for one case.
//!
//! Records are only ever appended. The fields that may change afterwards are
//! evidence relevance and verification, violation status (forward only), and
//! violation-to-evidence links. All writes go through a single lock, so a
//! batch of findings lands atomically or not at all.

use accord_core::{Evidence, IntelligenceSummary, ResearchFindings, Violation, ViolationStatus};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Unknown evidence: {0}")]
    UnknownEvidence(String),

    #[error("Unknown violation: {0}")]
    UnknownViolation(String),

    #[error("Record belongs to case '{found}', ledger holds '{expected}'")]
    CaseMismatch { expected: String, found: String },

    #[error("Violation {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: ViolationStatus,
        to: ViolationStatus,
    },

    #[error("Duplicate record id: {0}")]
    DuplicateId(String),

    #[error("Relevance must be within 0.0..=1.0, got {0}")]
    InvalidRelevance(f64),
}

#[derive(Default)]
struct LedgerState {
    evidence: Vec<Evidence>,
    violations: Vec<Violation>,
}

impl LedgerState {
    fn evidence_ids(&self) -> BTreeSet<&str> {
        self.evidence.iter().map(|e| e.id.as_str()).collect()
    }

    fn violation_mut(&mut self, id: &str) -> Result<&mut Violation, LedgerError> {
        self.violations
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| LedgerError::UnknownViolation(id.to_string()))
    }

    fn evidence_mut(&mut self, id: &str) -> Result<&mut Evidence, LedgerError> {
        self.evidence
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| LedgerError::UnknownEvidence(id.to_string()))
    }
}

pub struct CaseLedger {
    case_id: String,
    state: RwLock<LedgerState>,
}

impl CaseLedger {
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            state: RwLock::new(LedgerState::default()),
        }
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    fn check_case(&self, case_id: &str) -> Result<(), LedgerError> {
        if case_id != self.case_id {
            return Err(LedgerError::CaseMismatch {
                expected: self.case_id.clone(),
                found: case_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn add_evidence(&self, evidence: Evidence) -> Result<String, LedgerError> {
        self.check_case(&evidence.case_id)?;
        let mut state = self.state.write();
        if state.evidence.iter().any(|e| e.id == evidence.id) {
            return Err(LedgerError::DuplicateId(evidence.id));
        }
        let id = evidence.id.clone();
        state.evidence.push(evidence);
        Ok(id)
    }

    /// Append a violation. Every referenced evidence id must already be stored.
    pub fn add_violation(&self, violation: Violation) -> Result<String, LedgerError> {
        self.check_case(&violation.case_id)?;
        let mut state = self.state.write();
        if state.violations.iter().any(|v| v.id == violation.id) {
            return Err(LedgerError::DuplicateId(violation.id));
        }
        let known = state.evidence_ids();
        if let Some(missing) = violation.evidence_ids.iter().find(|id| !known.contains(id.as_str())) {
            return Err(LedgerError::UnknownEvidence(missing.clone()));
        }
        let id = violation.id.clone();
        state.violations.push(violation);
        Ok(id)
    }

    /// Append everything extracted from one provider's research, all or nothing.
    ///
    /// Returns the number of evidence and violation records added.
    pub fn record_findings(&self, findings: &ResearchFindings) -> Result<(usize, usize), LedgerError> {
        for e in &findings.evidence {
            self.check_case(&e.case_id)?;
        }
        for v in &findings.violations {
            self.check_case(&v.case_id)?;
        }

        let mut state = self.state.write();
        let mut seen: BTreeSet<&str> = state.evidence_ids();
        seen.extend(state.violations.iter().map(|v| v.id.as_str()));
        for id in findings
            .evidence
            .iter()
            .map(|e| e.id.as_str())
            .chain(findings.violations.iter().map(|v| v.id.as_str()))
        {
            if !seen.insert(id) {
                return Err(LedgerError::DuplicateId(id.to_string()));
            }
        }
        drop(seen);

        state.evidence.extend(findings.evidence.iter().cloned());
        state.violations.extend(findings.violations.iter().cloned());
        Ok((findings.evidence.len(), findings.violations.len()))
    }

    pub fn verify_evidence(&self, evidence_id: &str) -> Result<(), LedgerError> {
        self.state.write().evidence_mut(evidence_id)?.verified = true;
        Ok(())
    }

    pub fn update_relevance(&self, evidence_id: &str, relevance: f64) -> Result<(), LedgerError> {
        if !(0.0..=1.0).contains(&relevance) {
            return Err(LedgerError::InvalidRelevance(relevance));
        }
        self.state.write().evidence_mut(evidence_id)?.relevance_score = relevance;
        Ok(())
    }

    /// Move a violation forward: open to in_progress, or either of those to a
    /// terminal status. Terminal statuses never change.
    pub fn set_violation_status(
        &self,
        violation_id: &str,
        status: ViolationStatus,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        let violation = state.violation_mut(violation_id)?;
        let allowed = match (violation.status, status) {
            (ViolationStatus::Open, ViolationStatus::InProgress) => true,
            (from, to) => !from.is_terminal() && to.is_terminal(),
        };
        if !allowed {
            return Err(LedgerError::InvalidTransition {
                id: violation_id.to_string(),
                from: violation.status,
                to: status,
            });
        }
        tracing::debug!(violation = %violation_id, from = %violation.status, to = %status, "Violation status changed");
        violation.status = status;
        Ok(())
    }

    pub fn link_evidence(&self, violation_id: &str, evidence_id: &str) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        if !state.evidence.iter().any(|e| e.id == evidence_id) {
            return Err(LedgerError::UnknownEvidence(evidence_id.to_string()));
        }
        let violation = state.violation_mut(violation_id)?;
        if !violation.evidence_ids.iter().any(|id| id == evidence_id) {
            violation.evidence_ids.push(evidence_id.to_string());
        }
        Ok(())
    }

    pub fn evidence(&self) -> Vec<Evidence> {
        self.state.read().evidence.clone()
    }

    pub fn violations(&self) -> Vec<Violation> {
        self.state.read().violations.clone()
    }

    /// Counters for scoring, computed from the current records.
    pub fn summary(&self) -> IntelligenceSummary {
        let state = self.state.read();
        IntelligenceSummary::from_records(&state.evidence, &state.violations)
    }
}
