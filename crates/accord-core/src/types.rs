//! Task value types shared by the dispatch engine and the synthesizer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identifier of a registered provider (e.g. "claude", "gemini").
///
/// Ordering is lexicographic, which gives every provider-keyed map in the
/// crate a stable iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A unit of work addressed to one provider.
///
/// Immutable once submitted; the engine shares it with workers behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Generated at construction (UUID v4)
    pub id: Uuid,

    /// Provider this task is addressed to
    pub provider_id: ProviderId,

    /// Prompt text handed to the provider
    pub prompt: String,

    /// Opaque provider parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl TaskSpec {
    /// Create a task with a fresh id and no parameters.
    pub fn new(provider_id: impl Into<ProviderId>, prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider_id: provider_id.into(),
            prompt: prompt.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Attach a provider parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Why a task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Provider id was not present in the registry
    ProviderUnavailable,

    /// Provider rejected the task before execution
    ValidationFailed,

    /// Provider raised an error (or panicked) while executing
    ProviderError,

    /// Per-task deadline elapsed
    Timeout,

    /// Provider's circuit was open; the task was not executed
    CircuitOpen,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ProviderUnavailable => "provider_unavailable",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::ProviderError => "provider_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::CircuitOpen => "circuit_open",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of exactly one [`TaskSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: Uuid,
    pub provider_id: ProviderId,
    pub success: bool,

    /// Provider output (present iff `success`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Milliseconds since the dispatching engine's epoch
    pub completed_at_ms: u64,
}

impl TaskResult {
    pub fn succeeded(task: &TaskSpec, content: impl Into<String>, completed_at_ms: u64) -> Self {
        Self {
            task_id: task.id,
            provider_id: task.provider_id.clone(),
            success: true,
            content: Some(content.into()),
            error_kind: None,
            error: None,
            completed_at_ms,
        }
    }

    pub fn failed(
        task: &TaskSpec,
        kind: ErrorKind,
        message: impl Into<String>,
        completed_at_ms: u64,
    ) -> Self {
        Self {
            task_id: task.id,
            provider_id: task.provider_id.clone(),
            success: false,
            content: None,
            error_kind: Some(kind),
            error: Some(message.into()),
            completed_at_ms,
        }
    }
}

/// Results of one dispatch, keyed (and therefore ordered) by provider id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseResult {
    results: BTreeMap<ProviderId, TaskResult>,
}

impl PhaseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result; a later insert for the same provider replaces the earlier one.
    pub fn insert(&mut self, result: TaskResult) {
        self.results.insert(result.provider_id.clone(), result);
    }

    pub fn get(&self, provider_id: &ProviderId) -> Option<&TaskResult> {
        self.results.get(provider_id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProviderId, &TaskResult)> {
        self.results.iter()
    }

    pub fn provider_ids(&self) -> impl Iterator<Item = &ProviderId> {
        self.results.keys()
    }

    pub fn successes(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.values().filter(|r| r.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.values().filter(|r| !r.success)
    }

    pub fn into_inner(self) -> BTreeMap<ProviderId, TaskResult> {
        self.results
    }
}

impl FromIterator<TaskResult> for PhaseResult {
    fn from_iter<I: IntoIterator<Item = TaskResult>>(iter: I) -> Self {
        let mut phase = PhaseResult::new();
        for result in iter {
            phase.insert(result);
        }
        phase
    }
}
