//! Append-only log of every task result the engine produces.

use accord_core::{ProviderId, TaskResult};
use parking_lot::RwLock;

/// Sink for task results. Appends must be safe from concurrent workers.
pub trait TaskHistory: Send + Sync {
    fn record(&self, result: TaskResult);

    /// Everything recorded so far, in append order.
    fn snapshot(&self) -> Vec<TaskResult>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct InMemoryTaskHistory {
    entries: RwLock<Vec<TaskResult>>,
}

impl InMemoryTaskHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_provider(&self, provider: &ProviderId) -> Vec<TaskResult> {
        self.entries
            .read()
            .iter()
            .filter(|r| &r.provider_id == provider)
            .cloned()
            .collect()
    }
}

impl TaskHistory for InMemoryTaskHistory {
    fn record(&self, result: TaskResult) {
        self.entries.write().push(result);
    }

    fn snapshot(&self) -> Vec<TaskResult> {
        self.entries.read().clone()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
