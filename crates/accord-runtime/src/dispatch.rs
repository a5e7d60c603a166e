//! TaskDispatchEngine: bounded-parallel fan-out to providers.
//!
//! Every task runs in its own spawned worker gated by a semaphore. A worker
//! never lets an error escape: rejection, provider errors, timeouts, open
//! circuits and panics all become failed [`TaskResult`]s. Fan-in waits for
//! every worker, so one slow provider delays the phase but never drops a
//! sibling's result.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use accord_core::{ErrorKind, PhaseResult, ProviderId, TaskResult, TaskSpec};
use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::config::RuntimeConfig;
use crate::history::{InMemoryTaskHistory, TaskHistory};
use crate::providers::{ProviderClient, ProviderRegistry};
use crate::resilience::CircuitBreaker;

/// Key a list of tasks by their provider id. A later task for the same
/// provider replaces an earlier one.
pub fn batch_of(tasks: impl IntoIterator<Item = TaskSpec>) -> BTreeMap<ProviderId, TaskSpec> {
    tasks
        .into_iter()
        .map(|task| (task.provider_id.clone(), task))
        .collect()
}

pub struct TaskDispatchEngine {
    history: Arc<dyn TaskHistory>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
    task_timeout: Option<Duration>,
    strict_accounting: bool,
    epoch: Instant,
}

impl TaskDispatchEngine {
    /// Engine with an in-memory history, no deadline, no breaker, relaxed accounting.
    pub fn new() -> Self {
        Self {
            history: Arc::new(InMemoryTaskHistory::new()),
            circuit_breaker: None,
            task_timeout: None,
            strict_accounting: false,
            epoch: Instant::now(),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut engine = Self::new()
            .with_task_timeout(config.task_timeout)
            .with_strict_accounting(config.strict_accounting);
        if let Some(cb) = &config.circuit_breaker {
            engine = engine.with_circuit_breaker(Arc::new(CircuitBreaker::new(cb.clone())));
        }
        engine
    }

    pub fn with_history(mut self, history: Arc<dyn TaskHistory>) -> Self {
        self.history = history;
        self
    }

    pub fn with_circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = Some(breaker);
        self
    }

    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_strict_accounting(mut self, strict: bool) -> Self {
        self.strict_accounting = strict;
        self
    }

    pub fn history(&self) -> &Arc<dyn TaskHistory> {
        &self.history
    }

    pub fn circuit_breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        self.circuit_breaker.as_ref()
    }

    fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Run one task per provider with at most `max_parallel` in flight.
    ///
    /// Providers missing from `registry` are skipped with a warning, or
    /// reported as `provider_unavailable` under strict accounting. A task
    /// whose own provider differs from its batch key is never sent and is
    /// reported as `validation_failed` under the key. Every other entry
    /// yields exactly one result.
    pub async fn dispatch(
        &self,
        batch: BTreeMap<ProviderId, TaskSpec>,
        registry: &ProviderRegistry,
        max_parallel: usize,
    ) -> PhaseResult {
        let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
        let mut results = PhaseResult::new();
        let mut pending = Vec::with_capacity(batch.len());

        for (provider_id, task) in batch {
            if task.provider_id != provider_id {
                tracing::warn!(
                    provider = %provider_id,
                    task_provider = %task.provider_id,
                    "Task addressed to a different provider than its batch key"
                );
                let mut result = TaskResult::failed(
                    &task,
                    ErrorKind::ValidationFailed,
                    format!(
                        "task is addressed to '{}' but was batched under '{}'",
                        task.provider_id, provider_id
                    ),
                    self.elapsed_ms(),
                );
                result.provider_id = provider_id;
                self.history.record(result.clone());
                results.insert(result);
                continue;
            }

            let Some(provider) = registry.get(&provider_id).cloned() else {
                tracing::warn!(provider = %provider_id, "Provider not registered, skipping task");
                if self.strict_accounting {
                    let result = TaskResult::failed(
                        &task,
                        ErrorKind::ProviderUnavailable,
                        format!("provider '{}' is not registered", provider_id),
                        self.elapsed_ms(),
                    );
                    self.history.record(result.clone());
                    results.insert(result);
                }
                continue;
            };

            let task = Arc::new(task);
            let worker = Worker {
                provider,
                task: Arc::clone(&task),
                circuit_breaker: self.circuit_breaker.clone(),
                task_timeout: self.task_timeout,
                epoch: self.epoch,
            };
            let sem = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                worker.run().await
            });
            pending.push((task, handle));
        }

        let (tasks, handles): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
        let joined = futures::future::join_all(handles).await;

        for (task, outcome) in tasks.iter().zip(joined) {
            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    let message = panic_message(e);
                    tracing::warn!(provider = %task.provider_id, error = %message, "Provider task panicked");
                    if let Some(cb) = &self.circuit_breaker {
                        cb.record_failure(&task.provider_id);
                    }
                    TaskResult::failed(task, ErrorKind::ProviderError, message, self.elapsed_ms())
                }
            };
            self.history.record(result.clone());
            results.insert(result);
        }

        tracing::debug!(
            results = results.len(),
            failures = results.failures().count(),
            "Dispatch complete"
        );

        results
    }
}

impl Default for TaskDispatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one spawned worker needs, owned.
struct Worker {
    provider: Arc<dyn ProviderClient>,
    task: Arc<TaskSpec>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
    task_timeout: Option<Duration>,
    epoch: Instant,
}

impl Worker {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    async fn run(self) -> TaskResult {
        let provider_id = &self.task.provider_id;

        if let Some(cb) = &self.circuit_breaker {
            if cb.is_open(provider_id) {
                tracing::warn!(provider = %provider_id, "Circuit open, task not sent");
                return TaskResult::failed(
                    &self.task,
                    ErrorKind::CircuitOpen,
                    "circuit open",
                    self.now_ms(),
                );
            }
        }

        if !self.provider.validate(&self.task) {
            tracing::warn!(provider = %provider_id, "Provider rejected task");
            return TaskResult::failed(
                &self.task,
                ErrorKind::ValidationFailed,
                "task rejected by provider validation",
                self.now_ms(),
            );
        }

        let execution = self.provider.execute(&self.task);
        let outcome = match self.task_timeout {
            Some(limit) => match tokio::time::timeout(limit, execution).await {
                Ok(outcome) => Ok(outcome),
                Err(_) => Err(limit),
            },
            None => Ok(execution.await),
        };

        match outcome {
            Ok(Ok(content)) => {
                if let Some(cb) = &self.circuit_breaker {
                    cb.record_success(provider_id);
                }
                TaskResult::succeeded(&self.task, content, self.now_ms())
            }
            Ok(Err(e)) => {
                tracing::warn!(provider = %provider_id, error = %e, "Provider task failed");
                if let Some(cb) = &self.circuit_breaker {
                    cb.record_failure(provider_id);
                }
                TaskResult::failed(&self.task, ErrorKind::ProviderError, e.to_string(), self.now_ms())
            }
            Err(limit) => {
                tracing::warn!(provider = %provider_id, timeout = ?limit, "Provider task timed out");
                if let Some(cb) = &self.circuit_breaker {
                    cb.record_failure(provider_id);
                }
                TaskResult::failed(
                    &self.task,
                    ErrorKind::Timeout,
                    format!("no response within {}", humantime::format_duration(limit)),
                    self.now_ms(),
                )
            }
        }
    }
}

fn panic_message(error: JoinError) -> String {
    if error.is_cancelled() {
        return "task cancelled".to_string();
    }
    let payload = error.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("provider panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("provider panicked: {}", s)
    } else {
        "provider panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{Capability, ProviderError, ScriptedProvider};
    use crate::resilience::CircuitBreakerConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PanickingProvider {
        id: ProviderId,
    }

    #[async_trait]
    impl ProviderClient for PanickingProvider {
        fn id(&self) -> &ProviderId {
            &self.id
        }

        fn capabilities(&self) -> &[Capability] {
            &[]
        }

        async fn execute(&self, _task: &TaskSpec) -> Result<String, ProviderError> {
            panic!("backend exploded");
        }
    }

    /// Tracks how many executions overlap.
    struct GaugedProvider {
        id: ProviderId,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProviderClient for GaugedProvider {
        fn id(&self) -> &ProviderId {
            &self.id
        }

        fn capabilities(&self) -> &[Capability] {
            &[]
        }

        async fn execute(&self, _task: &TaskSpec) -> Result<String, ProviderError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok("done".to_string())
        }
    }

    fn registry(providers: Vec<Arc<dyn ProviderClient>>) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        for provider in providers {
            registry.register(provider);
        }
        registry
    }

    fn tasks(ids: &[&str]) -> BTreeMap<ProviderId, TaskSpec> {
        batch_of(ids.iter().map(|id| TaskSpec::new(*id, "Assess the case")))
    }

    #[tokio::test]
    async fn test_one_result_per_registered_provider() {
        let registry = registry(vec![
            Arc::new(ScriptedProvider::new("claude", "analysis")),
            Arc::new(ScriptedProvider::failing("gemini", "quota")),
            Arc::new(ScriptedProvider::new("grok", "ok").rejecting()),
        ]);
        let engine = TaskDispatchEngine::new();

        let results = engine
            .dispatch(tasks(&["claude", "gemini", "grok"]), &registry, 2)
            .await;

        assert_eq!(results.len(), 3);
        let claude = results.get(&"claude".into()).unwrap();
        assert!(claude.success);
        assert_eq!(claude.content.as_deref(), Some("analysis"));

        let gemini = results.get(&"gemini".into()).unwrap();
        assert_eq!(gemini.error_kind, Some(ErrorKind::ProviderError));
        assert!(gemini.error.as_deref().unwrap().contains("quota"));

        let grok = results.get(&"grok".into()).unwrap();
        assert_eq!(grok.error_kind, Some(ErrorKind::ValidationFailed));

        assert_eq!(engine.history().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_provider_skipped() {
        let registry = registry(vec![
            Arc::new(ScriptedProvider::new("claude", "a")),
            Arc::new(ScriptedProvider::new("grok", "b")),
        ]);
        let engine = TaskDispatchEngine::new();

        let results = engine
            .dispatch(tasks(&["claude", "grok", "perplexity"]), &registry, 4)
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.get(&"perplexity".into()).is_none());
        assert_eq!(engine.history().len(), 2);
    }

    #[tokio::test]
    async fn test_strict_accounting_reports_missing_provider() {
        let registry = registry(vec![Arc::new(ScriptedProvider::new("claude", "a"))]);
        let engine = TaskDispatchEngine::new().with_strict_accounting(true);

        let results = engine
            .dispatch(tasks(&["claude", "perplexity"]), &registry, 4)
            .await;

        assert_eq!(results.len(), 2);
        let missing = results.get(&"perplexity".into()).unwrap();
        assert!(!missing.success);
        assert_eq!(missing.error_kind, Some(ErrorKind::ProviderUnavailable));
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let registry = registry(vec![
            Arc::new(PanickingProvider { id: "gemini".into() }),
            Arc::new(ScriptedProvider::new("claude", "still here")),
        ]);
        let engine = TaskDispatchEngine::new();

        let results = engine.dispatch(tasks(&["claude", "gemini"]), &registry, 2).await;

        assert_eq!(results.len(), 2);
        assert!(results.get(&"claude".into()).unwrap().success);
        let gemini = results.get(&"gemini".into()).unwrap();
        assert_eq!(gemini.error_kind, Some(ErrorKind::ProviderError));
        assert!(gemini.error.as_deref().unwrap().contains("backend exploded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_marks_slow_provider() {
        let registry = registry(vec![
            Arc::new(ScriptedProvider::new("slow", "late").with_delay(Duration::from_secs(60))),
            Arc::new(ScriptedProvider::new("fast", "early")),
        ]);
        let engine = TaskDispatchEngine::new().with_task_timeout(Some(Duration::from_secs(5)));

        let results = engine.dispatch(tasks(&["fast", "slow"]), &registry, 2).await;

        assert!(results.get(&"fast".into()).unwrap().success);
        let slow = results.get(&"slow".into()).unwrap();
        assert_eq!(slow.error_kind, Some(ErrorKind::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallelism_is_bounded() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let providers: Vec<Arc<dyn ProviderClient>> = (0..6)
            .map(|i| {
                Arc::new(GaugedProvider {
                    id: format!("p{}", i).into(),
                    in_flight: Arc::clone(&in_flight),
                    peak: Arc::clone(&peak),
                }) as Arc<dyn ProviderClient>
            })
            .collect();
        let registry = registry(providers);
        let batch = batch_of((0..6).map(|i| TaskSpec::new(format!("p{}", i), "go")));

        let results = TaskDispatchEngine::new().dispatch(batch, &registry, 2).await;

        assert_eq!(results.len(), 6);
        assert!(results.successes().count() == 6);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_parallelism_still_runs() {
        let registry = registry(vec![Arc::new(ScriptedProvider::new("claude", "a"))]);
        let results = TaskDispatchEngine::new()
            .dispatch(tasks(&["claude"]), &registry, 0)
            .await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_open_circuit_short_circuits() {
        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            ..Default::default()
        }));
        let registry = registry(vec![Arc::new(ScriptedProvider::failing("gemini", "down"))]);
        let engine = TaskDispatchEngine::new().with_circuit_breaker(Arc::clone(&breaker));

        let first = engine.dispatch(tasks(&["gemini"]), &registry, 1).await;
        assert_eq!(
            first.get(&"gemini".into()).unwrap().error_kind,
            Some(ErrorKind::ProviderError)
        );

        let second = engine.dispatch(tasks(&["gemini"]), &registry, 1).await;
        assert_eq!(
            second.get(&"gemini".into()).unwrap().error_kind,
            Some(ErrorKind::CircuitOpen)
        );
    }

    #[tokio::test]
    async fn test_mismatched_key_is_rejected_under_batch_key() {
        let registry = registry(vec![
            Arc::new(ScriptedProvider::new("claude", "a")),
            Arc::new(ScriptedProvider::new("grok", "b")),
        ]);
        let task = TaskSpec::new("grok", "prompt");
        let id = task.id;
        let mut batch = BTreeMap::new();
        batch.insert(ProviderId::from("claude"), task);

        let engine = TaskDispatchEngine::new();
        let results = engine.dispatch(batch, &registry, 1).await;
        assert_eq!(results.len(), 1);
        let result = results.get(&"claude".into()).unwrap();
        assert_eq!(result.provider_id.as_str(), "claude");
        assert_eq!(result.task_id, id);
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::ValidationFailed));
        assert!(results.get(&"grok".into()).is_none());
        assert_eq!(engine.history().len(), 1);
    }

    #[tokio::test]
    async fn test_result_carries_task_id() {
        let registry = registry(vec![Arc::new(ScriptedProvider::new("claude", "a"))]);
        let task = TaskSpec::new("claude", "prompt");
        let id = task.id;

        let results = TaskDispatchEngine::new()
            .dispatch(batch_of([task]), &registry, 1)
            .await;
        assert_eq!(results.get(&"claude".into()).unwrap().task_id, id);
    }
}
