//! Per-provider circuit breaker.
//!
//! A provider that fails `failure_threshold` times in a row is short-circuited:
//! its tasks complete immediately as `circuit_open` failures without being sent.
//! After `recovery_timeout` the next task is let through as a probe.

use accord_core::ProviderId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,

    /// Seconds an open circuit waits before probing
    #[serde(with = "duration_secs")]
    pub recovery_timeout: Duration,

    /// Probe successes needed to close again
    pub success_threshold: u32,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitState {
    Closed { failures: u32 },
    Open { opened_at: Instant },
    HalfOpen { successes: u32 },
}

/// Tracks one circuit per provider so providers recover independently.
pub struct CircuitBreaker {
    states: RwLock<BTreeMap<ProviderId, CircuitState>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            states: RwLock::new(BTreeMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// True if tasks for this provider must not be sent.
    ///
    /// An open circuit whose recovery timeout has elapsed moves to half-open
    /// and admits the caller.
    pub fn is_open(&self, provider: &ProviderId) -> bool {
        let mut states = self.states.write();
        match states.get(provider) {
            Some(CircuitState::Open { opened_at }) => {
                if opened_at.elapsed() >= self.config.recovery_timeout {
                    states.insert(provider.clone(), CircuitState::HalfOpen { successes: 0 });
                    tracing::info!(provider = %provider, "Circuit half-open, probing provider");
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    pub fn record_success(&self, provider: &ProviderId) {
        let mut states = self.states.write();
        match states.get(provider).cloned() {
            Some(CircuitState::HalfOpen { successes }) => {
                if successes + 1 >= self.config.success_threshold {
                    states.insert(provider.clone(), CircuitState::Closed { failures: 0 });
                    tracing::info!(provider = %provider, "Circuit closed after recovery");
                } else {
                    states.insert(
                        provider.clone(),
                        CircuitState::HalfOpen {
                            successes: successes + 1,
                        },
                    );
                }
            }
            Some(CircuitState::Closed { failures }) if failures > 0 => {
                states.insert(provider.clone(), CircuitState::Closed { failures: 0 });
            }
            _ => {}
        }
    }

    pub fn record_failure(&self, provider: &ProviderId) {
        let mut states = self.states.write();
        let failures = match states.get(provider).cloned() {
            None => 1,
            Some(CircuitState::Closed { failures }) => failures + 1,
            Some(CircuitState::HalfOpen { .. }) => {
                states.insert(
                    provider.clone(),
                    CircuitState::Open {
                        opened_at: Instant::now(),
                    },
                );
                tracing::warn!(provider = %provider, "Circuit reopened, probe failed");
                return;
            }
            // Late result from a task admitted before the circuit opened
            Some(CircuitState::Open { .. }) => return,
        };

        if failures >= self.config.failure_threshold {
            states.insert(
                provider.clone(),
                CircuitState::Open {
                    opened_at: Instant::now(),
                },
            );
            tracing::warn!(provider = %provider, failures, "Circuit opened after repeated failures");
        } else {
            states.insert(provider.clone(), CircuitState::Closed { failures });
        }
    }

    pub fn state(&self, provider: &ProviderId) -> CircuitState {
        self.states
            .read()
            .get(provider)
            .cloned()
            .unwrap_or(CircuitState::Closed { failures: 0 })
    }

    /// Providers whose circuits are currently open.
    pub fn open_circuits(&self) -> Vec<ProviderId> {
        self.states
            .read()
            .iter()
            .filter(|(_, state)| matches!(state, CircuitState::Open { .. }))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn reset(&self) {
        self.states.write().clear();
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProviderId {
        ProviderId::from(s)
    }

    #[test]
    fn test_circuit_starts_closed() {
        let cb = CircuitBreaker::default();
        assert!(!cb.is_open(&pid("claude")));
        assert_eq!(cb.state(&pid("claude")), CircuitState::Closed { failures: 0 });
    }

    #[test]
    fn test_circuit_opens_after_threshold() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            ..Default::default()
        });

        cb.record_failure(&pid("claude"));
        assert!(!cb.is_open(&pid("claude")));

        cb.record_failure(&pid("claude"));
        assert!(cb.is_open(&pid("claude")));
        assert_eq!(cb.open_circuits(), vec![pid("claude")]);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cb = CircuitBreaker::default();
        cb.record_failure(&pid("claude"));
        cb.record_failure(&pid("claude"));
        cb.record_success(&pid("claude"));
        cb.record_failure(&pid("claude"));
        cb.record_failure(&pid("claude"));
        assert!(!cb.is_open(&pid("claude")));
    }

    #[test]
    fn test_providers_are_independent() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            ..Default::default()
        });
        cb.record_failure(&pid("claude"));
        assert!(cb.is_open(&pid("claude")));
        assert!(!cb.is_open(&pid("perplexity")));
    }

    #[test]
    fn test_half_open_after_recovery_timeout() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::ZERO,
            success_threshold: 1,
        });
        cb.record_failure(&pid("grok"));

        // Zero timeout: the first check admits a probe
        assert!(!cb.is_open(&pid("grok")));
        assert_eq!(cb.state(&pid("grok")), CircuitState::HalfOpen { successes: 0 });

        cb.record_success(&pid("grok"));
        assert_eq!(cb.state(&pid("grok")), CircuitState::Closed { failures: 0 });
    }

    #[test]
    fn test_failed_probe_reopens() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::ZERO,
            success_threshold: 1,
        });
        cb.record_failure(&pid("grok"));
        assert!(!cb.is_open(&pid("grok")));
        cb.record_failure(&pid("grok"));
        assert!(matches!(cb.state(&pid("grok")), CircuitState::Open { .. }));
    }

    #[test]
    fn test_config_from_yaml() {
        let config: CircuitBreakerConfig =
            serde_yaml::from_str("failure_threshold: 4\nrecovery_timeout: 12").unwrap();
        assert_eq!(config.failure_threshold, 4);
        assert_eq!(config.recovery_timeout, Duration::from_secs(12));
        assert_eq!(config.success_threshold, 2);
    }
}
