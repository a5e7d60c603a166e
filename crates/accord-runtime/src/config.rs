//! Runtime configuration.
//!
//! Loaded from YAML. Durations are human-readable strings (`"30s"`, `"2m"`).
//!
//! ```yaml
//! max_parallel: 4
//! task_timeout: 45s
//! strict_accounting: false
//! context_chars: 500
//! circuit_breaker:
//!   failure_threshold: 3
//!   recovery_timeout: 30
//!   success_threshold: 2
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::resilience::CircuitBreakerConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Dispatch and pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum tasks in flight per dispatch
    pub max_parallel: usize,

    /// Per-task deadline; absent means tasks run to completion
    #[serde(with = "humantime_opt", skip_serializing_if = "Option::is_none")]
    pub task_timeout: Option<Duration>,

    /// Report unregistered providers as failed results instead of skipping them
    pub strict_accounting: bool,

    /// Characters of each insight carried into the next phase's prompt
    pub context_chars: usize,

    /// Per-provider circuit breaker; absent disables it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_parallel: 4,
            task_timeout: None,
            strict_accounting: false,
            context_chars: 500,
            circuit_breaker: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel == 0 {
            return Err(ConfigError::Invalid(
                "max_parallel must be at least 1".to_string(),
            ));
        }

        if self.task_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "task_timeout must be positive when set".to_string(),
            ));
        }

        if let Some(cb) = &self.circuit_breaker {
            if cb.failure_threshold == 0 || cb.success_threshold == 0 {
                return Err(ConfigError::Invalid(
                    "circuit_breaker thresholds must be at least 1".to_string(),
                ));
            }
        }

        Ok(())
    }
}

mod humantime_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_parallel, 4);
        assert!(config.task_timeout.is_none());
        assert!(!config.strict_accounting);
        assert_eq!(config.context_chars, 500);
        assert!(config.circuit_breaker.is_none());
    }

    #[test]
    fn test_parse_yaml() {
        let config = RuntimeConfig::from_yaml(
            r#"
max_parallel: 2
task_timeout: 1m 30s
strict_accounting: true
circuit_breaker:
  failure_threshold: 5
  recovery_timeout: 10
  success_threshold: 1
"#,
        )
        .unwrap();

        assert_eq!(config.max_parallel, 2);
        assert_eq!(config.task_timeout, Some(Duration::from_secs(90)));
        assert!(config.strict_accounting);
        assert_eq!(config.context_chars, 500);
        let cb = config.circuit_breaker.unwrap();
        assert_eq!(cb.failure_threshold, 5);
        assert_eq!(cb.recovery_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = RuntimeConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let result = RuntimeConfig::from_yaml("max_parallel: 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result = RuntimeConfig::from_yaml("task_timeout: soon");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }
}
