//! Scripted provider: canned responses for dry runs and tests.
//!
//! ```yaml
//! - id: perplexity
//!   type: scripted
//!   config:
//!     capabilities: [real_time_research]
//!     responses:
//!       research: "OSHA inspection report lists a serious safety violation."
//!     response: "Nothing further."
//!     delay: 50ms
//! ```
//!
//! `responses` is keyed by the task's `phase` parameter; `response` is the
//! fallback. `fail_with` makes every execution fail, `reject` makes every
//! validation fail.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use accord_core::{ProviderId, TaskSpec};

use super::{Capability, ProviderClient, ProviderError, ProviderFactory};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScriptedConfig {
    capabilities: Vec<Capability>,
    response: Option<String>,
    responses: BTreeMap<String, String>,
    fail_with: Option<String>,
    reject: bool,
    delay: Option<String>,
}

pub struct ScriptedProvider {
    id: ProviderId,
    capabilities: Vec<Capability>,
    response: Option<String>,
    responses: BTreeMap<String, String>,
    fail_with: Option<String>,
    reject: bool,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    /// A provider that answers every task with `response`.
    pub fn new(id: impl Into<ProviderId>, response: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: Vec::new(),
            response: Some(response.into()),
            responses: BTreeMap::new(),
            fail_with: None,
            reject: false,
            delay: None,
        }
    }

    /// A provider whose every execution fails with `message`.
    pub fn failing(id: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::new(id, "")
        }
    }

    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    pub fn with_phase_response(mut self, phase: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(phase.into(), response.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    fn from_config(id: &ProviderId, config: ScriptedConfig) -> Result<Self, ProviderError> {
        let delay = config
            .delay
            .as_deref()
            .map(humantime::parse_duration)
            .transpose()
            .map_err(|e| ProviderError::InvalidConfig(format!("delay: {}", e)))?;

        Ok(Self {
            id: id.clone(),
            capabilities: config.capabilities,
            response: config.response,
            responses: config.responses,
            fail_with: config.fail_with,
            reject: config.reject,
            delay,
        })
    }

    fn reply_for(&self, task: &TaskSpec) -> String {
        let phase = task.parameters.get("phase").and_then(JsonValue::as_str);
        phase
            .and_then(|p| self.responses.get(p))
            .or(self.response.as_ref())
            .cloned()
            .unwrap_or_else(|| {
                let first_line = task.prompt.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
                format!("{} acknowledges: {}", self.id, first_line.trim())
            })
    }
}

#[async_trait]
impl ProviderClient for ScriptedProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn validate(&self, task: &TaskSpec) -> bool {
        !self.reject && !task.prompt.trim().is_empty()
    }

    async fn execute(&self, task: &TaskSpec) -> Result<String, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.fail_with {
            Some(message) => Err(ProviderError::RequestFailed(message.clone())),
            None => Ok(self.reply_for(task)),
        }
    }
}

/// Builds [`ScriptedProvider`]s from `type: scripted` entries.
pub struct ScriptedProviderFactory;

impl ScriptedProviderFactory {
    fn parse(config: &JsonValue) -> Result<ScriptedConfig, ProviderError> {
        if config.is_null() {
            return Ok(ScriptedConfig::default());
        }
        serde_json::from_value(config.clone())
            .map_err(|e| ProviderError::InvalidConfig(e.to_string()))
    }
}

impl ProviderFactory for ScriptedProviderFactory {
    fn provider_type(&self) -> &'static str {
        "scripted"
    }

    fn create(
        &self,
        id: &ProviderId,
        config: &JsonValue,
    ) -> Result<Arc<dyn ProviderClient>, ProviderError> {
        let provider = ScriptedProvider::from_config(id, Self::parse(config)?)?;
        Ok(Arc::new(provider))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        let parsed = Self::parse(config)?;
        if let Some(delay) = parsed.delay.as_deref() {
            humantime::parse_duration(delay)
                .map_err(|e| ProviderError::InvalidConfig(format!("delay: {}", e)))?;
        }
        Ok(())
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({
            "capabilities": [],
            "reject": false
        })
    }

    fn description(&self) -> &'static str {
        "Canned responses for dry runs"
    }
}
