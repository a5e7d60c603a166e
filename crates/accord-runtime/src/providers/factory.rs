//! Factory pattern for building providers from configuration.
//!
//! New provider types plug in by registering a factory; nothing else in the
//! runtime enumerates them.
//!
//! ```ignore
//! let factories = FactoryRegistry::with_defaults();
//! let registry = factories.build(&[ProviderSpec {
//!     id: "claude".into(),
//!     provider_type: "scripted".to_string(),
//!     config: json!({"response": "..."}),
//! }])?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use accord_core::ProviderId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{ProviderClient, ProviderError, ProviderRegistry, ScriptedProviderFactory};

/// Creates provider instances of one type.
pub trait ProviderFactory: Send + Sync {
    /// Type key used in configuration (e.g. "scripted")
    fn provider_type(&self) -> &'static str;

    fn create(
        &self,
        id: &ProviderId,
        config: &JsonValue,
    ) -> Result<Arc<dyn ProviderClient>, ProviderError>;

    /// Check a config without building anything.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;

    fn default_config(&self) -> JsonValue {
        serde_json::json!({})
    }

    fn description(&self) -> &'static str {
        "Provider"
    }
}

/// One configured provider: which id, built by which factory, with what config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub id: ProviderId,

    #[serde(rename = "type")]
    pub provider_type: String,

    #[serde(default)]
    pub config: JsonValue,
}

/// Factories keyed by type string.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in factories.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ScriptedProviderFactory));
        registry
    }

    /// Register a factory, replacing one with the same type.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories
            .insert(factory.provider_type().to_string(), factory);
    }

    fn factory(&self, provider_type: &str) -> Result<&Arc<dyn ProviderFactory>, ProviderError> {
        self.factories.get(provider_type).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider type: '{}'. Available: {:?}",
                provider_type,
                self.available_types()
            ))
        })
    }

    pub fn create(&self, spec: &ProviderSpec) -> Result<Arc<dyn ProviderClient>, ProviderError> {
        let factory = self.factory(&spec.provider_type)?;
        factory.validate_config(&spec.config)?;
        factory.create(&spec.id, &spec.config)
    }

    pub fn validate(&self, provider_type: &str, config: &JsonValue) -> Result<(), ProviderError> {
        self.factory(provider_type)?.validate_config(config)
    }

    /// Build every spec into a live registry. Duplicate ids are rejected.
    pub fn build(&self, specs: &[ProviderSpec]) -> Result<ProviderRegistry, ProviderError> {
        let mut registry = ProviderRegistry::new();
        for spec in specs {
            if registry.contains(&spec.id) {
                return Err(ProviderError::InvalidConfig(format!(
                    "duplicate provider id '{}'",
                    spec.id
                )));
            }
            let provider = self.create(spec)?;
            tracing::debug!(provider = %spec.id, provider_type = %spec.provider_type, "Provider built");
            registry.register(provider);
        }
        Ok(registry)
    }

    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    pub fn has_type(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    pub fn default_config(&self, provider_type: &str) -> Option<JsonValue> {
        self.factories
            .get(provider_type)
            .map(|f| f.default_config())
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("types", &self.available_types())
            .finish()
    }
}

/// Build specs with the built-in factories.
pub fn build_registry(specs: &[ProviderSpec]) -> Result<ProviderRegistry, ProviderError> {
    FactoryRegistry::with_defaults().build(specs)
}
