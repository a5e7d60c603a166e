//! Provider abstraction for accord-runtime.
//!
//! A provider is an opaque text-generation backend. The runtime only needs two
//! things from it: a cheap `validate` check and an async `execute` call.
//! Transport and credentials are the provider's own business.
//!
//! Providers are built from configuration through [`FactoryRegistry`] and
//! collected into a [`ProviderRegistry`] that the dispatch engine reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use accord_core::{ProviderId, TaskSpec};

mod factory;
mod scripted;

pub use factory::{build_registry, FactoryRegistry, ProviderFactory, ProviderSpec};
pub use scripted::{ScriptedProvider, ScriptedProviderFactory};

/// Errors from providers and provider construction.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid provider config: {0}")]
    InvalidConfig(String),
}

/// What a provider is good at. Drives prompt selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    StrategicReasoning,
    RealTimeResearch,
    AdvancedModeling,
    CommunicationOptimization,
    NarrativeDevelopment,
    LegalAnalysis,
    DataSynthesis,
    CodeGeneration,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::StrategicReasoning => "strategic_reasoning",
            Capability::RealTimeResearch => "real_time_research",
            Capability::AdvancedModeling => "advanced_modeling",
            Capability::CommunicationOptimization => "communication_optimization",
            Capability::NarrativeDevelopment => "narrative_development",
            Capability::LegalAnalysis => "legal_analysis",
            Capability::DataSynthesis => "data_synthesis",
            Capability::CodeGeneration => "code_generation",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external text-generation backend.
///
/// Implementations must be safe to call concurrently; the engine shares a
/// single instance across every task addressed to it.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn id(&self) -> &ProviderId;

    fn capabilities(&self) -> &[Capability];

    /// Accept or reject a task before spending compute on it.
    fn validate(&self, task: &TaskSpec) -> bool {
        !task.prompt.trim().is_empty()
    }

    async fn execute(&self, task: &TaskSpec) -> Result<String, ProviderError>;

    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Live providers keyed by id.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderId, Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own id, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn ProviderClient>) {
        self.providers.insert(provider.id().clone(), provider);
    }

    pub fn get(&self, id: &ProviderId) -> Option<&Arc<dyn ProviderClient>> {
        self.providers.get(id)
    }

    pub fn contains(&self, id: &ProviderId) -> bool {
        self.providers.contains_key(id)
    }

    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
