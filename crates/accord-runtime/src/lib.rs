//! # accord-runtime
//!
//! Async orchestration of reasoning providers around the deterministic core.
//!
//! `accord-core` scores and plans a case with no I/O. This crate adds:
//! - the [`ProviderClient`] boundary and config-driven provider construction
//! - the [`TaskDispatchEngine`], a bounded-parallel fan-out with per-task
//!   failure isolation
//! - the [`CaseLedger`] that research findings accumulate in
//! - the [`MissionPipeline`] that runs Research, Analysis and Execution
//!
//! ## Example
//!
//! ```rust,ignore
//! use accord_runtime::{build_registry, MissionPipeline, ProviderSpec, RuntimeConfig};
//!
//! let registry = build_registry(&specs)?;
//! let pipeline = MissionPipeline::builder()
//!     .registry(registry)
//!     .config(RuntimeConfig::from_yaml_file("runtime.yaml")?)
//!     .build()?;
//!
//! let report = pipeline.run(&case).await?;
//! println!("{:?} after {} tasks", report.state, report.total_tasks);
//! ```

pub mod config;
pub mod dispatch;
pub mod history;
pub mod ledger;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod resilience;

pub use config::{ConfigError, RuntimeConfig};
pub use dispatch::{batch_of, TaskDispatchEngine};
pub use history::{InMemoryTaskHistory, TaskHistory};
pub use ledger::{CaseLedger, LedgerError};
pub use pipeline::{
    MissionPipeline, MissionPipelineBuilder, MissionReport, MissionState, RuntimeError, Shortfall,
};
pub use prompts::{build_prompt, Focus, Phase, PromptContext};
pub use providers::{
    build_registry, Capability, FactoryRegistry, ProviderClient, ProviderError, ProviderFactory,
    ProviderRegistry, ProviderSpec, ScriptedProvider, ScriptedProviderFactory,
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
