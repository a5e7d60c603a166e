//! MissionPipeline: Research, then Analysis, then Execution.
//!
//! Each phase fans out one task per rostered provider through the
//! [`TaskDispatchEngine`] and folds the results with the [`ResultSynthesizer`].
//! Between phases the pipeline runs the deterministic core:
//! - after Research: extract evidence into the case ledger, then score
//! - after Analysis: plan the negotiation
//!
//! A phase in which providers fail never stops the mission. The shortfall is
//! recorded and the next phase runs with whatever context survived.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use accord_core::{
    assess, plan_negotiation, CaseError, CaseFacts, ErrorKind, IntelligenceSummary,
    NegotiationFramework, PhaseResult, ProviderId, ResearchFindings, ResultSynthesizer,
    StrategicAssessment, Synthesis, TaskSpec,
};

use crate::config::{ConfigError, RuntimeConfig};
use crate::dispatch::{batch_of, TaskDispatchEngine};
use crate::history::TaskHistory;
use crate::ledger::{CaseLedger, LedgerError};
use crate::prompts::{build_prompt, Phase, PromptContext};
use crate::providers::{ProviderError, ProviderRegistry};

/// Errors that stop a mission before it starts.
///
/// Provider failures during a phase are not errors; they become shortfalls.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("No providers registered and no roster given")]
    NoProviders,

    #[error("Invalid case: {0}")]
    Case(#[from] CaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Mission cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: MissionState, to: MissionState },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionState {
    NotStarted,
    ResearchDone,
    AnalysisDone,
    ExecutionDone,
}

impl MissionState {
    pub fn next(&self) -> Option<MissionState> {
        match self {
            MissionState::NotStarted => Some(MissionState::ResearchDone),
            MissionState::ResearchDone => Some(MissionState::AnalysisDone),
            MissionState::AnalysisDone => Some(MissionState::ExecutionDone),
            MissionState::ExecutionDone => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Step forward to `to`, which must be the immediate successor.
    pub fn advance(&mut self, to: MissionState) -> Result<(), RuntimeError> {
        if self.next() != Some(to) {
            return Err(RuntimeError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}

/// A phase that did not get a clean answer from every provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub phase: Phase,
    pub total: usize,
    pub failed: usize,

    /// Every task failed or nothing was dispatched
    pub total_failure: bool,

    pub failures: Vec<(ProviderId, ErrorKind)>,
}

impl Shortfall {
    fn from_synthesis(phase: Phase, synthesis: &Synthesis) -> Option<Self> {
        let summary = &synthesis.summary;
        if summary.failure_count == 0 && summary.total > 0 {
            return None;
        }
        Some(Self {
            phase,
            total: summary.total,
            failed: summary.failure_count,
            total_failure: summary.total == 0 || synthesis.is_total_failure(),
            failures: synthesis
                .errors
                .iter()
                .map(|e| (e.source.clone(), e.error_kind))
                .collect(),
        })
    }
}

/// The final decision package for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub mission_id: Uuid,
    pub case_id: String,
    pub state: MissionState,

    pub research: Synthesis,
    pub analysis: Synthesis,
    pub execution: Synthesis,

    /// One headline per research provider that said something substantive
    pub key_findings: Vec<String>,

    /// Ledger counters the assessment was scored from
    pub intelligence: IntelligenceSummary,

    pub assessment: StrategicAssessment,
    pub framework: NegotiationFramework,

    pub shortfalls: Vec<Shortfall>,
    pub total_tasks: usize,
    pub successful_tasks: usize,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl MissionReport {
    /// Successful tasks over all tasks across the three phases.
    pub fn success_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.successful_tasks as f64 / self.total_tasks as f64
        }
    }

    pub fn phase(&self, phase: Phase) -> &Synthesis {
        match phase {
            Phase::Research => &self.research,
            Phase::Analysis => &self.analysis,
            Phase::Execution => &self.execution,
        }
    }
}

pub struct MissionPipeline {
    engine: TaskDispatchEngine,
    registry: ProviderRegistry,
    config: RuntimeConfig,
    roster: Vec<ProviderId>,
    ledger: Option<Arc<CaseLedger>>,
    synthesizer: ResultSynthesizer,
}

impl MissionPipeline {
    pub fn builder() -> MissionPipelineBuilder {
        MissionPipelineBuilder::new()
    }

    pub fn roster(&self) -> &[ProviderId] {
        &self.roster
    }

    pub fn engine(&self) -> &TaskDispatchEngine {
        &self.engine
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run all three phases for `case`.
    ///
    /// Fails only on pre-flight problems (invalid case, ledger for another
    /// case). Once Research starts the mission always reaches `ExecutionDone`.
    pub async fn run(&self, case: &CaseFacts) -> Result<MissionReport, RuntimeError> {
        case.validate()?;
        let ledger = match &self.ledger {
            Some(ledger) if ledger.case_id() != case.case_id => {
                return Err(LedgerError::CaseMismatch {
                    expected: ledger.case_id().to_string(),
                    found: case.case_id.clone(),
                }
                .into());
            }
            Some(ledger) => Arc::clone(ledger),
            None => Arc::new(CaseLedger::new(case.case_id.clone())),
        };

        let mission_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut state = MissionState::NotStarted;
        let mut shortfalls = Vec::new();

        tracing::info!(
            mission = %mission_id,
            case_id = %case.case_id,
            providers = self.roster.len(),
            "Mission started"
        );

        // Research
        let ctx = PromptContext::new(case);
        let research = self.run_phase(Phase::Research, &ctx).await;
        shortfalls.extend(Shortfall::from_synthesis(Phase::Research, &research));
        let key_findings = self.record_research(&ledger, &research);

        let intelligence = ledger.summary();
        let assessment = assess(case, &intelligence);
        state.advance(MissionState::ResearchDone)?;
        tracing::info!(
            mission = %mission_id,
            leverage = assessment.leverage.overall,
            risk_tier = %assessment.leverage.risk_tier,
            "Research complete, case scored"
        );

        // Analysis
        let research_digest = research.context_digest(self.config.context_chars);
        let ctx = PromptContext::new(case)
            .with_digest(&research_digest)
            .with_leverage(&assessment.leverage);
        let analysis = self.run_phase(Phase::Analysis, &ctx).await;
        shortfalls.extend(Shortfall::from_synthesis(Phase::Analysis, &analysis));

        let framework = plan_negotiation(&assessment);
        state.advance(MissionState::AnalysisDone)?;
        tracing::info!(
            mission = %mission_id,
            opening = framework.opening,
            floor = framework.floor,
            rounds = framework.schedule.len(),
            "Analysis complete, negotiation planned"
        );

        // Execution
        let analysis_digest = analysis.context_digest(self.config.context_chars);
        let ctx = PromptContext::new(case)
            .with_digest(&analysis_digest)
            .with_leverage(&assessment.leverage)
            .with_framework(&framework);
        let execution = self.run_phase(Phase::Execution, &ctx).await;
        shortfalls.extend(Shortfall::from_synthesis(Phase::Execution, &execution));
        state.advance(MissionState::ExecutionDone)?;

        let phases = [&research, &analysis, &execution];
        let total_tasks = phases.iter().map(|s| s.summary.total).sum();
        let successful_tasks = phases.iter().map(|s| s.summary.success_count).sum();

        for shortfall in &shortfalls {
            tracing::warn!(
                mission = %mission_id,
                phase = %shortfall.phase,
                failed = shortfall.failed,
                total = shortfall.total,
                "Phase shortfall"
            );
        }
        tracing::info!(
            mission = %mission_id,
            successful_tasks,
            total_tasks,
            "Mission complete"
        );

        Ok(MissionReport {
            mission_id,
            case_id: case.case_id.clone(),
            state,
            research,
            analysis,
            execution,
            key_findings,
            intelligence,
            assessment,
            framework,
            shortfalls,
            total_tasks,
            successful_tasks,
            started_at,
            completed_at: Utc::now(),
        })
    }

    fn tasks_for(&self, phase: Phase, ctx: &PromptContext<'_>) -> Vec<TaskSpec> {
        self.roster
            .iter()
            .map(|id| {
                let capabilities = self
                    .registry
                    .get(id)
                    .map(|p| p.capabilities())
                    .unwrap_or(&[]);
                let focus = phase.focus_for(capabilities);
                TaskSpec::new(id.clone(), build_prompt(phase, focus, ctx))
                    .with_parameter("phase", json!(phase.as_str()))
                    .with_parameter("focus", json!(focus))
            })
            .collect()
    }

    async fn run_phase(&self, phase: Phase, ctx: &PromptContext<'_>) -> Synthesis {
        let batch = batch_of(self.tasks_for(phase, ctx));
        tracing::info!(phase = %phase, tasks = batch.len(), "Dispatching phase");

        let results: PhaseResult = self
            .engine
            .dispatch(batch, &self.registry, self.config.max_parallel)
            .await;
        let synthesis = self.synthesizer.synthesize(&results);

        tracing::info!(
            phase = %phase,
            succeeded = synthesis.summary.success_count,
            failed = synthesis.summary.failure_count,
            "Phase synthesized"
        );
        synthesis
    }

    /// Extract records from every successful research answer into the ledger.
    fn record_research(&self, ledger: &CaseLedger, research: &Synthesis) -> Vec<String> {
        let mut key_findings = Vec::new();
        for insight in &research.combined_insights {
            let findings =
                ResearchFindings::extract(ledger.case_id(), insight.source.as_str(), &insight.content);
            match ledger.record_findings(&findings) {
                Ok((evidence, violations)) => {
                    tracing::debug!(
                        provider = %insight.source,
                        evidence,
                        violations,
                        "Research findings recorded"
                    );
                }
                Err(e) => {
                    tracing::warn!(provider = %insight.source, error = %e, "Could not record research findings");
                }
            }
            key_findings.extend(findings.key_findings);
        }
        key_findings
    }
}

pub struct MissionPipelineBuilder {
    registry: ProviderRegistry,
    config: RuntimeConfig,
    roster: Vec<ProviderId>,
    history: Option<Arc<dyn TaskHistory>>,
    ledger: Option<Arc<CaseLedger>>,
}

impl MissionPipelineBuilder {
    pub fn new() -> Self {
        Self {
            registry: ProviderRegistry::new(),
            config: RuntimeConfig::default(),
            roster: Vec::new(),
            history: None,
            ledger: None,
        }
    }

    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Providers to task in every phase. Defaults to every registered provider.
    pub fn roster(mut self, roster: impl IntoIterator<Item = impl Into<ProviderId>>) -> Self {
        self.roster = roster.into_iter().map(Into::into).collect();
        self
    }

    pub fn history(mut self, history: Arc<dyn TaskHistory>) -> Self {
        self.history = Some(history);
        self
    }

    /// Use an existing ledger instead of a fresh one per run.
    pub fn ledger(mut self, ledger: Arc<CaseLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn build(self) -> Result<MissionPipeline, RuntimeError> {
        self.config.validate()?;

        let mut roster = if self.roster.is_empty() {
            self.registry.ids()
        } else {
            self.roster
        };
        if roster.is_empty() {
            return Err(RuntimeError::NoProviders);
        }
        roster.sort();
        roster.dedup();

        for id in roster.iter().filter(|id| !self.registry.contains(id)) {
            tracing::warn!(provider = %id, "Rostered provider is not registered");
        }

        let mut engine = TaskDispatchEngine::from_config(&self.config);
        if let Some(history) = self.history {
            engine = engine.with_history(history);
        }

        Ok(MissionPipeline {
            engine,
            registry: self.registry,
            config: self.config,
            roster,
            ledger: self.ledger,
            synthesizer: ResultSynthesizer::new(),
        })
    }
}

impl Default for MissionPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
