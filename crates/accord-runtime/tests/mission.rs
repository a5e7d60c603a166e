//! End-to-end mission scenarios over scripted and hand-rolled providers.

use std::sync::Arc;
use std::time::Duration;

use accord_core::{CaseFacts, ErrorKind, ProviderId, RiskTier, TaskSpec};
use accord_runtime::{
    build_registry, Capability, InMemoryTaskHistory, MissionPipeline, MissionState, Phase,
    ProviderClient, ProviderError, ProviderRegistry, ProviderSpec, RuntimeConfig, TaskHistory,
};
use async_trait::async_trait;
use tracing_test::traced_test;

const CASE: &str = r#"
case_id: "hartwell-2024"
mission_name: "Hartwell v. Corbin Logistics"
summary: "Warehouse lead terminated two weeks after requesting a disability accommodation"
legal_issues: ["ADA retaliation", "wrongful termination"]
regulatory_context: ["OSHA", "EEOC"]
jurisdiction: "CA"
claim_types: [wrongful_termination, disability_discrimination]
economic_damages: 85000
emotional_distress_severity: 7
punitive_damages_viable: true
public_interest: 6
legal_context:
  favorable_precedents: 3
  average_settlement: 150000
  comparable_cases: 2
"#;

const PROVIDERS: &str = r#"
- id: perplexity
  type: scripted
  config:
    capabilities: [real_time_research, data_synthesis]
    responses:
      research: >-
        An OSHA inspection report documented a serious safety violation at the Corbin warehouse.
        A second citation for a blocked fire exit was issued in March.
        Staff testimony describes a significant ADA violation in the loading area.
    response: "Settlement benchmarks for comparable cases sit between 150k and 300k."
- id: claude
  type: scripted
  config:
    capabilities: [strategic_reasoning, narrative_development, legal_analysis]
    response: "The retaliation timeline is the strongest thread."
- id: gemini
  type: scripted
  config:
    capabilities: [advanced_modeling]
    response: "Exposure modeled."
"#;

fn case() -> CaseFacts {
    CaseFacts::from_yaml(CASE).unwrap()
}

fn registry() -> ProviderRegistry {
    let specs: Vec<ProviderSpec> = serde_yaml::from_str(PROVIDERS).unwrap();
    build_registry(&specs).unwrap()
}

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
        panic!("connection pool poisoned");
    }
}

#[tokio::test]
async fn test_configured_mission_reaches_execution() {
    let history = Arc::new(InMemoryTaskHistory::new());
    let pipeline = MissionPipeline::builder()
        .registry(registry())
        .history(history.clone())
        .build()
        .unwrap();

    let report = pipeline.run(&case()).await.unwrap();

    assert_eq!(report.state, MissionState::ExecutionDone);
    assert_eq!(report.total_tasks, 9);
    assert_eq!(report.successful_tasks, 9);
    assert_eq!(history.len(), 9);
    assert!(report.shortfalls.is_empty());

    // One violation per research sentence, graded by wording
    assert_eq!(report.intelligence.evidence.total, 3);
    assert_eq!(report.intelligence.violations.total(), 3);
    assert_eq!(report.intelligence.violations.critical, 1);
    assert_eq!(report.intelligence.violations.major, 1);

    let leverage = &report.assessment.leverage;
    assert!(leverage.overall > 0.0 && leverage.overall <= 100.0);
    assert_ne!(leverage.risk_tier, RiskTier::Critical);

    let settlement = &report.assessment.settlement;
    assert!(settlement.range.low <= settlement.range.mid);
    assert!(settlement.range.mid <= settlement.range.high);
    assert!(settlement.recommended_demand >= settlement.range.high);

    let framework = &report.framework;
    assert!(framework.opening >= framework.target);
    assert!(framework.target >= framework.floor);
    assert!(framework
        .schedule
        .windows(2)
        .all(|w| w[1].position <= w[0].position));
}

#[traced_test]
#[tokio::test]
async fn test_missing_provider_is_skipped() {
    let pipeline = MissionPipeline::builder()
        .registry(registry())
        .roster(["perplexity", "claude", "deepseek"])
        .build()
        .unwrap();

    let report = pipeline.run(&case()).await.unwrap();

    assert_eq!(report.state, MissionState::ExecutionDone);
    for phase in Phase::ALL {
        let synthesis = report.phase(phase);
        assert_eq!(synthesis.summary.total, 2);
        assert!(!synthesis
            .summary
            .provider_ids
            .contains(&ProviderId::from("deepseek")));
    }
    assert!(report.shortfalls.is_empty());
    assert!(logs_contain("Provider not registered, skipping task"));
    assert!(logs_contain("deepseek"));
}

#[tokio::test]
async fn test_strict_accounting_records_missing_provider() {
    let config = RuntimeConfig {
        strict_accounting: true,
        ..Default::default()
    };
    let pipeline = MissionPipeline::builder()
        .registry(registry())
        .config(config)
        .roster(["perplexity", "claude", "deepseek"])
        .build()
        .unwrap();

    let report = pipeline.run(&case()).await.unwrap();

    assert_eq!(report.state, MissionState::ExecutionDone);
    assert_eq!(report.total_tasks, 9);
    assert_eq!(report.shortfalls.len(), 3);
    for shortfall in &report.shortfalls {
        assert!(!shortfall.total_failure);
        assert_eq!(
            shortfall.failures,
            vec![(ProviderId::from("deepseek"), ErrorKind::ProviderUnavailable)]
        );
    }
}

#[tokio::test]
async fn test_every_provider_failing_degrades_gracefully() {
    let specs: Vec<ProviderSpec> = serde_yaml::from_str(
        r#"
- id: claude
  type: scripted
  config: { fail_with: "503 from upstream" }
- id: grok
  type: scripted
  config: { reject: true }
"#,
    )
    .unwrap();
    let pipeline = MissionPipeline::builder()
        .registry(build_registry(&specs).unwrap())
        .build()
        .unwrap();

    let report = pipeline.run(&case()).await.unwrap();

    assert_eq!(report.state, MissionState::ExecutionDone);
    assert_eq!(report.successful_tasks, 0);
    assert_eq!(report.success_rate(), 0.0);
    assert_eq!(report.shortfalls.len(), 3);
    assert!(report.shortfalls.iter().all(|s| s.total_failure));

    let research = &report.research;
    assert_eq!(research.errors.len(), 2);
    assert_eq!(research.errors[0].error_kind, ErrorKind::ProviderError);
    assert_eq!(research.errors[1].error_kind, ErrorKind::ValidationFailed);

    // Scoring still runs on the case facts alone
    assert!(report.assessment.settlement.range.high > 0.0);
}

#[tokio::test]
async fn test_panicking_provider_does_not_sink_the_mission() {
    let mut registry = registry();
    registry.register(Arc::new(PanickingProvider {
        id: "unstable".into(),
    }));

    let pipeline = MissionPipeline::builder()
        .registry(registry)
        .build()
        .unwrap();
    let report = pipeline.run(&case()).await.unwrap();

    assert_eq!(report.state, MissionState::ExecutionDone);
    assert_eq!(report.total_tasks, 12);
    assert_eq!(report.successful_tasks, 9);
    let failure = &report.execution.errors[0];
    assert_eq!(failure.source.as_str(), "unstable");
    assert!(failure.message.contains("connection pool poisoned"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_provider_times_out() {
    let specs: Vec<ProviderSpec> = serde_yaml::from_str(
        r#"
- id: claude
  type: scripted
  config: { response: "fast answer" }
- id: grok
  type: scripted
  config: { delay: 10m }
"#,
    )
    .unwrap();
    let config = RuntimeConfig {
        task_timeout: Some(Duration::from_secs(30)),
        ..Default::default()
    };
    let history = Arc::new(InMemoryTaskHistory::new());
    let pipeline = MissionPipeline::builder()
        .registry(build_registry(&specs).unwrap())
        .config(config)
        .history(history.clone())
        .build()
        .unwrap();

    let report = pipeline.run(&case()).await.unwrap();

    assert_eq!(report.state, MissionState::ExecutionDone);
    assert_eq!(report.successful_tasks, 3);
    let timeouts = history
        .for_provider(&"grok".into())
        .iter()
        .filter(|r| r.error_kind == Some(ErrorKind::Timeout))
        .count();
    assert_eq!(timeouts, 3);
}
