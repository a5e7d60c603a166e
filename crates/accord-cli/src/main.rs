//! Accord CLI
//!
//! The `accord` command scores cases offline and runs missions against
//! configured providers.
//!
//! ## Commands
//!
//! - `validate`: Check a case file against the schema
//! - `score`: Leverage, settlement and negotiation plan with no providers
//! - `run`: Full Research → Analysis → Execution mission

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use accord_core::{
    assess, plan_negotiation, CaseError, CaseFacts, IntelligenceSummary, NegotiationFramework,
    ProviderId, StrategicAssessment,
};
use accord_runtime::{build_registry, MissionPipeline, ProviderSpec, RuntimeConfig};

mod render;

#[derive(Parser)]
#[command(name = "accord")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-provider case scoring and negotiation planning", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file (YAML or JSON)
    Validate {
        /// Path to the case file
        case: PathBuf,
    },

    /// Score a case offline
    Score {
        /// Path to the case file
        case: PathBuf,

        /// Intelligence summary (evidence and violation counters)
        #[arg(short, long)]
        intel: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Run a full mission against configured providers
    Run {
        /// Path to the case file
        case: PathBuf,

        /// Mission config (runtime settings, providers, roster)
        #[arg(short, long, default_value = "accord.yaml")]
        config: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Contents of `accord.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AccordConfig {
    runtime: RuntimeConfig,
    providers: Vec<ProviderSpec>,

    /// Providers to task; empty means all of them
    roster: Vec<ProviderId>,
}

impl AccordConfig {
    fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AccordConfig =
            serde_yaml::from_str(yaml).context("Failed to parse mission config")?;
        config
            .runtime
            .validate()
            .context("Invalid runtime section")?;
        if config.providers.is_empty() {
            bail!("Mission config lists no providers");
        }
        Ok(config)
    }

    fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&contents)
    }
}

/// Offline scoring output.
#[derive(Serialize)]
struct ScoreOutput {
    case_id: String,
    assessment: StrategicAssessment,
    framework: NegotiationFramework,
}

fn init_tracing(level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}

fn load_case(path: &Path) -> Result<CaseFacts> {
    match CaseFacts::from_file(path) {
        Ok(case) => Ok(case),
        Err(CaseError::SchemaViolation(errors)) => {
            for error in &errors {
                eprintln!("  - {}", error);
            }
            bail!(
                "{} does not match the case schema ({} errors)",
                path.display(),
                errors.len()
            )
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load case {}", path.display())),
    }
}

fn load_intel(path: Option<&Path>) -> Result<IntelligenceSummary> {
    let Some(path) = path else {
        return Ok(IntelligenceSummary::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read intelligence file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse intelligence file {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    let case = load_case(path)?;
    println!("✓ {} is valid ({})", path.display(), case.display_name());
    Ok(())
}

fn cmd_score(path: &Path, intel: Option<&Path>, format: OutputFormat) -> Result<()> {
    let case = load_case(path)?;
    let intelligence = load_intel(intel)?;

    let assessment = assess(&case, &intelligence);
    let framework = plan_negotiation(&assessment);

    match format {
        OutputFormat::Json => print_json(&ScoreOutput {
            case_id: case.case_id.clone(),
            assessment,
            framework,
        }),
        OutputFormat::Text => {
            print!("{}", render::assessment(&case, &assessment, &framework));
            Ok(())
        }
    }
}

async fn cmd_run(path: &Path, config_path: &Path, format: OutputFormat) -> Result<()> {
    let case = load_case(path)?;
    let config = AccordConfig::load(config_path)?;

    let registry = build_registry(&config.providers).context("Failed to build providers")?;
    let pipeline = MissionPipeline::builder()
        .registry(registry)
        .config(config.runtime)
        .roster(config.roster)
        .build()
        .context("Failed to assemble mission")?;

    let report = pipeline.run(&case).await.context("Mission failed")?;

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print!("{}", render::mission(&case, &report));
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(level);

    match cli.command {
        Commands::Validate { case } => cmd_validate(&case),
        Commands::Score {
            case,
            intel,
            format,
        } => cmd_score(&case, intel.as_deref(), format),
        Commands::Run {
            case,
            config,
            format,
        } => cmd_run(&case, &config, format).await,
    }
}
