//! ventureval - evaluation pipeline CLI
//!
//! ## Commands
//!
//! - `run`: run the evaluation pipeline over fixture-backed evaluators
//! - `score`: re-score a saved orchestration result
//! - `stages`: show the stage graph
//! - `config`: show the effective configuration

mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use tracing::{info, warn, Level};

use ventureval_core::metrics::METRICS;
use ventureval_core::{
    render_report_md, Context, EngineConfig, EvaluationService, FsReportStore,
    OrchestrationResult, PipelineOrchestrator, Report, StageGraph,
};

#[derive(Parser)]
#[command(name = "ventureval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic evaluation pipeline engine", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all evaluators against a context and build a report
    Run {
        /// Base context (JSON object)
        #[arg(short, long)]
        context: PathBuf,

        /// Canned evaluator replies keyed by evaluator name (JSON object)
        #[arg(short, long)]
        fixtures: PathBuf,

        /// Subject identifier
        #[arg(short, long)]
        subject: String,

        /// Subject display name
        #[arg(short, long)]
        name: Option<String>,

        /// Engine config file (JSON)
        #[arg(long, env = "VENTUREVAL_CONFIG")]
        config: Option<PathBuf>,

        /// Directory to persist reports in
        #[arg(long, env = "VENTUREVAL_STORE_DIR")]
        store_dir: Option<PathBuf>,

        /// Also write the raw orchestration result here
        #[arg(long)]
        save_run: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a saved orchestration result
    Score {
        /// Orchestration result (JSON)
        #[arg(long)]
        orchestration: PathBuf,

        /// Subject identifier
        #[arg(short, long)]
        subject: String,

        /// Subject display name
        #[arg(short, long)]
        name: Option<String>,

        /// Engine config file (JSON)
        #[arg(long, env = "VENTUREVAL_CONFIG")]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the evaluation stage graph
    Stages,

    /// Show the effective, validated configuration
    Config {
        /// Engine config file (JSON)
        #[arg(long, env = "VENTUREVAL_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    ventureval_core::init_tracing(cli.json, level);

    let outcome = match cli.command {
        Commands::Run {
            context,
            fixtures,
            subject,
            name,
            config,
            store_dir,
            save_run,
            format,
            output,
        } => {
            cmd_run(RunArgs {
                context: &context,
                fixtures: &fixtures,
                subject: &subject,
                name: name.as_deref(),
                config: config.as_deref(),
                store_dir: store_dir.as_deref(),
                save_run: save_run.as_deref(),
                format,
                output: output.as_deref(),
            })
            .await
        }
        Commands::Score {
            orchestration,
            subject,
            name,
            config,
            format,
            output,
        } => cmd_score(
            &orchestration,
            &subject,
            name.as_deref(),
            config.as_deref(),
            format,
            output.as_deref(),
        ),
        Commands::Stages => cmd_stages(),
        Commands::Config { config } => cmd_config(config.as_deref()),
    };

    METRICS.flush();
    outcome
}

struct RunArgs<'a> {
    context: &'a Path,
    fixtures: &'a Path,
    subject: &'a str,
    name: Option<&'a str>,
    config: Option<&'a Path>,
    store_dir: Option<&'a Path>,
    save_run: Option<&'a Path>,
    format: Format,
    output: Option<&'a Path>,
}

/// Run the pipeline over fixture evaluators, then score and report.
async fn cmd_run(args: RunArgs<'_>) -> Result<()> {
    let config = load_config(args.config)?;

    let raw = std::fs::read_to_string(args.context)
        .with_context(|| format!("Failed to read context file: {:?}", args.context))?;
    let base = Context::from_json_str(&raw)
        .with_context(|| format!("Invalid context file: {:?}", args.context))?;

    let fixtures = read_json_object(args.fixtures)?;
    let registry = fixtures::registry_from_fixtures(&fixtures);
    let orchestrator =
        PipelineOrchestrator::new(registry).context("Fixtures do not cover the pipeline")?;

    let run = orchestrator.run_full_evaluation(&base).await;
    info!(
        total = run.summary.total,
        failed = run.summary.failed,
        duration_ms = run.duration_ms(),
        "pipeline complete"
    );

    if let Some(path) = args.save_run {
        let json = serde_json::to_string_pretty(&run)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write orchestration result to {:?}", path))?;
    }

    let mut service = EvaluationService::new(config)?;
    if let Some(dir) = args.store_dir {
        let store = FsReportStore::new(dir)
            .with_context(|| format!("Failed to open report store at {:?}", dir))?;
        service = service.with_store(Arc::new(store));
    }

    let stored = service.evaluate_and_store(args.subject, args.name, &run);
    match (&stored.persistence.location, &stored.persistence.error) {
        (Some(location), _) => info!(location = %location, "report saved"),
        (None, Some(error)) => warn!(error = %error, "report was not saved"),
        (None, None) => {}
    }

    emit_report(&stored.report, args.format, args.output)
}

/// Score a previously saved orchestration result.
fn cmd_score(
    orchestration: &Path,
    subject: &str,
    name: Option<&str>,
    config: Option<&Path>,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let raw = std::fs::read_to_string(orchestration)
        .with_context(|| format!("Failed to read orchestration result: {:?}", orchestration))?;
    let run: OrchestrationResult = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid orchestration result: {:?}", orchestration))?;

    let report = EvaluationService::new(config)?.evaluate_named(subject, name, &run);
    emit_report(&report, format, output)
}

fn cmd_stages() -> Result<()> {
    for (index, stage) in StageGraph::evaluation().stages().iter().enumerate() {
        let mode = if stage.parallel { "parallel" } else { "sequential" };
        if stage.depends_on.is_empty() {
            println!("{}: {} ({})", index + 1, stage.tasks.join(", "), mode);
        } else {
            println!(
                "{}: {} ({}) <- {}",
                index + 1,
                stage.tasks.join(", "),
                mode,
                stage.depends_on.join(", ")
            );
        }
    }
    Ok(())
}

fn cmd_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {:?}", path)),
        None => Ok(EngineConfig::default()),
    }
}

fn read_json_object(path: &Path) -> Result<Map<String, Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    match serde_json::from_str::<Value>(&raw).with_context(|| format!("Invalid JSON in {:?}", path))? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Expected a JSON object in {:?}", path),
    }
}

fn render(report: &Report, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(report)?,
        Format::Markdown => render_report_md(report),
    })
}

fn emit_report(report: &Report, format: Format, output: Option<&Path>) -> Result<()> {
    let rendered = render(report, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            println!(
                "Report for {} written to {:?} ({}, {:.4})",
                report.subject_id, path, report.risk_label, report.final_score
            );
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
