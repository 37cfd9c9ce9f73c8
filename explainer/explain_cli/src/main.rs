use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use explain_core::{ExplainConfig, ExplainResult, ExplainTelemetry, Explainer};
use shared_logging::LogLevel;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "explain", version, about = "Explains words and phrases in one sentence")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON-lines log file; overrides `log_path` from the config.
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    /// Lowest level written to the log.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Dictionary deadline in milliseconds; overrides the config.
    #[arg(long, global = true)]
    deadline_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Explains a single subject.
    One {
        subject: String,
        /// Words describing the topic, used to pick between articles.
        #[arg(long = "context", num_args = 1..)]
        context: Vec<String>,
    },
    /// Explains several subjects, each using the others as context.
    Many {
        #[arg(required = true)]
        subjects: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let explainer = build_explainer(&cli, config)?;
    let runtime = Runtime::new().context("starting tokio runtime")?;

    match cli.command {
        Commands::One { subject, context } => {
            let result = runtime.block_on(explainer.explain(&subject, &context))?;
            print_result(&result)
        }
        Commands::Many { subjects } => {
            let mut printed = Ok(());
            runtime.block_on(explainer.explain_many_related(&subjects, |result| {
                if printed.is_ok() {
                    printed = print_result(result);
                }
            }))?;
            printed
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<ExplainConfig> {
    let mut config = match &cli.config {
        Some(path) => ExplainConfig::load(path)?,
        None => ExplainConfig::default(),
    };
    if let Some(deadline_ms) = cli.deadline_ms {
        config.deadline_ms = deadline_ms;
    }
    if let Some(log) = &cli.log {
        config.log_path = Some(log.clone());
    }
    config.validate()?;
    Ok(config)
}

fn build_explainer(cli: &Cli, config: ExplainConfig) -> Result<Explainer> {
    let Some(level) = LogLevel::parse(&cli.log_level) else {
        bail!("unknown log level '{}'", cli.log_level);
    };
    let telemetry = match &config.log_path {
        Some(path) => ExplainTelemetry::builder("explain")
            .min_level(level)
            .log_path(path)
            .build()
            .with_context(|| format!("opening log {}", path.display()))?,
        None => ExplainTelemetry::disabled(),
    };
    Ok(Explainer::from_config(config)?.with_telemetry(telemetry))
}

fn print_result(result: &ExplainResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
