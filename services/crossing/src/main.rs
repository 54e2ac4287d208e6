//! Ferry crossing simulation entry point
//!
//! `ferry-crossing N O K TA TP` runs one simulation and writes the action
//! log to `proj2.out` (or the configured output). Diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ferry_actors::{parse_log, FileSink, LogAudit, Simulation, SimulationOptions};
use ferry_config::{load_config, ConfigError, Parameter, ParameterOverrides, SimulationConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// N O K TA TP: trucks, cars, capacity, max arrival delay (us), max leg delay (us)
    #[arg(value_name = "PARAM", allow_negative_numbers = true)]
    params: Vec<String>,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Action log path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for origin ports, spawn order and delays
    #[arg(long)]
    seed: Option<u64>,

    /// Verify the action log after the run
    #[arg(long)]
    audit: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(args.log_format);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            if e.downcast_ref::<ConfigError>().is_some() {
                eprintln!("{}", usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ferry_crossing=info,ferry_actors=info,warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn usage() -> String {
    let bounds: Vec<String> = Parameter::ALL
        .iter()
        .map(|p| {
            let (min, max) = p.bounds();
            format!("{}={}..={}", p.symbol(), min, max)
        })
        .collect();
    format!("usage: ferry-crossing N O K TA TP ({})", bounds.join(", "))
}

/// Positional parameters may be omitted only when a config file supplies them
fn overrides(args: &Args) -> Result<ParameterOverrides, ConfigError> {
    if args.params.is_empty() && args.config.is_some() {
        return Ok(ParameterOverrides::default());
    }
    ParameterOverrides::from_positional(&args.params)
}

fn effective_config(args: &Args) -> Result<SimulationConfig> {
    let overrides = overrides(args)?;
    let mut config = load_config(args.config.as_deref(), &overrides)?;

    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.audit |= args.audit;

    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = effective_config(&args)?;

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let params = config.validate()?;
    info!(
        trucks = params.trucks,
        cars = params.cars,
        capacity = params.capacity,
        output = %config.output.display(),
        "Parameters accepted"
    );

    let sink = FileSink::create(&config.output)?;
    let options = SimulationOptions {
        seed: config.seed,
        origin: config.origin,
        spawn_order: config.spawn_order,
    };
    let report = Simulation::new(params)
        .with_options(options)
        .run(Box::new(sink))
        .await?;

    info!(
        "Delivered {} trucks and {} cars in {} crossings ({} events, {:?})",
        report.final_state.transported.trucks,
        report.final_state.transported.cars,
        report.crossings,
        report.events_logged,
        report.elapsed
    );

    if config.audit {
        let text = std::fs::read_to_string(&config.output)
            .with_context(|| format!("Failed to read back {}", config.output.display()))?;
        let events = parse_log(&text)?;
        let summary = LogAudit::new(params.trucks, params.cars)
            .audit(&events)
            .context("Action log audit failed")?;
        info!(
            events = summary.events,
            dockings = summary.dockings,
            vehicles = summary.vehicles,
            "Action log audit passed"
        );
    }

    Ok(())
}
