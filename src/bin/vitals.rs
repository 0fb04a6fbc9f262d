//! Vitals CLI - Command-line interface for Vitalgrid
//!
//! Commands:
//! - aggregate: Assemble daily biometric snapshots from a fixture document
//! - workouts: List recorded workouts in a date range
//! - validate: Validate a fixture document and report its contents

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use vitalgrid::{
    BaselineTracker, BiometricError, BiometricService, BiometricSource, FixtureSource,
    PayloadRange, ServiceConfig, SnapshotEncoder, ENGINE_VERSION, PRODUCER_NAME,
};

/// Vitals - Daily biometric aggregation from health data fixtures
#[derive(Parser)]
#[command(name = "vitals")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Aggregate health data into daily biometric snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble one snapshot per calendar day over a date range
    Aggregate {
        /// Input fixture path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the range, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        /// Per-query timeout in seconds (no timeout if omitted)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Baseline window in days
        #[arg(long, default_value = "14")]
        baseline_days: usize,

        /// Skip the baseline block in the payload
        #[arg(long)]
        no_baselines: bool,
    },

    /// List recorded workouts in a date range, ascending by start time
    Workouts {
        /// Input fixture path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the range, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Validate a fixture document and report its contents
    Validate {
        /// Input fixture path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one snapshot per line)
    Ndjson,
    /// Full payload with producer metadata and baselines
    JsonPretty,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), VitalsCliError> {
    match cli.command {
        Commands::Aggregate {
            input,
            output,
            from,
            to,
            format,
            timeout_secs,
            baseline_days,
            no_baselines,
        } => {
            cmd_aggregate(
                &input,
                &output,
                from,
                to,
                format,
                timeout_secs,
                baseline_days,
                no_baselines,
            )
            .await
        }

        Commands::Workouts { input, from, to } => cmd_workouts(&input, from, to).await,

        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_aggregate(
    input: &PathBuf,
    output: &PathBuf,
    from: NaiveDate,
    to: NaiveDate,
    format: OutputFormat,
    timeout_secs: Option<u64>,
    baseline_days: usize,
    no_baselines: bool,
) -> Result<(), VitalsCliError> {
    let source = FixtureSource::from_json(&read_input(input)?)?;

    let config = ServiceConfig {
        query_timeout: timeout_secs.map(Duration::from_secs),
    };
    let service = BiometricService::with_config(Arc::new(source), config);

    let snapshots = service.fetch_daily_biometrics(from, to).await?;
    let cache_stats = service.cache_stats().await;

    let output_data = match format {
        OutputFormat::Ndjson => {
            let mut lines = String::new();
            for snapshot in &snapshots {
                lines.push_str(&serde_json::to_string(snapshot)?);
                lines.push('\n');
            }
            lines
        }
        OutputFormat::JsonPretty => {
            let baselines = if no_baselines {
                None
            } else {
                let mut tracker = BaselineTracker::new(baseline_days);
                for snapshot in &snapshots {
                    tracker.observe(snapshot);
                }
                Some(tracker.baselines())
            };
            let encoder = SnapshotEncoder::new();
            let mut json = encoder.encode_to_json(
                PayloadRange { from, to },
                snapshots,
                baselines,
                Some(cache_stats),
            )?;
            json.push('\n');
            json
        }
    };

    write_output(output, &output_data)
}

async fn cmd_workouts(
    input: &PathBuf,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<(), VitalsCliError> {
    let source = FixtureSource::from_json(&read_input(input)?)?;
    let service = BiometricService::new(Arc::new(source));

    let workouts = service.fetch_historical_workouts(from, to).await?;
    println!("{}", serde_json::to_string_pretty(&workouts)?);
    Ok(())
}

fn cmd_validate(input: &PathBuf, json: bool) -> Result<(), VitalsCliError> {
    let source = FixtureSource::from_json(&read_input(input)?)?;

    let report = FixtureReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        available: source.is_available(),
        authorization: source.authorization_state().to_string(),
        quantity_samples: source.quantity_sample_count(),
        sleep_samples: source.sleep_sample_count(),
        workouts: source.workout_count(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Fixture Report");
        println!("==============");
        println!("Producer:         {} v{}", report.producer, report.version);
        println!("Available:        {}", report.available);
        println!("Authorization:    {}", report.authorization);
        println!("Quantity samples: {}", report.quantity_samples);
        println!("Sleep samples:    {}", report.sleep_samples);
        println!("Workouts:         {}", report.workouts);
        if atty::is(atty::Stream::Stdin) && input.to_string_lossy() == "-" {
            println!();
            println!("(reading fixture from an interactive terminal; pipe a file instead)");
        }
    }

    Ok(())
}

fn read_input(input: &PathBuf) -> Result<String, VitalsCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &PathBuf, data: &str) -> Result<(), VitalsCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

#[derive(Debug)]
enum VitalsCliError {
    Io(io::Error),
    Engine(BiometricError),
    Json(serde_json::Error),
}

impl From<io::Error> for VitalsCliError {
    fn from(e: io::Error) -> Self {
        VitalsCliError::Io(e)
    }
}

impl From<BiometricError> for VitalsCliError {
    fn from(e: BiometricError) -> Self {
        VitalsCliError::Engine(e)
    }
}

impl From<serde_json::Error> for VitalsCliError {
    fn from(e: serde_json::Error) -> Self {
        VitalsCliError::Json(e)
    }
}

/// Structured error emitted on stderr
#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<VitalsCliError> for CliError {
    fn from(e: VitalsCliError) -> Self {
        match e {
            VitalsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            VitalsCliError::Engine(e) => {
                let code = match &e {
                    BiometricError::InvalidRange { .. } => "INVALID_RANGE",
                    BiometricError::AuthorizationDenied { .. } => "AUTHORIZATION_DENIED",
                    BiometricError::NotAvailable => "NOT_AVAILABLE",
                    BiometricError::DataSourceQuery { .. } => "QUERY_ERROR",
                    BiometricError::QueryTimeout { .. } => "QUERY_TIMEOUT",
                    BiometricError::Json(_) => "JSON_ERROR",
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: None,
                }
            }
            VitalsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
        }
    }
}

/// Summary of a parsed fixture document
#[derive(serde::Serialize)]
struct FixtureReport {
    producer: String,
    version: String,
    available: bool,
    authorization: String,
    quantity_samples: usize,
    sleep_samples: usize,
    workouts: usize,
}
