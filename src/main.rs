//! Command line entry point for the cohort engine
//!
//! Loads configuration, initializes logging and runs one engine operation:
//! resolving or normalizing a rating, fetching a live rating, autopicking a
//! cohort or building a progress report from a population snapshot.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use cohort_engine::config::AppConfig;
use cohort_engine::metrics::MetricsCollector;
use cohort_engine::stats::ReportPeriod;
use cohort_engine::{
    AutopickRequest, CohortEngine, EngineDeps, FetchError, InMemoryStudentStore, ProviderRegistry,
    Rating, RatingSystem, Student,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Cohort Engine - rating normalization and cohort autopick for chess students
#[derive(Parser)]
#[command(
    name = "cohort-engine",
    version,
    about = "Rating normalization and cohort autopick for chess students",
    long_about = "Cohort Engine keeps students' Chess.com, Lichess, FIDE and USCF ratings up to \
                 date, places students into training cohorts from their preferred rating, and \
                 ranks ratings against the whole population for periodic progress reports."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without running a command")]
    dry_run: bool,

    /// Print collected metrics after the command
    #[arg(long, help = "Print Prometheus metrics after the command completes")]
    print_metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the cohort band for a rating
    Resolve {
        system: RatingSystem,
        rating: Rating,
    },

    /// Convert a rating onto another system's scale
    Normalize {
        system: RatingSystem,
        rating: Rating,
        #[arg(long, default_value = "fide")]
        target: RatingSystem,
    },

    /// Fetch a live rating from a provider
    Fetch {
        system: RatingSystem,
        username: String,
    },

    /// Refresh a student's ratings and pick a cohort from the preferred system
    Autopick {
        /// Population snapshot (JSON array of students)
        snapshot: PathBuf,
        student: String,
        #[arg(long)]
        system: RatingSystem,
    },

    /// Build a progress report for a student from a population snapshot
    Report {
        /// Population snapshot (JSON array of students)
        snapshot: PathBuf,
        student: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: NaiveDate,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: NaiveDate,
        #[arg(long)]
        label: Option<String>,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Cohort Engine");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Fetch timeout: {}ms", config.engine.fetch_timeout_ms);
    info!(
        "   Max concurrent fetches: {}",
        config.engine.max_concurrent_fetches
    );
    info!(
        "   Cohort bands: {} across {} rating systems",
        config.cohorts.bands.len(),
        config.cohorts.tables.len()
    );
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    Ok(config)
}

fn load_snapshot(path: &Path) -> Result<Vec<Student>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let students: Vec<Student> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    debug!("Loaded {} students from {}", students.len(), path.display());
    Ok(students)
}

fn start_of_day(date: NaiveDate) -> Result<DateTime<Utc>> {
    let time = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("Invalid date: {}", date))?;
    Ok(Utc.from_utc_datetime(&time))
}

fn end_of_day(date: NaiveDate) -> Result<DateTime<Utc>> {
    let time = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| anyhow!("Invalid date: {}", date))?;
    Ok(Utc.from_utc_datetime(&time))
}

fn build_engine(
    config: &AppConfig,
    students: Vec<Student>,
    metrics: Arc<MetricsCollector>,
) -> Result<(CohortEngine, Arc<InMemoryStudentStore>)> {
    let store = Arc::new(InMemoryStudentStore::with_students(students));
    let engine = CohortEngine::new(
        EngineDeps {
            providers: ProviderRegistry::from_settings(&config.providers)?,
            store: store.clone(),
            resolver: config.cohorts.to_resolver()?,
        },
        config.engine.clone(),
    )
    .with_metrics(metrics);

    Ok((engine, store))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_command(
    command: Command,
    config: &AppConfig,
    metrics: Arc<MetricsCollector>,
) -> Result<()> {
    match command {
        Command::Resolve { system, rating } => {
            let resolver = config.cohorts.to_resolver()?;
            println!("{}", resolver.resolve_cohort(system, rating));
        }

        Command::Normalize {
            system,
            rating,
            target,
        } => {
            let resolver = config.cohorts.to_resolver()?;
            match resolver.normalize(system, rating, target) {
                Some(value) => println!("{}", value),
                None => {
                    return Err(anyhow!(
                        "{} rating {} cannot be converted to {}",
                        system,
                        rating,
                        target
                    ))
                }
            }
        }

        Command::Fetch { system, username } => {
            let registry = ProviderRegistry::from_settings(&config.providers)?;
            let provider = registry
                .get(system)
                .ok_or(FetchError::Unsupported { system })?;

            let rating = tokio::time::timeout(
                config.engine.fetch_timeout(),
                provider.fetch_rating(username.trim()),
            )
            .await
            .map_err(|_| FetchError::Timeout {
                timeout_ms: config.engine.fetch_timeout_ms,
            })??;
            println!("{}", rating);
        }

        Command::Autopick {
            snapshot,
            student,
            system,
        } => {
            let (engine, store) = build_engine(config, load_snapshot(&snapshot)?, metrics)?;
            let ratings = store
                .get(&student)
                .map(|record| record.ratings)
                .unwrap_or_default();

            let report = engine
                .autopick_cohort(
                    &student,
                    AutopickRequest {
                        preferred_system: Some(system),
                        ratings,
                    },
                )
                .await?;
            print_json(&report)?;
        }

        Command::Report {
            snapshot,
            student,
            start,
            end,
            label,
        } => {
            let period = ReportPeriod::new(
                label.unwrap_or_else(|| start.format("%Y").to_string()),
                start_of_day(start)?,
                end_of_day(end)?,
            );
            let (engine, store) = build_engine(config, load_snapshot(&snapshot)?, metrics)?;

            let report = engine
                .progress_reports(store.as_ref(), period)
                .await?
                .into_iter()
                .find(|report| report.student_id == student)
                .ok_or_else(|| anyhow!("Student not found in snapshot: {}", student))?;
            print_json(&report)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without running a command");
        return Ok(());
    }

    let Some(command) = args.command else {
        info!("No command given; see --help");
        return Ok(());
    };

    let metrics = Arc::new(MetricsCollector::new()?);
    run_command(command, &config, metrics.clone()).await?;

    if args.print_metrics {
        print!("{}", metrics.render()?);
    }

    Ok(())
}
