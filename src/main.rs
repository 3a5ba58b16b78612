//! Proctoring Dashboard - list and watch the proctored exams of a course

use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use proctoring_dashboard::collection::{CollectionEvent, FetchMode, Record, RecordSource};
use proctoring_dashboard::proctoring::exam_collection_from_config;
use proctoring_dashboard::{DashboardConfig, ExamCollection, ProctoredExam};

#[derive(Parser)]
#[command(name = "proctoring-dashboard")]
#[command(about = "Proctored exam list of the edX instructor dashboard", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the proctored exams of a course
    Exams {
        /// Course id, e.g. course-v1:edX+DemoX+Demo_Course
        #[arg(short, long)]
        course_id: Option<String>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,

        /// Only show active exams
        #[arg(long)]
        active_only: bool,
    },

    /// Refresh the exam list periodically and print changes
    Watch {
        #[arg(short, long)]
        course_id: Option<String>,

        /// Refresh interval in seconds (overrides the config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show configuration
    Config {
        /// Write the default configuration if no file exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config_path = cli.config.unwrap_or_else(DashboardConfig::default_path);
    let config = DashboardConfig::load_or_default(&config_path)?;

    match cli.command {
        Commands::Exams {
            course_id,
            json,
            active_only,
        } => {
            let exams = exam_collection_from_config(&config, course_id.as_deref())?;
            exams.fetch(FetchMode::Reset).await?;

            let records = if active_only {
                exams.filter(|e| e.is_active).await
            } else {
                exams.records().await
            };

            if json {
                let raw = records
                    .iter()
                    .map(Record::try_to_raw)
                    .collect::<Result<Vec<_>, _>>()?;
                println!("{}", serde_json::to_string_pretty(&raw)?);
            } else if records.is_empty() {
                println!("No exams found at {}", exams.url());
            } else {
                println!("Exams ({}):", records.len());
                for exam in &records {
                    println!("  {}", exam);
                }
            }
        }

        Commands::Watch {
            course_id,
            interval,
        } => {
            let secs = interval.unwrap_or(config.refresh_interval_secs).max(1);
            let exams = exam_collection_from_config(&config, course_id.as_deref())?;
            let mut events = exams.subscribe().await;

            let printer = tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => print_event(&event),
                        Err(RecvError::Lagged(n)) => warn!("Missed {} exam events", n),
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            info!("Watching {} every {}s (Ctrl+C to stop)", exams.url(), secs);
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Cannot listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            watch_exams(&exams, Duration::from_secs(secs), shutdown).await;

            printer.abort();
        }

        Commands::Config { init } => {
            if init && !config_path.exists() {
                config.save(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
            println!("# {}", config_path.display());
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| -> Box<dyn std::error::Error> { e })
}

/// Refresh `exams` every `period` until `shutdown` completes.
///
/// `shutdown` is polled during refreshes too, so a slow fetch never delays it.
async fn watch_exams<S, F>(exams: &ExamCollection<S>, period: Duration, shutdown: F)
where
    S: RecordSource,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = &mut shutdown => break,
            result = exams.fetch(FetchMode::Merge) => {
                if let Err(e) = result {
                    eprintln!("Refresh failed: {}", e);
                }
            }
        }
    }
}

fn print_event(event: &CollectionEvent<ProctoredExam>) {
    match event {
        CollectionEvent::Added { record, .. } => println!("+ {}", record),
        CollectionEvent::Removed { record, .. } => println!("- {}", record),
        CollectionEvent::Changed { current, .. } => println!("~ {}", current),
        CollectionEvent::Sorted => println!("  (order changed)"),
        CollectionEvent::Reset { len } => println!("  reset: {} exams", len),
        CollectionEvent::Request { .. } => {}
        CollectionEvent::Synced { len } => println!("  synced: {} exams", len),
        CollectionEvent::Error { message } => println!("! {}", message),
    }
}
