use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use physician_profiler::config::Settings;
use physician_profiler::models::read_roster;
use physician_profiler::pipeline::{publications, trials, FailureReporter};
use physician_profiler::sources::{ClinicalTrialsClient, PubMedClient};
use physician_profiler::store::MongoStore;

/// Physician Profiler - harvest per-physician trial and publication profiles
#[derive(Parser, Debug)]
#[command(name = "physician-profiler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build per-physician clinical-trial and publication profiles", long_about = None)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// MongoDB connection string (overrides configuration)
    #[arg(long, global = true)]
    mongo_uri: Option<String>,

    /// Failure report path (overrides configuration)
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Append the run log to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Harvest ClinicalTrials.gov studies for every roster entry
    Trials {
        /// Roster CSV with Record_Id and Full_Name columns
        #[arg(long)]
        roster: PathBuf,
    },
    /// Build PubMed publication profiles for every roster entry
    Publications {
        /// Roster CSV with Record_Id and Full_Name columns
        #[arg(long)]
        roster: PathBuf,
    },
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(uri) = &cli.mongo_uri {
        settings.mongo.uri = uri.clone();
    }
    if let Some(report) = &cli.report {
        settings.report.failure_report = report.clone();
    }

    let store = MongoStore::connect(&settings.mongo)
        .await
        .context("failed to connect to MongoDB")?;

    let mut reporter = FailureReporter::new();

    match &cli.command {
        Commands::Trials { roster } => {
            let roster = read_roster(roster).context("failed to read roster")?;
            tracing::info!("processing {} roster entries (trials)", roster.len());

            store
                .ensure_indexes()
                .await
                .context("failed to create indexes")?;
            let client = ClinicalTrialsClient::new(&settings.trials);
            trials::run(&client, &store, &roster, &mut reporter).await;
        }
        Commands::Publications { roster } => {
            let roster = read_roster(roster).context("failed to read roster")?;
            tracing::info!("processing {} roster entries (publications)", roster.len());

            let client = PubMedClient::new(&settings.pubmed);
            publications::run(&client, &store, &settings.pubmed, &roster, &mut reporter).await;
        }
    }

    let report_path = &settings.report.failure_report;
    if reporter
        .write_report(report_path)
        .context("failed to write failure report")?
    {
        tracing::warn!(
            "{} entries failed; report written to {}",
            reporter.len(),
            report_path.display()
        );
    } else {
        tracing::info!("all entries processed without failures");
    }

    Ok(())
}
