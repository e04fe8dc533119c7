//! Command-line entry point for LazyLife trackers and insights.
//!
//! # Responsibility
//! - Map subcommands onto `lazylife_core` services and the dashboard aggregator.
//! - Print human-readable lines for writes and JSON for insights.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use lazylife_core::db::open_db;
use lazylife_core::{
    default_log_level, init_logging, DashboardAggregator, Granularity, InsightsConfig,
    SqliteEntryRepository, SqliteEntryStore, SqliteTrackerRepository, TrackerService,
};
use log::error;
use rusqlite::Connection;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "lazylife", version, about = "Household trackers and engagement insights")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "LAZYLIFE_DB", default_value = "lazylife.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "LAZYLIFE_LOG_DIR")]
    log_dir: Option<String>,

    #[arg(long, env = "LAZYLIFE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage trackers.
    #[command(subcommand)]
    Tracker(TrackerCommand),
    /// Log or remove entries.
    #[command(subcommand)]
    Entry(EntryCommand),
    /// Print the engagement dashboard as JSON.
    Insights(InsightsArgs),
}

#[derive(Debug, Subcommand)]
enum TrackerCommand {
    Add {
        name: String,
        #[arg(long, default_value = "daily")]
        granularity: Granularity,
    },
    List {
        /// Include archived trackers.
        #[arg(long)]
        all: bool,
    },
    Archive {
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
enum EntryCommand {
    Log {
        tracker_id: Uuid,
        /// Calendar date (YYYY-MM-DD); defaults to today in UTC.
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        note: Option<String>,
    },
    Remove {
        id: Uuid,
    },
}

#[derive(Debug, Args)]
struct InsightsArgs {
    /// Evaluate as of this RFC 3339 instant instead of the current time.
    #[arg(long)]
    now: Option<DateTime<Utc>>,
    #[arg(long)]
    lookback_days: Option<u32>,
    /// Print one tracker's snapshot instead of the dashboard.
    #[arg(long)]
    tracker: Option<Uuid>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let conn = open_db(&cli.db)?;

    match cli.command {
        Command::Tracker(command) => {
            let service = TrackerService::new(
                SqliteTrackerRepository::new(&conn),
                SqliteEntryRepository::new(&conn),
            );
            match command {
                TrackerCommand::Add { name, granularity } => {
                    let tracker = service.create_tracker(&name, granularity)?;
                    println!("{}", tracker.id);
                }
                TrackerCommand::List { all } => {
                    for tracker in service.list_trackers(all)? {
                        let state = if tracker.is_active() { "" } else { "\tarchived" };
                        println!(
                            "{}\t{}\t{}{state}",
                            tracker.id, tracker.granularity, tracker.name
                        );
                    }
                }
                TrackerCommand::Archive { id } => service.archive_tracker(id)?,
            }
        }
        Command::Entry(command) => {
            let service = TrackerService::new(
                SqliteTrackerRepository::new(&conn),
                SqliteEntryRepository::new(&conn),
            );
            match command {
                EntryCommand::Log {
                    tracker_id,
                    date,
                    note,
                } => {
                    let date = date.unwrap_or_else(|| Utc::now().date_naive());
                    let entry = service.log_entry(tracker_id, date, note)?;
                    println!("{}", entry.id);
                }
                EntryCommand::Remove { id } => service.remove_entry(id)?,
            }
        }
        Command::Insights(args) => print_insights(conn, args).await?,
    }

    Ok(())
}

async fn print_insights(
    conn: Connection,
    args: InsightsArgs,
) -> Result<(), Box<dyn Error>> {
    let trackers = TrackerService::new(
        SqliteTrackerRepository::new(&conn),
        SqliteEntryRepository::new(&conn),
    )
    .list_trackers(false)?;

    let mut config = InsightsConfig::default();
    if let Some(lookback_days) = args.lookback_days {
        config.lookback_days = lookback_days;
    }
    let aggregator = DashboardAggregator::with_config(SqliteEntryStore::new(conn), config)?;
    let now = args.now.unwrap_or_else(Utc::now);

    let output = match args.tracker {
        Some(id) => {
            let tracker = trackers
                .iter()
                .find(|tracker| tracker.id == id)
                .ok_or_else(|| format!("tracker not found: {id}"))?;
            serde_json::to_string_pretty(&aggregator.snapshot_at(tracker, now).await?)?
        }
        None => serde_json::to_string_pretty(&aggregator.summarize_at(&trackers, now).await)?,
    };
    println!("{output}");
    Ok(())
}
