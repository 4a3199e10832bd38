//! `sparkify` — load song catalogs and listening logs into the warehouse.
//!
//! Reads `sparkify.toml` (or the path given with `--config`), layers
//! `SPARKIFY_*` environment variables and command-line flags on top, and
//! opens the SQLite warehouse.
//!
//! ```
//! sparkify create-tables
//! sparkify load --song-data data/song_data --log-data data/log_data
//! sparkify report --limit 5
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sparkify_core::store::Warehouse;
use sparkify_etl::{
  report::{write_report, write_stats},
  run_batch, EtlConfig, FailurePolicy, LogFileProcessor, SongFileProcessor,
};
use sparkify_store_sqlite::SqliteWarehouse;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sparkify warehouse loader")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "sparkify.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `database_path` from the config.
  #[arg(long, env = "SPARKIFY_DATABASE_PATH")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Drop every table and create them again, empty.
  CreateTables,

  /// Load all catalog files, then all activity logs.
  Load {
    /// Root of the catalog files.
    #[arg(long)]
    song_data: Option<PathBuf>,

    /// Root of the activity log files.
    #[arg(long)]
    log_data: Option<PathBuf>,

    /// Skip files that fail instead of aborting the run.
    #[arg(long)]
    keep_going: bool,
  },

  /// Print the most played songs and the longest sessions.
  Report {
    #[arg(long, default_value_t = 5)]
    limit: usize,
  },

  /// Print the row count of every table.
  Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = EtlConfig::load(&cli.config)
    .with_context(|| format!("failed to read config {:?}", cli.config))?;
  if let Some(database) = cli.database {
    cfg.database_path = database;
  }

  let warehouse = SqliteWarehouse::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open warehouse at {:?}", cfg.database_path))?;

  match cli.command {
    Command::CreateTables => {
      warehouse.reset_schema().await.context("failed to recreate tables")?;
    }

    Command::Load { song_data, log_data, keep_going } => {
      if let Some(dir) = song_data {
        cfg.song_data = dir;
      }
      if let Some(dir) = log_data {
        cfg.log_data = dir;
      }
      let policy = if keep_going || cfg.keep_going {
        FailurePolicy::Skip
      } else {
        FailurePolicy::Abort
      };

      // Catalog first: play lookups resolve against songs already loaded.
      let songs = SongFileProcessor::new(warehouse.clone());
      let song_report = run_batch(&cfg.song_data, &cfg.extension, &songs, policy)
        .await
        .context("song data load failed")?;

      let logs = LogFileProcessor::new(warehouse.clone());
      let log_report = run_batch(&cfg.log_data, &cfg.extension, &logs, policy)
        .await
        .context("log data load failed")?;

      for (path, reason) in song_report.skipped.iter().chain(&log_report.skipped) {
        tracing::warn!(path = %path.display(), %reason, "file was skipped");
      }
      tracing::info!(
        songs = song_report.processed,
        logs = log_report.processed,
        time_rows = log_report.totals.time_rows,
        user_rows = log_report.totals.user_rows,
        songplays = log_report.totals.songplays,
        resolved = log_report.totals.resolved,
        "load complete"
      );
    }

    Command::Report { limit } => {
      write_report(&warehouse, limit, &mut std::io::stdout().lock())
        .await
        .context("report failed")?;
    }

    Command::Stats => {
      write_stats(&warehouse, &mut std::io::stdout().lock())
        .await
        .context("stats failed")?;
    }
  }

  Ok(())
}
