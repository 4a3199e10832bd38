//! Loader configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `SPARKIFY_*` environment variables. Command-line flags are
//! applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Runtime loader configuration, deserialised from `sparkify.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EtlConfig {
  /// SQLite database file the warehouse lives in.
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
  /// Root of the catalog (song metadata) files.
  #[serde(default = "default_song_data")]
  pub song_data:     PathBuf,
  /// Root of the activity log files.
  #[serde(default = "default_log_data")]
  pub log_data:      PathBuf,
  /// Extension of input files, without the dot.
  #[serde(default = "default_extension")]
  pub extension:     String,
  /// Skip failing files instead of aborting the run.
  #[serde(default)]
  pub keep_going:    bool,
}

fn default_database_path() -> PathBuf { PathBuf::from("sparkify.db") }
fn default_song_data() -> PathBuf { PathBuf::from("data/song_data") }
fn default_log_data() -> PathBuf { PathBuf::from("data/log_data") }
fn default_extension() -> String { "json".to_owned() }

impl Default for EtlConfig {
  fn default() -> Self {
    Self {
      database_path: default_database_path(),
      song_data:     default_song_data(),
      log_data:      default_log_data(),
      extension:     default_extension(),
      keep_going:    false,
    }
  }
}

impl EtlConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("SPARKIFY"))
      .build()?
      .try_deserialize()
  }
}
