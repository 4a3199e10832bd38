//! Error types for `sparkify-core`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An input file is not valid line-delimited JSON, or a record lacks a
  /// field its shape requires.
  #[error("parse error in {}:{line}: {reason}", path.display())]
  Parse {
    path:   PathBuf,
    /// 1-based line number; 0 when the problem is not tied to one line.
    line:   usize,
    reason: String,
  },

  #[error("io error on {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("timestamp out of range: {0} ms")]
  Timestamp(i64),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn parse(path: impl Into<PathBuf>, line: usize, reason: impl ToString) -> Self {
    Self::Parse { path: path.into(), line, reason: reason.to_string() }
  }

  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }

  /// Wrap a backend error surfaced through [`crate::store::Warehouse`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
