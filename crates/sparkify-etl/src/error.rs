//! Errors raised by a batch run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
  #[error("failed to list input files under {}: {source}", root.display())]
  Discover {
    root:   PathBuf,
    #[source]
    source: sparkify_core::Error,
  },

  /// A file failed under the abort policy. Files before it stay committed;
  /// its own rows were rolled back.
  #[error(
    "aborted on {} after {completed}/{total} files processed: {source}",
    path.display()
  )]
  Aborted {
    path:      PathBuf,
    completed: usize,
    total:     usize,
    #[source]
    source:    sparkify_core::Error,
  },

  #[error("failed to write progress: {0}")]
  Progress(#[source] std::io::Error),
}
