//! File discovery and the per-file batch loop.
//!
//! Files are processed one at a time in lexicographic path order. Each file
//! is its own transaction, committed by the warehouse before the next file
//! starts.

use std::{
  io::{self, Write},
  ops::AddAssign,
  path::{Path, PathBuf},
};

use serde::Serialize;
use sparkify_core::{Error, Result};
use walkdir::WalkDir;

use crate::error::BatchError;

// ─── Processors ──────────────────────────────────────────────────────────────

/// Counts from loading one file, or from a whole run when summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
  /// Records read from the file.
  pub records:   usize,
  /// Records that produced rows.
  pub kept:      usize,
  /// `time` rows newly inserted.
  pub time_rows: usize,
  /// `users` rows inserted or upserted.
  pub user_rows: usize,
  pub songplays: usize,
  /// Song plays whose song and artist were found in the catalog.
  pub resolved:  usize,
}

impl AddAssign for LoadSummary {
  fn add_assign(&mut self, rhs: Self) {
    self.records += rhs.records;
    self.kept += rhs.kept;
    self.time_rows += rhs.time_rows;
    self.user_rows += rhs.user_rows;
    self.songplays += rhs.songplays;
    self.resolved += rhs.resolved;
  }
}

/// Turns one input file into committed warehouse rows.
pub trait FileProcessor {
  /// Short label for logs (`"song"`, `"log"`).
  fn kind(&self) -> &'static str;

  /// Extract, transform and load `path`. On error nothing from the file is
  /// committed.
  async fn process(&self, path: &Path) -> Result<LoadSummary>;
}

// ─── Discovery ───────────────────────────────────────────────────────────────

/// Every file under `root` whose extension is `extension`, sorted by path.
///
/// Dot-files are skipped; directories are descended regardless of name.
pub fn discover_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();

  for entry in WalkDir::new(root) {
    let entry = entry.map_err(|e| {
      let path = e.path().unwrap_or(root).to_path_buf();
      Error::io(path, e.into())
    })?;

    if !entry.file_type().is_file() {
      continue;
    }
    let hidden = entry.file_name().to_string_lossy().starts_with('.');
    let matches = entry.path().extension().is_some_and(|ext| ext == extension);
    if matches && !hidden {
      files.push(entry.into_path());
    }
  }

  files.sort();
  Ok(files)
}

// ─── Batch loop ──────────────────────────────────────────────────────────────

/// What to do when one file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
  /// Stop the run at the first failing file.
  #[default]
  Abort,
  /// Log the failure, leave that file out, and carry on.
  Skip,
}

/// The outcome of a run that was not aborted.
#[derive(Debug, Default)]
pub struct BatchReport {
  pub found:     usize,
  pub processed: usize,
  /// Files left out under [`FailurePolicy::Skip`], with the reason.
  pub skipped:   Vec<(PathBuf, String)>,
  pub totals:    LoadSummary,
}

/// Load every matching file under `root` with `processor`, printing
/// progress to stdout.
pub async fn run_batch<P: FileProcessor>(
  root:      &Path,
  extension: &str,
  processor: &P,
  policy:    FailurePolicy,
) -> Result<BatchReport, BatchError> {
  run_batch_with_progress(root, extension, processor, policy, &mut io::stdout()).await
}

/// [`run_batch`] with the progress lines written to `out`.
///
/// A committed file prints `i/n files processed.`; a file left out under
/// [`FailurePolicy::Skip`] prints `i/n files skipped.` instead.
pub async fn run_batch_with_progress<P: FileProcessor, O: Write>(
  root:      &Path,
  extension: &str,
  processor: &P,
  policy:    FailurePolicy,
  out:       &mut O,
) -> Result<BatchReport, BatchError> {
  let files = discover_files(root, extension)
    .map_err(|source| BatchError::Discover { root: root.to_path_buf(), source })?;
  let total = files.len();

  writeln!(out, "{} files found in {}", total, root.display()).map_err(BatchError::Progress)?;
  tracing::info!(kind = processor.kind(), root = %root.display(), total, "starting batch");

  let mut report = BatchReport { found: total, ..Default::default() };

  for (i, path) in files.into_iter().enumerate() {
    match processor.process(&path).await {
      Ok(summary) => {
        tracing::debug!(path = %path.display(), ?summary, "file committed");
        report.totals += summary;
        report.processed += 1;
        writeln!(out, "{}/{} files processed.", i + 1, total).map_err(BatchError::Progress)?;
      }
      Err(source) if policy == FailurePolicy::Skip => {
        tracing::warn!(path = %path.display(), error = %source, "skipping file");
        report.skipped.push((path, source.to_string()));
        writeln!(out, "{}/{} files skipped.", i + 1, total).map_err(BatchError::Progress)?;
      }
      Err(source) => {
        tracing::error!(path = %path.display(), error = %source, "aborting batch");
        return Err(BatchError::Aborted { path, completed: report.processed, total, source });
      }
    }
  }

  tracing::info!(
    kind = processor.kind(),
    processed = report.processed,
    skipped = report.skipped.len(),
    songplays = report.totals.songplays,
    resolved = report.totals.resolved,
    "batch finished"
  );
  Ok(report)
}
