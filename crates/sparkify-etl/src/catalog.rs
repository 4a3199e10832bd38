//! Catalog files: one song, and the artist who recorded it.

use std::path::Path;

use sparkify_core::{record::SongRecord, store::Warehouse, Error, Result};

use crate::{
  extract::read_numbered_records,
  runner::{FileProcessor, LoadSummary},
};

/// Loads catalog files into `songs` and `artists`.
pub struct SongFileProcessor<W> {
  warehouse: W,
}

impl<W: Warehouse> SongFileProcessor<W> {
  pub fn new(warehouse: W) -> Self { Self { warehouse } }
}

impl<W: Warehouse> FileProcessor for SongFileProcessor<W> {
  fn kind(&self) -> &'static str { "song" }

  async fn process(&self, path: &Path) -> Result<LoadSummary> {
    let records = read_numbered_records(path)?;
    let read = records.len();

    // A catalog file describes a single song; only its first record counts.
    let Some((line, first)) = records.into_iter().next() else {
      return Err(Error::parse(path, 0, "catalog file has no records"));
    };
    if read > 1 {
      tracing::debug!(path = %path.display(), read, "ignoring extra catalog records");
    }

    let song = SongRecord::from_record(first).map_err(|e| Error::parse(path, line, e))?;
    let (song, artist) = song.into_rows();

    self
      .warehouse
      .load_catalog_entry(song, artist)
      .await
      .map_err(Error::store)?;

    Ok(LoadSummary { records: read, kept: 1, ..Default::default() })
  }
}
