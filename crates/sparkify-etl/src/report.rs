//! Read-only analytics over a loaded warehouse.

use std::io::Write;

use sparkify_core::{store::Warehouse, Error, Result};

/// Write the top `limit` songs by play count and the top `limit` sessions by
/// length to `out`.
pub async fn write_report<W, O>(warehouse: &W, limit: usize, out: &mut O) -> Result<()>
where
  W: Warehouse,
  O: Write,
{
  let songs = warehouse.top_songs(limit).await.map_err(Error::store)?;
  let sessions = warehouse.top_sessions(limit).await.map_err(Error::store)?;
  let io_err = |e| Error::io("<report output>", e);

  writeln!(out, "Top {limit} listened-to songs").map_err(io_err)?;
  for song in &songs {
    let title = song.title.as_deref().unwrap_or("(not in catalog)");
    writeln!(out, "  {:>6}  {title}", song.play_count).map_err(io_err)?;
  }

  writeln!(out, "Top {limit} listening sessions by session length").map_err(io_err)?;
  for session in &sessions {
    let id = session.session_id.map_or_else(|| "-".to_owned(), |id| id.to_string());
    writeln!(out, "  session {id:>6}  {:.3}s", session.length_seconds).map_err(io_err)?;
  }

  Ok(())
}

/// Write the row count of every table to `out`.
pub async fn write_stats<W, O>(warehouse: &W, out: &mut O) -> Result<()>
where
  W: Warehouse,
  O: Write,
{
  let counts = warehouse.table_counts().await.map_err(Error::store)?;
  let io_err = |e| Error::io("<stats output>", e);

  for (table, count) in [
    ("songs", counts.songs),
    ("artists", counts.artists),
    ("time", counts.time),
    ("users", counts.users),
    ("songplays", counts.songplays),
  ] {
    writeln!(out, "{table:<10} {count}").map_err(io_err)?;
  }
  Ok(())
}
