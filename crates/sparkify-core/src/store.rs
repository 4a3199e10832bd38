//! The `Warehouse` trait and the batch types written through it.
//!
//! The trait is implemented by storage backends (e.g.
//! `sparkify-store-sqlite`). The loader depends on this abstraction, not on
//! any concrete backend. Each `load_*` call is one transaction: it commits
//! when every row in the batch is written and leaves nothing behind if any
//! write fails.

use std::future::Future;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::{Artist, Song, SongLookup, SongMatch, SongPlay, TimeBucket, User};

// ─── Write batches ───────────────────────────────────────────────────────────

/// A song play waiting for its song/artist ids to be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPlay {
  pub start_time: NaiveDateTime,
  pub user_id:    i64,
  pub level:      Option<String>,
  pub session_id: Option<i64>,
  pub location:   Option<String>,
  pub user_agent: Option<String>,
  pub lookup:     SongLookup,
}

/// Every row derived from one activity log file.
///
/// Written in field order: time buckets, then users, then plays, so each
/// play's foreign keys exist before it is inserted.
#[derive(Debug, Clone, Default)]
pub struct ActivityBatch {
  pub time_buckets: Vec<TimeBucket>,
  pub users:        Vec<User>,
  pub plays:        Vec<PendingPlay>,
}

/// What [`Warehouse::load_activity`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityOutcome {
  /// Time buckets actually inserted; repeated timestamps add nothing.
  pub time_rows: usize,
  /// User rows inserted or given a new `level`.
  pub user_rows: usize,
  pub songplays: usize,
  /// Plays whose lookup matched a catalog song.
  pub resolved:  usize,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// Row count per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
  pub songs:     u64,
  pub artists:   u64,
  pub time:      u64,
  pub users:     u64,
  pub songplays: u64,
}

/// A title and how many plays it collected. Unresolved plays group under
/// `title == None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongPlayCount {
  pub title:      Option<String>,
  pub play_count: u64,
}

/// A listening session and the time between its first and last play.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSpan {
  pub session_id:     Option<i64>,
  pub length_seconds: f64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational store the loader writes into.
///
/// Dimension writes are conflict-tolerant: songs, artists and time buckets
/// keep their first version, and users only take a new `level`. Song plays
/// are append-only, so loading the same log twice doubles them.
pub trait Warehouse: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Administration ────────────────────────────────────────────────────

  /// Drop every table and create them again, empty.
  fn reset_schema(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Loads ─────────────────────────────────────────────────────────────

  /// Insert-or-ignore one song and its artist, song first, as one
  /// transaction.
  fn load_catalog_entry(
    &self,
    song: Song,
    artist: Artist,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Write one log file's rows as one transaction, resolving each play's
  /// song/artist ids with the same lookup as [`Warehouse::find_song`].
  fn load_activity(
    &self,
    batch: ActivityBatch,
  ) -> impl Future<Output = Result<ActivityOutcome, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Find the catalog song whose title, artist name and duration all equal
  /// the lookup's exactly. Returns `None` when nothing matches.
  fn find_song(
    &self,
    lookup: SongLookup,
  ) -> impl Future<Output = Result<Option<SongMatch>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// All song plays in insertion order.
  fn list_songplays(&self) -> impl Future<Output = Result<Vec<SongPlay>, Self::Error>> + Send + '_;

  fn table_counts(&self) -> impl Future<Output = Result<TableCounts, Self::Error>> + Send + '_;

  /// The `limit` most played titles, most played first.
  fn top_songs(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SongPlayCount>, Self::Error>> + Send + '_;

  /// The `limit` sessions with the longest span between first and last play.
  fn top_sessions(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SessionSpan>, Self::Error>> + Send + '_;
}
