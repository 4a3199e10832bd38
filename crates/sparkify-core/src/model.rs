//! Row types for the five warehouse tables.
//!
//! `songs`, `artists` and `users` are dimensions keyed by their natural ids.
//! `time` is keyed by the play timestamp and carries only derived calendar
//! fields. `songplays` is the append-only fact table.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ─── Dimensions ──────────────────────────────────────────────────────────────

/// A catalog song. The first write for a `song_id` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
  pub song_id:   String,
  pub title:     String,
  pub artist_id: Option<String>,
  pub year:      Option<i32>,
  /// Length in seconds, compared exactly during the play lookup.
  pub duration:  f64,
}

/// A catalog artist. The first write for an `artist_id` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
  pub artist_id: String,
  pub name:      String,
  pub location:  Option<String>,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

/// A listener. Only `level` changes once the row exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    i64,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub gender:     Option<String>,
  /// Subscription tier (`free` / `paid`).
  pub level:      Option<String>,
}

/// Calendar breakdown of one play timestamp.
///
/// Every field except `start_time` is derived; build it with
/// [`TimeBucket::from_start_time`] or [`TimeBucket::from_millis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
  pub start_time: NaiveDateTime,
  pub hour:       u32,
  pub day:        u32,
  /// ISO 8601 week of the ISO week-based year.
  pub week:       u32,
  pub month:      u32,
  pub year:       i32,
  /// 0 = Monday … 6 = Sunday.
  pub weekday:    u32,
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// One stored play of one song by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongPlay {
  pub songplay_id: i64,
  pub start_time:  NaiveDateTime,
  pub user_id:     i64,
  pub level:       Option<String>,
  pub song_id:     Option<String>,
  pub artist_id:   Option<String>,
  pub session_id:  Option<i64>,
  pub location:    Option<String>,
  pub user_agent:  Option<String>,
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// What a log line knows about the song it played.
///
/// Matching is exact on all three parts, duration included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongLookup {
  pub title:    Option<String>,
  pub artist:   Option<String>,
  pub duration: Option<f64>,
}

impl SongLookup {
  /// Title, artist name and duration, or `None` when any part is missing.
  /// Such a lookup can never match a catalog row.
  pub fn parts(&self) -> Option<(&str, &str, f64)> {
    Some((self.title.as_deref()?, self.artist.as_deref()?, self.duration?))
  }
}

/// The catalog ids a [`SongLookup`] resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMatch {
  pub song_id:   String,
  pub artist_id: String,
}
