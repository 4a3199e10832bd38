//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are naive UTC strings with millisecond precision, which sort
//! lexically and are understood by SQLite's date functions.

use chrono::NaiveDateTime;
use sparkify_core::model::SongPlay;

use crate::{Error, Result};

const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: NaiveDateTime) -> String { dt.format(DT_FORMAT).to_string() }

pub fn decode_dt(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `songplays` row.
pub struct RawSongPlay {
  pub songplay_id: i64,
  pub start_time:  String,
  pub user_id:     i64,
  pub level:       Option<String>,
  pub song_id:     Option<String>,
  pub artist_id:   Option<String>,
  pub session_id:  Option<i64>,
  pub location:    Option<String>,
  pub user_agent:  Option<String>,
}

impl RawSongPlay {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      songplay_id: row.get(0)?,
      start_time:  row.get(1)?,
      user_id:     row.get(2)?,
      level:       row.get(3)?,
      song_id:     row.get(4)?,
      artist_id:   row.get(5)?,
      session_id:  row.get(6)?,
      location:    row.get(7)?,
      user_agent:  row.get(8)?,
    })
  }

  pub fn into_songplay(self) -> Result<SongPlay> {
    Ok(SongPlay {
      songplay_id: self.songplay_id,
      start_time:  decode_dt(&self.start_time)?,
      user_id:     self.user_id,
      level:       self.level,
      song_id:     self.song_id,
      artist_id:   self.artist_id,
      session_id:  self.session_id,
      location:    self.location,
      user_agent:  self.user_agent,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  #[test]
  fn datetime_text_keeps_milliseconds() {
    let dt = NaiveDate::from_ymd_opt(2018, 11, 1)
      .unwrap()
      .and_hms_milli_opt(21, 1, 46, 796)
      .unwrap();
    let s = encode_dt(dt);
    assert_eq!(s, "2018-11-01 21:01:46.796");
    assert_eq!(decode_dt(&s).unwrap(), dt);
  }

  #[test]
  fn malformed_datetime_is_an_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
