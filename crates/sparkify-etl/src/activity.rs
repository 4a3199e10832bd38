//! Activity log files: song plays, the users behind them, and when they
//! happened.

use std::path::Path;

use sparkify_core::{
  record::{is_song_play, LogEvent, Record},
  store::{ActivityBatch, Warehouse},
  Error, Result,
};

use crate::{
  extract::read_numbered_records,
  runner::{FileProcessor, LoadSummary},
};

/// Keep the `NextSong` records and decode them, preserving file order.
pub fn song_plays(path: &Path, records: Vec<(usize, Record)>) -> Result<Vec<LogEvent>> {
  records
    .into_iter()
    .filter(|(_, record)| is_song_play(record))
    .map(|(line, record)| LogEvent::from_record(record).map_err(|e| Error::parse(path, line, e)))
    .collect()
}

/// Derive every row one log file contributes.
///
/// Each play yields one time bucket, one user and one pending song play.
/// Duplicate timestamps and returning users are left in; the store's
/// conflict rules collapse them.
pub fn build_batch(events: &[LogEvent]) -> Result<ActivityBatch> {
  Ok(ActivityBatch {
    time_buckets: events.iter().map(LogEvent::time_bucket).collect::<Result<_>>()?,
    users:        events.iter().map(LogEvent::user).collect(),
    plays:        events.iter().map(LogEvent::pending_play).collect::<Result<_>>()?,
  })
}

/// Loads activity log files into `time`, `users` and `songplays`.
pub struct LogFileProcessor<W> {
  warehouse: W,
}

impl<W: Warehouse> LogFileProcessor<W> {
  pub fn new(warehouse: W) -> Self { Self { warehouse } }
}

impl<W: Warehouse> FileProcessor for LogFileProcessor<W> {
  fn kind(&self) -> &'static str { "log" }

  async fn process(&self, path: &Path) -> Result<LoadSummary> {
    let records = read_numbered_records(path)?;
    let read = records.len();

    let events = song_plays(path, records)?;
    let batch = build_batch(&events)?;

    let outcome = self
      .warehouse
      .load_activity(batch)
      .await
      .map_err(Error::store)?;

    Ok(LoadSummary {
      records:   read,
      kept:      events.len(),
      time_rows: outcome.time_rows,
      user_rows: outcome.user_rows,
      songplays: outcome.songplays,
      resolved:  outcome.resolved,
    })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::{json, Value};

  use super::*;

  fn numbered(values: Vec<Value>) -> Vec<(usize, Record)> {
    values
      .into_iter()
      .enumerate()
      .map(|(i, v)| match v {
        Value::Object(map) => (i + 1, map),
        _ => panic!("test record must be an object"),
      })
      .collect()
  }

  fn event(page: &str, user_id: Value, ts: i64) -> Value {
    json!({
      "page": page, "userId": user_id, "ts": ts,
      "firstName": "Ryan", "lastName": "Smith", "gender": "M", "level": "free",
      "song": "Test", "artist": "Band", "length": 180.5,
      "sessionId": 583, "location": "San Jose", "userAgent": "Mozilla/5.0"
    })
  }

  #[test]
  fn only_next_song_records_survive() {
    let records = numbered(vec![
      event("Home", json!(""), 1_541_000_000_000),
      event("NextSong", json!("26"), 1_541_000_001_000),
      event("Login", json!(""), 1_541_000_002_000),
      event("NextSong", json!(26), 1_541_000_003_000),
    ]);

    let events = song_plays(Path::new("log.json"), records).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.page == "NextSong" && e.user_id == 26));
    assert_eq!(events[0].ts, 1_541_000_001_000);
    assert_eq!(events[1].ts, 1_541_000_003_000);
  }

  #[test]
  fn bad_play_record_reports_its_line() {
    let mut broken = event("NextSong", json!("26"), 1);
    broken.as_object_mut().unwrap().remove("ts");
    let records = numbered(vec![event("Home", json!(""), 0), broken]);

    match song_plays(Path::new("log.json"), records) {
      Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
      other => panic!("expected a parse error, got {other:?}"),
    }
  }

  #[test]
  fn batch_has_one_row_group_per_play() {
    let records = numbered(vec![
      event("NextSong", json!("26"), 1_541_000_001_000),
      event("NextSong", json!("26"), 1_541_000_001_000),
      event("NextSong", json!("80"), 1_541_000_009_000),
    ]);
    let events = song_plays(Path::new("log.json"), records).unwrap();
    let batch = build_batch(&events).unwrap();

    assert_eq!(batch.time_buckets.len(), 3);
    assert_eq!(batch.users.len(), 3);
    assert_eq!(batch.plays.len(), 3);
    assert_eq!(batch.time_buckets[0], batch.time_buckets[1]);
    assert_eq!(batch.plays[2].user_id, 80);
    assert_eq!(batch.plays[2].session_id, Some(583));
    assert_eq!(batch.plays[2].start_time, batch.time_buckets[2].start_time);
    assert_eq!(batch.users[0].level.as_deref(), Some("free"));
  }
}
