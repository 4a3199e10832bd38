//! Calendar derivation for the `time` dimension.
//!
//! Log timestamps are milliseconds since the Unix epoch, interpreted as UTC
//! and stored without an offset. Week numbers follow ISO 8601 week-based
//! years, so the last days of December can fall in week 1 and the first days
//! of January in week 52 or 53. Weekdays count from Monday = 0.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

use crate::{model::TimeBucket, Error, Result};

/// Convert an epoch-milliseconds log timestamp into a naive UTC datetime.
pub fn start_time_from_millis(ms: i64) -> Result<NaiveDateTime> {
  DateTime::from_timestamp_millis(ms)
    .map(|dt| dt.naive_utc())
    .ok_or(Error::Timestamp(ms))
}

impl TimeBucket {
  pub fn from_start_time(start_time: NaiveDateTime) -> Self {
    Self {
      start_time,
      hour:    start_time.hour(),
      day:     start_time.day(),
      week:    start_time.iso_week().week(),
      month:   start_time.month(),
      year:    start_time.year(),
      weekday: start_time.weekday().num_days_from_monday(),
    }
  }

  pub fn from_millis(ms: i64) -> Result<Self> {
    start_time_from_millis(ms).map(Self::from_start_time)
  }
}
