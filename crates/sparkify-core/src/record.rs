//! Raw JSON records and the typed views decoded from them.
//!
//! The extractor yields [`Record`]s, one per input line, with the JSON values
//! left as they were. Catalog and log transformers decode them into
//! [`SongRecord`] and [`LogEvent`] only once they know which shape to expect.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

use crate::{
  Result,
  model::{Artist, Song, SongLookup, TimeBucket, User},
  store::PendingPlay,
};

/// One line of a line-delimited JSON file, field name to value, in file
/// order.
pub type Record = serde_json::Map<String, Value>;

/// The `page` value that marks a log line as a song play.
pub const NEXT_SONG: &str = "NextSong";

/// Whether a raw log record is a song play. All other page actions (home,
/// login, settings, ...) carry no play information.
pub fn is_song_play(record: &Record) -> bool {
  record.get("page").and_then(Value::as_str) == Some(NEXT_SONG)
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// One catalog file's song metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
  pub song_id:          String,
  pub title:            String,
  pub artist_id:        String,
  #[serde(default, deserialize_with = "opt_year")]
  pub year:             Option<i32>,
  pub duration:         f64,
  pub artist_name:      String,
  pub artist_location:  Option<String>,
  pub artist_latitude:  Option<f64>,
  pub artist_longitude: Option<f64>,
}

impl SongRecord {
  pub fn from_record(record: Record) -> serde_json::Result<Self> {
    serde_json::from_value(Value::Object(record))
  }

  /// Split into the `songs` row and the `artists` row.
  pub fn into_rows(self) -> (Song, Artist) {
    let song = Song {
      song_id:   self.song_id,
      title:     self.title,
      artist_id: Some(self.artist_id.clone()),
      year:      self.year,
      duration:  self.duration,
    };
    let artist = Artist {
      artist_id: self.artist_id,
      name:      self.artist_name,
      location:  self.artist_location,
      latitude:  self.artist_latitude,
      longitude: self.artist_longitude,
    };
    (song, artist)
  }
}

// ─── Activity log ────────────────────────────────────────────────────────────

/// One `NextSong` line from an activity log.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
  /// Epoch milliseconds, UTC.
  pub ts:         i64,
  pub page:       String,
  #[serde(deserialize_with = "int_or_string")]
  pub user_id:    i64,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub gender:     Option<String>,
  pub level:      Option<String>,
  pub song:       Option<String>,
  pub artist:     Option<String>,
  pub length:     Option<f64>,
  #[serde(default, deserialize_with = "opt_int_or_string")]
  pub session_id: Option<i64>,
  pub location:   Option<String>,
  pub user_agent: Option<String>,
}

impl LogEvent {
  pub fn from_record(record: Record) -> serde_json::Result<Self> {
    serde_json::from_value(Value::Object(record))
  }

  pub fn time_bucket(&self) -> Result<TimeBucket> {
    TimeBucket::from_millis(self.ts)
  }

  pub fn user(&self) -> User {
    User {
      user_id:    self.user_id,
      first_name: self.first_name.clone(),
      last_name:  self.last_name.clone(),
      gender:     self.gender.clone(),
      level:      self.level.clone(),
    }
  }

  /// The play row minus the song/artist ids, which the store resolves.
  pub fn pending_play(&self) -> Result<PendingPlay> {
    Ok(PendingPlay {
      start_time: self.time_bucket()?.start_time,
      user_id:    self.user_id,
      level:      self.level.clone(),
      session_id: self.session_id,
      location:   self.location.clone(),
      user_agent: self.user_agent.clone(),
      lookup:     SongLookup {
        title:    self.song.clone(),
        artist:   self.artist.clone(),
        duration: self.length,
      },
    })
  }
}

// ─── Lenient integers ────────────────────────────────────────────────────────

// Ids show up both as JSON numbers and as numeric strings (`"userId": "39"`).
// Integral floats (`39.0`) are accepted only inside the `i64` range.

const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn value_to_int<E: serde::de::Error>(value: Value) -> Result<Option<i64>, E> {
  match value {
    Value::Null => Ok(None),
    Value::Number(n) => n
      .as_i64()
      .or_else(|| {
        n.as_f64()
          .filter(|f| f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(f))
          .map(|f| f as i64)
      })
      .map(Some)
      .ok_or_else(|| E::custom(format!("expected an integer, found {n}"))),
    Value::String(s) if s.trim().is_empty() => Ok(None),
    Value::String(s) => s
      .trim()
      .parse()
      .map(Some)
      .map_err(|_| E::custom(format!("expected an integer, found {s:?}"))),
    other => Err(E::custom(format!("expected an integer, found {other}"))),
  }
}

fn int_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
  value_to_int(Value::deserialize(d)?)?
    .ok_or_else(|| D::Error::custom("expected an integer, found nothing"))
}

fn opt_int_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
  value_to_int(Value::deserialize(d)?)
}

fn opt_year<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
  value_to_int(Value::deserialize(d)?)?
    .map(|y| i32::try_from(y).map_err(|_| D::Error::custom(format!("year {y} is out of range"))))
    .transpose()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record(value: Value) -> Record {
    match value {
      Value::Object(map) => map,
      _ => panic!("test record must be an object"),
    }
  }

  #[test]
  fn song_record_maps_artist_columns() {
    let rec = record(json!({
      "num_songs": 1,
      "artist_id": "ARD7TVE1187B99BFB1",
      "artist_latitude": null,
      "artist_longitude": null,
      "artist_location": "California - LA",
      "artist_name": "Casual",
      "song_id": "SOMZWCG12A8C13C480",
      "title": "I Didn't Mean To",
      "duration": 218.93179,
      "year": 0
    }));

    let (song, artist) = SongRecord::from_record(rec).unwrap().into_rows();

    assert_eq!(song.song_id, "SOMZWCG12A8C13C480");
    assert_eq!(song.artist_id.as_deref(), Some("ARD7TVE1187B99BFB1"));
    assert_eq!(song.year, Some(0));
    assert_eq!(song.duration, 218.93179);
    assert_eq!(artist.artist_id, "ARD7TVE1187B99BFB1");
    assert_eq!(artist.name, "Casual");
    assert_eq!(artist.location.as_deref(), Some("California - LA"));
    assert_eq!(artist.latitude, None);
    assert_eq!(artist.longitude, None);
  }

  #[test]
  fn song_record_without_title_is_rejected() {
    let rec = record(json!({
      "song_id": "S1", "artist_id": "A1", "artist_name": "Band", "duration": 1.0
    }));
    assert!(SongRecord::from_record(rec).is_err());
  }

  #[test]
  fn log_event_accepts_string_user_id() {
    let rec = record(json!({
      "artist": "Des'ree", "auth": "Logged In", "firstName": "Kaylee",
      "gender": "F", "itemInSession": 1, "lastName": "Summers",
      "length": 246.30812, "level": "free", "location": "Phoenix-Mesa-Scottsdale, AZ",
      "method": "PUT", "page": "NextSong", "registration": 1540344794796.0,
      "sessionId": 139, "song": "You Gotta Be", "status": 200,
      "ts": 1541106106796i64, "userAgent": "Mozilla/5.0", "userId": "8"
    }));

    let event = LogEvent::from_record(rec).unwrap();
    assert_eq!(event.user_id, 8);
    assert_eq!(event.session_id, Some(139));

    let play = event.pending_play().unwrap();
    assert_eq!(play.lookup.title.as_deref(), Some("You Gotta Be"));
    assert_eq!(play.lookup.artist.as_deref(), Some("Des'ree"));
    assert_eq!(play.lookup.duration, Some(246.30812));
    assert_eq!(play.start_time, event.time_bucket().unwrap().start_time);
  }

  #[test]
  fn song_record_with_out_of_range_year_is_rejected() {
    let rec = record(json!({
      "song_id": "S1", "title": "T", "artist_id": "A1", "artist_name": "Band",
      "duration": 1.0, "year": 3_000_000_000i64
    }));
    let err = SongRecord::from_record(rec).unwrap_err();
    assert!(err.to_string().contains("out of range"), "got {err}");
  }

  #[test]
  fn song_record_accepts_string_year() {
    let rec = record(json!({
      "song_id": "S1", "title": "T", "artist_id": "A1", "artist_name": "Band",
      "duration": 1.0, "year": "1999"
    }));
    assert_eq!(SongRecord::from_record(rec).unwrap().year, Some(1999));
  }

  #[test]
  fn integral_float_user_id_must_fit_i64() {
    let ok = record(json!({ "ts": 1, "page": "NextSong", "userId": 39.0 }));
    assert_eq!(LogEvent::from_record(ok).unwrap().user_id, 39);

    let huge = record(json!({ "ts": 1, "page": "NextSong", "userId": 1e20 }));
    assert!(LogEvent::from_record(huge).is_err());

    let edge = record(json!({ "ts": 1, "page": "NextSong", "userId": 9.223372036854775808e18 }));
    assert!(LogEvent::from_record(edge).is_err());
  }

  #[test]
  fn log_event_requires_user_id() {
    let rec = record(json!({ "ts": 1, "page": "NextSong", "userId": "" }));
    assert!(LogEvent::from_record(rec).is_err());
  }

  #[test]
  fn only_next_song_is_a_play() {
    assert!(is_song_play(&record(json!({ "page": "NextSong" }))));
    assert!(!is_song_play(&record(json!({ "page": "Home" }))));
    assert!(!is_song_play(&record(json!({ "page": "Login" }))));
    assert!(!is_song_play(&record(json!({}))));
  }
}
