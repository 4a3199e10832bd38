//! [`SqliteWarehouse`] — the SQLite implementation of [`Warehouse`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use sparkify_core::{
  model::{Artist, Song, SongLookup, SongMatch, SongPlay, User},
  store::{ActivityBatch, ActivityOutcome, SessionSpan, SongPlayCount, TableCounts, Warehouse},
};

use crate::{
  encode::{encode_dt, RawSongPlay},
  schema::{
    ARTIST_TABLE_INSERT, CONNECTION_PRAGMAS, CREATE_TABLE_QUERIES, DROP_TABLE_QUERIES,
    SONGPLAY_SELECT_ALL, SONGPLAY_TABLE_INSERT, SONG_SELECT, SONG_TABLE_INSERT,
    TABLE_COUNTS_SELECT, TIME_TABLE_INSERT, TOP_SESSIONS_SELECT, TOP_SONGS_SELECT,
    USER_SELECT, USER_TABLE_INSERT,
  },
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Sparkify warehouse backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The
/// connection closes when the last clone is dropped.
#[derive(Clone)]
pub struct SqliteWarehouse {
  conn: tokio_rusqlite::Connection,
}

impl SqliteWarehouse {
  /// Open (or create) a warehouse at `path` and create any missing tables.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(|e| Error::Connection(format!("{}: {e}", path.display())))?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened warehouse");
    Ok(store)
  }

  /// Open an in-memory warehouse — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(|e| Error::Connection(e.to_string()))?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        for create in CREATE_TABLE_QUERIES {
          conn.execute(create, [])?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Shared by [`Warehouse::find_song`] and the per-play lookup inside
/// [`Warehouse::load_activity`].
fn lookup_song(
  conn: &rusqlite::Connection,
  lookup: &SongLookup,
) -> rusqlite::Result<Option<SongMatch>> {
  let Some((title, artist, duration)) = lookup.parts() else {
    return Ok(None);
  };

  conn
    .prepare_cached(SONG_SELECT)?
    .query_row(rusqlite::params![title, artist, duration], |row| {
      Ok(SongMatch { song_id: row.get(0)?, artist_id: row.get(1)? })
    })
    .optional()
}

// ─── Warehouse impl ──────────────────────────────────────────────────────────

impl Warehouse for SqliteWarehouse {
  type Error = Error;

  // ── Administration ────────────────────────────────────────────────────────

  async fn reset_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        // Parents go before `songplays`, so enforcement must be off while
        // dropping. The pragma is a no-op inside a transaction.
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        let dropped = DROP_TABLE_QUERIES
          .iter()
          .try_for_each(|stmt| conn.execute(stmt, []).map(|_| ()));
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        dropped?;

        for create in CREATE_TABLE_QUERIES {
          conn.execute(create, [])?;
        }
        Ok(())
      })
      .await?;

    tracing::info!("dropped and recreated all tables");
    Ok(())
  }

  // ── Loads ─────────────────────────────────────────────────────────────────

  async fn load_catalog_entry(&self, song: Song, artist: Artist) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.prepare_cached(SONG_TABLE_INSERT)?.execute(rusqlite::params![
          song.song_id,
          song.title,
          song.artist_id,
          song.year,
          song.duration,
        ])?;
        tx.prepare_cached(ARTIST_TABLE_INSERT)?.execute(rusqlite::params![
          artist.artist_id,
          artist.name,
          artist.location,
          artist.latitude,
          artist.longitude,
        ])?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_activity(&self, batch: ActivityBatch) -> Result<ActivityOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        // Dropping `tx` on any early return rolls the whole file back.
        let tx = conn.transaction()?;
        let mut outcome = ActivityOutcome::default();

        {
          let mut insert = tx.prepare_cached(TIME_TABLE_INSERT)?;
          for bucket in &batch.time_buckets {
            outcome.time_rows += insert.execute(rusqlite::params![
              encode_dt(bucket.start_time),
              bucket.hour,
              bucket.day,
              bucket.week,
              bucket.month,
              bucket.year,
              bucket.weekday,
            ])?;
          }
        }

        {
          let mut upsert = tx.prepare_cached(USER_TABLE_INSERT)?;
          for user in &batch.users {
            outcome.user_rows += upsert.execute(rusqlite::params![
              user.user_id,
              user.first_name,
              user.last_name,
              user.gender,
              user.level,
            ])?;
          }
        }

        {
          let mut insert = tx.prepare_cached(SONGPLAY_TABLE_INSERT)?;
          for play in &batch.plays {
            let found = lookup_song(&tx, &play.lookup)?;
            if found.is_some() {
              outcome.resolved += 1;
            }
            let (song_id, artist_id) = found
              .map(|m| (Some(m.song_id), Some(m.artist_id)))
              .unwrap_or((None, None));

            insert.execute(rusqlite::params![
              encode_dt(play.start_time),
              play.user_id,
              play.level,
              song_id,
              artist_id,
              play.session_id,
              play.location,
              play.user_agent,
            ])?;
            outcome.songplays += 1;
          }
        }

        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(outcome)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn find_song(&self, lookup: SongLookup) -> Result<Option<SongMatch>> {
    let found = self
      .conn
      .call(move |conn| Ok(lookup_song(conn, &lookup)?))
      .await?;
    Ok(found)
  }

  async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
    let user = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(USER_SELECT, rusqlite::params![user_id], |row| {
            Ok(User {
              user_id:    row.get(0)?,
              first_name: row.get(1)?,
              last_name:  row.get(2)?,
              gender:     row.get(3)?,
              level:      row.get(4)?,
            })
          })
          .optional()?)
      })
      .await?;
    Ok(user)
  }

  async fn list_songplays(&self) -> Result<Vec<SongPlay>> {
    let raws: Vec<RawSongPlay> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(SONGPLAY_SELECT_ALL)?;
        let rows = stmt
          .query_map([], RawSongPlay::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSongPlay::into_songplay).collect()
  }

  async fn table_counts(&self) -> Result<TableCounts> {
    let counts = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(TABLE_COUNTS_SELECT, [], |row| {
          Ok(TableCounts {
            songs:     row.get::<_, i64>(0)? as u64,
            artists:   row.get::<_, i64>(1)? as u64,
            time:      row.get::<_, i64>(2)? as u64,
            users:     row.get::<_, i64>(3)? as u64,
            songplays: row.get::<_, i64>(4)? as u64,
          })
        })?)
      })
      .await?;
    Ok(counts)
  }

  async fn top_songs(&self, limit: usize) -> Result<Vec<SongPlayCount>> {
    let limit_val = limit as i64;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(TOP_SONGS_SELECT)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok(SongPlayCount {
              title:      row.get(0)?,
              play_count: row.get::<_, i64>(1)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn top_sessions(&self, limit: usize) -> Result<Vec<SessionSpan>> {
    let limit_val = limit as i64;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(TOP_SESSIONS_SELECT)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok(SessionSpan {
              session_id:     row.get(0)?,
              length_seconds: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}
