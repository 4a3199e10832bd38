//! SQL for the Sparkify star schema.
//!
//! `songplays` is the fact table; `users`, `songs`, `artists` and `time` are
//! its dimensions. Statements are plain constants. Nothing here is validated
//! or executed.

/// Per-connection settings, applied when a connection is opened.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

// ─── Drop ────────────────────────────────────────────────────────────────────

pub const SONGPLAY_TABLE_DROP: &str = "DROP TABLE IF EXISTS songplays";
pub const USER_TABLE_DROP: &str = "DROP TABLE IF EXISTS users";
pub const SONG_TABLE_DROP: &str = "DROP TABLE IF EXISTS songs";
pub const ARTIST_TABLE_DROP: &str = "DROP TABLE IF EXISTS artists";
pub const TIME_TABLE_DROP: &str = "DROP TABLE IF EXISTS time";

// ─── Create ──────────────────────────────────────────────────────────────────

pub const USER_TABLE_CREATE: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id     INTEGER PRIMARY KEY,
    first_name  TEXT,
    last_name   TEXT,
    gender      TEXT,
    level       TEXT             -- 'free' | 'paid'; the only mutable column
)";

pub const SONG_TABLE_CREATE: &str = "
CREATE TABLE IF NOT EXISTS songs (
    song_id     TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    artist_id   TEXT,
    year        INTEGER,
    duration    REAL NOT NULL    -- seconds
)";

pub const ARTIST_TABLE_CREATE: &str = "
CREATE TABLE IF NOT EXISTS artists (
    artist_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    location    TEXT,
    latitude    REAL,
    longitude   REAL
)";

pub const TIME_TABLE_CREATE: &str = "
CREATE TABLE IF NOT EXISTS time (
    start_time  TEXT PRIMARY KEY,  -- 'YYYY-MM-DD HH:MM:SS.fff', UTC
    hour        INTEGER,
    day         INTEGER,
    week        INTEGER,           -- ISO 8601 week
    month       INTEGER,
    year        INTEGER,
    weekday     INTEGER            -- 0 = Monday
)";

// Song plays are strictly append-only.
pub const SONGPLAY_TABLE_CREATE: &str = "
CREATE TABLE IF NOT EXISTS songplays (
    songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_time  TEXT NOT NULL REFERENCES time(start_time),
    user_id     INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    level       TEXT,
    song_id     TEXT REFERENCES songs(song_id) ON DELETE CASCADE,
    artist_id   TEXT REFERENCES artists(artist_id) ON DELETE CASCADE,
    session_id  INTEGER,
    location    TEXT,
    user_agent  TEXT
)";

// ─── Insert ──────────────────────────────────────────────────────────────────

pub const SONGPLAY_TABLE_INSERT: &str = "
INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// A returning user keeps their name and gender; only `level` moves.
pub const USER_TABLE_INSERT: &str = "
INSERT INTO users (user_id, first_name, last_name, gender, level)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (user_id) DO UPDATE SET level = excluded.level";

pub const SONG_TABLE_INSERT: &str = "
INSERT INTO songs (song_id, title, artist_id, year, duration)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (song_id) DO NOTHING";

pub const ARTIST_TABLE_INSERT: &str = "
INSERT INTO artists (artist_id, name, location, latitude, longitude)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (artist_id) DO NOTHING";

pub const TIME_TABLE_INSERT: &str = "
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT (start_time) DO NOTHING";

// ─── Select ──────────────────────────────────────────────────────────────────

/// Resolve a log line's (title, artist name, duration) to catalog ids.
/// Duration is compared exactly.
pub const SONG_SELECT: &str = "
SELECT s.song_id, a.artist_id
FROM songs s
JOIN artists a ON s.artist_id = a.artist_id
WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
ORDER BY s.song_id
LIMIT 1";

pub const USER_SELECT: &str = "
SELECT user_id, first_name, last_name, gender, level FROM users WHERE user_id = ?1";

pub const SONGPLAY_SELECT_ALL: &str = "
SELECT songplay_id, start_time, user_id, level, song_id, artist_id, session_id, location, user_agent
FROM songplays
ORDER BY songplay_id";

pub const TABLE_COUNTS_SELECT: &str = "
SELECT
    (SELECT COUNT(*) FROM songs),
    (SELECT COUNT(*) FROM artists),
    (SELECT COUNT(*) FROM time),
    (SELECT COUNT(*) FROM users),
    (SELECT COUNT(*) FROM songplays)";

// ─── Analytics ───────────────────────────────────────────────────────────────

/// Most played titles. Plays with no catalog match count under a NULL title.
pub const TOP_SONGS_SELECT: &str = "
SELECT s.title, COUNT(*) AS play_count
FROM songplays sp
LEFT JOIN songs s ON sp.song_id = s.song_id
GROUP BY s.title
ORDER BY play_count DESC, s.title
LIMIT ?1";

/// Sessions ranked by the time between their first and last play, in
/// seconds rounded to the millisecond.
pub const TOP_SESSIONS_SELECT: &str = "
SELECT session_id,
       ROUND((julianday(MAX(start_time)) - julianday(MIN(start_time))) * 86400.0, 3) AS session_length
FROM songplays
GROUP BY session_id
ORDER BY session_length DESC, session_id
LIMIT ?1";

// ─── Query lists ─────────────────────────────────────────────────────────────

/// Parents first, so every `REFERENCES` target exists.
pub const CREATE_TABLE_QUERIES: [&str; 5] = [
  USER_TABLE_CREATE,
  SONG_TABLE_CREATE,
  ARTIST_TABLE_CREATE,
  TIME_TABLE_CREATE,
  SONGPLAY_TABLE_CREATE,
];

/// Must run with `PRAGMA foreign_keys = OFF`: parents are dropped before
/// `songplays`.
pub const DROP_TABLE_QUERIES: [&str; 5] = [
  USER_TABLE_DROP,
  SONG_TABLE_DROP,
  ARTIST_TABLE_DROP,
  TIME_TABLE_DROP,
  SONGPLAY_TABLE_DROP,
];
