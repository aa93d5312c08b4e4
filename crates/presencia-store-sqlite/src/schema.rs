//! SQL schema for the presencia SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    id    TEXT PRIMARY KEY,  -- national identifier (cédula)
    name  TEXT NOT NULL
);

-- The presence log is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table, and rows carry no
-- surfaced identifier; callers observe events only by listing.
CREATE TABLE IF NOT EXISTS events (
    person_id      TEXT NOT NULL REFERENCES people(id),
    person_name    TEXT NOT NULL,   -- name snapshot at recording time
    direction      TEXT NOT NULL,   -- free-form, 'entrada' | 'salida' by convention
    place          TEXT NOT NULL,
    latitude       REAL NOT NULL,
    longitude      REAL NOT NULL,
    origin_address TEXT NOT NULL,   -- peer address as seen by the server
    recorded_at    TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS events_person_idx   ON events(person_id);
CREATE INDEX IF NOT EXISTS events_recorded_idx ON events(recorded_at);

PRAGMA user_version = 1;
";
