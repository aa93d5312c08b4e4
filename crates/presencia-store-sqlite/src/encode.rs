//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings in UTC. Coordinates map to
//! SQLite REALs and need no translation.

use chrono::{DateTime, Utc};
use presencia_core::event::Event;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub person_id:      String,
  pub person_name:    String,
  pub direction:      String,
  pub place:          String,
  pub latitude:       f64,
  pub longitude:      f64,
  pub origin_address: String,
  pub recorded_at:    String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      person_id:      self.person_id,
      person_name:    self.person_name,
      direction:      self.direction,
      place:          self.place,
      latitude:       self.latitude,
      longitude:      self.longitude,
      origin_address: self.origin_address,
      recorded_at:    decode_dt(&self.recorded_at)?,
    })
  }
}
