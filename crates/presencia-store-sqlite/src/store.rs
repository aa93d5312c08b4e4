//! [`SqliteStore`] — the SQLite implementation of [`PresenceStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use presencia_core::{
  event::{Event, NewEvent},
  person::Person,
  store::PresenceStore,
};

use crate::{
  encode::{RawEvent, encode_dt},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A presence store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PresenceStore impl ──────────────────────────────────────────────────────

impl PresenceStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn add_person(&self, person: Person) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (id, name) VALUES (?1, ?2)",
          rusqlite::params![person.id, person.name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_person(&self, id: &str) -> Result<Option<Person>> {
    let id = id.to_owned();

    let person: Option<Person> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name FROM people WHERE id = ?1",
              rusqlite::params![id],
              |row| Ok(Person { id: row.get(0)?, name: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(person)
  }

  async fn list_people(&self) -> Result<Vec<Person>> {
    let people: Vec<Person> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM people")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Person { id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(people)
  }

  // ── Events — append-only writes ───────────────────────────────────────────

  async fn record_event(&self, input: NewEvent) -> Result<Event> {
    let event = Event {
      person_id:      input.person_id,
      person_name:    input.person_name,
      direction:      input.direction,
      place:          input.place,
      latitude:       input.latitude,
      longitude:      input.longitude,
      origin_address: input.origin_address,
      recorded_at:    Utc::now(),
    };

    let row = event.clone();
    let recorded_at_str = encode_dt(event.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             person_id, person_name, direction, place,
             latitude, longitude, origin_address, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.person_id,
            row.person_name,
            row.direction,
            row.place,
            row.latitude,
            row.longitude,
            row.origin_address,
            recorded_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_events(&self) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT person_id, person_name, direction, place,
                  latitude, longitude, origin_address, recorded_at
           FROM events",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawEvent {
              person_id:      row.get(0)?,
              person_name:    row.get(1)?,
              direction:      row.get(2)?,
              place:          row.get(3)?,
              latitude:       row.get(4)?,
              longitude:      row.get(5)?,
              origin_address: row.get(6)?,
              recorded_at:    row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn list_events_on(&self, date: NaiveDate) -> Result<Vec<Event>> {
    let date_str = date.format("%Y-%m-%d").to_string();

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT person_id, person_name, direction, place,
                  latitude, longitude, origin_address, recorded_at
           FROM events
           WHERE date(recorded_at) = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], |row| {
            Ok(RawEvent {
              person_id:      row.get(0)?,
              person_name:    row.get(1)?,
              direction:      row.get(2)?,
              place:          row.get(3)?,
              latitude:       row.get(4)?,
              longitude:      row.get(5)?,
              origin_address: row.get(6)?,
              recorded_at:    row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  // ── Liveness ──────────────────────────────────────────────────────────────

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
