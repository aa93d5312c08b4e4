//! The `PresenceStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `presencia-store-sqlite`). Higher layers (`presencia-api`,
//! `presencia-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  event::{Event, NewEvent},
  person::Person,
};

/// Abstraction over a presence store backend.
///
/// People are write-once; events are append-only. The trait exposes no
/// update or delete operations because the workflow has none.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PresenceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Persist a new person. Fails if the id is already registered.
  fn add_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a person by national identifier. Returns `None` if not found.
  fn get_person<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// List all registered people.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Events — append-only writes ───────────────────────────────────────

  /// Record a new event and return the persisted [`Event`].
  /// The `recorded_at` timestamp is set by the store.
  fn record_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Return every recorded event in storage order.
  fn list_events(
    &self,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Return the events whose `recorded_at` falls on the given UTC calendar
  /// date.
  fn list_events_on(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  // ── Liveness ──────────────────────────────────────────────────────────

  /// Run a trivial query to confirm the backend is reachable.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
