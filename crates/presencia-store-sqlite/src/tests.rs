//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use presencia_core::{event::NewEvent, person::Person, store::PresenceStore};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ana() -> Person {
  Person { id: "1032456789".into(), name: "Ana".into() }
}

fn checkin(person: &Person, direction: &str) -> NewEvent {
  NewEvent {
    person_id:      person.id.clone(),
    person_name:    person.name.clone(),
    direction:      direction.into(),
    place:          "Oficina Central".into(),
    latitude:       4.6097,
    longitude:      -74.0817,
    origin_address: "127.0.0.1:55443".into(),
  }
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;
  s.add_person(ana()).await.unwrap();

  let fetched = s.get_person("1032456789").await.unwrap();
  assert!(fetched.is_some());
  let fetched = fetched.unwrap();
  assert_eq!(fetched.id, "1032456789");
  assert_eq!(fetched.name, "Ana");
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  let result = s.get_person("999").await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn add_person_duplicate_id_errors() {
  let s = store().await;
  s.add_person(ana()).await.unwrap();

  let err = s
    .add_person(Person { id: "1032456789".into(), name: "Ana María".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));

  // The original row is untouched.
  let fetched = s.get_person("1032456789").await.unwrap().unwrap();
  assert_eq!(fetched.name, "Ana");
}

#[tokio::test]
async fn list_people_all() {
  let s = store().await;
  s.add_person(ana()).await.unwrap();
  s.add_person(Person { id: "80123456".into(), name: "Luis".into() })
    .await
    .unwrap();

  let all = s.list_people().await.unwrap();
  assert_eq!(all.len(), 2);
}

// ─── Event recording ─────────────────────────────────────────────────────────

#[tokio::test]
async fn record_event_and_list() {
  let s = store().await;
  let person = ana();
  s.add_person(person.clone()).await.unwrap();

  let before = chrono::Utc::now();
  let event = s.record_event(checkin(&person, "entrada")).await.unwrap();
  let after = chrono::Utc::now();

  assert_eq!(event.person_id, person.id);
  assert_eq!(event.person_name, "Ana");
  assert!(event.recorded_at >= before && event.recorded_at <= after);

  let events = s.list_events().await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].person_id, person.id);
  assert_eq!(events[0].person_name, "Ana");
  assert_eq!(events[0].direction, "entrada");
  assert_eq!(events[0].place, "Oficina Central");
  assert_eq!(events[0].latitude, 4.6097);
  assert_eq!(events[0].longitude, -74.0817);
  assert_eq!(events[0].origin_address, "127.0.0.1:55443");
}

#[tokio::test]
async fn recorded_at_roundtrips_through_storage() {
  let s = store().await;
  let person = ana();
  s.add_person(person.clone()).await.unwrap();

  let event = s.record_event(checkin(&person, "salida")).await.unwrap();

  let events = s.list_events().await.unwrap();
  assert_eq!(events[0].recorded_at, event.recorded_at);
}

#[tokio::test]
async fn record_event_unknown_person_errors() {
  let s = store().await;

  let err = s
    .record_event(NewEvent {
      person_id:      "999".into(),
      person_name:    "Nadie".into(),
      direction:      "entrada".into(),
      place:          "Oficina Central".into(),
      latitude:       4.6097,
      longitude:      -74.0817,
      origin_address: "127.0.0.1:55443".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));

  // Nothing was written.
  let events = s.list_events().await.unwrap();
  assert!(events.is_empty());
}

#[tokio::test]
async fn list_events_keeps_insertion_order() {
  let s = store().await;
  let person = ana();
  s.add_person(person.clone()).await.unwrap();

  s.record_event(checkin(&person, "entrada")).await.unwrap();
  s.record_event(checkin(&person, "salida")).await.unwrap();
  s.record_event(checkin(&person, "entrada")).await.unwrap();

  let events = s.list_events().await.unwrap();
  let directions: Vec<_> =
    events.iter().map(|e| e.direction.as_str()).collect();
  assert_eq!(directions, ["entrada", "salida", "entrada"]);
}

// ─── Date filtering ──────────────────────────────────────────────────────────

#[tokio::test]
async fn list_events_on_matches_recording_date() {
  let s = store().await;
  let person = ana();
  s.add_person(person.clone()).await.unwrap();

  let event = s.record_event(checkin(&person, "entrada")).await.unwrap();
  let today = event.recorded_at.date_naive();

  let todays = s.list_events_on(today).await.unwrap();
  assert_eq!(todays.len(), 1);
  assert_eq!(todays[0].person_id, person.id);
}

#[tokio::test]
async fn list_events_on_other_date_is_empty() {
  let s = store().await;
  let person = ana();
  s.add_person(person.clone()).await.unwrap();
  s.record_event(checkin(&person, "entrada")).await.unwrap();

  let other = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap();
  let events = s.list_events_on(other).await.unwrap();
  assert!(events.is_empty());
}

#[tokio::test]
async fn list_events_on_empty_store_is_empty() {
  let s = store().await;
  let today = chrono::Utc::now().date_naive();
  let events = s.list_events_on(today).await.unwrap();
  assert!(events.is_empty());
}

// ─── Liveness ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ping_succeeds_on_open_store() {
  let s = store().await;
  s.ping().await.unwrap();
}
