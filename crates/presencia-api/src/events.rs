//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Every event, storage order |
//! | `POST` | `/events` | Body: [`RecordBody`]; peer address captured server-side |
//! | `GET`  | `/events/by-date` | `?date=YYYY-MM-DD` required |

use std::{net::SocketAddr, sync::Arc};

use axum::{
  Json,
  extract::{ConnectInfo, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use presencia_core::{
  event::{Event, NewEvent},
  store::PresenceStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  error::ApiError,
  validate::{required, required_text},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /events`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  S: PresenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let events = store
    .list_events()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(events))
}

// ─── Record ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /events`.
///
/// Every field deserialises as optional so absence surfaces as a 400 naming
/// the field instead of a rejected body.
#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub id:        Option<String>,
  pub direction: Option<String>,
  pub place:     Option<String>,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

/// `POST /events` — validate, resolve the person, then record.
///
/// Unknown ids fail with 404 before anything is written. The event carries a
/// snapshot of the person's name and the peer address of the caller; the
/// timestamp is assigned by the store. Nothing about the stored event is
/// returned.
pub async fn record<S>(
  State(store): State<Arc<S>>,
  ConnectInfo(peer): ConnectInfo<SocketAddr>,
  Json(body): Json<RecordBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PresenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id        = required_text(body.id, "id")?;
  let direction = required_text(body.direction, "direction")?;
  let place     = required_text(body.place, "place")?;
  let latitude  = required(body.latitude, "latitude")?;
  let longitude = required(body.longitude, "longitude")?;

  let person = store
    .get_person(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      tracing::warn!(%id, "check-in attempt for unregistered id");
      ApiError::NotFound(format!("person {id} not found"))
    })?;

  let event = NewEvent {
    person_id: person.id,
    person_name: person.name,
    direction,
    place,
    latitude,
    longitude,
    origin_address: peer.to_string(),
  };

  store
    .record_event(event)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

// ─── List by date ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ByDateParams {
  pub date: Option<String>,
}

/// `GET /events/by-date?date=YYYY-MM-DD`
///
/// Missing or malformed dates are rejected before the store is touched. A
/// date with no events yields an empty array.
pub async fn list_by_date<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ByDateParams>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  S: PresenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let raw = required_text(params.date, "date")?;
  let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
    ApiError::BadRequest(format!("invalid date: {raw:?}, expected YYYY-MM-DD"))
  })?;

  let events = store
    .list_events_on(date)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(events))
}
