//! Handlers for `/people` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/people` | All registered people |
//! | `POST` | `/people` | Body: `{"id":"...","name":"..."}` |
//! | `POST` | `/people/verify` | 404 + `{"found":false}` when unknown |
//! | `GET`  | `/people/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use presencia_core::{person::Person, store::PresenceStore};
use serde::Deserialize;
use serde_json::json;

use crate::{error::ApiError, validate::required_text};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /people`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PresenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let people = store
    .list_people()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(people))
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub id:   Option<String>,
  pub name: Option<String>,
}

/// `POST /people` — body: `{"id":"1032456789","name":"Ana"}`.
///
/// A duplicate id surfaces as a storage failure, not a dedicated conflict
/// branch; the directory's PRIMARY KEY is the source of truth.
pub async fn register<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PresenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = Person {
    id:   required_text(body.id, "id")?,
    name: required_text(body.name, "name")?,
  };

  store
    .add_person(person.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(id = %person.id, "person registered");
  Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

// ─── Verify ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub id: Option<String>,
}

/// `POST /people/verify` — body: `{"id":"..."}`.
///
/// An unknown id is an expected outcome of this endpoint, so the 404 carries
/// `{"found": false}` rather than an error payload.
pub async fn verify<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<VerifyBody>,
) -> Result<Response, ApiError>
where
  S: PresenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = required_text(body.id, "id")?;

  let person = store
    .get_person(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let response = match person {
    Some(p) => (StatusCode::OK, Json(json!({ "found": true, "id": p.id }))),
    None => (StatusCode::NOT_FOUND, Json(json!({ "found": false }))),
  };
  Ok(response.into_response())
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Person>, ApiError>
where
  S: PresenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = store
    .get_person(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}
