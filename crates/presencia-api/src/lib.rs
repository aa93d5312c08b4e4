//! JSON REST API for the presencia check-in backend.
//!
//! Exposes an axum [`Router`] backed by any
//! [`presencia_core::store::PresenceStore`]. CORS, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", presencia_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod events;
pub mod people;
mod validate;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use presencia_core::store::PresenceStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PresenceStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // People
    .route("/people", get(people::list::<S>).post(people::register::<S>))
    .route("/people/verify", post(people::verify::<S>))
    .route("/people/{id}", get(people::get_one::<S>))
    // Events
    .route("/events", get(events::list::<S>).post(events::record::<S>))
    .route("/events/by-date", get(events::list_by_date::<S>))
    .with_state(store)
}
