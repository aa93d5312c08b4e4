//! HTTP server for the presencia check-in backend.
//!
//! Assembles the JSON API router behind CORS and request tracing, and adds
//! the service banner and health endpoints. The binary in `main.rs` wires
//! this to a SQLite store and a TCP listener.

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::State,
  http::{HeaderValue, Method, StatusCode, header},
  response::{IntoResponse, Response},
  routing::get,
};
use chrono::Utc;
use presencia_core::store::PresenceStore;
use serde::Deserialize;
use serde_json::json;
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// Origins accepted by the CORS layer. Empty means every origin.
  #[serde(default)]
  pub cors_origins: Vec<String>,
}

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("presencia.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         default_host(),
      port:         default_port(),
      store_path:   default_store_path(),
      cors_origins: Vec::new(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: banner, health, and the `/api` nest,
/// wrapped in request tracing and CORS.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: PresenceStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/", get(banner))
    .route("/health", get(health::<S>))
    .with_state(store.clone())
    .nest("/api", presencia_api::api_router(store))
    .layer(TraceLayer::new_for_http())
    .layer(cors_layer(&config.cors_origins))
}

/// Build the CORS layer from the configured origin allow-list.
fn cors_layer(origins: &[String]) -> CorsLayer {
  if origins.is_empty() {
    return CorsLayer::permissive();
  }

  let list: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|origin| match origin.parse() {
      Ok(value) => Some(value),
      Err(_) => {
        tracing::warn!(%origin, "ignoring unparseable CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(list))
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// ─── Plumbing handlers ────────────────────────────────────────────────────────

/// `GET /` — service banner.
async fn banner() -> Json<serde_json::Value> {
  Json(json!({
    "service": "presencia",
    "version": env!("CARGO_PKG_VERSION"),
    "status":  "ok",
  }))
}

/// `GET /health` — run a trivial query through the store and report.
async fn health<S>(State(store): State<Arc<S>>) -> Response
where
  S: PresenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match store.ping().await {
    Ok(()) => (
      StatusCode::OK,
      Json(json!({
        "status":    "healthy",
        "database":  "connected",
        "timestamp": Utc::now().to_rfc3339(),
      })),
    )
      .into_response(),
    Err(e) => {
      tracing::error!(error = %e, "health check failed");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
          "status":    "unhealthy",
          "database":  "disconnected",
          "timestamp": Utc::now().to_rfc3339(),
        })),
      )
        .into_response()
    }
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use std::net::SocketAddr;

  use axum::{body::Body, extract::ConnectInfo, http::Request};
  use presencia_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  const PEER: ([u8; 4], u16) = ([127, 0, 0, 1], 54321);

  async fn test_app() -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    router(store, &ServerConfig::default())
  }

  /// Fire a single request and return status plus parsed JSON body.
  async fn oneshot_json(
    app:    Router,
    method: &str,
    uri:    &str,
    body:   Option<serde_json::Value>,
  ) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
      .method(method)
      .uri(uri)
      .extension(ConnectInfo(SocketAddr::from(PEER)));
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      serde_json::Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn register(app: &Router, id: &str, name: &str) {
    let (status, body) = oneshot_json(
      app.clone(),
      "POST",
      "/api/people",
      Some(json!({ "id": id, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
  }

  // ── Plumbing ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn banner_reports_service_metadata() {
    let app = test_app().await;
    let (status, body) = oneshot_json(app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], json!("presencia"));
    assert_eq!(body["status"], json!("ok"));
  }

  #[tokio::test]
  async fn health_reports_connected_store() {
    let app = test_app().await;
    let (status, body) = oneshot_json(app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["database"], json!("connected"));
  }

  // ── Check-in workflow ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_verify_record_list_roundtrip() {
    let app = test_app().await;
    register(&app, "123", "Ana").await;

    let (status, body) = oneshot_json(
      app.clone(),
      "POST",
      "/api/people/verify",
      Some(json!({ "id": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "found": true, "id": "123" }));

    let (status, body) = oneshot_json(
      app.clone(),
      "POST",
      "/api/events",
      Some(json!({
        "id":        "123",
        "direction": "entrada",
        "place":     "Oficina Central",
        "latitude":  4.6097,
        "longitude": -74.0817,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = oneshot_json(app, "GET", "/api/events", None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["person_id"], json!("123"));
    assert_eq!(events[0]["person_name"], json!("Ana"));
    assert_eq!(events[0]["direction"], json!("entrada"));
    assert_eq!(events[0]["place"], json!("Oficina Central"));
    assert_eq!(events[0]["origin_address"], json!("127.0.0.1:54321"));
  }

  #[tokio::test]
  async fn record_for_unregistered_id_returns_404_and_writes_nothing() {
    let app = test_app().await;

    let (status, body) = oneshot_json(
      app.clone(),
      "POST",
      "/api/events",
      Some(json!({
        "id":        "999",
        "direction": "entrada",
        "place":     "Oficina Central",
        "latitude":  4.6097,
        "longitude": -74.0817,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));

    let (_, body) = oneshot_json(app, "GET", "/api/events", None).await;
    assert!(body.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn record_with_missing_field_returns_400_and_writes_nothing() {
    let app = test_app().await;
    register(&app, "123", "Ana").await;

    // `place` omitted.
    let (status, body) = oneshot_json(
      app.clone(),
      "POST",
      "/api/events",
      Some(json!({
        "id":        "123",
        "direction": "entrada",
        "latitude":  4.6097,
        "longitude": -74.0817,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("place"));

    let (_, body) = oneshot_json(app, "GET", "/api/events", None).await;
    assert!(body.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn record_rejects_blank_direction() {
    let app = test_app().await;
    register(&app, "123", "Ana").await;

    let (status, body) = oneshot_json(
      app,
      "POST",
      "/api/events",
      Some(json!({
        "id":        "123",
        "direction": "   ",
        "place":     "Oficina Central",
        "latitude":  4.6097,
        "longitude": -74.0817,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("direction"));
  }

  // ── Verify ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn verify_unknown_id_reports_found_false() {
    let app = test_app().await;

    let (status, body) = oneshot_json(
      app.clone(),
      "POST",
      "/api/people/verify",
      Some(json!({ "id": "999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "found": false }));

    // Same answer when asked again.
    let (status, body) = oneshot_json(
      app,
      "POST",
      "/api/people/verify",
      Some(json!({ "id": "999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "found": false }));
  }

  #[tokio::test]
  async fn verify_without_id_returns_400() {
    let app = test_app().await;
    let (status, body) =
      oneshot_json(app, "POST", "/api/people/verify", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("id"));
  }

  // ── People ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_without_name_returns_400() {
    let app = test_app().await;
    let (status, body) =
      oneshot_json(app, "POST", "/api/people", Some(json!({ "id": "123" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
  }

  #[tokio::test]
  async fn register_duplicate_id_returns_500_with_error_payload() {
    let app = test_app().await;
    register(&app, "123", "Ana").await;

    let (status, body) = oneshot_json(
      app,
      "POST",
      "/api/people",
      Some(json!({ "id": "123", "name": "Ana María" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn get_person_returns_404_when_unknown() {
    let app = test_app().await;
    let (status, body) =
      oneshot_json(app, "GET", "/api/people/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn list_people_returns_registered() {
    let app = test_app().await;
    register(&app, "123", "Ana").await;
    register(&app, "456", "Luis").await;

    let (status, body) = oneshot_json(app, "GET", "/api/people", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
  }

  // ── Date filtering ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn by_date_returns_only_matching_day() {
    let app = test_app().await;
    register(&app, "123", "Ana").await;

    oneshot_json(
      app.clone(),
      "POST",
      "/api/events",
      Some(json!({
        "id":        "123",
        "direction": "entrada",
        "place":     "Oficina Central",
        "latitude":  4.6097,
        "longitude": -74.0817,
      })),
    )
    .await;

    // Read back the recorded date, then filter on it.
    let (_, body) = oneshot_json(app.clone(), "GET", "/api/events", None).await;
    let recorded_at = body[0]["recorded_at"].as_str().unwrap();
    let day = chrono::DateTime::parse_from_rfc3339(recorded_at)
      .unwrap()
      .date_naive();

    let (status, body) = oneshot_json(
      app.clone(),
      "GET",
      &format!("/api/events/by-date?date={day}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) =
      oneshot_json(app, "GET", "/api/events/by-date?date=1999-01-01", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn by_date_rejects_missing_and_malformed_dates() {
    let app = test_app().await;

    let (status, body) =
      oneshot_json(app.clone(), "GET", "/api/events/by-date", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("date"));

    let (status, body) =
      oneshot_json(app, "GET", "/api/events/by-date?date=not-a-date", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not-a-date"));
  }

  // ── CORS ────────────────────────────────────────────────────────────────────

  async fn preflight(app: Router, origin: &str) -> Response {
    let req = Request::builder()
      .method("OPTIONS")
      .uri("/api/events")
      .header(header::ORIGIN, origin)
      .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
      .extension(ConnectInfo(SocketAddr::from(PEER)))
      .body(Body::empty())
      .unwrap();
    app.oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn cors_defaults_to_permissive() {
    let app = test_app().await;
    let resp = preflight(app, "http://localhost:5173").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
      resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
  }

  #[tokio::test]
  async fn cors_allow_list_limits_origins() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let config = ServerConfig {
      cors_origins: vec!["http://allowed.example".to_string()],
      ..ServerConfig::default()
    };
    let app = router(store, &config);

    let resp = preflight(app.clone(), "http://allowed.example").await;
    let allowed = resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN);
    assert_eq!(allowed.unwrap().to_str().unwrap(), "http://allowed.example");

    let resp = preflight(app, "http://other.example").await;
    assert!(
      resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none()
    );
  }
}
