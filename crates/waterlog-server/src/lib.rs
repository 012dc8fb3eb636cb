//! HTTP server assembly for Waterlog.
//!
//! Mounts the JSON API under `/api`, the server-rendered pages under `/app`,
//! and a liveness endpoint at `/healthz`, backed by any
//! [`HydrationStore`].

pub mod pages;
pub mod ratelimit;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
  routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use waterlog_core::store::HydrationStore;

use ratelimit::RateLimiter;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` merged with
/// `WATERLOG_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  #[serde(default = "default_store_path")]
  pub store_path:            PathBuf,
  #[serde(default)]
  pub rate_limit_enabled:    bool,
  #[serde(default = "default_rate_limit")]
  pub rate_limit_per_minute: u32,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("waterlog.db") }
fn default_rate_limit() -> u32 { 60 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  default_host(),
      port:                  default_port(),
      store_path:            default_store_path(),
      rate_limit_enabled:    false,
      rate_limit_per_minute: default_rate_limit(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: HydrationStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: HydrationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let app = Router::new()
    .route("/healthz", get(healthz::<S>))
    .with_state(state.clone())
    .nest("/api", waterlog_api::api_router(state.store.clone()))
    .nest("/app", pages::router(state.clone()));

  let app = if state.config.rate_limit_enabled {
    let limiter = Arc::new(RateLimiter::new(state.config.rate_limit_per_minute));
    app.layer(axum::middleware::from_fn_with_state(limiter, ratelimit::limit))
  } else {
    app
  };

  app.layer(TraceLayer::new_for_http())
}

// ─── Health ───────────────────────────────────────────────────────────────────

/// `GET /healthz` — 200 when the process and its database are reachable.
async fn healthz<S>(State(state): State<AppState<S>>) -> impl IntoResponse
where
  S: HydrationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match state.store.ping().await {
    Ok(()) => (StatusCode::OK, "ok"),
    Err(e) => {
      tracing::error!(error = %e, "health check failed");
      (StatusCode::SERVICE_UNAVAILABLE, "database unreachable")
    }
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use waterlog_store_sqlite::SqliteStore;

  use super::*;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig::default()),
    }
  }

  async fn send(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  fn ada() -> Value {
    json!({
      "name": "Ada",
      "weight_kg": 70.0,
      "activity": "medium",
      "climate": "hot",
    })
  }

  async fn create_user(state: &AppState<SqliteStore>, body: Value) -> Value {
    let (status, user) =
      send(state.clone(), "POST", "/api/users", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    user
  }

  // ── Users ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_get_user_roundtrip() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    let (status, fetched) =
      send(state, "GET", &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Ada");
    assert_eq!(fetched["weight_kg"], 70.0);
    assert_eq!(fetched["activity"], "medium");
    assert_eq!(fetched["climate"], "hot");
    assert_eq!(fetched["created_at"], created["created_at"]);
  }

  #[tokio::test]
  async fn create_user_rejects_nonpositive_weight() {
    let state = make_state().await;
    let mut body = ada();
    body["weight_kg"] = json!(-4.0);

    let (status, err) = send(state, "POST", "/api/users", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["field"], "weight_kg");
  }

  #[tokio::test]
  async fn create_user_rejects_unknown_enum_value() {
    let state = make_state().await;
    let mut body = ada();
    body["activity"] = json!("extreme");

    let (status, _) = send(state, "POST", "/api/users", Some(body)).await;
    assert!(status.is_client_error(), "status: {status}");
  }

  #[tokio::test]
  async fn get_missing_user_returns_404() {
    let state = make_state().await;
    let (status, _) = send(
      state,
      "GET",
      &format!("/api/users/{}", uuid::Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn update_user_with_empty_body_is_rejected() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    let (status, err) =
      send(state, "PUT", &format!("/api/users/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["field"], "body");
  }

  #[tokio::test]
  async fn update_user_changes_goal() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    let (status, _) = send(
      state.clone(),
      "PUT",
      &format!("/api/users/{id}"),
      Some(json!({ "climate": "temperate" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, goal) =
      send(state, "GET", &format!("/api/users/{id}/goal"), None).await;
    // 70 kg at medium activity in a temperate climate.
    assert_eq!(goal["goal_ml"], 70.0 * 35.0 * 1.15);
  }

  // ── Goal ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn goal_endpoint_applies_formula() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    let (status, goal) =
      send(state, "GET", &format!("/api/users/{id}/goal"), None).await;
    assert_eq!(status, StatusCode::OK);
    let goal_ml = goal["goal_ml"].as_f64().unwrap();
    assert!((goal_ml - 70.0 * 35.0 * 1.15 * 1.2).abs() < 1e-9);
  }

  // ── Logs ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn log_intake_and_list_in_window() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    for (at, volume) in [
      ("2024-06-01T07:00:00Z", 150.0),
      ("2024-06-01T08:00:00Z", 200.0),
      ("2024-06-01T12:30:00Z", 300.0),
      ("2024-06-01T19:59:00Z", 500.0),
    ] {
      let (status, _) = send(
        state.clone(),
        "POST",
        &format!("/api/users/{id}/logs"),
        Some(json!({ "volume_ml": volume, "logged_at": at })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, logs) = send(
      state,
      "GET",
      &format!(
        "/api/users/{id}/logs?from=2024-06-01T08:00:00Z&to=2024-06-01T20:00:00Z"
      ),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 3);
    let total: f64 = logs.iter().map(|l| l["volume_ml"].as_f64().unwrap()).sum();
    assert_eq!(total, 1000.0);
  }

  #[tokio::test]
  async fn log_for_missing_user_returns_404() {
    let state = make_state().await;
    let (status, _) = send(
      state,
      "POST",
      &format!("/api/users/{}/logs", uuid::Uuid::new_v4()),
      Some(json!({ "volume_ml": 250.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn log_rejects_nonpositive_volume() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    let (status, err) = send(
      state,
      "POST",
      &format!("/api/users/{id}/logs"),
      Some(json!({ "volume_ml": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["field"], "volume_ml");
  }

  #[tokio::test]
  async fn delete_log_then_404_on_repeat() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    let (_, log) = send(
      state.clone(),
      "POST",
      &format!("/api/users/{id}/logs"),
      Some(json!({ "volume_ml": 250.0 })),
    )
    .await;
    let log_id = log["log_id"].as_str().unwrap().to_owned();

    let (status, _) =
      send(state.clone(), "DELETE", &format!("/api/logs/{log_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
      send(state, "DELETE", &format!("/api/logs/{log_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Cascade ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_user_cascades_logs() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    for volume in [200.0, 300.0, 500.0] {
      send(
        state.clone(),
        "POST",
        &format!("/api/users/{id}/logs"),
        Some(json!({ "volume_ml": volume })),
      )
      .await;
    }

    let (status, _) =
      send(state.clone(), "DELETE", &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, logs) =
      send(state, "GET", &format!("/api/users/{id}/logs"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 0);
  }

  // ── Progress ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn progress_caps_percent_but_reports_raw_ratio() {
    let state = make_state().await;
    // 10 kg, low activity, temperate: 350 ml goal.
    let created = create_user(
      &state,
      json!({
        "name": "Mara",
        "weight_kg": 10.0,
        "activity": "low",
        "climate": "temperate",
      }),
    )
    .await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    send(
      state.clone(),
      "POST",
      &format!("/api/users/{id}/logs"),
      Some(json!({ "volume_ml": 700.0, "logged_at": "2024-06-01T09:00:00Z" })),
    )
    .await;

    let (status, progress) = send(
      state,
      "GET",
      &format!("/api/users/{id}/progress?date=2024-06-01"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["goal_ml"], 350.0);
    assert_eq!(progress["consumed_ml"], 700.0);
    assert_eq!(progress["ratio"], 2.0);
    assert_eq!(progress["percent"], 100.0);
    assert_eq!(progress["goal_reached"], true);
  }

  // ── Health ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn healthz_returns_ok() {
    let state = make_state().await;
    let resp = router(state)
      .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  // ── Pages ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn index_page_renders_profiles_and_form() {
    let state = make_state().await;
    create_user(&state, ada()).await;

    let resp = router(state)
      .oneshot(Request::builder().uri("/app/").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let html = std::str::from_utf8(&bytes).unwrap();
    assert!(html.contains("Ada"), "body: {html}");
    assert!(html.contains("<form"), "body: {html}");
  }

  #[tokio::test]
  async fn profile_page_shows_goal() {
    let state = make_state().await;
    let created = create_user(&state, ada()).await;
    let id = created["user_id"].as_str().unwrap().to_owned();

    let resp = router(state)
      .oneshot(
        Request::builder()
          .uri(format!("/app/users/{id}"))
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let html = std::str::from_utf8(&bytes).unwrap();
    // 70 * 35 * 1.15 * 1.2 = 3381 ml.
    assert!(html.contains("3381"), "body: {html}");
  }

  // ── Rate limiting ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn rate_limit_rejects_over_limit_requests() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        rate_limit_enabled: true,
        rate_limit_per_minute: 2,
        ..Default::default()
      }),
    };
    let app = router(state);

    for _ in 0..2 {
      let resp = app
        .clone()
        .oneshot(
          Request::builder().uri("/api/users").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
      assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
      .clone()
      .oneshot(
        Request::builder().uri("/api/users").body(Body::empty()).unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "60");

    // Excluded paths stay reachable.
    let resp = app
      .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
