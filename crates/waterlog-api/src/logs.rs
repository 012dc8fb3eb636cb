//! Handlers for hydration-log endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users/:id/logs` | Optional `?from=` / `?to=` (RFC 3339, closed range) |
//! | `POST`   | `/users/:id/logs` | Body: [`CreateBody`]; returns 201 + log |
//! | `DELETE` | `/logs/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use waterlog_core::{
  log::{HydrationLog, LogWindow, NewLog},
  store::HydrationStore,
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub from: Option<DateTime<Utc>>,
  pub to:   Option<DateTime<Utc>>,
}

/// `GET /users/:id/logs[?from=...][&to=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<HydrationLog>>, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if let (Some(from), Some(to)) = (params.from, params.to)
    && from > to
  {
    return Err(ApiError::Validation {
      field:   "from",
      message: "window start must not be after window end".into(),
    });
  }

  let window = LogWindow { from: params.from, to: params.to };
  let logs = store
    .list_logs(user_id, &window)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(logs))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub volume_ml: f64,
  /// Defaults to now when omitted.
  pub logged_at: Option<DateTime<Utc>>,
}

/// `POST /users/:id/logs` — body: `{"volume_ml":250.0}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !body.volume_ml.is_finite() || body.volume_ml <= 0.0 {
    return Err(ApiError::Validation {
      field:   "volume_ml",
      message: "volume must be a positive number".into(),
    });
  }

  let log = store
    .record_log(NewLog {
      user_id,
      volume_ml: body.volume_ml,
      logged_at: body.logged_at,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(log)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /logs/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store.delete_log(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
