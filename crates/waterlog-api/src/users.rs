//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users` | Optional `?name=`, `?limit=`, `?offset=` |
//! | `POST`   | `/users` | Body: [`CreateBody`]; returns 201 + user |
//! | `GET`    | `/users/:id` | 404 if not found |
//! | `PUT`    | `/users/:id` | Partial update; 422 if no field present |
//! | `DELETE` | `/users/:id` | Cascades the user's logs; returns 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use waterlog_core::{
  store::{HydrationStore, UserQuery},
  user::{ActivityLevel, Climate, NewUser, User, UserUpdate},
};

use crate::error::ApiError;

/// Shared weight check for create and update bodies.
fn validate_weight(weight_kg: f64) -> Result<(), ApiError> {
  if !weight_kg.is_finite() || weight_kg <= 0.0 {
    return Err(ApiError::Validation {
      field:   "weight_kg",
      message: "weight must be a positive number".into(),
    });
  }
  Ok(())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
  if name.trim().is_empty() {
    return Err(ApiError::Validation {
      field:   "name",
      message: "name must not be empty".into(),
    });
  }
  Ok(())
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Case-insensitive substring filter.
  pub name:   Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /users[?name=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = UserQuery {
    name_contains: params.name,
    limit:         params.limit,
    offset:        params.offset,
  };
  let users = store
    .list_users(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(users))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:      String,
  pub weight_kg: f64,
  pub activity:  ActivityLevel,
  pub climate:   Climate,
}

/// `POST /users` — body: `{"name":"Ada","weight_kg":62.0,"activity":"medium","climate":"hot"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  validate_name(&body.name)?;
  validate_weight(body.weight_kg)?;

  let user = store
    .create_user(NewUser {
      name:      body.name,
      weight_kg: body.weight_kg,
      activity:  body.activity,
      climate:   body.climate,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /users/:id` — body is a [`UserUpdate`]; omitted fields keep their
/// stored values.
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(update): Json<UserUpdate>,
) -> Result<Json<User>, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if update.is_empty() {
    return Err(ApiError::Validation {
      field:   "body",
      message: "no updatable fields present".into(),
    });
  }
  if let Some(name) = &update.name {
    validate_name(name)?;
  }
  if let Some(weight_kg) = update.weight_kg {
    validate_weight(weight_kg)?;
  }

  let user = store
    .update_user(id, update)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(user))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/:id` — removes the user and every log they own.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .delete_user(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
