//! Handlers for the derived views: daily goal and daily progress.
//!
//! Neither endpoint reads anything precomputed — the goal is recomputed from
//! the stored profile on every request, and progress from the day's logs.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use waterlog_core::{
  goal::{DailyProgress, daily_goal_ml},
  log::LogWindow,
  store::HydrationStore,
};

use crate::error::ApiError;

// ─── Daily goal ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GoalResponse {
  pub user_id: Uuid,
  pub goal_ml: f64,
}

/// `GET /users/:id/goal`
pub async fn daily<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GoalResponse>, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  let goal_ml = daily_goal_ml(user.weight_kg, user.activity, user.climate)?;
  Ok(Json(GoalResponse { user_id: id, goal_ml }))
}

// ─── Daily progress ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProgressParams {
  /// Calendar day (UTC), `YYYY-MM-DD`. Defaults to today.
  pub date: Option<NaiveDate>,
}

/// `GET /users/:id/progress[?date=YYYY-MM-DD]`
pub async fn progress<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ProgressParams>,
) -> Result<Json<DailyProgress>, ApiError>
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  let day = params.date.unwrap_or_else(|| Utc::now().date_naive());
  let start = day.and_time(NaiveTime::MIN).and_utc();
  let end = start + Duration::days(1) - Duration::nanoseconds(1);

  let logs = store
    .list_logs(id, &LogWindow { from: Some(start), to: Some(end) })
    .await
    .map_err(ApiError::from_store)?;

  let progress = DailyProgress::compute(&user, &logs, day)?;
  Ok(Json(progress))
}
