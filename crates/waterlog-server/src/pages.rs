//! Server-rendered pages under `/app`.
//!
//! Purely presentational: every number shown here comes from the same store
//! and domain calls the JSON API uses. The pages only render.

use std::collections::BTreeMap;

use axum::{
  Form, Router,
  extract::{Path, State},
  http::StatusCode,
  response::{Html, IntoResponse, Redirect, Response},
  routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use waterlog_core::{
  goal::DailyProgress,
  log::{LogWindow, NewLog},
  store::{HydrationStore, UserQuery},
  user::{ActivityLevel, Climate, NewUser},
};

use crate::AppState;

pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: HydrationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/", get(index::<S>))
    .route("/users", post(create_profile::<S>))
    .route("/users/{id}", get(profile::<S>))
    .route("/users/{id}/logs", post(log_intake::<S>))
    .with_state(state)
}

// ─── Rendering helpers ───────────────────────────────────────────────────────

fn escape(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
  format!(
    "<!doctype html>\n<html><head><meta charset=\"utf-8\">\
     <title>{title} — Waterlog</title>\
     <style>\
       body{{font-family:sans-serif;max-width:42rem;margin:2rem auto;padding:0 1rem}}\
       table{{border-collapse:collapse;width:100%}}\
       td,th{{border:1px solid #ccc;padding:.3rem .6rem;text-align:left}}\
       .bar{{background:#e3e9ef;height:1rem;border-radius:.5rem;overflow:hidden}}\
       .bar div{{background:#2a7ab0;height:100%}}\
       .error{{color:#a03030}}\
     </style></head>\
     <body><h1><a href=\"/app/\">Waterlog</a></h1>{body}</body></html>",
    title = escape(title),
  )
}

fn error_page(status: StatusCode, message: &str) -> Response {
  let body = format!(
    "<p class=\"error\">{}</p><p><a href=\"/app/\">Back</a></p>",
    escape(message)
  );
  (status, Html(layout("Error", &body))).into_response()
}

fn store_failure<E: std::error::Error>(e: E) -> Response {
  tracing::error!(error = %e, "storage failure");
  error_page(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
}

const PROFILE_FORM: &str = "\
<h2>New profile</h2>\
<form method=\"post\" action=\"/app/users\">\
  <p><label>Name <input name=\"name\" required></label></p>\
  <p><label>Weight (kg) <input name=\"weight_kg\" type=\"number\" step=\"0.1\" min=\"1\" required></label></p>\
  <p><label>Activity <select name=\"activity\">\
    <option value=\"low\">Low</option>\
    <option value=\"medium\" selected>Medium</option>\
    <option value=\"high\">High</option>\
  </select></label></p>\
  <p><label>Climate <select name=\"climate\">\
    <option value=\"temperate\" selected>Temperate</option>\
    <option value=\"hot\">Hot</option>\
    <option value=\"humid\">Humid</option>\
  </select></label></p>\
  <p><button type=\"submit\">Create</button></p>\
</form>";

// ─── Index ───────────────────────────────────────────────────────────────────

/// `GET /app/` — profile list plus the creation form.
async fn index<S>(State(state): State<AppState<S>>) -> Response
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let users = match state.store.list_users(&UserQuery::default()).await {
    Ok(users) => users,
    Err(e) => return store_failure(e),
  };

  let rows: String = users
    .iter()
    .map(|u| {
      format!(
        "<li><a href=\"/app/users/{}\">{}</a></li>",
        u.user_id,
        escape(&u.name)
      )
    })
    .collect();
  let list = if rows.is_empty() {
    "<p>No profiles yet.</p>".to_owned()
  } else {
    format!("<ul>{rows}</ul>")
  };

  Html(layout("Profiles", &format!("<h2>Profiles</h2>{list}{PROFILE_FORM}")))
    .into_response()
}

// ─── Create profile ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ProfileForm {
  name:      String,
  weight_kg: f64,
  activity:  ActivityLevel,
  climate:   Climate,
}

/// `POST /app/users`
async fn create_profile<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<ProfileForm>,
) -> Response
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if form.name.trim().is_empty() {
    return error_page(StatusCode::UNPROCESSABLE_ENTITY, "name must not be empty");
  }
  if !form.weight_kg.is_finite() || form.weight_kg <= 0.0 {
    return error_page(
      StatusCode::UNPROCESSABLE_ENTITY,
      "weight must be a positive number",
    );
  }

  match state
    .store
    .create_user(NewUser {
      name:      form.name,
      weight_kg: form.weight_kg,
      activity:  form.activity,
      climate:   form.climate,
    })
    .await
  {
    Ok(user) => {
      Redirect::to(&format!("/app/users/{}", user.user_id)).into_response()
    }
    Err(e) => store_failure(e),
  }
}

// ─── Profile detail ──────────────────────────────────────────────────────────

/// `GET /app/users/:id` — today's progress, the intake form, and a per-day
/// history table.
async fn profile<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Response
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = match state.store.get_user(id).await {
    Ok(Some(user)) => user,
    Ok(None) => return error_page(StatusCode::NOT_FOUND, "no such profile"),
    Err(e) => return store_failure(e),
  };
  let logs = match state.store.list_logs(id, &LogWindow::default()).await {
    Ok(logs) => logs,
    Err(e) => return store_failure(e),
  };

  let today = Utc::now().date_naive();
  let progress = match DailyProgress::compute(&user, &logs, today) {
    Ok(p) => p,
    Err(e) => return error_page(StatusCode::BAD_REQUEST, &e.to_string()),
  };

  let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
  for log in &logs {
    *by_day.entry(log.logged_at.date_naive()).or_insert(0.0) += log.volume_ml;
  }

  let history: String = by_day
    .iter()
    .rev()
    .map(|(day, consumed)| {
      let percent = (consumed / progress.goal_ml * 100.0).min(100.0);
      format!(
        "<tr><td>{day}</td><td>{consumed:.0} ml</td>\
         <td><div class=\"bar\"><div style=\"width:{percent:.0}%\"></div></div></td>\
         <td>{}</td></tr>",
        if *consumed >= progress.goal_ml { "✓" } else { "" },
      )
    })
    .collect();

  let body = format!(
    "<h2>{name}</h2>\
     <p>{weight:.1} kg, {activity:?} activity, {climate:?} climate \
        — daily goal <strong>{goal:.0} ml</strong></p>\
     <h3>Today</h3>\
     <div class=\"bar\"><div style=\"width:{percent:.0}%\"></div></div>\
     <p>{consumed:.0} of {goal:.0} ml ({percent:.0}%), {remaining:.0} ml to go</p>\
     <form method=\"post\" action=\"/app/users/{id}/logs\">\
       <label>Log intake (ml) <input name=\"volume_ml\" type=\"number\" step=\"1\" min=\"1\" required></label>\
       <button type=\"submit\">Add</button>\
     </form>\
     <h3>History</h3>\
     <table><tr><th>Day</th><th>Consumed</th><th>Progress</th><th>Goal</th></tr>{history}</table>",
    name = escape(&user.name),
    weight = user.weight_kg,
    activity = user.activity,
    climate = user.climate,
    goal = progress.goal_ml,
    consumed = progress.consumed_ml,
    percent = progress.percent,
    remaining = progress.remaining_ml,
    id = id,
  );

  Html(layout(&user.name, &body)).into_response()
}

// ─── Log intake ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct IntakeForm {
  volume_ml: f64,
}

/// `POST /app/users/:id/logs`
async fn log_intake<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Form(form): Form<IntakeForm>,
) -> Response
where
  S: HydrationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !form.volume_ml.is_finite() || form.volume_ml <= 0.0 {
    return error_page(
      StatusCode::UNPROCESSABLE_ENTITY,
      "volume must be a positive number",
    );
  }
  match state.store.get_user(id).await {
    Ok(Some(_)) => {}
    Ok(None) => return error_page(StatusCode::NOT_FOUND, "no such profile"),
    Err(e) => return store_failure(e),
  }

  match state.store.record_log(NewLog::new(id, form.volume_ml)).await {
    Ok(_) => Redirect::to(&format!("/app/users/{id}")).into_response(),
    Err(e) => store_failure(e),
  }
}
