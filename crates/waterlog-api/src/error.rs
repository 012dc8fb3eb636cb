//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use waterlog_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Bad client input; the response body names the offending field.
  #[error("invalid {field}: {message}")]
  Validation { field: &'static str, message: String },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a store error, surfacing domain conditions buried in its source
  /// chain: not-found becomes a 404 and computation misuse a 400; anything
  /// else is an opaque storage failure.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = source {
      if let Some(core) = e.downcast_ref::<CoreError>() {
        return Self::from(core);
      }
      source = e.source();
    }
    ApiError::Store(Box::new(err))
  }
}

impl From<&CoreError> for ApiError {
  fn from(core: &CoreError) -> Self {
    match core {
      CoreError::UserNotFound(id) => {
        ApiError::NotFound(format!("user {id} not found"))
      }
      CoreError::LogNotFound(id) => {
        ApiError::NotFound(format!("log {id} not found"))
      }
      CoreError::NonPositiveWeight(_) | CoreError::ZeroGoal => {
        ApiError::BadRequest(core.to_string())
      }
    }
  }
}

impl From<CoreError> for ApiError {
  fn from(core: CoreError) -> Self { Self::from(&core) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::Validation { field, message } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": message, "field": field })),
      )
        .into_response(),
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Store(e) => {
        // Log the detail server-side; the client gets a generic body.
        tracing::error!(error = %e, "storage failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal server error" })),
        )
          .into_response()
      }
    }
  }
}
