//! JSON REST API for Waterlog.
//!
//! Exposes an axum [`Router`] backed by any
//! [`waterlog_core::store::HydrationStore`]. Transport, pages, and health
//! wiring are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", waterlog_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod goal;
pub mod logs;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use waterlog_core::store::HydrationStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: HydrationStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .put(users::update_one::<S>)
        .delete(users::delete_one::<S>),
    )
    // Logs
    .route("/users/{id}/logs", get(logs::list::<S>).post(logs::create::<S>))
    .route("/logs/{id}", delete(logs::delete_one::<S>))
    // Derived views
    .route("/users/{id}/goal", get(goal::daily::<S>))
    .route("/users/{id}/progress", get(goal::progress::<S>))
    .with_state(store)
}
