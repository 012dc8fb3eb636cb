//! The `HydrationStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `waterlog-store-sqlite`). Higher layers (`waterlog-api`,
//! `waterlog-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  log::{HydrationLog, LogWindow, NewLog},
  user::{NewUser, User, UserUpdate},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`HydrationStore::list_users`].
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
  /// Case-insensitive substring filter on the user's name.
  pub name_contains: Option<String>,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Waterlog storage backend.
///
/// Every operation is atomic with respect to the others; the one
/// multi-statement operation, [`delete_user`](Self::delete_user), removes the
/// user's logs before the user record so that no orphan log is ever
/// observable.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HydrationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. The `user_id` and `created_at` fields
  /// are assigned by the store.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by UUID. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// List users matching `query`, in creation order.
  fn list_users<'a>(
    &'a self,
    query: &'a UserQuery,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  /// Apply a partial update and return the updated record.
  ///
  /// Errors with the store's user-not-found condition if `id` does not
  /// resolve.
  fn update_user(
    &self,
    id: Uuid,
    update: UserUpdate,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Delete a user and every log that references it. The logs go first, in
  /// the same transaction, so a failure can never leave orphans behind.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Logs ──────────────────────────────────────────────────────────────

  /// Record an intake event. `log_id` is assigned by the store, and
  /// `logged_at` defaults to now when the input leaves it unset.
  ///
  /// Errors with the user-not-found condition if the owning user does not
  /// exist.
  fn record_log(
    &self,
    input: NewLog,
  ) -> impl Future<Output = Result<HydrationLog, Self::Error>> + Send + '_;

  /// Return a user's logs inside the closed `window`, newest first.
  ///
  /// A user id that does not resolve yields an empty list — after a cascade
  /// delete this is exactly the "no orphans" read.
  fn list_logs<'a>(
    &'a self,
    user_id: Uuid,
    window: &'a LogWindow,
  ) -> impl Future<Output = Result<Vec<HydrationLog>, Self::Error>> + Send + 'a;

  /// Delete a single log. Errors with the log-not-found condition if `id`
  /// does not resolve.
  fn delete_log(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Health ────────────────────────────────────────────────────────────

  /// Cheap round-trip to the backing store; drives the liveness endpoint.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
