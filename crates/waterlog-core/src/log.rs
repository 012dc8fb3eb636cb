//! Hydration logs — recorded intake events.
//!
//! A log is immutable once written. There is no update operation; the only
//! ways a log leaves the store are explicit deletion and the owner cascade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single recorded intake event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrationLog {
  pub log_id:    Uuid,
  /// The owning user. Every stored log references an existing user.
  pub user_id:   Uuid,
  pub volume_ml: f64,
  pub logged_at: DateTime<Utc>,
}

/// Input to [`crate::store::HydrationStore::record_log`].
#[derive(Debug, Clone)]
pub struct NewLog {
  pub user_id:   Uuid,
  pub volume_ml: f64,
  /// When the intake happened. Defaults to now if the caller omits it.
  pub logged_at: Option<DateTime<Utc>>,
}

impl NewLog {
  /// Convenience constructor with a store-assigned timestamp.
  pub fn new(user_id: Uuid, volume_ml: f64) -> Self {
    Self { user_id, volume_ml, logged_at: None }
  }
}

/// A closed time window over `logged_at`. Unset bounds are unbounded.
#[derive(Debug, Clone, Default)]
pub struct LogWindow {
  pub from: Option<DateTime<Utc>>,
  pub to:   Option<DateTime<Utc>>,
}
