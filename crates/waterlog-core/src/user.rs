//! User — the profile a hydration goal is computed from.
//!
//! A user holds only the attributes the goal formula needs plus identity
//! metadata. Everything derived (goals, progress) is computed on read and
//! never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How physically active the user is on a typical day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
  Low,
  Medium,
  High,
}

/// The climate the user lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Climate {
  Temperate,
  Hot,
  Humid,
}

/// A stored user profile. `user_id` and `created_at` are assigned by the
/// store; the remaining fields are mutable via [`UserUpdate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub name:       String,
  pub weight_kg:  f64,
  pub activity:   ActivityLevel,
  pub climate:    Climate,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::HydrationStore::create_user`].
/// `user_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub name:      String,
  pub weight_kg: f64,
  pub activity:  ActivityLevel,
  pub climate:   Climate,
}

/// A partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
  pub name:      Option<String>,
  pub weight_kg: Option<f64>,
  pub activity:  Option<ActivityLevel>,
  pub climate:   Option<Climate>,
}

impl UserUpdate {
  /// `true` if the update would change nothing.
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.weight_kg.is_none()
      && self.activity.is_none()
      && self.climate.is_none()
  }
}
