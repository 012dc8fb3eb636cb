//! Hydration goal computation and intake aggregation.
//!
//! Everything in this module is a pure function of its inputs: the same user
//! attributes always produce the same goal, and no result is ever persisted.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  log::HydrationLog,
  user::{ActivityLevel, Climate, User},
};

/// Base daily intake per kilogram of body weight, in millilitres.
pub const BASE_ML_PER_KG: f64 = 35.0;

impl ActivityLevel {
  /// Multiplicative adjustment applied on top of the base rate.
  pub fn multiplier(self) -> f64 {
    match self {
      Self::Low => 1.0,
      Self::Medium => 1.15,
      Self::High => 1.3,
    }
  }
}

impl Climate {
  pub fn multiplier(self) -> f64 {
    match self {
      Self::Temperate => 1.0,
      Self::Humid => 1.1,
      Self::Hot => 1.2,
    }
  }
}

// ─── Goal ────────────────────────────────────────────────────────────────────

/// Compute the daily intake goal in millilitres.
///
/// Base rate per kilogram, adjusted multiplicatively for activity level and
/// climate. Errors when `weight_kg` is not a positive finite number.
pub fn daily_goal_ml(
  weight_kg: f64,
  activity:  ActivityLevel,
  climate:   Climate,
) -> Result<f64> {
  if !weight_kg.is_finite() || weight_kg <= 0.0 {
    return Err(Error::NonPositiveWeight(weight_kg));
  }
  Ok(weight_kg * BASE_ML_PER_KG * activity.multiplier() * climate.multiplier())
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Sum the volumes of all logs whose `logged_at` falls inside the closed
/// window `[start, end]`. An empty slice or an empty window yields `0.0`;
/// this never errors.
pub fn aggregate_intake(
  logs:  &[HydrationLog],
  start: DateTime<Utc>,
  end:   DateTime<Utc>,
) -> f64 {
  logs
    .iter()
    .filter(|log| log.logged_at >= start && log.logged_at <= end)
    .map(|log| log.volume_ml)
    .sum()
}

/// Raw `total / goal`, uncapped. Callers decide whether and how to clamp for
/// display. Errors when `goal_ml` is zero.
pub fn progress_ratio(total_ml: f64, goal_ml: f64) -> Result<f64> {
  if goal_ml == 0.0 {
    return Err(Error::ZeroGoal);
  }
  Ok(total_ml / goal_ml)
}

// ─── Daily progress ──────────────────────────────────────────────────────────

/// The computed read model for one user-day — never stored, always derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProgress {
  pub day:          NaiveDate,
  pub goal_ml:      f64,
  pub consumed_ml:  f64,
  /// Goal minus consumption, floored at zero.
  pub remaining_ml: f64,
  /// Raw consumed/goal ratio; exceeds 1.0 once the goal is beaten.
  pub ratio:        f64,
  /// Display percentage, capped at 100.
  pub percent:      f64,
  pub goal_reached: bool,
}

impl DailyProgress {
  /// Derive the progress summary for `day` (UTC) from a user's profile and
  /// their logs. Logs outside the day are ignored, so callers may pass an
  /// unfiltered history.
  pub fn compute(
    user: &User,
    logs: &[HydrationLog],
    day:  NaiveDate,
  ) -> Result<Self> {
    let goal_ml = daily_goal_ml(user.weight_kg, user.activity, user.climate)?;

    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::nanoseconds(1);
    let consumed_ml = aggregate_intake(logs, start, end);

    let ratio = progress_ratio(consumed_ml, goal_ml)?;

    Ok(Self {
      day,
      goal_ml,
      consumed_ml,
      remaining_ml: (goal_ml - consumed_ml).max(0.0),
      ratio,
      percent: (ratio * 100.0).min(100.0),
      goal_reached: consumed_ml >= goal_ml,
    })
  }
}
