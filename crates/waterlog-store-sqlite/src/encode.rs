//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings so that SQL `<=`/`>=`
//! comparisons order chronologically. UUIDs are stored as hyphenated
//! lowercase strings; the enums as their lowercase serde tags.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use waterlog_core::{
  log::HydrationLog,
  user::{ActivityLevel, Climate, User},
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ActivityLevel ───────────────────────────────────────────────────────────

pub fn encode_activity(a: ActivityLevel) -> &'static str {
  match a {
    ActivityLevel::Low => "low",
    ActivityLevel::Medium => "medium",
    ActivityLevel::High => "high",
  }
}

pub fn decode_activity(s: &str) -> Result<ActivityLevel> {
  match s {
    "low" => Ok(ActivityLevel::Low),
    "medium" => Ok(ActivityLevel::Medium),
    "high" => Ok(ActivityLevel::High),
    other => Err(Error::DateParse(format!("unknown activity level: {other:?}"))),
  }
}

// ─── Climate ─────────────────────────────────────────────────────────────────

pub fn encode_climate(c: Climate) -> &'static str {
  match c {
    Climate::Temperate => "temperate",
    Climate::Hot => "hot",
    Climate::Humid => "humid",
  }
}

pub fn decode_climate(s: &str) -> Result<Climate> {
  match s {
    "temperate" => Ok(Climate::Temperate),
    "hot" => Ok(Climate::Hot),
    "humid" => Ok(Climate::Humid),
    other => Err(Error::DateParse(format!("unknown climate: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub weight_kg:  f64,
  pub activity:   String,
  pub climate:    String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      weight_kg:  self.weight_kg,
      activity:   decode_activity(&self.activity)?,
      climate:    decode_climate(&self.climate)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `logs` row.
pub struct RawLog {
  pub log_id:    String,
  pub user_id:   String,
  pub volume_ml: f64,
  pub logged_at: String,
}

impl RawLog {
  pub fn into_log(self) -> Result<HydrationLog> {
    Ok(HydrationLog {
      log_id:    decode_uuid(&self.log_id)?,
      user_id:   decode_uuid(&self.user_id)?,
      volume_ml: self.volume_ml,
      logged_at: decode_dt(&self.logged_at)?,
    })
  }
}
