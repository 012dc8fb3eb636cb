//! Error types for `waterlog-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("log not found: {0}")]
  LogNotFound(Uuid),

  #[error("weight must be a positive finite number, got {0}")]
  NonPositiveWeight(f64),

  #[error("daily goal is zero; progress ratio is undefined")]
  ZeroGoal,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
