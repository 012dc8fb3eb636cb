//! Fixed-window per-client rate limiting.
//!
//! Optional (off by default, enabled via [`crate::ServerConfig`]). Clients
//! are keyed by the first `X-Forwarded-For` entry when present, otherwise by
//! the peer address. This is the one piece of shared in-process state beyond
//! the database connection; everything behind the mutex is a counter map.

use std::{
  collections::HashMap,
  net::SocketAddr,
  sync::{Arc, Mutex},
  time::Instant,
};

use axum::{
  extract::{ConnectInfo, Request, State},
  http::{HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};

const WINDOW_SECS: u64 = 60;
/// Entries idle for two full windows are dropped so the map cannot grow
/// without bound.
const STALE_SECS: u64 = 120;

/// Paths never counted against the limit.
const EXCLUDED: &[&str] = &["/healthz", "/app"];

pub struct RateLimiter {
  per_minute: u32,
  counts:     Mutex<HashMap<String, (u32, Instant)>>,
}

impl RateLimiter {
  pub fn new(per_minute: u32) -> Self {
    Self { per_minute, counts: Mutex::new(HashMap::new()) }
  }

  /// Record a hit for `key`; returns `false` when the client has exhausted
  /// the current window.
  pub fn allow(&self, key: &str) -> bool {
    let now = Instant::now();
    let mut counts = self.counts.lock().unwrap_or_else(|p| p.into_inner());

    counts
      .retain(|_, (_, started)| now.duration_since(*started).as_secs() < STALE_SECS);

    let entry = counts.entry(key.to_owned()).or_insert((0, now));
    if now.duration_since(entry.1).as_secs() >= WINDOW_SECS {
      *entry = (0, now);
    }
    if entry.0 >= self.per_minute {
      return false;
    }
    entry.0 += 1;
    true
  }
}

/// First `X-Forwarded-For` entry, else the peer address, else `"unknown"`
/// (e.g. in-process test requests carry no connect info).
fn client_key(req: &Request) -> String {
  if let Some(first) = req
    .headers()
    .get("x-forwarded-for")
    .and_then(|v| v.to_str().ok())
    .and_then(|s| s.split(',').next())
  {
    let first = first.trim();
    if !first.is_empty() {
      return first.to_owned();
    }
  }
  req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ci| ci.0.ip().to_string())
    .unwrap_or_else(|| "unknown".to_owned())
}

/// Axum middleware enforcing the limit.
pub async fn limit(
  State(limiter): State<Arc<RateLimiter>>,
  req: Request,
  next: Next,
) -> Response {
  let path = req.uri().path();
  if EXCLUDED.iter().any(|p| path.starts_with(p)) {
    return next.run(req).await;
  }

  let key = client_key(&req);
  if limiter.allow(&key) {
    next.run(req).await
  } else {
    tracing::warn!(client = %key, "rate limit exceeded");
    let mut res = (
      StatusCode::TOO_MANY_REQUESTS,
      "rate limit exceeded, try again later",
    )
      .into_response();
    res
      .headers_mut()
      .insert(header::RETRY_AFTER, HeaderValue::from_static("60"));
    res
  }
}
