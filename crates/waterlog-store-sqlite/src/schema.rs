//! SQL schema for the Waterlog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    weight_kg  REAL NOT NULL,
    activity   TEXT NOT NULL,   -- 'low' | 'medium' | 'high'
    climate    TEXT NOT NULL,   -- 'temperate' | 'hot' | 'humid'
    created_at TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- Logs are immutable once written. The only DELETEs issued against this
-- table are explicit single-log deletion and the owner cascade.
CREATE TABLE IF NOT EXISTS logs (
    log_id    TEXT PRIMARY KEY,
    user_id   TEXT NOT NULL REFERENCES users(user_id),
    volume_ml REAL NOT NULL,
    logged_at TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS logs_user_idx   ON logs(user_id);
CREATE INDEX IF NOT EXISTS logs_logged_idx ON logs(logged_at);
CREATE INDEX IF NOT EXISTS users_name_idx  ON users(name);

PRAGMA user_version = 1;
";
