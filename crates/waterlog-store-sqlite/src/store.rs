//! [`SqliteStore`] — the SQLite implementation of [`HydrationStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use waterlog_core::{
  Error as CoreError,
  log::{HydrationLog, LogWindow, NewLog},
  store::{HydrationStore, UserQuery},
  user::{NewUser, User, UserUpdate},
};

use crate::{
  Error, Result,
  encode::{
    RawLog, RawUser, encode_activity, encode_climate, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Waterlog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised onto one underlying connection, which is what makes the
/// cascade delete atomic with respect to concurrent writes.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a raw user row by encoded id.
  async fn fetch_raw_user(&self, id_str: String) -> Result<Option<RawUser>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, weight_kg, activity, climate, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  name:       row.get(1)?,
                  weight_kg:  row.get(2)?,
                  activity:   row.get(3)?,
                  climate:    row.get(4)?,
                  created_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── HydrationStore impl ─────────────────────────────────────────────────────

impl HydrationStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      name:       input.name,
      weight_kg:  input.weight_kg,
      activity:   input.activity,
      climate:    input.climate,
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(user.user_id);
    let name         = user.name.clone();
    let weight_kg    = user.weight_kg;
    let activity_str = encode_activity(user.activity).to_owned();
    let climate_str  = encode_climate(user.climate).to_owned();
    let at_str       = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, weight_kg, activity, climate, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            name,
            weight_kg,
            activity_str,
            climate_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let raw = self.fetch_raw_user(encode_uuid(id)).await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self, query: &UserQuery) -> Result<Vec<User>> {
    let name_pattern = query.name_contains.as_deref().map(|n| format!("%{n}%"));
    let limit_val    = query.limit.unwrap_or(100) as i64;
    let offset_val   = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, name, weight_kg, activity, climate, created_at
           FROM users
           WHERE (?1 IS NULL OR name LIKE ?1)
           ORDER BY created_at
           LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![name_pattern.as_deref(), limit_val, offset_val],
            |row| {
              Ok(RawUser {
                user_id:    row.get(0)?,
                name:       row.get(1)?,
                weight_kg:  row.get(2)?,
                activity:   row.get(3)?,
                climate:    row.get(4)?,
                created_at: row.get(5)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User> {
    let id_str       = encode_uuid(id);
    let name         = update.name;
    let weight_kg    = update.weight_kg;
    let activity_str = update.activity.map(encode_activity).map(str::to_owned);
    let climate_str  = update.climate.map(encode_climate).map(str::to_owned);

    let changed: usize = {
      let id_str = id_str.clone();
      self
        .conn
        .call(move |conn| {
          // COALESCE keeps the stored value wherever the update is None.
          let n = conn.execute(
            "UPDATE users SET
               name      = COALESCE(?2, name),
               weight_kg = COALESCE(?3, weight_kg),
               activity  = COALESCE(?4, activity),
               climate   = COALESCE(?5, climate)
             WHERE user_id = ?1",
            rusqlite::params![
              id_str,
              name,
              weight_kg,
              activity_str,
              climate_str,
            ],
          )?;
          Ok(n)
        })
        .await?
    };

    if changed == 0 {
      return Err(Error::Core(CoreError::UserNotFound(id)));
    }

    let raw = self
      .fetch_raw_user(id_str)
      .await?
      .ok_or(Error::Core(CoreError::UserNotFound(id)))?;
    raw.into_user()
  }

  async fn delete_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        // Logs first, then the user row, in one transaction: a failure can
        // never leave orphan logs behind.
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM logs WHERE user_id = ?1", rusqlite::params![id_str])?;
        let n = tx.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(CoreError::UserNotFound(id)));
    }
    Ok(())
  }

  // ── Logs ──────────────────────────────────────────────────────────────────

  async fn record_log(&self, input: NewLog) -> Result<HydrationLog> {
    let log = HydrationLog {
      log_id:    Uuid::new_v4(),
      user_id:   input.user_id,
      volume_ml: input.volume_ml,
      logged_at: input.logged_at.unwrap_or_else(Utc::now),
    };

    let log_id_str  = encode_uuid(log.log_id);
    let user_id_str = encode_uuid(log.user_id);
    let volume_ml   = log.volume_ml;
    let at_str      = encode_dt(log.logged_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        // Owner check and insert share a transaction so the log cannot race
        // a concurrent cascade delete into existence.
        let tx = conn.transaction()?;
        let owner_exists: bool = tx
          .query_row(
            "SELECT 1 FROM users WHERE user_id = ?1",
            rusqlite::params![user_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !owner_exists {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO logs (log_id, user_id, volume_ml, logged_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![log_id_str, user_id_str, volume_ml, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::Core(CoreError::UserNotFound(log.user_id)));
    }
    Ok(log)
  }

  async fn list_logs(
    &self,
    user_id: Uuid,
    window:  &LogWindow,
  ) -> Result<Vec<HydrationLog>> {
    let user_id_str = encode_uuid(user_id);
    let from_str    = window.from.map(encode_dt);
    let to_str      = window.to.map(encode_dt);

    let raws: Vec<RawLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT log_id, user_id, volume_ml, logged_at
           FROM logs
           WHERE user_id = ?1
             AND (?2 IS NULL OR logged_at >= ?2)
             AND (?3 IS NULL OR logged_at <= ?3)
           ORDER BY logged_at DESC",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              user_id_str,
              from_str.as_deref(),
              to_str.as_deref(),
            ],
            |row| {
              Ok(RawLog {
                log_id:    row.get(0)?,
                user_id:   row.get(1)?,
                volume_ml: row.get(2)?,
                logged_at: row.get(3)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLog::into_log).collect()
  }

  async fn delete_log(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM logs WHERE log_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(CoreError::LogNotFound(id)));
    }
    Ok(())
  }

  // ── Health ────────────────────────────────────────────────────────────────

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
