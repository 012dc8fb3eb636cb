//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use uuid::Uuid;
use waterlog_core::{
  Error as CoreError,
  log::{LogWindow, NewLog},
  store::{HydrationStore, UserQuery},
  user::{ActivityLevel, Climate, NewUser, UserUpdate},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(name: &str) -> NewUser {
  NewUser {
    name:      name.into(),
    weight_kg: 70.0,
    activity:  ActivityLevel::Medium,
    climate:   Climate::Temperate,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user_roundtrip() {
  let s = store().await;

  let created = s.create_user(new_user("Alice")).await.unwrap();
  let fetched = s.get_user(created.user_id).await.unwrap().unwrap();

  assert_eq!(fetched.user_id, created.user_id);
  assert_eq!(fetched.name, "Alice");
  assert_eq!(fetched.weight_kg, 70.0);
  assert_eq!(fetched.activity, ActivityLevel::Medium);
  assert_eq!(fetched.climate, Climate::Temperate);
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  let result = s.get_user(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn list_users_all() {
  let s = store().await;
  s.create_user(new_user("Alice")).await.unwrap();
  s.create_user(new_user("Bob")).await.unwrap();
  s.create_user(new_user("Carol")).await.unwrap();

  let all = s.list_users(&UserQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn list_users_filtered_by_name() {
  let s = store().await;
  s.create_user(new_user("Alice")).await.unwrap();
  s.create_user(new_user("Alicia")).await.unwrap();
  s.create_user(new_user("Bob")).await.unwrap();

  let matches = s
    .list_users(&UserQuery {
      name_contains: Some("ali".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(matches.len(), 2);
  assert!(matches.iter().all(|u| u.name.to_lowercase().contains("ali")));
}

#[tokio::test]
async fn list_users_limit_and_offset() {
  let s = store().await;
  for name in ["A", "B", "C", "D"] {
    s.create_user(new_user(name)).await.unwrap();
  }

  let page = s
    .list_users(&UserQuery {
      limit: Some(2),
      offset: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn update_user_partial_preserves_other_fields() {
  let s = store().await;
  let user = s.create_user(new_user("Alice")).await.unwrap();

  let updated = s
    .update_user(user.user_id, UserUpdate {
      weight_kg: Some(82.5),
      climate: Some(Climate::Hot),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.name, "Alice");
  assert_eq!(updated.weight_kg, 82.5);
  assert_eq!(updated.activity, ActivityLevel::Medium);
  assert_eq!(updated.climate, Climate::Hot);
  assert_eq!(updated.created_at, user.created_at);
}

#[tokio::test]
async fn update_user_missing_errors() {
  let s = store().await;
  let err = s
    .update_user(Uuid::new_v4(), UserUpdate {
      name: Some("Ghost".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::UserNotFound(_))));
}

#[tokio::test]
async fn delete_user_missing_errors() {
  let s = store().await;
  let err = s.delete_user(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::UserNotFound(_))));
}

// ─── Logs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_log_and_list() {
  let s = store().await;
  let user = s.create_user(new_user("Alice")).await.unwrap();

  let log = s
    .record_log(NewLog::new(user.user_id, 250.0))
    .await
    .unwrap();
  assert_eq!(log.user_id, user.user_id);
  assert_eq!(log.volume_ml, 250.0);

  let logs = s
    .list_logs(user.user_id, &LogWindow::default())
    .await
    .unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].log_id, log.log_id);
  assert_eq!(logs[0].logged_at, log.logged_at);
}

#[tokio::test]
async fn record_log_for_missing_user_errors() {
  let s = store().await;
  let err = s
    .record_log(NewLog::new(Uuid::new_v4(), 250.0))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::UserNotFound(_))));
}

#[tokio::test]
async fn list_logs_window_is_closed() {
  let s = store().await;
  let user = s.create_user(new_user("Alice")).await.unwrap();

  let at = |h| Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap();
  for (hour, volume) in [(7, 150.0), (8, 200.0), (14, 300.0), (20, 500.0), (21, 100.0)] {
    s.record_log(NewLog {
      user_id:   user.user_id,
      volume_ml: volume,
      logged_at: Some(at(hour)),
    })
    .await
    .unwrap();
  }

  let logs = s
    .list_logs(user.user_id, &LogWindow {
      from: Some(at(8)),
      to:   Some(at(20)),
    })
    .await
    .unwrap();

  // Bounds are inclusive: 08:00 and 20:00 entries stay, the rest drop.
  assert_eq!(logs.len(), 3);
  let total: f64 = logs.iter().map(|l| l.volume_ml).sum();
  assert_eq!(total, 1000.0);
}

#[tokio::test]
async fn list_logs_newest_first() {
  let s = store().await;
  let user = s.create_user(new_user("Alice")).await.unwrap();

  let at = |h| Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap();
  for hour in [9, 15, 12] {
    s.record_log(NewLog {
      user_id:   user.user_id,
      volume_ml: 100.0,
      logged_at: Some(at(hour)),
    })
    .await
    .unwrap();
  }

  let logs = s
    .list_logs(user.user_id, &LogWindow::default())
    .await
    .unwrap();
  let hours: Vec<_> = logs
    .iter()
    .map(|l| l.logged_at.format("%H").to_string())
    .collect();
  assert_eq!(hours, ["15", "12", "09"]);
}

#[tokio::test]
async fn delete_log_removes_it() {
  let s = store().await;
  let user = s.create_user(new_user("Alice")).await.unwrap();
  let log = s
    .record_log(NewLog::new(user.user_id, 250.0))
    .await
    .unwrap();

  s.delete_log(log.log_id).await.unwrap();

  let logs = s
    .list_logs(user.user_id, &LogWindow::default())
    .await
    .unwrap();
  assert!(logs.is_empty());
}

#[tokio::test]
async fn delete_log_missing_errors() {
  let s = store().await;
  let err = s.delete_log(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::LogNotFound(_))));
}

// ─── Cascade ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_user_cascades_logs() {
  let s = store().await;
  let user = s.create_user(new_user("Alice")).await.unwrap();
  for volume in [200.0, 300.0, 500.0] {
    s.record_log(NewLog::new(user.user_id, volume)).await.unwrap();
  }

  s.delete_user(user.user_id).await.unwrap();

  assert!(s.get_user(user.user_id).await.unwrap().is_none());
  let logs = s
    .list_logs(user.user_id, &LogWindow::default())
    .await
    .unwrap();
  assert!(logs.is_empty());
}

#[tokio::test]
async fn delete_user_leaves_other_users_logs_alone() {
  let s = store().await;
  let alice = s.create_user(new_user("Alice")).await.unwrap();
  let bob = s.create_user(new_user("Bob")).await.unwrap();
  s.record_log(NewLog::new(alice.user_id, 200.0)).await.unwrap();
  s.record_log(NewLog::new(bob.user_id, 400.0)).await.unwrap();

  s.delete_user(alice.user_id).await.unwrap();

  let bobs = s
    .list_logs(bob.user_id, &LogWindow::default())
    .await
    .unwrap();
  assert_eq!(bobs.len(), 1);
  assert_eq!(bobs[0].volume_ml, 400.0);
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ping_succeeds_on_open_store() {
  let s = store().await;
  s.ping().await.unwrap();
}
