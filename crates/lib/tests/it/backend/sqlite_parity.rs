//! The SQLite backend behaves like the in-memory one.

use std::sync::Arc;

use kindred::{
    backend::{
        ContentBackend,
        database::{InMemory, Sqlite},
    },
    notify::NotificationLog,
};

use crate::helpers::{albums_manager, stored_titles, titles};

async fn reorder_outcome(backend: Arc<dyn ContentBackend>) -> Vec<String> {
    let log = Arc::new(NotificationLog::new());
    let mut manager = albums_manager(backend.clone(), log.clone(), &["A", "B", "C", "D"]).await;
    let ids = manager.ids();

    assert!(manager.drop_item(&ids[0], &ids[2]).await.unwrap().is_success());
    assert!(manager.drop_item(&ids[3], &ids[1]).await.unwrap().is_success());
    manager.remove(&ids[2]).await.unwrap();
    assert!(log.is_empty());

    let local = titles(&manager);
    assert_eq!(stored_titles(&*backend).await, local);
    local
}

#[tokio::test]
async fn test_sqlite_matches_in_memory() {
    let sqlite = Sqlite::sqlite_in_memory().await.unwrap();
    assert_eq!(sqlite.kind_label(), "sqlite");

    let from_sqlite = reorder_outcome(Arc::new(sqlite)).await;
    let from_memory = reorder_outcome(Arc::new(InMemory::new())).await;
    assert_eq!(from_sqlite, from_memory);
    assert_eq!(from_sqlite, ["D", "B", "A"]);
}

#[tokio::test]
async fn test_sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kindred.db");

    {
        let backend: Arc<dyn ContentBackend> = Arc::new(Sqlite::open_sqlite(&path).await.unwrap());
        let log = Arc::new(NotificationLog::new());
        let mut manager = albums_manager(backend.clone(), log, &["A", "B", "C"]).await;
        let ids = manager.ids();
        manager.drop_item(&ids[2], &ids[0]).await.unwrap();
        if let Some(sqlite) = backend.as_any().downcast_ref::<Sqlite>() {
            sqlite.close().await;
        }
    }

    let reopened = Sqlite::open_sqlite(&path).await.unwrap();
    assert_eq!(stored_titles(&reopened).await, ["C", "A", "B"]);
}

#[tokio::test]
async fn test_sqlite_rejects_unknown_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kindred.db");

    let sqlite = Sqlite::open_sqlite(&path).await.unwrap();
    sqlx::query("UPDATE schema_version SET version = $1")
        .bind(2_i64)
        .execute(sqlite.pool())
        .await
        .unwrap();
    sqlite.close().await;

    let err = Sqlite::open_sqlite(&path)
        .await
        .err()
        .expect("reopening a newer schema should fail");
    assert!(err.is_backend_error());
    assert!(err.to_string().contains("schema version 2"));
}
