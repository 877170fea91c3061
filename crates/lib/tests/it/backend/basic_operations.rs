//! Basic ContentBackend operations, run against the backend selected by TEST_BACKEND.

use kindred::{
    CollectionScope, ItemId, Position,
    entity::{Fields, NewRecord},
};
use serde_json::json;

use crate::helpers::test_backend;

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

fn titled(scope: CollectionScope, position: u32, title: &str) -> NewRecord {
    NewRecord::new(scope, Position::new(position), fields(json!({"title": title})))
}

#[tokio::test]
async fn test_fetch_orders_by_position() {
    let backend = test_backend().await;
    let scope = CollectionScope::albums();

    // Created out of order on purpose.
    for (position, title) in [(2, "C"), (0, "A"), (1, "B")] {
        backend
            .create_item(titled(scope.clone(), position, title))
            .await
            .unwrap();
    }

    let records = backend.fetch_collection(&scope).await.unwrap();
    let titles: Vec<_> = records
        .iter()
        .map(|r| r.fields["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["A", "B", "C"]);
    assert_eq!(backend.count(&scope).await.unwrap(), 3);
}

#[tokio::test]
async fn test_empty_collection_reads_empty() {
    let backend = test_backend().await;
    let records = backend
        .fetch_collection(&CollectionScope::photos(ItemId::from("no-such-album")))
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_collections_are_scoped_by_parent() {
    let backend = test_backend().await;
    let first = CollectionScope::photos(ItemId::from("album-1"));
    let second = CollectionScope::photos(ItemId::from("album-2"));

    backend.create_item(titled(first.clone(), 0, "one")).await.unwrap();
    backend.create_item(titled(second.clone(), 0, "two")).await.unwrap();
    backend.create_item(titled(second.clone(), 1, "three")).await.unwrap();

    assert_eq!(backend.count(&first).await.unwrap(), 1);
    assert_eq!(backend.count(&second).await.unwrap(), 2);
    assert_eq!(backend.count(&CollectionScope::albums()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_write_position_is_idempotent() {
    let backend = test_backend().await;
    let record = backend
        .create_item(titled(CollectionScope::albums(), 0, "A"))
        .await
        .unwrap();

    backend.write_position(&record.id, Position::new(4)).await.unwrap();
    backend.write_position(&record.id, Position::new(4)).await.unwrap();

    let stored = backend.get_item(&record.id).await.unwrap();
    assert_eq!(stored.position, Position::new(4));
    assert_eq!(stored.fields, record.fields);
}

#[tokio::test]
async fn test_missing_items_are_not_found() {
    let backend = test_backend().await;
    let missing = ItemId::from("missing");

    assert!(backend.get_item(&missing).await.unwrap_err().is_not_found());
    assert!(
        backend
            .write_position(&missing, Position::ZERO)
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(backend.delete_item(&missing).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_leaves_gap() {
    let backend = test_backend().await;
    let scope = CollectionScope::albums();
    let mut ids = Vec::new();
    for (position, title) in ["A", "B", "C"].into_iter().enumerate() {
        let record = backend
            .create_item(titled(scope.clone(), position as u32, title))
            .await
            .unwrap();
        ids.push(record.id);
    }

    backend.delete_item(&ids[1]).await.unwrap();

    let records = backend.fetch_collection(&scope).await.unwrap();
    let remaining: Vec<_> = records
        .iter()
        .map(|r| (r.fields["title"].as_str().unwrap(), r.position.get()))
        .collect();
    assert_eq!(remaining, [("A", 0), ("C", 2)]);
}

#[tokio::test]
async fn test_update_fields_merges() {
    let backend = test_backend().await;
    let record = backend
        .create_item(NewRecord::new(
            CollectionScope::albums(),
            Position::ZERO,
            fields(json!({"title": "Old", "description": "kept", "cover_url": "/c.jpg"})),
        ))
        .await
        .unwrap();

    let updated = backend
        .update_fields(&record.id, fields(json!({"title": "New", "cover_url": null})))
        .await
        .unwrap();

    assert_eq!(
        updated.fields,
        fields(json!({"title": "New", "description": "kept"}))
    );
    assert_eq!(updated.position, Position::ZERO);
    assert_eq!(backend.get_item(&record.id).await.unwrap().fields, updated.fields);
}
