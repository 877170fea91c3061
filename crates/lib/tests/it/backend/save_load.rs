//! JSON file persistence of the in-memory backend.

use kindred::{
    CollectionScope, ItemId, Position,
    backend::{ContentBackend, database::InMemory},
    entity::{Fields, NewRecord},
};
use serde_json::json;
use tempfile::tempdir;

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kindred.json");

    let backend = InMemory::new();
    let album = backend
        .create_item(NewRecord::new(
            CollectionScope::albums(),
            Position::ZERO,
            fields(json!({"title": "Harvest"})),
        ))
        .await
        .unwrap();
    let photos = CollectionScope::photos(album.id.clone());
    for position in 0..3 {
        backend
            .create_item(NewRecord::new(
                photos.clone(),
                Position::new(position),
                fields(json!({"image_url": format!("/assets/photos/{position}.jpg")})),
            ))
            .await
            .unwrap();
    }
    backend.save_to_file(&path).await.unwrap();

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.get_item(&album.id).await.unwrap(), album);
    assert_eq!(
        loaded.fetch_collection(&photos).await.unwrap(),
        backend.fetch_collection(&photos).await.unwrap()
    );
}

#[tokio::test]
async fn test_load_missing_file_gives_empty_store() {
    let dir = tempdir().unwrap();
    let loaded = InMemory::load_from_file(dir.path().join("absent.json"))
        .await
        .unwrap();
    assert!(loaded.all_ids().await.is_empty());
}

#[tokio::test]
async fn test_load_rejects_unknown_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("future.json");
    tokio::fs::write(&path, r#"{"_v": 99, "records": []}"#)
        .await
        .unwrap();

    assert!(InMemory::load_from_file(&path).await.is_err());
}

#[tokio::test]
async fn test_positions_survive_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kindred.json");

    let backend = InMemory::new();
    let record = backend
        .create_item(NewRecord::new(
            CollectionScope::hero_images(),
            Position::ZERO,
            fields(json!({"image_url": "/assets/hero/a.jpg"})),
        ))
        .await
        .unwrap();
    backend
        .write_position(&record.id, Position::new(7))
        .await
        .unwrap();
    backend.save_to_file(&path).await.unwrap();

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    let stored = loaded.get_item(&record.id).await.unwrap();
    assert_eq!(stored.position, Position::new(7));
    assert!(loaded.get_item(&ItemId::from("other")).await.is_err());
}
