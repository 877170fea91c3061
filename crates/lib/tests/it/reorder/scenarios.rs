//! Reorder outcomes, checked both locally and after a refetch from storage.

use std::sync::Arc;

use kindred::{
    CollectionScope, ItemId, ReorderManager,
    entity::{HeroImage, Photo},
    notify::NotificationLog,
};

use crate::helpers::{
    FlakyBackend, albums_manager, hero, positions, stored_titles, test_backend, titles,
};

#[tokio::test]
async fn test_move_first_to_last() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());
    let mut manager = albums_manager(backend.clone(), log.clone(), &["A", "B", "C"]).await;
    let ids = manager.ids();

    let report = manager.drop_item(&ids[0], &ids[2]).await.unwrap();
    assert!(report.is_success());
    assert_eq!(titles(&manager), ["B", "C", "A"]);
    assert_eq!(positions(&manager), [0, 1, 2]);

    let records = backend
        .fetch_collection(&CollectionScope::albums())
        .await
        .unwrap();
    let persisted: Vec<_> = records
        .iter()
        .map(|r| (r.id.clone(), r.position.get()))
        .collect();
    assert_eq!(
        persisted,
        [(ids[1].clone(), 0), (ids[2].clone(), 1), (ids[0].clone(), 2)]
    );
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_refetch_matches_order_at_drop() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());
    let mut manager =
        albums_manager(backend.clone(), log, &["A", "B", "C", "D", "E", "F"]).await;
    let ids = manager.ids();

    for (source, target) in [(5, 0), (1, 4), (2, 3), (0, 5)] {
        manager.drop_item(&ids[source], &ids[target]).await.unwrap();
        let local = titles(&manager);
        assert_eq!(stored_titles(&*backend).await, local);
    }

    let before = titles(&manager);
    manager.refresh().await.unwrap();
    assert_eq!(titles(&manager), before);
    assert_eq!(positions(&manager), [0, 1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_self_drop_issues_no_writes() {
    let backend = Arc::new(FlakyBackend::new());
    let log = Arc::new(NotificationLog::new());
    let mut manager = albums_manager(backend.clone(), log.clone(), &["A", "B", "C"]).await;
    let ids = manager.ids();

    let report = manager.drop_item(&ids[1], &ids[1]).await.unwrap();
    assert_eq!(report.attempted, 0);
    assert_eq!(backend.position_writes(), 0);
    assert_eq!(titles(&manager), ["A", "B", "C"]);
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_empty_and_single_collections_are_noops() {
    let backend = Arc::new(FlakyBackend::new());
    let log = Arc::new(NotificationLog::new());

    let mut empty = albums_manager(backend.clone(), log.clone(), &[]).await;
    assert!(empty.is_empty());
    let ghost = ItemId::from("ghost");
    assert!(empty.plan_drop(&ghost, &ghost).unwrap().is_none());

    let mut single = albums_manager(backend.clone(), log.clone(), &["Only"]).await;
    let only = single.ids()[0].clone();
    assert!(single.plan_drop(&only, &only).unwrap().is_none());
    assert_eq!(backend.position_writes(), 0);
}

#[tokio::test]
async fn test_append_uses_collection_size() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());
    let mut manager = albums_manager(backend.clone(), log, &["A", "B", "C"]).await;

    let created = manager.append(crate::helpers::album("D")).await.unwrap();
    assert_eq!(created.position.get(), 3);

    manager.refresh().await.unwrap();
    assert_eq!(positions(&manager), [0, 1, 2, 3]);
    assert_eq!(titles(&manager), ["A", "B", "C", "D"]);
}

#[tokio::test]
async fn test_delete_keeps_order_with_gap() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());
    let mut manager = albums_manager(backend.clone(), log, &["A", "B", "C"]).await;
    let ids = manager.ids();

    manager.remove(&ids[1]).await.unwrap();
    assert_eq!(titles(&manager), ["A", "C"]);

    manager.refresh().await.unwrap();
    assert_eq!(titles(&manager), ["A", "C"]);
    assert_eq!(positions(&manager), [0, 2]);
}

#[tokio::test]
async fn test_drop_outside_collection_aborts() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());
    let mut manager = albums_manager(backend.clone(), log, &["A", "B", "C"]).await;
    let ids = manager.ids();

    let err = manager
        .drop_item(&ids[0], &ItemId::from("not-here"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(titles(&manager), ["A", "B", "C"]);
    assert_eq!(stored_titles(&*backend).await, ["A", "B", "C"]);
}

#[tokio::test]
async fn test_hero_images_and_photos_reorder_too() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());

    let mut heroes: ReorderManager<HeroImage> =
        ReorderManager::load(backend.clone(), log.clone(), CollectionScope::hero_images())
            .await
            .unwrap();
    for name in ["one", "two", "three"] {
        heroes.append(hero(name)).await.unwrap();
    }
    let ids = heroes.ids();
    heroes.drop_item(&ids[2], &ids[0]).await.unwrap();
    heroes.refresh().await.unwrap();
    let alts: Vec<_> = heroes
        .items()
        .iter()
        .map(|i| i.content.alt_text.as_str())
        .collect();
    assert_eq!(alts, ["three", "one", "two"]);

    let album = ItemId::from("album-1");
    let mut photos: ReorderManager<Photo> = ReorderManager::load(
        backend.clone(),
        log.clone(),
        CollectionScope::photos(album.clone()),
    )
    .await
    .unwrap();
    for n in 0..3 {
        photos
            .append(Photo {
                image_url: format!("/assets/photos/{n}.jpg"),
                caption: n.to_string(),
            })
            .await
            .unwrap();
    }
    let ids = photos.ids();
    photos.drop_item(&ids[0], &ids[1]).await.unwrap();
    photos.refresh().await.unwrap();
    let captions: Vec<_> = photos
        .items()
        .iter()
        .map(|i| i.content.caption.as_str())
        .collect();
    assert_eq!(captions, ["1", "0", "2"]);
    assert!(log.is_empty());
}
