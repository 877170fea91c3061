//! Overlapping reorders on one list, and reorders on independent lists.

use std::sync::Arc;

use kindred::{CollectionScope, ReorderManager, entity::Photo, notify::NotificationLog};

use crate::helpers::{albums_manager, positions, stored_titles, test_backend, titles};

#[tokio::test]
async fn test_newer_reorder_supersedes_older_when_landing_last() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());
    let mut manager = albums_manager(backend.clone(), log.clone(), &["A", "B", "C", "D"]).await;
    let ids = manager.ids();

    let first = manager.plan_drop(&ids[0], &ids[3]).unwrap().unwrap();
    let second = manager.plan_drop(&ids[3], &ids[1]).unwrap().unwrap();
    let expected = titles(&manager);

    assert!(first.persist().await.is_success());
    assert!(second.persist().await.is_success());

    manager.refresh().await.unwrap();
    assert_eq!(titles(&manager), expected);
    assert_eq!(stored_titles(&*backend).await, expected);
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_out_of_order_landing_converges_after_refetch() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());
    let mut manager = albums_manager(backend.clone(), log.clone(), &["A", "B", "C", "D"]).await;
    let ids = manager.ids();

    let first = manager.plan_drop(&ids[0], &ids[3]).unwrap().unwrap();
    let second = manager.plan_drop(&ids[2], &ids[0]).unwrap().unwrap();

    // The superseded batch lands after the newer one.
    let newer = tokio::spawn(second.persist());
    assert!(newer.await.unwrap().is_success());
    assert!(first.persist().await.is_success());

    manager.refresh().await.unwrap();
    let local = titles(&manager);
    assert_eq!(stored_titles(&*backend).await, local);
    let mut sorted = local.clone();
    sorted.sort();
    assert_eq!(sorted, ["A", "B", "C", "D"]);

    // A later drop renumbers the whole list and restores contiguous positions.
    let ids = manager.ids();
    manager.drop_item(&ids[0], &ids[1]).await.unwrap();
    manager.refresh().await.unwrap();
    assert_eq!(positions(&manager), [0, 1, 2, 3]);
}

#[tokio::test]
async fn test_independent_collections_do_not_interfere() {
    let backend = test_backend().await;
    let log = Arc::new(NotificationLog::new());
    let mut albums = albums_manager(backend.clone(), log.clone(), &["A", "B", "C"]).await;
    let album_ids = albums.ids();

    let mut photo_lists = Vec::new();
    for album in &album_ids {
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
                    image_url: format!("/assets/photos/{album}-{n}.jpg"),
                    caption: n.to_string(),
                })
                .await
                .unwrap();
        }
        photo_lists.push(photos);
    }

    let mut pending = Vec::new();
    pending.push(albums.plan_drop(&album_ids[2], &album_ids[0]).unwrap().unwrap());
    for photos in &mut photo_lists {
        let ids = photos.ids();
        pending.push(photos.plan_drop(&ids[0], &ids[2]).unwrap().unwrap());
    }

    let handles: Vec<_> = pending
        .into_iter()
        .map(|p| tokio::spawn(p.persist()))
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_success());
    }

    albums.refresh().await.unwrap();
    assert_eq!(titles(&albums), ["C", "A", "B"]);
    for photos in &mut photo_lists {
        photos.refresh().await.unwrap();
        let captions: Vec<_> = photos
            .items()
            .iter()
            .map(|i| i.content.caption.as_str())
            .collect();
        assert_eq!(captions, ["1", "2", "0"]);
        assert_eq!(photos.len(), 3);
    }
    assert!(log.is_empty());
}
