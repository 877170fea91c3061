//! Upload-driven writes: the upload must succeed before anything is saved.

use kindred::{CollectionScope, ItemId};

use crate::helpers::{album, test_site};

#[tokio::test]
async fn test_rejected_upload_saves_nothing() {
    let t = test_site().await;
    let harvest = t.site.create_album(album("Harvest")).await.unwrap();

    let err = t
        .site
        .add_photo(&harvest.id, Vec::new(), "empty.jpg", "nothing")
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
    assert!(t.site.photos(&harvest.id).await.is_empty());

    let err = t
        .site
        .set_album_cover(&harvest.id, Vec::new(), "cover.jpg")
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(t.site.albums().await[0].content.cover_url, None);

    assert_eq!(t.log.drain().len(), 2);
    assert!(t.assets.is_empty().await);
}

#[tokio::test]
async fn test_uploaded_urls_are_stored() {
    let t = test_site().await;
    let hero = t
        .site
        .add_hero_image(b"png".to_vec(), "Banner Image.PNG", "Banner")
        .await
        .unwrap();
    assert!(hero.content.image_url.starts_with("/assets/hero/"));
    assert!(hero.content.image_url.ends_with("-banner-image.png"));
    assert_eq!(
        t.assets.get(&hero.content.image_url).await.as_deref(),
        Some(&b"png"[..])
    );
}

#[tokio::test]
async fn test_removing_items_deletes_their_files() {
    let t = test_site().await;
    let a = t.site.add_hero_image(b"a".to_vec(), "a.jpg", "a").await.unwrap();
    let b = t.site.add_hero_image(b"b".to_vec(), "b.jpg", "b").await.unwrap();
    let c = t.site.add_hero_image(b"c".to_vec(), "c.jpg", "c").await.unwrap();

    t.site
        .remove_item(&CollectionScope::hero_images(), &b.id)
        .await
        .unwrap();

    let remaining: Vec<_> = t
        .site
        .hero_images()
        .await
        .into_iter()
        .map(|h| (h.id, h.position.get()))
        .collect();
    assert_eq!(remaining, [(a.id, 0), (c.id, 2)]);
    assert!(t.assets.get(&b.content.image_url).await.is_none());
    assert_eq!(t.assets.len().await, 2);
}

#[tokio::test]
async fn test_remove_album_takes_photos_and_cover() {
    let t = test_site().await;
    let keep = t.site.create_album(album("Keep")).await.unwrap();
    let gone = t.site.create_album(album("Drop")).await.unwrap();
    t.site
        .set_album_cover(&gone.id, b"cover".to_vec(), "cover.jpg")
        .await
        .unwrap();
    for n in 0..2 {
        t.site
            .add_photo(&gone.id, b"photo".to_vec(), &format!("{n}.jpg"), "")
            .await
            .unwrap();
    }
    t.site
        .add_photo(&keep.id, b"photo".to_vec(), "k.jpg", "")
        .await
        .unwrap();

    t.site.remove_album(&gone.id).await.unwrap();

    let albums = t.site.albums().await;
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].id, keep.id);
    assert!(t.site.photos(&gone.id).await.is_empty());
    assert_eq!(t.site.photos(&keep.id).await.len(), 1);
    assert_eq!(t.assets.len().await, 1);
}

#[tokio::test]
async fn test_remove_from_wrong_scope_fails() {
    let t = test_site().await;
    let hero = t.site.add_hero_image(b"a".to_vec(), "a.jpg", "a").await.unwrap();

    let err = t
        .site
        .remove_item(&CollectionScope::activities(), &hero.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(t.site.hero_images().await.len(), 1);

    let err = t
        .site
        .remove_album(&ItemId::from("missing"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
