//! In-place edits through the Site: persistence, validation and cache invalidation.

use kindred::{
    CollectionScope, ItemId,
    cms::{EditRequest, EditTarget},
    constants::text_keys,
    entity::Fields,
};
use serde_json::json;

use crate::helpers::{album, test_site};

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_text_edit_shows_on_next_render() {
    let t = test_site().await;
    assert_eq!(t.site.home_page().await.text(text_keys::HERO_TITLE), "");

    let target: EditTarget = "text:hero_title".parse().unwrap();
    t.site
        .edit(EditRequest::new(target, fields(json!({"value": "Together"}))))
        .await
        .unwrap();

    let home = t.site.home_page().await;
    assert_eq!(home.text(text_keys::HERO_TITLE), "Together");
    assert_eq!(
        t.site.site_text(text_keys::HERO_TITLE).await.as_deref(),
        Some("Together")
    );
}

#[tokio::test]
async fn test_item_edit_from_attribute_string() {
    let t = test_site().await;
    let created = t.site.create_album(album("Draft")).await.unwrap();
    // Prime the cache.
    assert_eq!(t.site.albums().await[0].content.title, "Draft");

    let attribute = EditTarget::Item {
        scope: CollectionScope::albums(),
        id: created.id.clone(),
    }
    .to_string();
    let target: EditTarget = attribute.parse().unwrap();
    t.site
        .edit(EditRequest::new(
            target,
            fields(json!({"title": "Final", "description": "Spring planting"})),
        ))
        .await
        .unwrap();

    let albums = t.site.albums().await;
    assert_eq!(albums[0].content.title, "Final");
    assert_eq!(albums[0].content.description, "Spring planting");
    assert_eq!(albums[0].position, created.position);
}

#[tokio::test]
async fn test_photo_edit_in_wrong_album_is_rejected() {
    let t = test_site().await;
    let first = t.site.create_album(album("One")).await.unwrap();
    let second = t.site.create_album(album("Two")).await.unwrap();
    let photo = t
        .site
        .add_photo(&first.id, b"jpeg".to_vec(), "p.jpg", "old")
        .await
        .unwrap();

    let target = EditTarget::Item {
        scope: CollectionScope::photos(second.id.clone()),
        id: photo.id.clone(),
    };
    let err = t
        .site
        .edit(EditRequest::new(target, fields(json!({"caption": "new"}))))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(t.log.drain().len(), 1);
    assert_eq!(t.site.photos(&first.id).await[0].content.caption, "old");
}

#[tokio::test]
async fn test_invalid_event_date_is_rejected() {
    let t = test_site().await;
    let event = t
        .site
        .create_event(kindred::entity::Event {
            title: "Gala".into(),
            description: String::new(),
            location: "Hall".into(),
            starts_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let target = EditTarget::Item {
        scope: CollectionScope::events(),
        id: event.id.clone(),
    };
    let err = t
        .site
        .edit(EditRequest::new(target, fields(json!({"starts_at": "next week"}))))
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(t.site.events().await[0].content.starts_at, event.content.starts_at);
}

#[tokio::test]
async fn test_unknown_item_edit_fails() {
    let t = test_site().await;
    let target = EditTarget::Item {
        scope: CollectionScope::activities(),
        id: ItemId::from("nope"),
    };
    let err = t
        .site
        .edit(EditRequest::new(target, fields(json!({"title": "x"}))))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
