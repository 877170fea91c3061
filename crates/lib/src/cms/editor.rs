use std::sync::Arc;

use serde_json::Value;

use super::{ContentCache, EditRequest, EditTarget};
use crate::Result;
use crate::backend::{BackendError, ContentBackend, merge_fields};
use crate::entity::{
    Activity, Album, CollectionKind, CollectionScope, Content, ContentError, DonationMethod,
    Event, Fields, HeroImage, ItemId, NewRecord, Photo, Position, Record, SiteText,
};

/// Check that `fields` still decode as the entity stored in `kind` collections.
fn validate_fields(kind: CollectionKind, fields: &Fields) -> std::result::Result<(), ContentError> {
    match kind {
        CollectionKind::HeroImages => HeroImage::from_fields(fields).map(drop),
        CollectionKind::Albums => Album::from_fields(fields).map(drop),
        CollectionKind::Photos => Photo::from_fields(fields).map(drop),
        CollectionKind::Activities => Activity::from_fields(fields).map(drop),
        CollectionKind::Events => Event::from_fields(fields).map(drop),
        CollectionKind::SiteTexts => SiteText::from_fields(fields).map(drop),
        CollectionKind::DonationMethods => DonationMethod::from_fields(fields).map(drop),
    }
}

/// Applies in-place edits and keeps the read cache honest.
#[derive(Clone)]
pub struct Editor {
    backend: Arc<dyn ContentBackend>,
    cache: Arc<ContentCache>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("backend", &self.backend.kind_label())
            .finish()
    }
}

impl Editor {
    pub fn new(backend: Arc<dyn ContentBackend>, cache: Arc<ContentCache>) -> Self {
        Self { backend, cache }
    }

    /// Persist one edit and return the stored record.
    ///
    /// The merged fields must still form a valid entity; otherwise nothing is
    /// written. Site texts that do not exist yet are created at the end of
    /// their collection. The edited scope is invalidated in the cache.
    ///
    /// # Errors
    /// * `BackendError::ItemNotFound` if the target item does not exist in the
    ///   target's collection.
    /// * `ContentError::FieldDecode` if the result would not be a valid entity.
    pub async fn apply(&self, request: EditRequest) -> Result<Record> {
        let scope = request.target.scope();
        let record = match &request.target {
            EditTarget::SiteText { key } => self.apply_site_text(key, request.fields).await?,
            EditTarget::Item { scope, id } => {
                self.apply_item(scope, id, request.fields).await?
            }
            EditTarget::AlbumCover { album } => {
                let mut update = Fields::new();
                let cover = request.fields.get("cover_url").cloned().unwrap_or(Value::Null);
                update.insert("cover_url".to_string(), cover);
                self.apply_item(&CollectionScope::albums(), album, update)
                    .await?
            }
        };
        self.cache.invalidate(&scope).await;
        tracing::info!(edit = %request.target, id = %record.id, "Applied edit");
        Ok(record)
    }

    async fn apply_item(
        &self,
        scope: &CollectionScope,
        id: &ItemId,
        update: Fields,
    ) -> Result<Record> {
        let current = self.backend.get_item(id).await?;
        if &current.scope != scope {
            return Err(BackendError::ItemNotFound { id: id.clone() }.into());
        }
        let mut merged = current.fields;
        merge_fields(&mut merged, update.clone());
        validate_fields(scope.kind(), &merged)?;
        self.backend.update_fields(id, update).await
    }

    async fn apply_site_text(&self, key: &str, mut update: Fields) -> Result<Record> {
        update.insert("key".to_string(), Value::String(key.to_string()));
        let scope = CollectionScope::site_texts();
        let texts = self.backend.fetch_collection(&scope).await?;

        let existing = texts
            .iter()
            .find(|record| record.fields.get("key").and_then(Value::as_str) == Some(key));
        match existing {
            Some(record) => self.apply_item(&scope, &record.id, update).await,
            None => {
                let mut fields = Fields::new();
                merge_fields(&mut fields, update);
                validate_fields(CollectionKind::SiteTexts, &fields)?;
                let new = NewRecord::new(scope, Position::from_index(texts.len()), fields);
                self.backend.create_item(new).await
            }
        }
    }
}
