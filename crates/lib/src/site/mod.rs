//! The site facade.
//!
//! [`Site`] is what the web layer holds: it owns the backend, the asset store,
//! the notifier and the read cache, and exposes page-level reads and the admin
//! write flows on top of them.
//!
//! Failures follow three rules:
//! * a collection that cannot be read renders as empty and emits a notification;
//! * a failed write emits a notification and returns the error;
//! * a failed upload aborts the save that depended on it.

mod pages;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use pages::{AlbumPage, HomePage};

use crate::Result;
use crate::assets::AssetStore;
use crate::backend::{BackendError, ContentBackend};
use crate::clock::{Clock, SystemClock};
use crate::cms::{ContentCache, EditRequest, EditTarget, Editor};
use crate::constants::{COVERS_FOLDER, HERO_FOLDER, PHOTOS_FOLDER};
use crate::entity::{
    Activity, Album, CollectionKind, CollectionScope, Content, DonationMethod, Event, Fields,
    HeroImage, Item, ItemId, Photo, Record, SiteText,
};
use crate::notify::{Notification, Notifier};
use crate::reorder::ReorderManager;
use crate::repository::Repository;

/// Field names that hold asset URLs owned by a record.
const ASSET_FIELDS: &[&str] = &["image_url", "cover_url"];

fn asset_urls(record: &Record) -> Vec<String> {
    ASSET_FIELDS
        .iter()
        .filter_map(|field| record.fields.get(*field)?.as_str())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct Site {
    backend: Arc<dyn ContentBackend>,
    assets: Arc<dyn AssetStore>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<ContentCache>,
    clock: Arc<dyn Clock>,
    editor: Editor,
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("backend", &self.backend.kind_label())
            .field("clock", &self.clock)
            .finish()
    }
}

impl Site {
    pub fn new(
        backend: Arc<dyn ContentBackend>,
        assets: Arc<dyn AssetStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = Arc::new(ContentCache::new());
        Self {
            editor: Editor::new(Arc::clone(&backend), Arc::clone(&cache)),
            backend,
            assets,
            notifier,
            cache,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for "now" (upcoming events on the home page).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backend(&self) -> &Arc<dyn ContentBackend> {
        &self.backend
    }

    pub fn assets(&self) -> &Arc<dyn AssetStore> {
        &self.assets
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    fn repository<T: Content>(&self, scope: CollectionScope) -> Result<Repository<T>> {
        Repository::new(Arc::clone(&self.backend), scope)
    }

    /// Emit a notification for a failed write and pass the result through.
    fn report<T>(&self, action: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::warn!(action, error = %e, "Site write failed");
            self.notifier
                .notify(Notification::error(format!("Could not {action}: {e}")));
        }
        result
    }

    // --- Reads ---

    /// Records of `scope` in display order, through the cache.
    async fn records(&self, scope: &CollectionScope) -> Result<Vec<Record>> {
        if let Some(records) = self.cache.get(scope).await {
            return Ok(records);
        }
        let generation = self.cache.generation();
        let records = self.backend.fetch_collection(scope).await?;
        self.cache
            .insert(scope.clone(), records.clone(), generation)
            .await;
        Ok(records)
    }

    /// Typed read of one collection. Read failures yield an empty list and a
    /// notification; records that do not decode are skipped.
    async fn read<T: Content>(&self, scope: CollectionScope) -> Vec<Item<T>> {
        match self.records(&scope).await {
            Ok(records) => records
                .iter()
                .filter_map(|record| match Item::from_record(record) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        tracing::warn!(id = %record.id, error = %e, "Skipping undecodable record");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                tracing::warn!(%scope, error = %e, "Collection read failed");
                self.notifier.notify(Notification::error(format!(
                    "Could not load {scope}. Reload the page to try again."
                )));
                Vec::new()
            }
        }
    }

    pub async fn hero_images(&self) -> Vec<Item<HeroImage>> {
        self.read(CollectionScope::hero_images()).await
    }

    pub async fn albums(&self) -> Vec<Item<Album>> {
        self.read(CollectionScope::albums()).await
    }

    pub async fn photos(&self, album: &ItemId) -> Vec<Item<Photo>> {
        self.read(CollectionScope::photos(album.clone())).await
    }

    pub async fn activities(&self) -> Vec<Item<Activity>> {
        self.read(CollectionScope::activities()).await
    }

    pub async fn events(&self) -> Vec<Item<Event>> {
        self.read(CollectionScope::events()).await
    }

    /// Events starting at or after `now`, soonest first.
    pub async fn upcoming_events(&self, now: DateTime<Utc>) -> Vec<Item<Event>> {
        let mut events: Vec<_> = self
            .events()
            .await
            .into_iter()
            .filter(|event| event.content.starts_at >= now)
            .collect();
        events.sort_by_key(|event| event.content.starts_at);
        events
    }

    pub async fn donation_methods(&self) -> Vec<Item<DonationMethod>> {
        self.read(CollectionScope::donation_methods()).await
    }

    pub async fn site_texts(&self) -> Vec<Item<SiteText>> {
        self.read(CollectionScope::site_texts()).await
    }

    pub async fn site_text(&self, key: &str) -> Option<String> {
        self.site_texts()
            .await
            .into_iter()
            .find(|text| text.content.key == key)
            .map(|text| text.content.value)
    }

    pub async fn home_page(&self) -> HomePage {
        HomePage {
            hero_images: self.hero_images().await,
            texts: self
                .site_texts()
                .await
                .into_iter()
                .map(|text| (text.content.key, text.content.value))
                .collect(),
            activities: self.activities().await,
            upcoming_events: self.upcoming_events(self.clock.now_utc()).await,
            albums: self.albums().await,
            donation_methods: self.donation_methods().await,
        }
    }

    /// The album and its photos, or `None` if there is no such album.
    pub async fn album_page(&self, id: &ItemId) -> Option<AlbumPage> {
        let album = self.albums().await.into_iter().find(|album| &album.id == id)?;
        let photos = self.photos(id).await;
        Some(AlbumPage { album, photos })
    }

    // --- Writes ---

    /// Upload a file; a failure is reported and aborts the caller's save.
    async fn upload(&self, bytes: Vec<u8>, folder: &str, file_name: &str) -> Result<String> {
        let result = self.assets.upload_asset(bytes, folder, file_name).await;
        if let Err(e) = &result {
            tracing::warn!(folder, file_name, error = %e, "Upload failed");
            self.notifier.notify(Notification::error(format!(
                "Upload of {file_name} failed, nothing was saved: {e}"
            )));
        }
        result
    }

    /// Delete an asset whose record is gone. Failures are only logged.
    async fn discard_asset(&self, url: &str) {
        if let Err(e) = self.assets.delete_asset(url).await {
            tracing::warn!(url, error = %e, "Could not delete asset");
        }
    }

    async fn create<T: Content>(&self, scope: CollectionScope, content: T) -> Result<Item<T>> {
        let result = async {
            let item = self.repository::<T>(scope.clone())?.insert(content).await?;
            self.cache.invalidate(&scope).await;
            Ok::<_, crate::Error>(item)
        }
        .await;
        self.report(&format!("add to {scope}"), result)
    }

    pub async fn add_hero_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        alt_text: &str,
    ) -> Result<Item<HeroImage>> {
        let image_url = self.upload(bytes, HERO_FOLDER, file_name).await?;
        let image = HeroImage {
            image_url,
            alt_text: alt_text.to_string(),
            caption: String::new(),
        };
        self.create(CollectionScope::hero_images(), image).await
    }

    pub async fn add_photo(
        &self,
        album: &ItemId,
        bytes: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<Item<Photo>> {
        let exists = self
            .repository::<Album>(CollectionScope::albums())?
            .get(album)
            .await
            .map(drop);
        self.report("add a photo", exists)?;

        let image_url = self.upload(bytes, PHOTOS_FOLDER, file_name).await?;
        let photo = Photo {
            image_url,
            caption: caption.to_string(),
        };
        self.create(CollectionScope::photos(album.clone()), photo)
            .await
    }

    /// Upload a new cover for `album`. The previous cover file is deleted.
    pub async fn set_album_cover(
        &self,
        album: &ItemId,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<Item<Album>> {
        let albums = self.repository::<Album>(CollectionScope::albums())?;
        let current = self.report("change the album cover", albums.get(album).await)?;

        let cover_url = self.upload(bytes, COVERS_FOLDER, file_name).await?;
        let mut fields = Fields::new();
        fields.insert("cover_url".to_string(), cover_url.into());
        let target = EditTarget::AlbumCover {
            album: album.clone(),
        };
        let record = self
            .report(
                "change the album cover",
                self.editor.apply(EditRequest::new(target, fields)).await,
            )?;

        if let Some(old) = current.content.cover_url {
            self.discard_asset(&old).await;
        }
        Ok(Item::from_record(&record)?)
    }

    pub async fn create_album(&self, album: Album) -> Result<Item<Album>> {
        self.create(CollectionScope::albums(), album).await
    }

    pub async fn create_activity(&self, activity: Activity) -> Result<Item<Activity>> {
        self.create(CollectionScope::activities(), activity).await
    }

    pub async fn create_event(&self, event: Event) -> Result<Item<Event>> {
        self.create(CollectionScope::events(), event).await
    }

    pub async fn create_donation_method(
        &self,
        method: DonationMethod,
    ) -> Result<Item<DonationMethod>> {
        self.create(CollectionScope::donation_methods(), method)
            .await
    }

    /// Apply an in-place edit from the visual CMS.
    pub async fn edit(&self, request: EditRequest) -> Result<Record> {
        let action = format!("save {}", request.target);
        let result = self.editor.apply(request).await;
        self.report(&action, result)
    }

    /// Delete one item and the asset it owns. Albums take their photos with them.
    pub async fn remove_item(&self, scope: &CollectionScope, id: &ItemId) -> Result<()> {
        if scope.kind() == CollectionKind::Albums {
            return self.remove_album(id).await;
        }
        let result = self.delete_record(scope, id).await;
        self.report(&format!("delete from {scope}"), result)
    }

    async fn delete_record(&self, scope: &CollectionScope, id: &ItemId) -> Result<()> {
        let record = self.backend.get_item(id).await?;
        if &record.scope != scope {
            return Err(BackendError::ItemNotFound { id: id.clone() }.into());
        }
        self.backend.delete_item(id).await?;
        self.cache.invalidate(scope).await;
        for url in asset_urls(&record) {
            self.discard_asset(&url).await;
        }
        Ok(())
    }

    /// Delete an album, every photo in it and their files.
    pub async fn remove_album(&self, id: &ItemId) -> Result<()> {
        let result = async {
            let photos = CollectionScope::photos(id.clone());
            for record in self.backend.fetch_collection(&photos).await? {
                self.delete_record(&photos, &record.id).await?;
            }
            self.delete_record(&CollectionScope::albums(), id).await?;
            tracing::info!(album = %id, "Removed album");
            Ok::<_, crate::Error>(())
        }
        .await;
        self.report("delete the album", result)
    }

    /// A reorder manager for `scope`, loaded with its current order.
    ///
    /// Writes made through the manager invalidate the cached scope.
    pub async fn reorder_manager<T: Content>(
        &self,
        scope: CollectionScope,
    ) -> Result<ReorderManager<T>> {
        let manager = ReorderManager::load(
            Arc::clone(&self.backend),
            Arc::clone(&self.notifier),
            scope,
        )
        .await?;
        Ok(manager.with_cache(Arc::clone(&self.cache)))
    }
}
