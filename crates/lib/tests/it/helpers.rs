use std::any::Any;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use kindred::{
    CollectionScope, ItemId, Position, Result, ReorderManager, Site,
    assets::InMemoryAssets,
    backend::{BackendError, ContentBackend, database::InMemory},
    entity::{Album, Fields, HeroImage, NewRecord, Record},
    notify::NotificationLog,
};

// ==========================
// CORE TEST FACTORIES
// ==========================

/// Creates a test backend based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Panics
/// Panics if the requested backend's feature is not enabled.
///
/// # Example
/// ```bash
/// # Run tests with SQLite
/// TEST_BACKEND=sqlite cargo test --features sqlite
///
/// # Run tests with PostgreSQL
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/kindred_test" \
///   cargo test --features postgres
/// ```
pub async fn test_backend() -> Arc<dyn ContentBackend> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use kindred::backend::database::Sqlite;
                Arc::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use kindred::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/kindred_test".to_string());
                Arc::new(
                    Postgres::connect_postgres_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Arc::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// A Site over the test backend with in-memory assets and a drainable notification log.
pub struct TestSite {
    pub site: Site,
    pub assets: Arc<InMemoryAssets>,
    pub log: Arc<NotificationLog>,
}

pub async fn test_site() -> TestSite {
    site_over(test_backend().await)
}

pub fn site_over(backend: Arc<dyn ContentBackend>) -> TestSite {
    let assets = Arc::new(InMemoryAssets::new());
    let log = Arc::new(NotificationLog::new());
    let site = Site::new(backend, assets.clone(), log.clone());
    TestSite { site, assets, log }
}

pub fn album(title: &str) -> Album {
    Album {
        title: title.to_string(),
        description: String::new(),
        cover_url: None,
    }
}

pub fn hero(name: &str) -> HeroImage {
    HeroImage {
        image_url: format!("/assets/hero/{name}.jpg"),
        alt_text: name.to_string(),
        caption: String::new(),
    }
}

/// Loads a manager over `backend` and appends one album per title.
pub async fn albums_manager(
    backend: Arc<dyn ContentBackend>,
    log: Arc<NotificationLog>,
    titles: &[&str],
) -> ReorderManager<Album> {
    let mut manager = ReorderManager::load(backend, log, CollectionScope::albums())
        .await
        .expect("Failed to load albums");
    for title in titles {
        manager
            .append(album(title))
            .await
            .expect("Failed to append album");
    }
    manager
}

pub fn titles(manager: &ReorderManager<Album>) -> Vec<String> {
    manager
        .items()
        .iter()
        .map(|item| item.content.title.clone())
        .collect()
}

pub fn positions(manager: &ReorderManager<Album>) -> Vec<u32> {
    manager
        .items()
        .iter()
        .map(|item| item.position.get())
        .collect()
}

/// Titles of the persisted albums in stored position order.
pub async fn stored_titles(backend: &dyn ContentBackend) -> Vec<String> {
    backend
        .fetch_collection(&CollectionScope::albums())
        .await
        .expect("Failed to fetch albums")
        .into_iter()
        .map(|record| {
            record.fields["title"]
                .as_str()
                .expect("title is a string")
                .to_string()
        })
        .collect()
}

// ==========================
// FAULT INJECTION
// ==========================

/// Backend wrapper that can be told to fail reads or position writes.
#[derive(Debug)]
pub struct FlakyBackend {
    inner: InMemory,
    fail_reads: AtomicBool,
    fail_all_writes: AtomicBool,
    failing_ids: Mutex<HashSet<ItemId>>,
    position_writes: AtomicUsize,
}

#[allow(dead_code)]
impl FlakyBackend {
    pub fn new() -> Self {
        Self {
            inner: InMemory::new(),
            fail_reads: AtomicBool::new(false),
            fail_all_writes: AtomicBool::new(false),
            failing_ids: Mutex::new(HashSet::new()),
            position_writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_all_writes(&self, fail: bool) {
        self.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    /// Make position writes of `id` fail.
    pub fn fail_writes_for(&self, id: &ItemId) {
        self.failing_ids.lock().unwrap().insert(id.clone());
    }

    /// Number of `write_position` calls seen, failed or not.
    pub fn position_writes(&self) -> usize {
        self.position_writes.load(Ordering::SeqCst)
    }

    fn unavailable() -> kindred::Error {
        BackendError::Unavailable {
            reason: "injected failure".to_string(),
        }
        .into()
    }
}

#[async_trait]
impl ContentBackend for FlakyBackend {
    async fn fetch_collection(&self, scope: &CollectionScope) -> Result<Vec<Record>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.fetch_collection(scope).await
    }

    async fn get_item(&self, id: &ItemId) -> Result<Record> {
        self.inner.get_item(id).await
    }

    async fn create_item(&self, new: NewRecord) -> Result<Record> {
        self.inner.create_item(new).await
    }

    async fn write_position(&self, id: &ItemId, position: Position) -> Result<()> {
        self.position_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_all_writes.load(Ordering::SeqCst)
            || self.failing_ids.lock().unwrap().contains(id)
        {
            return Err(Self::unavailable());
        }
        self.inner.write_position(id, position).await
    }

    async fn update_fields(&self, id: &ItemId, fields: Fields) -> Result<Record> {
        self.inner.update_fields(id, fields).await
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        self.inner.delete_item(id).await
    }

    fn kind_label(&self) -> &'static str {
        "flaky"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Backend wrapper whose next collection read stops after reading, until released.
#[derive(Debug, Default)]
pub struct ParkedReads {
    inner: InMemory,
    park_next: AtomicBool,
    parked: Notify,
    release: Notify,
}

#[allow(dead_code)]
impl ParkedReads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park the next `fetch_collection` once it has read from storage.
    pub fn park_next_read(&self) {
        self.park_next.store(true, Ordering::SeqCst);
    }

    /// Wait until a read is parked.
    pub async fn wait_parked(&self) {
        self.parked.notified().await;
    }

    /// Let the parked read return what it read.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl ContentBackend for ParkedReads {
    async fn fetch_collection(&self, scope: &CollectionScope) -> Result<Vec<Record>> {
        let records = self.inner.fetch_collection(scope).await;
        if self.park_next.swap(false, Ordering::SeqCst) {
            self.parked.notify_one();
            self.release.notified().await;
        }
        records
    }

    async fn get_item(&self, id: &ItemId) -> Result<Record> {
        self.inner.get_item(id).await
    }

    async fn create_item(&self, new: NewRecord) -> Result<Record> {
        self.inner.create_item(new).await
    }

    async fn write_position(&self, id: &ItemId, position: Position) -> Result<()> {
        self.inner.write_position(id, position).await
    }

    async fn update_fields(&self, id: &ItemId, fields: Fields) -> Result<Record> {
        self.inner.update_fields(id, fields).await
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        self.inner.delete_item(id).await
    }

    fn kind_label(&self) -> &'static str {
        "parked"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
