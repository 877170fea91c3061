//! In-memory content backend
//!
//! Suitable for tests, development and small deployments where the whole site
//! fits in memory and is saved to a JSON file on shutdown.

mod persistence;

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{ContentBackend, merge_fields};
use crate::clock::{Clock, SystemClock};
use crate::entity::{CollectionScope, Fields, ItemId, NewRecord, Position, Record, sort_records};

/// A `HashMap`-backed content store.
///
/// Persistence is explicit: call [`InMemory::save_to_file`] to write the whole
/// state as JSON and [`InMemory::load_from_file`] to restore it.
#[derive(Debug)]
pub struct InMemory {
    pub(crate) records: RwLock<HashMap<ItemId, Record>>,
    clock: Arc<dyn Clock>,
}

impl InMemory {
    /// Creates a new, empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a new, empty store stamping records with the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the IDs of every stored item.
    pub async fn all_ids(&self) -> Vec<ItemId> {
        self.records.read().await.keys().cloned().collect()
    }

    /// Saves every record to a JSON file.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads records from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentBackend for InMemory {
    async fn fetch_collection(&self, scope: &CollectionScope) -> Result<Vec<Record>> {
        let records = self.records.read().await;
        let mut items: Vec<Record> = records
            .values()
            .filter(|r| &r.scope == scope)
            .cloned()
            .collect();
        sort_records(&mut items);
        tracing::debug!(%scope, count = items.len(), "Fetched collection");
        Ok(items)
    }

    async fn get_item(&self, id: &ItemId) -> Result<Record> {
        let records = self.records.read().await;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::ItemNotFound { id: id.clone() }.into())
    }

    async fn create_item(&self, new: NewRecord) -> Result<Record> {
        let now = self.clock.now_millis();
        let record = Record {
            id: ItemId::generate(),
            scope: new.scope,
            position: new.position,
            fields: new.fields,
            created_at: now,
            updated_at: now,
        };
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        tracing::info!(id = %record.id, scope = %record.scope, position = %record.position, "Created item");
        Ok(record)
    }

    async fn write_position(&self, id: &ItemId, position: Position) -> Result<()> {
        let now = self.clock.now_millis();
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| BackendError::ItemNotFound { id: id.clone() })?;
        record.position = position;
        record.updated_at = now;
        Ok(())
    }

    async fn update_fields(&self, id: &ItemId, fields: Fields) -> Result<Record> {
        let now = self.clock.now_millis();
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| BackendError::ItemNotFound { id: id.clone() })?;
        merge_fields(&mut record.fields, fields);
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        match self.records.write().await.remove(id) {
            Some(record) => {
                tracing::info!(%id, scope = %record.scope, "Deleted item");
                Ok(())
            }
            None => Err(BackendError::ItemNotFound { id: id.clone() }.into()),
        }
    }

    async fn count(&self, scope: &CollectionScope) -> Result<usize> {
        let records = self.records.read().await;
        Ok(records.values().filter(|r| &r.scope == scope).count())
    }

    fn kind_label(&self) -> &'static str {
        "inmemory"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
