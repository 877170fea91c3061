//! Content persistence for Kindred.
//!
//! The [`ContentBackend`] trait is the typed contract every storage service
//! satisfies: read a collection in display order, write one item's position,
//! create, update and delete items. Everything above this module (repositories,
//! the reorder manager, the CMS editor) talks only to the trait.
//!
//! Implementations live in [`database`]: an in-memory store with JSON file
//! persistence, and a SQL store on SQLite or PostgreSQL.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::entity::{CollectionScope, Fields, ItemId, NewRecord, Position, Record};

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Storage contract for site content.
///
/// All methods are independent operations; there are no transactions spanning
/// several items. A reorder therefore issues one `write_position` per changed
/// item and may be partially applied if some of those writes fail.
///
/// Implementations must be `Send + Sync` so a single backend can be shared
/// behind an `Arc` by the web server, and implement `Any` for downcasting.
#[async_trait]
pub trait ContentBackend: Send + Sync + Any {
    /// Reads every item of a collection, sorted by position ascending.
    ///
    /// Ties (which only occur after racing writes) are broken by creation time
    /// and then id. An unknown or empty collection yields an empty list.
    async fn fetch_collection(&self, scope: &CollectionScope) -> Result<Vec<Record>>;

    /// Reads one item by id.
    ///
    /// # Errors
    /// `BackendError::ItemNotFound` if no item has this id.
    async fn get_item(&self, id: &ItemId) -> Result<Record>;

    /// Creates an item with the given initial position and returns it with its
    /// generated id and timestamps.
    async fn create_item(&self, new: NewRecord) -> Result<Record>;

    /// Sets the position of one item. Idempotent.
    ///
    /// # Errors
    /// `BackendError::ItemNotFound` if no item has this id.
    async fn write_position(&self, id: &ItemId, position: Position) -> Result<()>;

    /// Merges `fields` into an item's existing fields and returns the result.
    ///
    /// Keys present in `fields` overwrite stored values; a JSON `null` removes the key.
    async fn update_fields(&self, id: &ItemId, fields: Fields) -> Result<Record>;

    /// Deletes one item. Remaining items keep their positions.
    ///
    /// # Errors
    /// `BackendError::ItemNotFound` if no item has this id.
    async fn delete_item(&self, id: &ItemId) -> Result<()>;

    /// Number of items in a collection.
    async fn count(&self, scope: &CollectionScope) -> Result<usize> {
        Ok(self.fetch_collection(scope).await?.len())
    }

    /// Short label of the storage engine, used by health reporting.
    fn kind_label(&self) -> &'static str;

    /// Returns a reference to the backend as a dynamic `Any` type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Apply a field merge the way every backend does: overwrite keys, drop `null`s.
pub(crate) fn merge_fields(target: &mut Fields, update: Fields) {
    for (key, value) in update {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}
