//! Typed access to one collection.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::Result;
use crate::backend::{BackendError, ContentBackend};
use crate::entity::{
    CollectionScope, Content, ContentError, Item, ItemId, NewRecord, Position, Record,
};

/// A typed view of a single collection.
///
/// `Repository` converts between a [`Content`] type and the untyped records a
/// [`ContentBackend`] stores, and checks that every record it touches belongs to
/// its collection.
///
/// # Type Parameters
/// - `T`: The entity stored in the collection. `T::KIND` must match the scope's kind.
pub struct Repository<T: Content> {
    backend: Arc<dyn ContentBackend>,
    scope: CollectionScope,
    phantom: PhantomData<T>,
}

impl<T: Content> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            scope: self.scope.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T: Content> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("scope", &self.scope)
            .field("backend", &self.backend.kind_label())
            .finish()
    }
}

impl<T: Content> Repository<T> {
    /// Creates a repository over `scope`.
    ///
    /// # Errors
    /// `ContentError::KindMismatch` if `scope` is not a collection of `T`.
    pub fn new(backend: Arc<dyn ContentBackend>, scope: CollectionScope) -> Result<Self> {
        if scope.kind() != T::KIND {
            return Err(ContentError::KindMismatch {
                id: scope.to_string(),
                expected: T::KIND.to_string(),
                actual: scope.kind().to_string(),
            }
            .into());
        }
        Ok(Self {
            backend,
            scope,
            phantom: PhantomData,
        })
    }

    pub fn scope(&self) -> &CollectionScope {
        &self.scope
    }

    pub fn backend(&self) -> &Arc<dyn ContentBackend> {
        &self.backend
    }

    /// Every item of the collection in display order.
    ///
    /// Records whose fields do not decode as `T` are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<Item<T>>> {
        let records = self.backend.fetch_collection(&self.scope).await?;
        Ok(records
            .iter()
            .filter_map(|record| match Item::from_record(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(id = %record.id, error = %e, "Skipping undecodable record");
                    None
                }
            })
            .collect())
    }

    /// Retrieves one item by id.
    ///
    /// # Errors
    /// * `BackendError::ItemNotFound` if the id is unknown, or belongs to another collection.
    /// * `ContentError::FieldDecode` if the stored fields do not decode as `T`.
    pub async fn get(&self, id: &ItemId) -> Result<Item<T>> {
        let record = self.get_record(id).await?;
        Ok(Item::from_record(&record)?)
    }

    async fn get_record(&self, id: &ItemId) -> Result<Record> {
        let record = self.backend.get_item(id).await?;
        if record.scope != self.scope {
            return Err(BackendError::ItemNotFound { id: id.clone() }.into());
        }
        Ok(record)
    }

    /// Appends `content` to the end of the collection.
    ///
    /// The new item's position is the current collection size.
    pub async fn insert(&self, content: T) -> Result<Item<T>> {
        let size = self.backend.count(&self.scope).await?;
        self.insert_at(content, Position::from_index(size)).await
    }

    /// Creates an item with an explicit initial position.
    pub async fn insert_at(&self, content: T, position: Position) -> Result<Item<T>> {
        let fields = content.to_fields()?;
        let record = self
            .backend
            .create_item(NewRecord::new(self.scope.clone(), position, fields))
            .await?;
        Ok(Item {
            id: record.id,
            position: record.position,
            content,
        })
    }

    /// Replaces the content of an existing item, keeping its position.
    pub async fn set(&self, id: &ItemId, content: T) -> Result<Item<T>> {
        let current = self.get_record(id).await?;
        let mut update = content.to_fields()?;
        // Fields the new content leaves out (cleared options) are removed.
        for key in current.fields.keys() {
            if !update.contains_key(key) {
                update.insert(key.clone(), serde_json::Value::Null);
            }
        }
        let record = self.backend.update_fields(id, update).await?;
        Ok(Item::from_record(&record)?)
    }

    /// Deletes an item. Other items keep their positions.
    pub async fn delete(&self, id: &ItemId) -> Result<()> {
        self.get_record(id).await?;
        self.backend.delete_item(id).await
    }

    /// Items whose content matches `query`, in display order.
    pub async fn search(&self, query: impl Fn(&T) -> bool) -> Result<Vec<Item<T>>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|item| query(&item.content))
            .collect())
    }
}
