//! Drag-and-drop reordering with optimistic local updates.
//!
//! A [`ReorderManager`] owns the in-memory copy of one collection. Dropping an
//! item onto another relocates it in that copy immediately, renumbers every
//! item to its new index and hands back a [`PendingReorder`] holding one
//! position write per item whose position actually changed.
//!
//! Persisting is fire-and-forget from the caller's point of view: the writes
//! run concurrently, are never cancelled, and failures are reported through the
//! [`Notifier`] without rolling the local order back. Calling
//! [`ReorderManager::refresh`] reconciles the local copy with storage.
//!
//! ```
//! use kindred::reorder::move_item;
//!
//! let mut list = vec!["A", "B", "C"];
//! assert!(move_item(&mut list, 0, 2));
//! assert_eq!(list, ["B", "C", "A"]);
//! ```

mod errors;

use std::sync::Arc;

use futures::future::join_all;

pub use errors::ReorderError;

use crate::Result;
use crate::backend::ContentBackend;
use crate::cms::ContentCache;
use crate::entity::{CollectionScope, Content, Item, ItemId, Position};
use crate::notify::{Notification, Notifier};
use crate::repository::Repository;

/// Relocate the element at `from` so that it ends up at index `to`.
///
/// This is a single-element move, not a swap: elements between the two
/// indices shift by one. Returns `false` and leaves `items` untouched when the
/// move is a no-op (`from == to`, fewer than two elements, or an index out of range).
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if items.len() < 2 || from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Outcome of persisting one reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderReport {
    /// Number of position writes issued.
    pub attempted: usize,
    /// Writes that failed, with the error message.
    pub failed: Vec<(ItemId, String)>,
}

impl ReorderReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed.len()
    }
}

/// Position writes produced by one drop, not yet sent to storage.
///
/// Owns everything it needs, so it can be moved into a spawned task.
#[must_use = "a reorder is not saved until `persist` is awaited"]
pub struct PendingReorder {
    scope: CollectionScope,
    writes: Vec<(ItemId, Position)>,
    backend: Arc<dyn ContentBackend>,
    notifier: Arc<dyn Notifier>,
    cache: Option<Arc<ContentCache>>,
}

impl std::fmt::Debug for PendingReorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingReorder")
            .field("scope", &self.scope)
            .field("writes", &self.writes)
            .field("backend", &self.backend.kind_label())
            .finish()
    }
}

impl PendingReorder {
    pub fn scope(&self) -> &CollectionScope {
        &self.scope
    }

    /// The `(id, new position)` pairs that will be written.
    pub fn writes(&self) -> &[(ItemId, Position)] {
        &self.writes
    }

    /// Issue every write concurrently and wait for all of them.
    ///
    /// Never fails: a batch with at least one failed write produces exactly one
    /// error notification and is described in the returned report.
    pub async fn persist(self) -> ReorderReport {
        let attempted = self.writes.len();
        if attempted == 0 {
            return ReorderReport::default();
        }

        let backend = &self.backend;
        let results = join_all(self.writes.iter().map(|(id, position)| async move {
            (id, backend.write_position(id, *position).await)
        }))
        .await;

        let failed: Vec<(ItemId, String)> = results
            .into_iter()
            .filter_map(|(id, result)| {
                result.err().map(|e| {
                    tracing::warn!(%id, error = %e, "Position write failed");
                    (id.clone(), e.to_string())
                })
            })
            .collect();

        if let Some(cache) = &self.cache {
            cache.invalidate(&self.scope).await;
        }

        if failed.is_empty() {
            tracing::info!(scope = %self.scope, writes = attempted, "Saved new order");
        } else {
            self.notifier.notify(Notification::error(format!(
                "The new order of {} was not fully saved ({} of {} changes failed). Reload to see the saved order.",
                self.scope,
                failed.len(),
                attempted
            )));
        }

        ReorderReport { attempted, failed }
    }
}

/// Optimistic reorder state for one collection.
///
/// Mutation takes `&mut self`, so drops on one list are applied one after
/// another. Separate lists use separate managers and do not interact.
#[derive(Debug)]
pub struct ReorderManager<T: Content> {
    repository: Repository<T>,
    notifier: Arc<dyn Notifier>,
    cache: Option<Arc<ContentCache>>,
    items: Vec<Item<T>>,
}

impl<T: Content> ReorderManager<T> {
    /// Build a manager for `scope` and read its current order from storage.
    pub async fn load(
        backend: Arc<dyn ContentBackend>,
        notifier: Arc<dyn Notifier>,
        scope: CollectionScope,
    ) -> Result<Self> {
        let mut manager = Self {
            repository: Repository::new(backend, scope)?,
            notifier,
            cache: None,
            items: Vec::new(),
        };
        manager.refresh().await?;
        Ok(manager)
    }

    /// Invalidate `cache` for this scope whenever this manager writes.
    pub fn with_cache(mut self, cache: Arc<ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the local list with what storage currently holds.
    ///
    /// On a read failure the list is left empty, a notification is emitted and
    /// the error is returned.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.repository.list().await {
            Ok(items) => {
                tracing::debug!(scope = %self.scope(), count = items.len(), "Loaded collection");
                self.items = items;
                Ok(())
            }
            Err(e) => {
                self.items.clear();
                self.notifier.notify(Notification::error(format!(
                    "Could not load {}: {e}",
                    self.scope()
                )));
                Err(e)
            }
        }
    }

    pub fn scope(&self) -> &CollectionScope {
        self.repository.scope()
    }

    pub fn items(&self) -> &[Item<T>] {
        &self.items
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn index_of(&self, id: &ItemId) -> Result<usize> {
        self.items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| ReorderError::NotInCollection { id: id.clone() }.into())
    }

    /// Apply a drop of `source` onto `target` to the local list.
    ///
    /// Returns `Ok(None)` when nothing moves (same item, or fewer than two
    /// items). Otherwise the local list is already reordered and renumbered
    /// when this returns, and the writes still have to be persisted.
    ///
    /// # Errors
    /// `ReorderError::NotInCollection` if either id is not in this list. The
    /// local list is unchanged.
    pub fn plan_drop(
        &mut self,
        source: &ItemId,
        target: &ItemId,
    ) -> Result<Option<PendingReorder>> {
        if self.items.len() < 2 {
            return Ok(None);
        }
        let from = self.index_of(source)?;
        let to = self.index_of(target)?;
        if !move_item(&mut self.items, from, to) {
            return Ok(None);
        }

        let mut writes = Vec::new();
        for (index, item) in self.items.iter_mut().enumerate() {
            let position = Position::from_index(index);
            if item.position != position {
                item.position = position;
                writes.push((item.id.clone(), position));
            }
        }

        tracing::debug!(scope = %self.scope(), %source, %target, writes = writes.len(), "Planned reorder");
        Ok(Some(PendingReorder {
            scope: self.scope().clone(),
            writes,
            backend: Arc::clone(self.repository.backend()),
            notifier: Arc::clone(&self.notifier),
            cache: self.cache.clone(),
        }))
    }

    /// Drop `source` onto `target` and wait for the writes.
    pub async fn drop_item(&mut self, source: &ItemId, target: &ItemId) -> Result<ReorderReport> {
        match self.plan_drop(source, target)? {
            Some(pending) => Ok(pending.persist().await),
            None => Ok(ReorderReport::default()),
        }
    }

    /// Create a new item at the end of the list.
    pub async fn append(&mut self, content: T) -> Result<&Item<T>> {
        let position = Position::from_index(self.items.len());
        let item = self.repository.insert_at(content, position).await?;
        self.invalidate_cache().await;
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Delete an item. The others keep their positions.
    pub async fn remove(&mut self, id: &ItemId) -> Result<()> {
        let index = self.index_of(id)?;
        self.repository.delete(id).await?;
        self.invalidate_cache().await;
        self.items.remove(index);
        Ok(())
    }

    async fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate(self.scope()).await;
        }
    }
}
