use std::collections::HashMap;

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::entity::{CollectionKind, CollectionScope, Record};

/// Read cache of whole collections, keyed by scope.
///
/// Holds what the site last read from the backend. Every write path
/// invalidates the scope it touched so the next read goes back to storage.
///
/// Each invalidation bumps a generation counter. A reader takes
/// [`generation`](Self::generation) before fetching and hands it back to
/// [`insert`](Self::insert), which drops the result if the scope was
/// invalidated while the fetch was in flight.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: RwLock<HashMap<CollectionScope, Vec<Record>>>,
    generation: AtomicU64,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, scope: &CollectionScope) -> Option<Vec<Record>> {
        self.entries.read().await.get(scope).cloned()
    }

    /// Current invalidation generation. Take it before fetching from storage.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Caches `records` unless an invalidation happened since `generation`
    /// was taken. Returns whether the records were stored.
    pub async fn insert(
        &self,
        scope: CollectionScope,
        records: Vec<Record>,
        generation: u64,
    ) -> bool {
        let mut entries = self.entries.write().await;
        // Invalidations bump the counter under this lock.
        if self.generation() != generation {
            tracing::debug!(%scope, "Discarding collection read that raced an invalidation");
            return false;
        }
        entries.insert(scope, records);
        true
    }

    pub async fn invalidate(&self, scope: &CollectionScope) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        if entries.remove(scope).is_some() {
            tracing::debug!(%scope, "Invalidated cached collection");
        }
    }

    /// Drops every cached collection of `kind`, whatever its parent.
    pub async fn invalidate_kind(&self, kind: CollectionKind) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.retain(|scope, _| scope.kind() != kind);
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
