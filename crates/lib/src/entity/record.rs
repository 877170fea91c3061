//! The storage shape every backend persists.

use serde::{Deserialize, Serialize};

use super::{CollectionScope, ItemId, Position};

/// Untyped field map of a stored item.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A stored item: identity, collection membership, rank and content fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: ItemId,
    pub scope: CollectionScope,
    pub position: Position,
    #[serde(default)]
    pub fields: Fields,
    /// Milliseconds since Unix epoch.
    pub created_at: u64,
    /// Milliseconds since Unix epoch.
    pub updated_at: u64,
}

/// Input for creating a record. The backend assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub scope: CollectionScope,
    pub position: Position,
    pub fields: Fields,
}

impl NewRecord {
    pub fn new(scope: CollectionScope, position: Position, fields: Fields) -> Self {
        Self {
            scope,
            position,
            fields,
        }
    }
}

/// Sort records into display order.
///
/// Ascending position, with creation time and then id breaking ties so the
/// order is total even when concurrent writes produced duplicate positions.
pub fn sort_records(records: &mut [Record]) {
    records.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then(a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
