//! Error types for reordering.

use thiserror::Error;

use crate::entity::ItemId;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ReorderError {
    /// A drag referenced an item that is not part of the list being reordered.
    #[error("Item {id} is not in this collection")]
    NotInCollection { id: ItemId },
}

impl ReorderError {
    pub fn is_not_in_collection(&self) -> bool {
        matches!(self, ReorderError::NotInCollection { .. })
    }

    /// The id the failing drag referenced.
    pub fn item_id(&self) -> &ItemId {
        match self {
            ReorderError::NotInCollection { id } => id,
        }
    }
}

impl From<ReorderError> for crate::Error {
    fn from(err: ReorderError) -> Self {
        crate::Error::Reorder(err)
    }
}
