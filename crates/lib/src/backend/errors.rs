//! Error types for content backends.

use thiserror::Error;

use crate::entity::ItemId;

/// Errors that can occur during backend operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Item not found by ID.
    #[error("Item not found: {id}")]
    ItemNotFound {
        /// The ID of the item that was not found
        id: ItemId,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// A stored row could not be mapped back into a record.
    #[error("Corrupt stored item {id}: {reason}")]
    CorruptItem { id: String, reason: String },

    /// SQL database error.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Description of what was being attempted
        reason: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// The storage service could not be reached or refused the request.
    #[error("Backend unavailable: {reason}")]
    Unavailable { reason: String },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::ItemNotFound { .. })
    }

    /// Check if this error is related to I/O or encoding.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error is transient: retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Unavailable { .. } => true,
            #[cfg(any(feature = "sqlite", feature = "postgres"))]
            BackendError::SqlxError { .. } => true,
            _ => false,
        }
    }

    /// Get the item ID if this error is about a specific item.
    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            BackendError::ItemNotFound { id } => Some(id),
            _ => None,
        }
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
