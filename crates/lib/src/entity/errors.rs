//! Error types for the content model.

use thiserror::Error;

/// Errors raised while building scopes or converting between typed content and stored fields.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ContentError {
    /// The collection kind and parent combination is not valid.
    #[error("Invalid scope for collection {kind}: {reason}")]
    InvalidScope {
        /// Storage name of the collection
        kind: String,
        /// Why the scope was rejected
        reason: String,
    },

    /// Unknown collection name.
    #[error("Unknown collection: {name}")]
    UnknownCollection { name: String },

    /// Stored fields could not be decoded into the typed entity.
    #[error("Failed to decode {kind} fields")]
    FieldDecode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// Typed entity could not be encoded into a field map.
    #[error("Failed to encode {kind} fields")]
    FieldEncode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// An edit target string could not be parsed.
    #[error("Invalid edit target: {target}")]
    InvalidTarget { target: String },

    /// A record was asked for as the wrong entity type.
    #[error("Record {id} belongs to {actual}, expected {expected}")]
    KindMismatch {
        id: String,
        expected: String,
        actual: String,
    },
}

impl ContentError {
    /// Check if this error is caused by bad caller input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ContentError::InvalidScope { .. }
                | ContentError::UnknownCollection { .. }
                | ContentError::InvalidTarget { .. }
                | ContentError::KindMismatch { .. }
        )
    }

    /// Check if this error is a (de)serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            ContentError::FieldDecode { .. } | ContentError::FieldEncode { .. }
        )
    }
}

impl From<ContentError> for crate::Error {
    fn from(err: ContentError) -> Self {
        crate::Error::Content(err)
    }
}
