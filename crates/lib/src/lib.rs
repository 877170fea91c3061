//!
//! Kindred: content engine for a small donation/NGO website with an embedded visual CMS.
//!
//! ## Core Concepts
//!
//! * **Records (`entity::Record`)**: Every piece of site content is stored as a record with a
//!   stable id, a `position` inside its collection and a JSON field map.
//! * **Collections (`entity::CollectionScope`)**: Ordered lists of records, optionally scoped to a
//!   parent (photos belong to an album). Reading a collection always yields position order.
//! * **Content types (`entity::Content`)**: Typed views over records: hero images, albums, photos,
//!   activities, events, editable site texts and donation methods.
//! * **Backends (`backend::ContentBackend`)**: The pluggable persistence contract, with an
//!   in-memory store (JSON file persistence) and an sqlx store for SQLite and PostgreSQL.
//! * **Assets (`assets::AssetStore`)**: Image uploads that come back as public URLs.
//! * **Reordering (`reorder::ReorderManager`)**: Drag-and-drop ordering with an optimistic local
//!   update followed by one position write per changed item.
//! * **Visual editing (`cms`)**: Click-to-edit targets on rendered pages, a read cache and the
//!   editor that persists a change and invalidates cached reads.
//! * **Site (`site::Site`)**: The facade the web layer talks to.

pub mod assets;
pub mod backend;
pub mod clock;
pub mod cms;
pub mod constants;
pub mod entity;
pub mod notify;
pub mod reorder;
pub mod repository;
pub mod site;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use entity::{CollectionKind, CollectionScope, ItemId, Position};
pub use notify::{Notification, Notifier};
pub use reorder::{ReorderManager, ReorderReport};
pub use repository::Repository;
pub use site::Site;

/// Result type used throughout the Kindred library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Kindred library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured upload errors from the assets module
    #[error(transparent)]
    Asset(assets::AssetError),

    /// Structured content model errors from the entity module
    #[error(transparent)]
    Content(entity::ContentError),

    /// Structured reorder errors from the reorder module
    #[error(transparent)]
    Reorder(reorder::ReorderError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Asset(_) => "assets",
            Error::Content(_) => "entity",
            Error::Reorder(_) => "reorder",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            Error::Asset(asset_err) => asset_err.is_not_found(),
            Error::Reorder(reorder_err) => reorder_err.is_not_in_collection(),
            _ => false,
        }
    }

    /// Check if this error is database/backend-related.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            Error::Asset(asset_err) => asset_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Content(content_err) => content_err.is_validation_error(),
            Error::Asset(asset_err) => asset_err.is_validation_error(),
            Error::Reorder(_) => true,
            _ => false,
        }
    }

    /// Check if retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_transient(),
            Error::Asset(assets::AssetError::Unavailable { .. }) => true,
            _ => false,
        }
    }
}
