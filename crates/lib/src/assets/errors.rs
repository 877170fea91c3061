//! Error types for asset storage.

use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssetError {
    /// Upload body was empty.
    #[error("Refusing to store an empty upload")]
    EmptyUpload,

    /// Destination folder is not one the site stores assets in.
    #[error("Invalid asset folder: {folder}")]
    InvalidFolder { folder: String },

    /// URL does not belong to this store.
    #[error("Unknown asset URL: {url}")]
    UnknownUrl { url: String },

    /// File I/O error.
    #[error("Asset I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// The storage service could not be reached or refused the request.
    #[error("Asset storage unavailable: {reason}")]
    Unavailable { reason: String },
}

impl AssetError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::UnknownUrl { .. })
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AssetError::EmptyUpload | AssetError::InvalidFolder { .. }
        )
    }

    pub fn is_io_error(&self) -> bool {
        matches!(self, AssetError::FileIo { .. })
    }
}

impl From<AssetError> for crate::Error {
    fn from(err: AssetError) -> Self {
        crate::Error::Asset(err)
    }
}
