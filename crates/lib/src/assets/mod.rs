//! Asset (image) storage.
//!
//! Uploads go into a fixed set of folders and come back as public URLs that
//! content records store verbatim. Deleting takes the same URL.

mod errors;
mod in_memory;
mod local;

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::constants::ASSET_FOLDERS;

pub use errors::AssetError;
pub use in_memory::InMemoryAssets;
pub use local::LocalAssets;

/// Storage contract for uploaded files.
#[async_trait]
pub trait AssetStore: Send + Sync + Any {
    /// Stores `bytes` under `folder` and returns the public URL of the stored file.
    ///
    /// `file_name` is only a hint: the stored name is sanitized and made unique.
    async fn upload_asset(&self, bytes: Vec<u8>, folder: &str, file_name: &str) -> Result<String>;

    /// Removes a previously uploaded file by its public URL.
    async fn delete_asset(&self, public_url: &str) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

/// Check an upload before storing it.
pub(crate) fn validate_upload(bytes: &[u8], folder: &str) -> std::result::Result<(), AssetError> {
    if bytes.is_empty() {
        return Err(AssetError::EmptyUpload);
    }
    if !ASSET_FOLDERS.contains(&folder) {
        return Err(AssetError::InvalidFolder {
            folder: folder.to_string(),
        });
    }
    Ok(())
}

/// Build a unique, filesystem- and URL-safe name from a client supplied file name.
pub(crate) fn stored_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '-');
    let unique = uuid::Uuid::new_v4().simple().to_string();
    if cleaned.is_empty() {
        unique
    } else {
        format!("{unique}-{cleaned}")
    }
}
