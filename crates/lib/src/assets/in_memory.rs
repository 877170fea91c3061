use std::any::Any;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AssetError, AssetStore, stored_name, validate_upload};
use crate::Result;

/// Asset store that keeps uploads in memory. Used in tests and demos.
#[derive(Debug)]
pub struct InMemoryAssets {
    base_url: String,
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::with_base_url("/assets")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Contents of an uploaded file, if the URL is known.
    pub async fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(url).cloned()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

impl Default for InMemoryAssets {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssets {
    async fn upload_asset(&self, bytes: Vec<u8>, folder: &str, file_name: &str) -> Result<String> {
        validate_upload(&bytes, folder)?;
        let url = format!("{}/{}/{}", self.base_url, folder, stored_name(file_name));
        self.files.write().await.insert(url.clone(), bytes);
        Ok(url)
    }

    async fn delete_asset(&self, public_url: &str) -> Result<()> {
        match self.files.write().await.remove(public_url) {
            Some(_) => Ok(()),
            None => Err(AssetError::UnknownUrl {
                url: public_url.to_string(),
            }
            .into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
