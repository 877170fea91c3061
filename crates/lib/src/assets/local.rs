use std::any::Any;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{AssetError, AssetStore, stored_name, validate_upload};
use crate::Result;

/// Asset store writing uploads into a local directory.
///
/// A file stored as `<root>/<folder>/<name>` is published as
/// `<base_url>/<folder>/<name>`; the web server maps `base_url` back onto `root`.
#[derive(Debug, Clone)]
pub struct LocalAssets {
    root: PathBuf,
    base_url: String,
}

impl LocalAssets {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a path relative to the asset root onto the filesystem.
    ///
    /// Returns `None` for anything that could escape the root (`..`, absolute paths).
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        if relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            Some(self.root.join(relative))
        } else {
            None
        }
    }

    fn relative_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.base_url)?.strip_prefix('/')
    }
}

#[async_trait]
impl AssetStore for LocalAssets {
    async fn upload_asset(&self, bytes: Vec<u8>, folder: &str, file_name: &str) -> Result<String> {
        validate_upload(&bytes, folder)?;
        let name = stored_name(file_name);
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| AssetError::FileIo { source })?;
        tokio::fs::write(dir.join(&name), &bytes)
            .await
            .map_err(|source| AssetError::FileIo { source })?;

        let url = format!("{}/{}/{}", self.base_url, folder, name);
        tracing::info!(%url, size = bytes.len(), "Stored asset");
        Ok(url)
    }

    async fn delete_asset(&self, public_url: &str) -> Result<()> {
        let unknown = || AssetError::UnknownUrl {
            url: public_url.to_string(),
        };
        let path = self
            .relative_from_url(public_url)
            .and_then(|relative| self.resolve(relative))
            .ok_or_else(unknown)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(url = %public_url, "Deleted asset");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(unknown().into()),
            Err(source) => Err(AssetError::FileIo { source }.into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
