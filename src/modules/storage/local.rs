//! Local filesystem storage backend.

use async_trait::async_trait;
use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::backend::{StorageBackend, StorageError, StorageResult};
use super::keys::check_key;

/// Stores objects as plain files under `{base_path}/{key}`.
///
/// The directory is expected to be served by a front proxy under `media_url`.
pub struct LocalStorage {
    base_path: PathBuf,
    media_url: String,
}

impl LocalStorage {
    pub fn new(base_path: PathBuf, media_url: impl Into<String>) -> Self {
        Self {
            base_path,
            media_url: media_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        check_key(key)?;
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        self.ensure_parent(&path).await?;
        fs::write(&path, &data).await?;
        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()), // Already deleted
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.media_url, key)
    }
}
