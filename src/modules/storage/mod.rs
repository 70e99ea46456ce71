//! Storage module for uploaded files
//!
//! Vehicle pictures and contact attachments go through [`StorageBackend`].
//! The local filesystem backend is the default; MinIO/S3 is selected with
//! `STORAGE_BACKEND=minio`.

mod backend;
mod keys;
mod local;
mod minio_client;

use std::sync::Arc;

pub use backend::{StorageBackend, StorageError, StorageResult};
pub use keys::random_key;
pub use local::LocalStorage;
pub use minio_client::MinIOClient;

use crate::core::config::{StorageConfig, StorageKind};

/// Shared handle to the configured backend
pub type Storage = Arc<dyn StorageBackend>;

/// Builds the backend selected by configuration
pub async fn from_config(config: &StorageConfig) -> StorageResult<Storage> {
    match config.kind {
        StorageKind::Local => {
            tracing::info!(
                "Using local storage at {} served under {}",
                config.media_root.display(),
                config.media_url
            );
            Ok(Arc::new(LocalStorage::new(
                config.media_root.clone(),
                config.media_url.clone(),
            )))
        }
        StorageKind::Minio => {
            let minio = config.minio.clone().ok_or_else(|| {
                StorageError::Backend("MinIO storage selected without MinIO settings".to_string())
            })?;
            Ok(Arc::new(MinIOClient::new(minio).await?))
        }
    }
}
