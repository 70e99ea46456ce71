//! Storage backend trait definition.
//!
//! Uploaded files (vehicle pictures, contact attachments) are written through
//! this trait so the local filesystem and MinIO/S3 are interchangeable.

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Pluggable file storage.
///
/// Keys are relative, `/`-separated paths such as
/// `contact_uploads/2025/03/4f1c2a9be07d.pdf`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store an object, replacing any previous object under the same key
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Delete an object; deleting a missing object is not an error
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// URL under which the object is served
    fn url(&self, key: &str) -> String;
}
