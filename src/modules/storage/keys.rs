//! Storage key generation.
//!
//! Stored names are random; the client file name only contributes its
//! lowercased extension.

use uuid::Uuid;

use super::backend::{StorageError, StorageResult};
use crate::shared::validation::file_extension;

const RANDOM_NAME_LEN: usize = 12;

/// Random file name keeping the original extension, e.g. `4f1c2a9be07d.pdf`
pub fn random_file_name(original_name: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    let ext = file_extension(original_name).unwrap_or_default();
    format!("{}{}", &hex[..RANDOM_NAME_LEN], ext)
}

/// `<prefix>/<random name>`
pub fn random_key(prefix: &str, original_name: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        random_file_name(original_name)
    )
}

/// Rejects keys that could escape the storage root
pub fn check_key(key: &str) -> StorageResult<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");

    if bad {
        Err(StorageError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}
