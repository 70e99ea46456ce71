use sqlx::FromRow;

use super::vehicle::display_source;
use crate::modules::storage::StorageBackend;

/// Database model for a gallery image
#[derive(Debug, Clone, FromRow)]
pub struct VehicleImage {
    pub id: i64,
    pub vehicle_id: i64,
    /// Storage key of the uploaded file
    pub image: Option<String>,
    pub image_url: String,
    pub caption: String,
    pub sort_order: i32,
}

impl VehicleImage {
    pub fn display_image(&self, storage: &dyn StorageBackend) -> Option<String> {
        display_source(self.image.as_deref(), &self.image_url, storage)
    }

    /// Whether the saved row can be shown without a new file or URL
    pub fn has_display_source(&self) -> bool {
        self.image.as_deref().is_some_and(|k| !k.is_empty()) || !self.image_url.is_empty()
    }
}
