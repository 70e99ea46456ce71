use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::appointments::models::{AppointmentRequest, Attachment, Reason};
use crate::modules::storage::StorageBackend;

/// Response DTO for a stored attachment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentDto {
    pub id: i64,
    /// Storage key
    pub file: String,
    pub url: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
}

impl AttachmentDto {
    pub fn from_model(a: Attachment, storage: &dyn StorageBackend) -> Self {
        Self {
            url: storage.url(&a.file),
            id: a.id,
            file: a.file,
            original_filename: a.original_filename,
            content_type: a.content_type,
            file_size: a.file_size,
        }
    }
}

/// Response DTO for a submitted appointment request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentDto {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub reason: Reason,
    pub reason_label: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentDto>,
}

impl AppointmentDto {
    pub fn from_model(
        request: AppointmentRequest,
        attachments: Vec<Attachment>,
        storage: &dyn StorageBackend,
    ) -> Self {
        Self {
            id: request.id,
            last_name: request.last_name,
            first_name: request.first_name,
            email: request.email,
            phone: request.phone,
            reason: request.reason,
            reason_label: request.reason.label().to_string(),
            message: request.message,
            created_at: request.created_at,
            attachments: attachments
                .into_iter()
                .map(|a| AttachmentDto::from_model(a, storage))
                .collect(),
        }
    }
}
