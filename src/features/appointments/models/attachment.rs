use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// File attached to an appointment request
#[derive(Debug, Clone, FromRow)]
pub struct Attachment {
    pub id: i64,
    pub appointment_id: i64,
    /// Storage key, `contact_uploads/<YYYY>/<MM>/<random><ext>`
    pub file: String,
    /// Name sent by the client; informational only
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}
