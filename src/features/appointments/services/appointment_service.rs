use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::attachment_validation::{validate_attachments, CONTACT_UPLOAD_POLICY};
use crate::core::error::{AppError, Result};
use crate::features::appointments::dtos::{AppointmentDto, AppointmentInput, ATTACHMENTS_FIELD};
use crate::features::appointments::models::{AppointmentRequest, Attachment};
use crate::modules::storage::{random_key, Storage};
use crate::shared::constants::CONTACT_UPLOAD_PREFIX;
use crate::shared::forms::{FormData, FormErrors, UploadedFile};

/// Attachment already written to storage, waiting for its row
struct StoredAttachment {
    key: String,
    file: UploadedFile,
}

/// Service for contact form submissions
pub struct AppointmentService {
    pool: SqlitePool,
    storage: Storage,
}

impl AppointmentService {
    pub fn new(pool: SqlitePool, storage: Storage) -> Self {
        Self { pool, storage }
    }

    /// Records a contact request with its attachments.
    ///
    /// The fields and the attachments are validated before anything is
    /// written. The request and its attachment rows are then inserted in one
    /// transaction.
    pub async fn submit(&self, mut form: FormData) -> Result<AppointmentDto> {
        let values = form.values();
        let mut errors = FormErrors::new();

        let input = AppointmentInput::from_form(&form, &mut errors);
        let files = match validate_attachments(
            form.take_files(ATTACHMENTS_FIELD),
            &CONTACT_UPLOAD_POLICY,
        ) {
            Ok(files) => files,
            Err(e) => {
                errors.add(ATTACHMENTS_FIELD, e.to_string());
                Vec::new()
            }
        };

        if !errors.is_empty() {
            debug!("Rejected contact request: {}", errors);
            return Err(errors.with_values(values).into());
        }

        let created_at = Utc::now();
        let stored = self.store_attachments(files, created_at).await?;
        let keys: Vec<String> = stored.iter().map(|s| s.key.clone()).collect();

        let result = async {
            let mut tx = self.pool.begin().await?;
            let request_id = insert_request(&mut tx, &input, created_at).await?;
            for attachment in &stored {
                insert_attachment(&mut tx, request_id, attachment, created_at).await?;
            }
            tx.commit().await?;
            Ok::<i64, AppError>(request_id)
        }
        .await;

        let request_id = match result {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to save contact request: {}", e);
                self.discard_files(&keys).await;
                return Err(e);
            }
        };

        info!(
            "Contact request {} received with {} attachment(s)",
            request_id,
            stored.len()
        );
        self.get(request_id).await
    }

    /// Request with its attachments
    pub async fn get(&self, id: i64) -> Result<AppointmentDto> {
        let request = sqlx::query_as::<_, AppointmentRequest>(
            r#"
            SELECT id, last_name, first_name, email, phone, reason, message, created_at
            FROM appointment_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment request {} not found", id)))?;

        let attachments = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT id, appointment_id, file, original_filename, content_type, file_size, created_at
            FROM appointment_attachments
            WHERE appointment_id = ?
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(AppointmentDto::from_model(
            request,
            attachments,
            self.storage.as_ref(),
        ))
    }

    /// Writes every file under `contact_uploads/<YYYY>/<MM>/`
    async fn store_attachments(
        &self,
        files: Vec<UploadedFile>,
        created_at: DateTime<Utc>,
    ) -> Result<Vec<StoredAttachment>> {
        let prefix = format!("{}/{}", CONTACT_UPLOAD_PREFIX, created_at.format("%Y/%m"));
        let mut stored: Vec<StoredAttachment> = Vec::with_capacity(files.len());

        for file in files {
            let key = random_key(&prefix, &file.file_name);
            if let Err(e) = self
                .storage
                .put(&key, file.data.clone(), &file.content_type)
                .await
            {
                let keys: Vec<String> = stored.iter().map(|s| s.key.clone()).collect();
                self.discard_files(&keys).await;
                return Err(e.into());
            }
            debug!("Stored attachment {} as {}", file.file_name, key);
            stored.push(StoredAttachment { key, file });
        }

        Ok(stored)
    }

    async fn discard_files(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                warn!("Failed to remove orphaned attachment {}: {}", key, e);
            }
        }
    }
}

async fn insert_request(
    tx: &mut Transaction<'_, Sqlite>,
    input: &AppointmentInput,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO appointment_requests
            (last_name, first_name, email, phone, reason, message, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.last_name)
    .bind(&input.first_name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(input.reason)
    .bind(&input.message)
    .bind(created_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn insert_attachment(
    tx: &mut Transaction<'_, Sqlite>,
    appointment_id: i64,
    attachment: &StoredAttachment,
    created_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO appointment_attachments
            (appointment_id, file, original_filename, content_type, file_size, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(appointment_id)
    .bind(&attachment.key)
    .bind(&attachment.file.file_name)
    .bind(&attachment.file.content_type)
    .bind(attachment.file.size() as i64)
    .bind(created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Datelike;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;

    use crate::shared::test_helpers::{test_pool, test_storage};

    fn contact_form() -> FormData {
        let first_name: String = FirstName().fake();
        let last_name: String = LastName().fake();
        let email: String = SafeEmail().fake();
        FormData::default()
            .with_text("last_name", last_name)
            .with_text("first_name", first_name)
            .with_text("email", email)
            .with_text("phone", "+33 6 12 34 56 78")
            .with_text("reason", "sell_vehicle")
            .with_text("message", "Low mileage, full service history.")
    }

    fn attachment(name: &str, size: usize) -> UploadedFile {
        UploadedFile::new(name, "application/pdf", vec![1u8; size])
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn form_errors(result: Result<AppointmentDto>) -> FormErrors {
        match result {
            Err(AppError::Form(errors)) => *errors,
            other => panic!("expected form errors, got {:?}", other.map(|a| a.id)),
        }
    }

    #[tokio::test]
    async fn test_submit_without_attachments() {
        let pool = test_pool().await;
        let (_dir, storage) = test_storage();
        let service = AppointmentService::new(pool.clone(), storage);

        let request = service.submit(contact_form()).await.unwrap();

        assert_eq!(request.reason_label, "Sell my vehicle");
        assert!(request.attachments.is_empty());
        assert_eq!(count(&pool, "appointment_requests").await, 1);
    }

    #[tokio::test]
    async fn test_five_files_are_stored_by_month() {
        let pool = test_pool().await;
        let (dir, storage) = test_storage();
        let service = AppointmentService::new(pool.clone(), storage);

        let mut form = contact_form();
        for (i, ext) in ["pdf", "DOCX", "xls", "jpg", "gif"].iter().enumerate() {
            form = form.with_file(ATTACHMENTS_FIELD, attachment(&format!("doc{}.{}", i, ext), 1));
        }
        let request = service.submit(form).await.unwrap();

        assert_eq!(request.attachments.len(), 5);
        assert_eq!(count(&pool, "appointment_attachments").await, 5);

        let prefix = format!(
            "contact_uploads/{:04}/{:02}/",
            request.created_at.year(),
            request.created_at.month()
        );
        for attachment in &request.attachments {
            let name = attachment.file.strip_prefix(&prefix).unwrap();
            let (stem, ext) = name.split_at(12);
            assert!(stem.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            assert_eq!(ext, ext.to_lowercase());
            // the client's file name never reaches the storage key
            let (original_stem, _) = attachment.original_filename.rsplit_once('.').unwrap();
            assert!(!name.contains(original_stem));
            assert_eq!(attachment.file_size, 1);
            assert!(dir.path().join(&attachment.file).exists());
        }
        assert_eq!(request.attachments[1].original_filename, "doc1.DOCX");
        assert!(request.attachments[1].file.ends_with(".docx"));
    }

    #[tokio::test]
    async fn test_rejected_attachments_write_nothing() {
        let pool = test_pool().await;
        let (dir, storage) = test_storage();
        let service = AppointmentService::new(pool.clone(), storage);

        let form = contact_form()
            .with_file(ATTACHMENTS_FIELD, attachment("ok.pdf", 1))
            .with_file(ATTACHMENTS_FIELD, attachment("payload.exe", 1));
        let errors = form_errors(service.submit(form).await);

        assert_eq!(
            errors.field_errors[ATTACHMENTS_FIELD],
            vec!["File type \".exe\" is not allowed.".to_string()]
        );
        assert_eq!(errors.values["reason"], "sell_vehicle");
        assert_eq!(count(&pool, "appointment_requests").await, 0);
        assert_eq!(count(&pool, "appointment_attachments").await, 0);
        assert!(!dir.path().join("contact_uploads").exists());
    }

    #[tokio::test]
    async fn test_too_many_files() {
        let pool = test_pool().await;
        let (_dir, storage) = test_storage();
        let service = AppointmentService::new(pool.clone(), storage);

        let mut form = contact_form();
        for i in 0..6 {
            form = form.with_file(ATTACHMENTS_FIELD, attachment(&format!("{}.pdf", i), 1));
        }
        let errors = form_errors(service.submit(form).await);

        assert_eq!(
            errors.field_errors[ATTACHMENTS_FIELD],
            vec!["You can attach at most 5 files.".to_string()]
        );
        assert_eq!(count(&pool, "appointment_requests").await, 0);
    }

    #[tokio::test]
    async fn test_field_and_attachment_errors_together() {
        let pool = test_pool().await;
        let (_dir, storage) = test_storage();
        let service = AppointmentService::new(pool, storage);

        let limit = CONTACT_UPLOAD_POLICY.max_file_size as usize;
        let form = contact_form()
            .with_text("email", "nope")
            .with_file(ATTACHMENTS_FIELD, attachment("scan.pdf", limit + 1));
        let errors = form_errors(service.submit(form).await);

        assert!(errors.has_field("email"));
        assert!(errors.has_field(ATTACHMENTS_FIELD));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_submissions_keep_their_own_files() {
        let pool = test_pool().await;
        let (_dir, storage) = test_storage();
        let service = Arc::new(AppointmentService::new(pool.clone(), storage));

        let first = contact_form()
            .with_file(ATTACHMENTS_FIELD, attachment("a1.pdf", 1))
            .with_file(ATTACHMENTS_FIELD, attachment("a2.pdf", 1));
        let second = contact_form().with_file(ATTACHMENTS_FIELD, attachment("b1.png", 2));

        let a = tokio::spawn({
            let service = service.clone();
            async move { service.submit(first).await }
        });
        let b = tokio::spawn({
            let service = service.clone();
            async move { service.submit(second).await }
        });
        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());

        assert_ne!(a.id, b.id);
        let names = |r: &AppointmentDto| -> Vec<String> {
            r.attachments
                .iter()
                .map(|f| f.original_filename.clone())
                .collect()
        };
        assert_eq!(names(&a), vec!["a1.pdf", "a2.pdf"]);
        assert_eq!(names(&b), vec!["b1.png"]);
        assert_eq!(count(&pool, "appointment_attachments").await, 3);
    }

    #[tokio::test]
    async fn test_pool_connections_share_one_database() {
        let pool = test_pool().await;
        let mut first = pool.acquire().await.unwrap();
        let mut second = pool.acquire().await.unwrap();

        sqlx::query(
            r#"
            INSERT INTO appointment_requests (last_name, first_name, email, phone, reason, created_at)
            VALUES ('Durand', 'Léa', 'lea@example.com', '0612345678', 'interested', '2025-03-01T09:00:00Z')
            "#,
        )
        .execute(&mut *first)
        .await
        .unwrap();
        let seen: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointment_requests")
            .fetch_one(&mut *second)
            .await
            .unwrap();
        assert_eq!(seen, 1);
    }
}
