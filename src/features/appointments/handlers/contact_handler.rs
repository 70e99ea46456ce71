use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::core::error::Result;
use crate::features::appointments::dtos::{AppointmentDto, ContactFormDto, ContactFormSchemaDto};
use crate::features::appointments::services::AppointmentService;
use crate::shared::forms::{FormData, FormErrors};
use crate::shared::types::ApiResponse;

/// Layout of the contact form
#[utoipa::path(
    get,
    path = "/api/contact/form",
    responses(
        (status = 200, description = "Contact form layout, reasons and upload limits", body = ApiResponse<ContactFormSchemaDto>),
    ),
    tag = "contact"
)]
pub async fn get_contact_form() -> Result<Json<ApiResponse<ContactFormSchemaDto>>> {
    Ok(Json(ApiResponse::success(
        Some(ContactFormSchemaDto::new()),
        None,
        None,
    )))
}

/// Submit an appointment request
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body(
        content = ContactFormDto,
        content_type = "multipart/form-data",
        description = "Contact details, reason, message and up to 5 attachments",
    ),
    responses(
        (status = 201, description = "Request received", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Form errors", body = ApiResponse<FormErrors>),
        (status = 413, description = "Request body too large")
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    State(service): State<Arc<AppointmentService>>,
    form: FormData,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentDto>>)> {
    let request = service.submit(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(request),
            Some("Thank you, we will get back to you shortly.".to_string()),
            None,
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::appointments::routes;
    use crate::shared::test_helpers::{test_pool, test_storage};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;

    async fn server() -> (tempfile::TempDir, TestServer) {
        let (dir, storage) = test_storage();
        let service = Arc::new(AppointmentService::new(test_pool().await, storage));
        (dir, TestServer::new(routes::public_routes(service)).unwrap())
    }

    fn contact_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("last_name", "Durand")
            .add_text("first_name", "Claire")
            .add_text("email", "claire.durand@example.com")
            .add_text("phone", "06 12 34 56 78")
            .add_text("reason", "interested")
    }

    #[tokio::test]
    async fn test_submit_contact_with_attachment() {
        let (_dir, server) = server().await;

        let form = contact_form()
            .add_part(
                "attachments",
                Part::bytes(b"%PDF-1.7".to_vec())
                    .file_name("Carte Grise.PDF")
                    .mime_type("application/pdf"),
            )
            // Untouched file input
            .add_part(
                "attachments",
                Part::bytes(Vec::new())
                    .file_name("")
                    .mime_type("application/octet-stream"),
            );
        let response = server.post("/api/contact").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["reason_label"], "Interested in a vehicle");
        let attachments = body["data"]["attachments"].as_array().unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0]["original_filename"], "Carte Grise.PDF");
        assert!(attachments[0]["file"].as_str().unwrap().ends_with(".pdf"));
        assert!(attachments[0]["url"].as_str().unwrap().starts_with("/media/contact_uploads/"));
    }

    #[tokio::test]
    async fn test_submit_contact_rejects_bad_file() {
        let (_dir, server) = server().await;

        let form = contact_form().add_part(
            "attachments",
            Part::bytes(b"MZ".to_vec())
                .file_name("setup.exe")
                .mime_type("application/octet-stream"),
        );
        let response = server.post("/api/contact").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["data"]["field_errors"]["attachments"][0],
            "File type \".exe\" is not allowed."
        );
        assert_eq!(body["data"]["values"]["email"], "claire.durand@example.com");
        assert!(body["data"].get("record_id").is_none());
    }

    #[tokio::test]
    async fn test_contact_form_schema() {
        let (_dir, server) = server().await;

        let response = server.get("/api/contact/form").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["reasons"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"]["max_files"], 5);
        assert_eq!(body["data"]["max_file_size"], 10_485_760);
    }
}
