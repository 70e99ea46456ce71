use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::features::appointments::models::Reason;
use crate::features::appointments::services::CONTACT_UPLOAD_POLICY;
use crate::shared::forms::{Choice, FieldSpec, FormData, FormErrors, Widget, REQUIRED};

/// Multipart field carrying the attachments (repeatable)
pub const ATTACHMENTS_FIELD: &str = "attachments";

pub const CONTACT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("last_name", "Last name", Widget::Text)
        .required()
        .max_length(120),
    FieldSpec::new("first_name", "First name", Widget::Text)
        .required()
        .max_length(120),
    FieldSpec::new("email", "Email", Widget::Email)
        .required()
        .placeholder("you@example.com"),
    FieldSpec::new("phone", "Phone", Widget::Tel)
        .required()
        .max_length(20)
        .placeholder("+33 6 12 34 56 78"),
    FieldSpec::new("reason", "Reason", Widget::Select).required(),
    FieldSpec::new("message", "Message", Widget::Textarea)
        .rows(5)
        .placeholder("Tell us more (optional)"),
    FieldSpec::new(ATTACHMENTS_FIELD, "Attachments", Widget::File)
        .accept(".pdf,.doc,.docx,.xls,.xlsx,.jpg,.jpeg,.png,.gif")
        .multiple(),
];

/// Layout of the public contact form
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactFormSchemaDto {
    #[schema(value_type = Vec<Object>)]
    pub fields: &'static [FieldSpec],
    #[schema(value_type = Vec<Object>)]
    pub reasons: Vec<Choice>,
    pub max_files: usize,
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
}

impl ContactFormSchemaDto {
    pub fn new() -> Self {
        Self {
            fields: CONTACT_FIELDS,
            reasons: Reason::choices(),
            max_files: CONTACT_UPLOAD_POLICY.max_files,
            max_file_size: CONTACT_UPLOAD_POLICY.max_file_size,
            allowed_extensions: CONTACT_UPLOAD_POLICY
                .allowed_extensions
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// Multipart body of the contact form, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ContactFormDto {
    #[schema(example = "Durand")]
    pub last_name: String,
    #[schema(example = "Claire")]
    pub first_name: String,
    #[schema(example = "claire.durand@example.com")]
    pub email: String,
    #[schema(example = "+33 6 12 34 56 78")]
    pub phone: String,
    pub reason: Reason,
    pub message: Option<String>,
    /// Up to 5 files, 10 MB each
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub attachments: Option<Vec<String>>,
}

/// Validated text fields of the contact form
#[derive(Debug, Clone, Validate)]
pub struct AppointmentInput {
    #[validate(length(max = 120, message = "Ensure this value has at most 120 characters."))]
    pub last_name: String,
    #[validate(length(max = 120, message = "Ensure this value has at most 120 characters."))]
    pub first_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    /// Free text, visitors write extensions and notes in it
    #[validate(length(max = 20, message = "Ensure this value has at most 20 characters."))]
    pub phone: String,
    pub reason: Reason,
    pub message: String,
}

impl AppointmentInput {
    /// Reads the contact fields, recording every problem in `errors`
    pub fn from_form(form: &FormData, errors: &mut FormErrors) -> Self {
        let input = Self {
            last_name: required_text(form, "last_name", errors),
            first_name: required_text(form, "first_name", errors),
            email: required_text(form, "email", errors),
            phone: required_text(form, "phone", errors),
            reason: errors
                .choice::<Reason>("reason", form.text("reason"))
                .unwrap_or(Reason::Other),
            message: form.text("message").to_string(),
        };

        if let Err(e) = input.validate() {
            errors.extend_validation(&e);
        }
        input
    }
}

fn required_text(form: &FormData, field: &str, errors: &mut FormErrors) -> String {
    let value = form.text(field);
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;

    fn contact_form() -> FormData {
        let first_name: String = FirstName().fake();
        let last_name: String = LastName().fake();
        let email: String = SafeEmail().fake();
        FormData::default()
            .with_text("last_name", last_name)
            .with_text("first_name", first_name)
            .with_text("email", email)
            .with_text("phone", "06 12 34 56 78")
            .with_text("reason", "interested")
    }

    #[test]
    fn test_valid_contact_input() {
        let mut errors = FormErrors::new();
        let input = AppointmentInput::from_form(&contact_form(), &mut errors);

        assert!(errors.is_empty(), "{}", errors);
        assert_eq!(input.reason, Reason::Interested);
        assert_eq!(input.message, "");
    }

    #[test]
    fn test_contact_input_errors() {
        let form = contact_form()
            .with_text("email", "not-an-email")
            .with_text("phone", "")
            .with_text("reason", "vendre")
            .with_text("first_name", "");
        let mut errors = FormErrors::new();
        AppointmentInput::from_form(&form, &mut errors);

        assert!(errors.has_field("email"));
        assert_eq!(errors.field_errors["phone"], vec![REQUIRED.to_string()]);
        assert!(errors.has_field("reason"));
        assert_eq!(errors.field_errors["first_name"], vec![REQUIRED.to_string()]);
        assert!(!errors.has_field("last_name"));
    }

    #[test]
    fn test_long_phone_is_rejected() {
        let form = contact_form().with_text("phone", "+33 6 12 34 56 78 90 12");
        let mut errors = FormErrors::new();
        AppointmentInput::from_form(&form, &mut errors);

        assert!(errors.has_field("phone"));
    }

    #[test]
    fn test_phone_is_free_text_up_to_twenty_chars() {
        for phone in ["12345", "+1 555 0100 ext 2", "evenings only", "0612345678"] {
            let form = contact_form().with_text("phone", phone);
            let mut errors = FormErrors::new();
            let input = AppointmentInput::from_form(&form, &mut errors);

            assert!(errors.is_empty(), "{}: {}", phone, errors);
            assert_eq!(input.phone, phone);
        }
    }
}
