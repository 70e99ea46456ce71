mod appointment_service;
mod attachment_validation;

pub use appointment_service::AppointmentService;
pub use attachment_validation::{
    validate_attachments, UploadError, UploadPolicy, CONTACT_UPLOAD_POLICY,
};
