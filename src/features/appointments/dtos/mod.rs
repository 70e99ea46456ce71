mod appointment_dto;
mod contact_form_dto;

pub use appointment_dto::{AppointmentDto, AttachmentDto};
pub use contact_form_dto::{
    AppointmentInput, ContactFormDto, ContactFormSchemaDto, ATTACHMENTS_FIELD,
};
