mod appointment;
mod attachment;

pub use appointment::{AppointmentRequest, Reason};
pub use attachment::Attachment;
