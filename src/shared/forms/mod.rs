//! Multipart form handling shared by the contact form and the CMS.

mod errors;
mod multipart;
mod schema;

pub use errors::{FormErrors, RowErrors, REQUIRED};
pub use multipart::{FormData, RowData, UploadedFile};
pub use schema::{Choice, CollectionSpec, FieldSpec, Widget};
