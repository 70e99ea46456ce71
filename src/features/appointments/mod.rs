//! Contact page: appointment requests with optional attachments.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/contact/form` | No | Form layout, reasons and upload limits |
//! | POST | `/api/contact` | No | Submit a request (multipart) |
//!
//! Attachments are stored under `contact_uploads/<YYYY>/<MM>/` with random
//! names; the client file name is only kept as metadata.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::AppointmentService;
