//! Vehicle showcase and staff CMS.
//!
//! A vehicle owns its options (equipment lines) and gallery images. The CMS
//! edits all three in one multipart submission; option and image rows are
//! sent as `options-<i>-<field>` and `images-<i>-<field>`.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/home` | No | Featured vehicles |
//! | GET | `/api/vehicles` | No | All vehicles with options |
//! | GET | `/api/vehicles/{id}` | No | Vehicle detail with options and gallery |
//! | GET | `/api/cms/vehicles` | Staff | CMS list |
//! | GET | `/api/cms/vehicles/form` | Staff | Form layout |
//! | POST | `/api/cms/vehicles` | Staff | Create vehicle |
//! | GET | `/api/cms/vehicles/{id}` | Staff | Edit view |
//! | POST | `/api/cms/vehicles/{id}` | Staff | Update vehicle |
//! | GET | `/api/cms/vehicles/{id}/delete` | Staff | Deletion preview |
//! | POST | `/api/cms/vehicles/{id}/delete` | Staff | Delete vehicle |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::VehicleService;
