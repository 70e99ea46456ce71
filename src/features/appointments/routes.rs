use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::appointments::handlers;
use crate::features::appointments::services::AppointmentService;

/// Public contact routes (no authentication required)
pub fn public_routes(service: Arc<AppointmentService>) -> Router {
    Router::new()
        .route("/api/contact", post(handlers::submit_contact))
        .route("/api/contact/form", get(handlers::get_contact_form))
        .with_state(service)
}
