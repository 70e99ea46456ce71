use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::vehicles::handlers;
use crate::features::vehicles::services::VehicleService;

/// Public showcase routes (no authentication required)
pub fn public_routes(service: Arc<VehicleService>) -> Router {
    Router::new()
        .route("/api/home", get(handlers::get_home))
        .route("/api/vehicles", get(handlers::list_vehicles))
        .route("/api/vehicles/{id}", get(handlers::get_vehicle))
        .with_state(service)
}

/// CMS routes; mount behind the staff gate
pub fn cms_routes(service: Arc<VehicleService>) -> Router {
    Router::new()
        .route(
            "/api/cms/vehicles",
            get(handlers::cms_list_vehicles).post(handlers::create_vehicle),
        )
        .route("/api/cms/vehicles/form", get(handlers::get_vehicle_form))
        .route(
            "/api/cms/vehicles/{id}",
            get(handlers::get_vehicle_for_edit).post(handlers::update_vehicle),
        )
        .route(
            "/api/cms/vehicles/{id}/delete",
            get(handlers::confirm_delete_vehicle).post(handlers::delete_vehicle),
        )
        .with_state(service)
}
