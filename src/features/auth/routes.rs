use crate::features::auth::handlers;
use axum::{routing::get, Router};

/// Auth routes that require a verified bearer token (any role)
pub fn protected_routes() -> Router {
    Router::new().route("/api/auth/me", get(handlers::get_me))
}
