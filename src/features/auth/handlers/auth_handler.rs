use crate::core::error::Result;
use crate::features::auth::dtos::MeResponseDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;
use axum::Json;

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<Json<ApiResponse<MeResponseDto>>> {
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::core::middleware::auth_middleware;
    use crate::features::auth::{routes, JwtValidator};
    use crate::shared::test_helpers::{issue_token, test_auth_config};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::Arc;

    fn server() -> TestServer {
        let validator = Arc::new(JwtValidator::new(&test_auth_config()));
        let app = routes::protected_routes().route_layer(axum::middleware::from_fn_with_state(
            validator,
            auth_middleware,
        ));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_me_returns_identity() {
        let server = server();
        let token = issue_token("15", false, &["staff"]);

        let response = server.get("/api/auth/me").authorization_bearer(token).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["sub"], "15");
        assert_eq!(body["data"]["is_staff"], true);
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let server = server();
        let response = server.get("/api/auth/me").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}
