use crate::core::error::AppError;
use crate::features::auth::JwtValidator;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        // Parse origins into HeaderValue
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            if let Some(auth_header) = auth_header {
                if let Some(encoded) = auth_header.strip_prefix("Basic ") {
                    if let Ok(decoded) = BASE64_STANDARD.decode(encoded) {
                        if let Ok(creds) = String::from_utf8(decoded) {
                            if creds == *credentials {
                                return Ok(next.run(req).await);
                            }
                        }
                    }
                }
            }

            let response = Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")
                .body(Body::from("Unauthorized"))
                .unwrap();

            Err(response)
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))
}

/// Requires a valid bearer token of any role
pub async fn auth_middleware(
    State(validator): State<Arc<JwtValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = validator.validate_token(bearer_token(req.headers())?)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// State of the staff gate in front of the CMS routes
#[derive(Clone)]
pub struct StaffGate {
    validator: Arc<JwtValidator>,
    login_url: String,
}

impl StaffGate {
    pub fn new(validator: Arc<JwtValidator>, login_url: impl Into<String>) -> Self {
        Self {
            validator,
            login_url: login_url.into(),
        }
    }

    /// Login entry point with `next` pointing back at the requested page
    fn login_redirect(&self, uri: &Uri) -> AppError {
        let next = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        let separator = if self.login_url.contains('?') { '&' } else { '?' };

        AppError::LoginRequired(format!(
            "{}{}next={}",
            self.login_url,
            separator,
            urlencoding::encode(next)
        ))
    }
}

/// Admits staff only.
///
/// Anonymous callers and callers whose token fails verification are
/// redirected to the login page; authenticated non-staff get 403.
pub async fn staff_gate_middleware(
    State(gate): State<Arc<StaffGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = match bearer_token(req.headers())
        .and_then(|token| gate.validator.validate_token(token))
    {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!("Staff gate redirecting {}: {}", req.uri().path(), e);
            return Err(gate.login_redirect(req.uri()));
        }
    };

    if !user.is_staff_member() {
        tracing::warn!(
            "Non-staff user {} denied access to {}",
            user.sub,
            req.uri().path()
        );
        return Err(AppError::Forbidden("Staff access required".to_string()));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{issue_token, test_auth_config};
    use axum::{middleware, routing::get, Router};
    use axum_test::TestServer;

    fn gated_server() -> TestServer {
        let validator = Arc::new(JwtValidator::new(&test_auth_config()));
        let gate = Arc::new(StaffGate::new(validator, "/admin/login/"));
        let app = Router::new()
            .route("/api/cms/vehicles", get(|| async { "cms" }))
            .layer(middleware::from_fn_with_state(gate, staff_gate_middleware));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected_to_login() {
        let server = gated_server();

        let response = server.get("/api/cms/vehicles").await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.header(header::LOCATION),
            "/admin/login/?next=%2Fapi%2Fcms%2Fvehicles"
        );
    }

    #[tokio::test]
    async fn test_invalid_token_is_redirected() {
        let server = gated_server();

        let response = server
            .get("/api/cms/vehicles")
            .authorization_bearer("garbage")
            .await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_non_staff_is_forbidden() {
        let server = gated_server();
        let token = issue_token("3", false, &["customer"]);

        let response = server
            .get("/api/cms/vehicles")
            .authorization_bearer(token)
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_staff_is_admitted() {
        let server = gated_server();
        let token = issue_token("1", true, &[]);

        let response = server
            .get("/api/cms/vehicles")
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_text("cms");
    }

    #[test]
    fn test_login_redirect_keeps_query() {
        let validator = Arc::new(JwtValidator::new(&test_auth_config()));
        let gate = StaffGate::new(validator, "/login?lang=fr");
        let uri: Uri = "/api/cms/vehicles/3?tab=images".parse().unwrap();

        match gate.login_redirect(&uri) {
            AppError::LoginRequired(location) => assert_eq!(
                location,
                "/login?lang=fr&next=%2Fapi%2Fcms%2Fvehicles%2F3%3Ftab%3Dimages"
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
