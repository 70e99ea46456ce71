use axum::{
    extract::{multipart::Multipart, FromRequest, FromRequestParts, Request},
    http::request::Parts,
};

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::forms::FormData;

/// Buffers a `multipart/form-data` body into [`FormData`] with consistent
/// error responses
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::BadRequest(format!("Expected multipart form data: {}", rejection))
            })?;

        FormData::from_multipart(multipart).await
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
