//! Caller identity middleware for protected routes.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user as an `X-User-Id` header carrying a UUID.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tally_shared::AppError;
use tally_shared::types::UserId;

use crate::ApiError;

/// Header carrying the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

fn parse_user_id(header: Option<&str>) -> Result<UserId, AppError> {
    let value = header
        .ok_or_else(|| AppError::Unauthorized("X-User-Id header is required".to_string()))?;

    value
        .trim()
        .parse()
        .map_err(|_| AppError::Unauthorized("X-User-Id header must be a UUID".to_string()))
}

/// Middleware that resolves the caller and stores it in request extensions.
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok());

    match parse_user_id(header) {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthUser(user_id));
            next.run(request).await
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     let user_id = user.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl AuthUser {
    /// Returns the caller's user ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| ApiError(AppError::Unauthorized("Authentication required".to_string())))
    }
}
