//! Authentication middleware for protected routes.
//!
//! `require_auth` reads the bearer token from the `Authorization` header,
//! verifies it against the cached realm keys, and attaches the resulting
//! [`User`] to the request extensions. Any failure halts the chain with a
//! JSON error response.

use crate::auth::TokenVerifier;
use crate::errors::AuthError;
use crate::models::User;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

const BEARER: &str = "Bearer";

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    /// Token verifier bound to the key cache.
    pub verifier: Arc<TokenVerifier>,
}

/// Extract the bearer token from the Authorization header.
///
/// - missing or empty header: `HeaderMissing`
/// - `Bearer` with nothing after it: `BearerTokenMissing`
/// - anything that is not exactly `Bearer <token>`: `HeaderMalformed`
///
/// The scheme is matched case-sensitively.
pub fn extract_bearer_token(req: &Request) -> Result<&str, AuthError> {
    let value = match req.headers().get(header::AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => {
            tracing::debug!(target: "guard.middleware.auth", "Missing Authorization header");
            return Err(AuthError::HeaderMissing);
        }
    };

    let auth_header = value.to_str().map_err(|_| {
        tracing::debug!(target: "guard.middleware.auth", "Authorization header is not visible ASCII");
        AuthError::HeaderMalformed
    })?;

    // Servers may strip the trailing space of "Bearer "
    if auth_header.trim_end() == BEARER {
        tracing::debug!(target: "guard.middleware.auth", "Bearer scheme without token");
        return Err(AuthError::BearerTokenMissing);
    }

    let mut parts = auth_header.split(' ');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(BEARER), Some(_), None)
    );
    if !well_formed {
        tracing::debug!(target: "guard.middleware.auth", "Invalid Authorization header format");
        return Err(AuthError::HeaderMalformed);
    }

    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token),
        _ => {
            tracing::debug!(target: "guard.middleware.auth", "Bearer scheme without token");
            Err(AuthError::BearerTokenMissing)
        }
    }
}

/// Authentication middleware.
///
/// # Response
///
/// - Returns 401 Unauthorized if the header is missing or malformed, the
///   token fails verification, or a required claim is missing or malformed
/// - Continues to next handler with [`User`] in extensions if the token is valid
#[instrument(skip_all, name = "guard.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_bearer_token(&req)?;

    let user = state.verifier.parse_token(token).map_err(|e| {
        tracing::debug!(target: "guard.middleware.auth", error = %e, "Request rejected");
        e
    })?;

    tracing::debug!(target: "guard.middleware.auth", user_id = %user.id, "Request authenticated");

    // Store user in request extensions for downstream handlers
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Read the authenticated user attached by [`require_auth`].
///
/// Returns `None` if the middleware was not applied to this request.
pub fn user_details<B>(req: &axum::http::Request<B>) -> Option<&User> {
    req.extensions().get::<User>()
}

/// Extension trait for extracting the user from a request.
pub trait UserExt {
    /// Get the authenticated user from request extensions.
    ///
    /// Returns `None` if auth middleware was not applied to this request.
    fn user(&self) -> Option<&User>;
}

impl<B> UserExt for axum::http::Request<B> {
    fn user(&self) -> Option<&User> {
        user_details(self)
    }
}
