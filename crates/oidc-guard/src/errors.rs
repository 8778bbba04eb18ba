//! oidc-guard error types.
//!
//! All errors map to HTTP responses via the `IntoResponse` impl. The body is a
//! JSON object with a single `error` field carrying the Display message.

use crate::auth::jwt::TokenError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Value of the `WWW-Authenticate` header sent with every 401.
const WWW_AUTHENTICATE_VALUE: &str = "Bearer error=\"invalid_token\"";

/// oidc-guard error type.
///
/// Maps to HTTP status codes:
/// - ProviderUnavailable: 503 Service Unavailable
/// - everything else: 401 Unauthorized
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The JWKS endpoint could not be fetched or parsed.
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authorization header missing")]
    HeaderMissing,

    #[error("Invalid Authorization header format")]
    HeaderMalformed,

    /// Header started with `Bearer` but carried no token after the space.
    #[error("Authorization header format must be Bearer {{token}}")]
    BearerTokenMissing,

    /// Token rejected by the verifier.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// `sub` absent, not a string, or not a UUID.
    #[error("invalid user ID in token")]
    InvalidUserId,

    #[error("missing claim in token: {0}")]
    ClaimMissing(&'static str),

    #[error("malformed claim in token: {0}")]
    ClaimMalformed(&'static str),
}

impl AuthError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::HeaderMissing
            | AuthError::HeaderMalformed
            | AuthError::BearerTokenMissing
            | AuthError::Token(_)
            | AuthError::InvalidUserId
            | AuthError::ClaimMissing(_)
            | AuthError::ClaimMalformed(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Bounded label used when recording rejection metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            AuthError::ProviderUnavailable(_) => "provider_unavailable",
            AuthError::HeaderMissing => "header_missing",
            AuthError::HeaderMalformed | AuthError::BearerTokenMissing => "header_malformed",
            AuthError::Token(e) => e.error_type(),
            AuthError::InvalidUserId | AuthError::ClaimMalformed(_) => "claim_malformed",
            AuthError::ClaimMissing(_) => "claim_missing",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AuthError::ProviderUnavailable(reason) => {
                // Log actual reason server-side, return generic message to client
                tracing::warn!(target: "guard.availability", reason = %reason, "Identity provider unavailable");
                "Service temporarily unavailable".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_VALUE),
            );
        }

        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_header_errors() {
        assert_eq!(
            AuthError::HeaderMissing.to_string(),
            "Authorization header missing"
        );
        assert_eq!(
            AuthError::HeaderMalformed.to_string(),
            "Invalid Authorization header format"
        );
        assert_eq!(
            AuthError::BearerTokenMissing.to_string(),
            "Authorization header format must be Bearer {token}"
        );
    }

    #[test]
    fn test_display_token_error_is_transparent() {
        let error = AuthError::from(TokenError::UnknownKey);
        assert_eq!(error.to_string(), "key not found");
    }

    #[test]
    fn test_display_claim_errors() {
        assert_eq!(
            AuthError::InvalidUserId.to_string(),
            "invalid user ID in token"
        );
        assert_eq!(
            AuthError::ClaimMissing("email").to_string(),
            "missing claim in token: email"
        );
        assert_eq!(
            AuthError::ClaimMalformed("given_name").to_string(),
            "malformed claim in token: given_name"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::ProviderUnavailable("down".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::HeaderMissing.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Token(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::ClaimMissing("email").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidUserId.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_into_response_header_missing() {
        let response = AuthError::HeaderMissing.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(www_auth, WWW_AUTHENTICATE_VALUE);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(
            body_json,
            serde_json::json!({"error": "Authorization header missing"})
        );
    }

    #[tokio::test]
    async fn test_into_response_token_error_carries_verifier_message() {
        let response = AuthError::Token(TokenError::UnknownKey).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"], "key not found");
    }

    #[tokio::test]
    async fn test_into_response_provider_unavailable_is_generic() {
        let response =
            AuthError::ProviderUnavailable("connection refused to 10.0.0.3".to_string())
                .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"], "Service temporarily unavailable");
    }
}
