//! oidc-guard models.
//!
//! Contains the user record attached to authenticated requests and the
//! response shapes of the demo host.

use crate::auth::claims::{self, Claims};
use crate::errors::AuthError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user, projected from a verified token's claims.
///
/// Serialized with camelCase field names:
/// `{id, username, firstName, lastName, email, enabled}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Subject (`sub`) of the token.
    pub id: Uuid,

    /// `preferred_username` claim.
    pub username: String,

    /// `given_name` claim.
    pub first_name: String,

    /// `family_name` claim.
    pub last_name: String,

    pub email: String,

    /// Always false: the provider does not carry account state in the token.
    pub enabled: bool,
}

impl User {
    /// Build a user from verified claims.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidUserId` if `sub` is absent or not a UUID
    /// - `AuthError::ClaimMissing` / `AuthError::ClaimMalformed` for the
    ///   remaining string claims
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        let id = claims.subject_id()?;

        Ok(Self {
            id,
            username: claims.required_str(claims::PREFERRED_USERNAME)?.to_string(),
            first_name: claims.required_str(claims::GIVEN_NAME)?.to_string(),
            last_name: claims.required_str(claims::FAMILY_NAME)?.to_string(),
            email: claims.required_str(claims::EMAIL)?.to_string(),
            enabled: false,
        })
    }
}

/// Health check response.
///
/// Returned by the `/health` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service health status ("healthy" or "degraded").
    pub status: &'static str,

    /// Number of signing keys currently published by the key cache.
    pub jwks_keys: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn claims(value: Value) -> Claims {
        Claims::from(value.as_object().unwrap().clone())
    }

    fn alice() -> Value {
        json!({
            "sub": "550e8400-e29b-41d4-a716-446655440000",
            "preferred_username": "alice",
            "given_name": "Alice",
            "family_name": "Anders",
            "email": "alice@example.com",
            "exp": 1700000060
        })
    }

    #[test]
    fn test_user_from_claims() {
        let user = User::from_claims(&claims(alice())).unwrap();

        assert_eq!(user.id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(user.username, "alice");
        assert_eq!(user.first_name, "Alice");
        assert_eq!(user.last_name, "Anders");
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.enabled);
    }

    #[test]
    fn test_user_from_claims_is_repeatable() {
        let claims = claims(alice());
        assert_eq!(
            User::from_claims(&claims).unwrap(),
            User::from_claims(&claims).unwrap()
        );
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User::from_claims(&claims(alice())).unwrap();
        let value = serde_json::to_value(&user).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "username": "alice",
                "firstName": "Alice",
                "lastName": "Anders",
                "email": "alice@example.com",
                "enabled": false
            })
        );
    }

    #[test]
    fn test_invalid_sub_checked_first() {
        let mut value = alice();
        value["sub"] = json!("not-a-uuid");
        value.as_object_mut().unwrap().remove("email");

        assert_eq!(
            User::from_claims(&claims(value)).unwrap_err(),
            AuthError::InvalidUserId
        );
    }

    #[test]
    fn test_missing_string_claim() {
        let mut value = alice();
        value.as_object_mut().unwrap().remove("given_name");

        assert_eq!(
            User::from_claims(&claims(value)).unwrap_err(),
            AuthError::ClaimMissing("given_name")
        );
    }

    #[test]
    fn test_non_string_claim_is_malformed() {
        let mut value = alice();
        value["email"] = json!(["alice@example.com"]);

        let err = User::from_claims(&claims(value)).unwrap_err();
        assert_eq!(err, AuthError::ClaimMalformed("email"));
        assert_eq!(err.to_string(), "malformed claim in token: email");
    }
}
