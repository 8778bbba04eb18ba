//! Claim set of a verified token.
//!
//! Claims are kept as the untrusted JSON object they arrived as. Every typed
//! read checks presence and type and reports a specific error instead of
//! assuming the provider's shape. The `sub` claim is redacted in Debug output.

use crate::auth::jwt::TokenError;
use crate::errors::AuthError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

pub const SUB: &str = "sub";
pub const PREFERRED_USERNAME: &str = "preferred_username";
pub const GIVEN_NAME: &str = "given_name";
pub const FAMILY_NAME: &str = "family_name";
pub const EMAIL: &str = "email";
pub const EXP: &str = "exp";
pub const NBF: &str = "nbf";
pub const IAT: &str = "iat";

/// Decoded claim set of a token whose signature has been verified.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name == SUB {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Read a required string claim.
    ///
    /// # Errors
    ///
    /// `AuthError::ClaimMissing` if absent (or null), `AuthError::ClaimMalformed`
    /// if present with another JSON type.
    pub fn required_str(&self, name: &'static str) -> Result<&str, AuthError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Err(AuthError::ClaimMissing(name)),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(AuthError::ClaimMalformed(name)),
        }
    }

    /// Read `sub` as a UUID.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidUserId` if `sub` is absent, not a string, or not a UUID.
    pub fn subject_id(&self) -> Result<Uuid, AuthError> {
        self.0
            .get(SUB)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or(AuthError::InvalidUserId)
    }

    /// Read a NumericDate claim (`exp`, `nbf`, `iat`) as whole Unix seconds.
    ///
    /// Fractional values are truncated toward negative infinity.
    ///
    /// # Errors
    ///
    /// `TokenError::Malformed` if present with a non-numeric value.
    pub fn numeric_date(&self, name: &str) -> Result<Option<i64>, TokenError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => {
                if let Some(secs) = n.as_i64() {
                    Ok(Some(secs))
                } else if let Some(secs) = n.as_f64().filter(|f| f.is_finite()) {
                    Ok(Some(secs.floor() as i64))
                } else {
                    Err(TokenError::Malformed)
                }
            }
            Some(_) => Err(TokenError::Malformed),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        Claims::from(value.as_object().unwrap().clone())
    }

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims = claims(json!({
            "sub": "550e8400-e29b-41d4-a716-446655440000",
            "preferred_username": "alice"
        }));

        let debug_str = format!("{:?}", claims);

        assert!(
            !debug_str.contains("550e8400"),
            "Debug output should not contain actual sub value"
        );
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("alice"));
    }

    #[test]
    fn test_required_str_present() {
        let claims = claims(json!({"email": "alice@example.com"}));
        assert_eq!(claims.required_str(EMAIL).unwrap(), "alice@example.com");
    }

    #[test]
    fn test_required_str_missing_or_null() {
        let claims = claims(json!({"given_name": null}));

        assert_eq!(
            claims.required_str(EMAIL).unwrap_err(),
            AuthError::ClaimMissing(EMAIL)
        );
        assert_eq!(
            claims.required_str(GIVEN_NAME).unwrap_err(),
            AuthError::ClaimMissing(GIVEN_NAME)
        );
    }

    #[test]
    fn test_required_str_wrong_type() {
        let claims = claims(json!({"email": 42, "family_name": ["Anders"]}));

        assert_eq!(
            claims.required_str(EMAIL).unwrap_err(),
            AuthError::ClaimMalformed(EMAIL)
        );
        assert_eq!(
            claims.required_str(FAMILY_NAME).unwrap_err(),
            AuthError::ClaimMalformed(FAMILY_NAME)
        );
    }

    #[test]
    fn test_subject_id_parses_uuid() {
        let claims = claims(json!({"sub": "550e8400-e29b-41d4-a716-446655440000"}));
        assert_eq!(
            claims.subject_id().unwrap().to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_subject_id_rejects_missing_non_string_and_non_uuid() {
        assert_eq!(
            claims(json!({})).subject_id().unwrap_err(),
            AuthError::InvalidUserId
        );
        assert_eq!(
            claims(json!({"sub": 12345})).subject_id().unwrap_err(),
            AuthError::InvalidUserId
        );
        assert_eq!(
            claims(json!({"sub": "service-account-alice"}))
                .subject_id()
                .unwrap_err(),
            AuthError::InvalidUserId
        );
    }

    #[test]
    fn test_numeric_date_variants() {
        let claims = claims(json!({
            "exp": 1700000000,
            "nbf": 1700000000.75,
            "iat": "1700000000"
        }));

        assert_eq!(claims.numeric_date(EXP).unwrap(), Some(1_700_000_000));
        assert_eq!(claims.numeric_date(NBF).unwrap(), Some(1_700_000_000));
        assert_eq!(claims.numeric_date(IAT).unwrap_err(), TokenError::Malformed);
        assert_eq!(claims.numeric_date("auth_time").unwrap(), None);
    }

    #[test]
    fn test_claims_serialize_as_plain_object() {
        let original = json!({"sub": "x", "exp": 1});
        let claims = claims(original.clone());

        assert_eq!(serde_json::to_value(&claims).unwrap(), original);
    }
}
