//! Builder patterns for test data construction
//!
//! Provides a fluent API for creating claim sets. The defaults describe a
//! valid user, so tests only spell out the claim they are exercising.

use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

/// Subject of the default test user.
pub const ALICE_SUB: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Builder for test token claims
///
/// Defaults: the `alice` user, `iat` now, `exp` five minutes from now.
///
/// # Example
/// ```rust,ignore
/// let claims = TestTokenBuilder::new()
///     .username("bob")
///     .expires_in(60)
///     .build();
/// let token = RSA_KEY_1.signer("K1").sign(&claims);
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(ALICE_SUB));
        claims.insert("preferred_username".to_string(), json!("alice"));
        claims.insert("given_name".to_string(), json!("Alice"));
        claims.insert("family_name".to_string(), json!("Anders"));
        claims.insert("email".to_string(), json!("alice@example.com"));
        claims.insert("iat".to_string(), json!(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::seconds(300)).timestamp()),
        );
        Self { claims }
    }

    /// Set the subject
    pub fn subject(self, sub: &str) -> Self {
        self.claim("sub", json!(sub))
    }

    /// Set `preferred_username`
    pub fn username(self, username: &str) -> Self {
        self.claim("preferred_username", json!(username))
    }

    /// Set expiration in seconds from now
    pub fn expires_in(self, seconds: i64) -> Self {
        self.claim("exp", json!((Utc::now() + Duration::seconds(seconds)).timestamp()))
    }

    /// Set the expiration timestamp
    pub fn expires_at(self, timestamp: i64) -> Self {
        self.claim("exp", json!(timestamp))
    }

    /// Set issued-at timestamp
    pub fn issued_at(self, timestamp: i64) -> Self {
        self.claim("iat", json!(timestamp))
    }

    /// Set not-before timestamp
    pub fn not_before(self, timestamp: i64) -> Self {
        self.claim("nbf", json!(timestamp))
    }

    /// Set an arbitrary claim
    pub fn claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Remove a claim
    pub fn without(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Build the claims as a JSON value
    pub fn build(self) -> Value {
        Value::Object(self.claims)
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_alice() {
        let claims = TestTokenBuilder::new().build();

        assert_eq!(claims["sub"], ALICE_SUB);
        assert_eq!(claims["preferred_username"], "alice");
        assert!(claims["exp"].as_i64().unwrap() > claims["iat"].as_i64().unwrap());
    }

    #[test]
    fn test_builder_overrides_and_removes() {
        let claims = TestTokenBuilder::default()
            .username("bob")
            .not_before(42)
            .without("email")
            .build();

        assert_eq!(claims["preferred_username"], "bob");
        assert_eq!(claims["nbf"], 42);
        assert!(claims.get("email").is_none());
    }
}
