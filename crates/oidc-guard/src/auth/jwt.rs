//! Bearer token verification against the cached realm keys.
//!
//! Verification is pure CPU work: the only shared state touched is a
//! lock-free read of the key cache, and no fetch is ever triggered from the
//! request path. Each call re-runs every check; results are never cached.
//!
//! # Checks, in order
//!
//! 1. Size and compact structure (`header.claims.signature`), header and
//!    claims decode to JSON objects
//! 2. `kid` present in the header
//! 3. Key lookup by `kid`
//! 4. `alg` present, not `none`, and permitted for the resolved key
//! 5. Signature over `header.claims`
//! 6. `exp` (required), `nbf` and `iat` against the wall clock

use crate::auth::claims::{self, Claims};
use crate::auth::jwks::{KeyCache, KeySet, SigningKey};
use crate::errors::AuthError;
use crate::models::User;
use crate::observability::metrics;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::Algorithm;
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::instrument;

/// Maximum accepted token size in bytes (8KB), checked before any decoding.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// How far in the future `iat` may lie before the token is refused.
pub const IAT_FUTURE_TOLERANCE_SECONDS: i64 = 300;

/// Reasons a token is rejected by the verifier.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("key not found")]
    UnknownKey,

    #[error("token signing algorithm is not permitted")]
    AlgorithmMismatch,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token is expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,
}

impl TokenError {
    /// Bounded label used when recording rejection metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::UnknownKey => "unknown_key",
            TokenError::AlgorithmMismatch => "algorithm_mismatch",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
            TokenError::NotYetValid => "not_yet_valid",
        }
    }
}

/// Source of signing keys by key ID.
///
/// Implemented by the refreshing [`KeyCache`] and by a fixed [`KeySet`].
pub trait KeySource: Send + Sync {
    fn lookup(&self, kid: &str) -> Option<Arc<SigningKey>>;
}

impl KeySource for KeyCache {
    fn lookup(&self, kid: &str) -> Option<Arc<SigningKey>> {
        KeyCache::lookup(self, kid)
    }
}

impl KeySource for KeySet {
    fn lookup(&self, kid: &str) -> Option<Arc<SigningKey>> {
        self.get(kid).cloned()
    }
}

/// Token verifier bound to a key source.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn KeySource>,

    /// Clock skew tolerance in seconds applied to `exp`, `nbf` and `iat`.
    leeway_seconds: i64,
}

impl TokenVerifier {
    /// Create a verifier with exact (zero leeway) temporal checks.
    pub fn new(keys: Arc<dyn KeySource>) -> Self {
        Self::with_leeway(keys, 0)
    }

    /// Create a verifier with a clock skew tolerance in seconds.
    pub fn with_leeway(keys: Arc<dyn KeySource>, leeway_seconds: i64) -> Self {
        Self {
            keys,
            leeway_seconds: leeway_seconds.max(0),
        }
    }

    pub fn leeway_seconds(&self) -> i64 {
        self.leeway_seconds
    }

    /// Verify a compact token against the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns the `TokenError` of the first failing check.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a compact token as of `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns the `TokenError` of the first failing check.
    #[instrument(skip_all, name = "guard.auth.jwt.verify")]
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let parts = split_token(token)?;

        let kid = parts
            .header
            .get("kid")
            .and_then(Value::as_str)
            .filter(|kid| !kid.is_empty())
            .ok_or_else(|| {
                tracing::debug!(target: "guard.auth.jwt", "Token header has no usable kid");
                TokenError::Malformed
            })?;

        let key = self.keys.lookup(kid).ok_or_else(|| {
            tracing::debug!(target: "guard.auth.jwt", kid = %kid, "No cached key for kid");
            TokenError::UnknownKey
        })?;

        let alg = header_algorithm(&parts.header, &key)?;

        let signature_ok =
            jsonwebtoken::crypto::verify(parts.signature, parts.signing_input.as_bytes(), key.decoding_key(), alg)
                .map_err(|e| {
                    tracing::debug!(target: "guard.auth.jwt", kid = %kid, error = %e, "Signature check errored");
                    TokenError::BadSignature
                })?;
        if !signature_ok {
            tracing::debug!(target: "guard.auth.jwt", kid = %kid, "Signature mismatch");
            return Err(TokenError::BadSignature);
        }

        let claims = Claims::from(parts.claims);
        self.check_temporal_claims(&claims, now)?;

        tracing::debug!(target: "guard.auth.jwt", kid = %kid, "Token verified");
        Ok(claims)
    }

    /// Verify a token and project its claims into a [`User`].
    ///
    /// # Errors
    ///
    /// `AuthError::Token` for verification failures, or the claim error from
    /// [`User::from_claims`].
    pub fn parse_token(&self, token: &str) -> Result<User, AuthError> {
        let start = Instant::now();

        let result = self
            .verify(token)
            .map_err(AuthError::from)
            .and_then(|claims| User::from_claims(&claims));

        match &result {
            Ok(_) => metrics::record_token_validation("success", "none", start.elapsed()),
            Err(e) => metrics::record_token_validation("error", e.error_type(), start.elapsed()),
        }

        result
    }

    fn check_temporal_claims(&self, claims: &Claims, now: i64) -> Result<(), TokenError> {
        let leeway = self.leeway_seconds;

        let exp = claims.numeric_date(claims::EXP)?.ok_or_else(|| {
            tracing::debug!(target: "guard.auth.jwt", "Token has no exp claim");
            TokenError::Malformed
        })?;
        // exp is an exclusive upper bound
        if now >= exp.saturating_add(leeway) {
            tracing::debug!(target: "guard.auth.jwt", exp = exp, now = now, "Token expired");
            return Err(TokenError::Expired);
        }

        if let Some(nbf) = claims.numeric_date(claims::NBF)? {
            if nbf > now.saturating_add(leeway) {
                tracing::debug!(target: "guard.auth.jwt", nbf = nbf, now = now, "Token not valid yet");
                return Err(TokenError::NotYetValid);
            }
        }

        if let Some(iat) = claims.numeric_date(claims::IAT)? {
            let max_iat = now
                .saturating_add(leeway)
                .saturating_add(IAT_FUTURE_TOLERANCE_SECONDS);
            if iat > max_iat {
                tracing::debug!(target: "guard.auth.jwt", iat = iat, now = now, "Token issued in the future");
                return Err(TokenError::NotYetValid);
            }
        }

        Ok(())
    }
}

/// Decoded pieces of a compact token.
struct TokenParts<'a> {
    header: Map<String, Value>,
    claims: Map<String, Value>,
    /// `header.claims` exactly as received.
    signing_input: &'a str,
    signature: &'a str,
}

fn split_token(token: &str) -> Result<TokenParts<'_>, TokenError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "guard.auth.jwt",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenError::Malformed);
    }

    if token.split('.').count() != 3 {
        tracing::debug!(target: "guard.auth.jwt", "Token rejected: not three segments");
        return Err(TokenError::Malformed);
    }

    let (signing_input, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
    let (header_b64, claims_b64) = signing_input
        .split_once('.')
        .ok_or(TokenError::Malformed)?;

    Ok(TokenParts {
        header: decode_object(header_b64, "header")?,
        claims: decode_object(claims_b64, "claims")?,
        signing_input,
        signature,
    })
}

fn decode_object(segment: &str, part: &'static str) -> Result<Map<String, Value>, TokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!(target: "guard.auth.jwt", part = part, error = %e, "Segment is not base64url");
        TokenError::Malformed
    })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            tracing::debug!(target: "guard.auth.jwt", part = part, "Segment is not a JSON object");
            Err(TokenError::Malformed)
        }
        Err(e) => {
            tracing::debug!(target: "guard.auth.jwt", part = part, error = %e, "Segment is not JSON");
            Err(TokenError::Malformed)
        }
    }
}

/// Resolve the header `alg` and confirm the key may verify it.
fn header_algorithm(
    header: &Map<String, Value>,
    key: &SigningKey,
) -> Result<Algorithm, TokenError> {
    let name = header.get("alg").and_then(Value::as_str).ok_or_else(|| {
        tracing::debug!(target: "guard.auth.jwt", "Token header has no alg");
        TokenError::Malformed
    })?;

    if name.eq_ignore_ascii_case("none") {
        tracing::warn!(target: "guard.auth.jwt", kid = %key.kid(), "Rejected unsigned token (alg=none)");
        return Err(TokenError::AlgorithmMismatch);
    }

    let alg = Algorithm::from_str(name).map_err(|_| {
        tracing::debug!(target: "guard.auth.jwt", alg = %name, "Unknown token algorithm");
        TokenError::AlgorithmMismatch
    })?;

    if !key.permits(alg) {
        tracing::debug!(
            target: "guard.auth.jwt",
            kid = %key.kid(),
            alg = ?alg,
            key_alg = ?key.algorithm(),
            "Token algorithm not permitted for key"
        );
        return Err(TokenError::AlgorithmMismatch);
    }

    Ok(alg)
}
