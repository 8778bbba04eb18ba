//! JWKS key cache for the identity provider's realm signing keys.
//!
//! The cache fetches `{base}/realms/{realm}/protocol/openid-connect/certs`
//! once at construction (construction fails if that fetch fails) and then
//! refreshes it from a background task on a fixed interval.
//!
//! # Publication
//!
//! The visible [`KeySet`] lives behind an [`ArcSwap`]. A refresh builds the
//! complete replacement set first and publishes it with a single pointer
//! store, so readers see either the previous generation or the next one,
//! never a set under construction. Readers never block the refresher and a
//! failed refresh leaves the published set untouched.
//!
//! Construction itself is not cancellable: the initial fetch runs to
//! completion (or failure) on the caller's task. The cancellation token only
//! governs the background refresher.

use crate::config::KeyCacheSettings;
use crate::errors::AuthError;
use crate::observability::metrics;
use arc_swap::ArcSwap;
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Lower bound on the refresher period; tokio intervals reject a zero period.
const MIN_REFRESH_PERIOD: std::time::Duration = std::time::Duration::from_millis(10);

/// JSON Web Key as published by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA", "EC", "OKP").
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// Algorithm the key is intended for (e.g. "RS256").
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use ("sig" or "enc").
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// RSA modulus (base64url).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url).
    #[serde(default)]
    pub e: Option<String>,

    /// Curve name for EC and OKP keys.
    #[serde(default)]
    pub crv: Option<String>,

    /// EC x coordinate or OKP public key (base64url).
    #[serde(default)]
    pub x: Option<String>,

    /// EC y coordinate (base64url).
    #[serde(default)]
    pub y: Option<String>,
}

/// JWKS document.
///
/// Entries are kept as raw JSON so that one unusable entry (an encryption
/// key, an unknown key type) does not invalidate the whole document.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<serde_json::Value>,
}

/// Reasons a JWK entry is not admitted into a [`KeySet`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwkError {
    #[error("key is published for encryption, not signing")]
    EncryptionKey,

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    #[error("missing key parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

/// Algorithm family of a signing key, derived from the JWK `kty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Rsa,
    Ec,
    Okp,
}

impl KeyFamily {
    fn from_kty(kty: &str) -> Result<Self, JwkError> {
        match kty {
            "RSA" => Ok(KeyFamily::Rsa),
            "EC" => Ok(KeyFamily::Ec),
            "OKP" => Ok(KeyFamily::Okp),
            other => Err(JwkError::UnsupportedKeyType(other.to_string())),
        }
    }

    /// Whether `alg` is a signature algorithm of this family.
    ///
    /// HMAC algorithms belong to no family: a public JWKS can never hold the
    /// secret they need.
    pub fn accepts(self, alg: Algorithm) -> bool {
        match self {
            KeyFamily::Rsa => matches!(
                alg,
                Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512
            ),
            KeyFamily::Ec => matches!(alg, Algorithm::ES256 | Algorithm::ES384),
            KeyFamily::Okp => matches!(alg, Algorithm::EdDSA),
        }
    }
}

/// A verified-usable public signing key. Immutable once constructed.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    family: KeyFamily,
    algorithm: Algorithm,
    /// True when the provider pinned the algorithm via the JWK `alg` member.
    algorithm_declared: bool,
    decoding_key: DecodingKey,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("family", &self.family)
            .field("algorithm", &self.algorithm)
            .field("algorithm_declared", &self.algorithm_declared)
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Build a signing key from a JWK.
    ///
    /// # Errors
    ///
    /// Returns a `JwkError` describing why the entry cannot be used for
    /// signature verification.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, JwkError> {
        if jwk.key_use.as_deref() == Some("enc") {
            return Err(JwkError::EncryptionKey);
        }

        let family = KeyFamily::from_kty(&jwk.kty)?;

        let declared = match jwk.alg.as_deref() {
            Some(name) => {
                let alg = Algorithm::from_str(name)
                    .map_err(|_| JwkError::UnsupportedAlgorithm(name.to_string()))?;
                if !family.accepts(alg) {
                    return Err(JwkError::UnsupportedAlgorithm(name.to_string()));
                }
                Some(alg)
            }
            None => None,
        };

        let (default_alg, decoding_key) = match family {
            KeyFamily::Rsa => {
                let n = jwk.n.as_deref().ok_or(JwkError::MissingParameter("n"))?;
                let e = jwk.e.as_deref().ok_or(JwkError::MissingParameter("e"))?;
                let key = DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| JwkError::InvalidKeyMaterial(e.to_string()))?;
                (Algorithm::RS256, key)
            }
            KeyFamily::Ec => {
                let alg = match jwk.crv.as_deref() {
                    Some("P-256") => Algorithm::ES256,
                    Some("P-384") => Algorithm::ES384,
                    Some(other) => return Err(JwkError::UnsupportedCurve(other.to_string())),
                    None => return Err(JwkError::MissingParameter("crv")),
                };
                let x = jwk.x.as_deref().ok_or(JwkError::MissingParameter("x"))?;
                let y = jwk.y.as_deref().ok_or(JwkError::MissingParameter("y"))?;
                let key = DecodingKey::from_ec_components(x, y)
                    .map_err(|e| JwkError::InvalidKeyMaterial(e.to_string()))?;
                (alg, key)
            }
            KeyFamily::Okp => {
                match jwk.crv.as_deref() {
                    Some("Ed25519") => {}
                    Some(other) => return Err(JwkError::UnsupportedCurve(other.to_string())),
                    None => return Err(JwkError::MissingParameter("crv")),
                }
                let x = jwk.x.as_deref().ok_or(JwkError::MissingParameter("x"))?;
                let key = DecodingKey::from_ed_components(x)
                    .map_err(|e| JwkError::InvalidKeyMaterial(e.to_string()))?;
                (Algorithm::EdDSA, key)
            }
        };

        Ok(Self {
            kid: jwk.kid.clone(),
            family,
            algorithm: declared.unwrap_or(default_alg),
            algorithm_declared: declared.is_some(),
            decoding_key,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Whether a token header's `alg` may be verified with this key.
    ///
    /// The algorithm must belong to the key's family; when the provider
    /// declared an algorithm for the key, it must match exactly.
    pub fn permits(&self, alg: Algorithm) -> bool {
        if self.algorithm_declared {
            alg == self.algorithm
        } else {
            self.family.accepts(alg)
        }
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// One immutable generation of signing keys, indexed by key ID.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, Arc<SigningKey>>,
}

impl KeySet {
    /// Build a key set from a JWKS document.
    ///
    /// Unusable entries are skipped and logged. When several entries share a
    /// key ID, the first one wins.
    pub fn from_jwks(jwks: JwksResponse) -> Self {
        let mut keys: HashMap<String, Arc<SigningKey>> = HashMap::with_capacity(jwks.keys.len());

        for entry in jwks.keys {
            let jwk: Jwk = match serde_json::from_value(entry) {
                Ok(jwk) => jwk,
                Err(e) => {
                    tracing::warn!(target: "guard.auth.jwks", error = %e, "Skipping malformed JWKS entry");
                    continue;
                }
            };

            let key = match SigningKey::from_jwk(&jwk) {
                Ok(key) => key,
                Err(e) => {
                    tracing::debug!(target: "guard.auth.jwks", kid = %jwk.kid, reason = %e, "Skipping JWKS entry");
                    continue;
                }
            };

            if keys.contains_key(&jwk.kid) {
                tracing::warn!(target: "guard.auth.jwks", kid = %jwk.kid, "Duplicate key ID in JWKS, keeping first entry");
                continue;
            }
            keys.insert(jwk.kid, Arc::new(key));
        }

        Self { keys }
    }

    /// Build a key set from already constructed keys (first key per ID wins).
    pub fn from_keys(keys: impl IntoIterator<Item = SigningKey>) -> Self {
        let mut map = HashMap::new();
        for key in keys {
            map.entry(key.kid.clone()).or_insert_with(|| Arc::new(key));
        }
        Self { keys: map }
    }

    pub fn get(&self, kid: &str) -> Option<&Arc<SigningKey>> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key IDs in this set, sorted.
    pub fn key_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Concurrently readable cache of the realm's signing keys.
pub struct KeyCache {
    settings: KeyCacheSettings,
    jwks_url: String,
    http_client: reqwest::Client,
    current: ArcSwap<KeySet>,
}

impl fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCache")
            .field("jwks_url", &self.jwks_url)
            .field("refresh_interval", &self.settings.refresh_interval())
            .field("key_count", &self.key_count())
            .finish()
    }
}

impl KeyCache {
    /// Fetch the initial key set and start the background refresher.
    ///
    /// The refresher runs until `cancel_token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderUnavailable` if the initial fetch fails or
    /// the response is not a JWKS document.
    pub async fn connect(
        settings: KeyCacheSettings,
        cancel_token: CancellationToken,
    ) -> Result<Arc<Self>, AuthError> {
        let cache = Arc::new(Self::initialize(settings).await?);
        spawn_refresher(Arc::clone(&cache), cancel_token);
        Ok(cache)
    }

    /// Fetch the initial key set without starting a refresher.
    ///
    /// Hosts that manage the refresh task themselves pair this with
    /// [`spawn_refresher`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderUnavailable` if the initial fetch fails.
    #[instrument(skip_all, name = "guard.auth.jwks.initialize")]
    pub async fn initialize(settings: KeyCacheSettings) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder().build().map_err(|e| {
            tracing::error!(target: "guard.auth.jwks", error = %e, "Failed to build HTTP client");
            AuthError::ProviderUnavailable(format!("failed to build HTTP client: {}", e))
        })?;
        let jwks_url = settings.jwks_url();

        let initial = fetch_key_set(&http_client, &jwks_url).await.map_err(|e| {
            metrics::record_jwks_refresh("error");
            tracing::error!(target: "guard.auth.jwks", url = %jwks_url, error = %e, "Initial JWKS fetch failed");
            e
        })?;

        metrics::record_jwks_refresh("success");
        metrics::set_jwks_key_count(initial.len());
        tracing::info!(
            target: "guard.auth.jwks",
            url = %jwks_url,
            key_count = initial.len(),
            "JWKS loaded"
        );

        Ok(Self {
            settings,
            jwks_url,
            http_client,
            current: ArcSwap::from_pointee(initial),
        })
    }

    /// Look up a key by ID in the currently published set.
    ///
    /// Lock-free; never triggers a fetch.
    pub fn lookup(&self, kid: &str) -> Option<Arc<SigningKey>> {
        self.current.load().get(kid).cloned()
    }

    /// The currently published key set.
    pub fn snapshot(&self) -> Arc<KeySet> {
        self.current.load_full()
    }

    pub fn key_count(&self) -> usize {
        self.current.load().len()
    }

    /// Key IDs in the currently published set, sorted.
    pub fn key_ids(&self) -> Vec<String> {
        self.current
            .load()
            .key_ids()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        self.settings.refresh_interval()
    }

    /// Re-fetch the JWKS and publish it if the fetch succeeds.
    ///
    /// On failure the error is logged at warn level, returned, and the
    /// published set is left as it was.
    ///
    /// Returns the number of keys in the newly published set.
    #[instrument(skip_all, name = "guard.auth.jwks.refresh")]
    pub async fn refresh(&self) -> Result<usize, AuthError> {
        match fetch_key_set(&self.http_client, &self.jwks_url).await {
            Ok(next) => {
                let key_count = next.len();
                self.current.store(Arc::new(next));

                metrics::record_jwks_refresh("success");
                metrics::set_jwks_key_count(key_count);
                tracing::info!(target: "guard.auth.jwks", key_count = key_count, "JWKS updated successfully");
                Ok(key_count)
            }
            Err(e) => {
                metrics::record_jwks_refresh("error");
                tracing::warn!(
                    target: "guard.auth.jwks",
                    error = %e,
                    retained_key_count = self.key_count(),
                    "JWKS refresh failed, keeping current key set"
                );
                Err(e)
            }
        }
    }
}

/// Fetch and parse the JWKS document into a complete key set.
async fn fetch_key_set(client: &reqwest::Client, url: &str) -> Result<KeySet, AuthError> {
    tracing::debug!(target: "guard.auth.jwks", url = %url, "Fetching JWKS");

    let response = client.get(url).send().await.map_err(|e| {
        AuthError::ProviderUnavailable(format!("failed to fetch JWKS: {}", e))
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::ProviderUnavailable(format!(
            "JWKS endpoint returned status {}",
            status
        )));
    }

    let jwks: JwksResponse = response.json().await.map_err(|e| {
        AuthError::ProviderUnavailable(format!("failed to parse JWKS document: {}", e))
    })?;

    let key_set = KeySet::from_jwks(jwks);
    if key_set.is_empty() {
        tracing::warn!(target: "guard.auth.jwks", url = %url, "JWKS contains no usable signing keys");
    }

    Ok(key_set)
}

/// Spawn the background refresher for `cache`.
pub fn spawn_refresher(cache: Arc<KeyCache>, cancel_token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(run_refresher(cache, cancel_token))
}

/// Refresh `cache` every refresh interval until `cancel_token` is cancelled.
///
/// The first refresh happens one full interval after start. There is no
/// jitter and no backoff: a failed refresh simply waits for the next tick.
#[instrument(skip_all, name = "guard.task.jwks_refresher")]
pub async fn run_refresher(cache: Arc<KeyCache>, cancel_token: CancellationToken) {
    let period = cache.refresh_interval().max(MIN_REFRESH_PERIOD);

    tracing::info!(
        target: "guard.task.jwks_refresher",
        interval_secs = period.as_secs(),
        url = %cache.jwks_url(),
        "Starting JWKS refresher task"
    );

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Failures are logged by refresh(); the current set stays published.
                let _ = cache.refresh().await;
            }
            _ = cancel_token.cancelled() => {
                tracing::info!(
                    target: "guard.task.jwks_refresher",
                    "JWKS refresher received shutdown signal, exiting"
                );
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use guard_test_utils::{ed25519_test_key, RSA_KEY_1, RSA_KEY_2};

    fn rsa_jwk_json(kid: &str) -> serde_json::Value {
        serde_json::json!({
            "kid": kid,
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": RSA_KEY_1.modulus,
            "e": RSA_KEY_1.exponent,
        })
    }

    fn jwk_from(value: serde_json::Value) -> Jwk {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_jwk_deserialization() {
        let json = r#"{
            "kid": "K1",
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": "AQAB",
            "e": "AQAB"
        }"#;

        let jwk: Jwk = serde_json::from_str(json).unwrap();

        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "K1");
        assert_eq!(jwk.alg.as_deref(), Some("RS256"));
        assert_eq!(jwk.key_use.as_deref(), Some("sig"));
        assert!(jwk.crv.is_none());
    }

    #[test]
    fn test_jwks_response_requires_keys_array() {
        assert!(serde_json::from_str::<JwksResponse>(r#"{"keys": []}"#).is_ok());
        assert!(serde_json::from_str::<JwksResponse>(r#"{"foo": []}"#).is_err());
        assert!(serde_json::from_str::<JwksResponse>(r#"{"keys": {}}"#).is_err());
        assert!(serde_json::from_str::<JwksResponse>("[]").is_err());
    }

    #[test]
    fn test_rsa_key_from_jwk() {
        let key = SigningKey::from_jwk(&jwk_from(rsa_jwk_json("K1"))).unwrap();

        assert_eq!(key.kid(), "K1");
        assert_eq!(key.family(), KeyFamily::Rsa);
        assert_eq!(key.algorithm(), Algorithm::RS256);
        assert!(key.permits(Algorithm::RS256));
        assert!(!key.permits(Algorithm::RS512), "declared alg pins the key");
        assert!(!key.permits(Algorithm::ES256));
        assert!(!key.permits(Algorithm::HS256));
    }

    #[test]
    fn test_rsa_key_without_declared_alg_accepts_family() {
        let mut value = rsa_jwk_json("K1");
        value.as_object_mut().unwrap().remove("alg");
        let key = SigningKey::from_jwk(&jwk_from(value)).unwrap();

        assert_eq!(key.algorithm(), Algorithm::RS256);
        assert!(key.permits(Algorithm::RS384));
        assert!(key.permits(Algorithm::PS256));
        assert!(!key.permits(Algorithm::EdDSA));
        assert!(!key.permits(Algorithm::HS256));
    }

    #[test]
    fn test_encryption_key_rejected() {
        let mut value = rsa_jwk_json("enc-key");
        value["use"] = serde_json::json!("enc");
        value["alg"] = serde_json::json!("RSA-OAEP");

        let err = SigningKey::from_jwk(&jwk_from(value)).unwrap_err();
        assert_eq!(err, JwkError::EncryptionKey);
    }

    #[test]
    fn test_non_signature_algorithm_rejected() {
        let mut value = rsa_jwk_json("K1");
        value["alg"] = serde_json::json!("RSA-OAEP");
        value.as_object_mut().unwrap().remove("use");

        let err = SigningKey::from_jwk(&jwk_from(value)).unwrap_err();
        assert_eq!(err, JwkError::UnsupportedAlgorithm("RSA-OAEP".to_string()));
    }

    #[test]
    fn test_algorithm_outside_family_rejected() {
        let mut value = rsa_jwk_json("K1");
        value["alg"] = serde_json::json!("ES256");

        let err = SigningKey::from_jwk(&jwk_from(value)).unwrap_err();
        assert_eq!(err, JwkError::UnsupportedAlgorithm("ES256".to_string()));
    }

    #[test]
    fn test_symmetric_key_rejected() {
        let value = serde_json::json!({"kid": "hmac", "kty": "oct", "k": "c2VjcmV0", "alg": "HS256"});
        let err = SigningKey::from_jwk(&jwk_from(value)).unwrap_err();
        assert_eq!(err, JwkError::UnsupportedKeyType("oct".to_string()));
    }

    #[test]
    fn test_rsa_key_missing_modulus_rejected() {
        let mut value = rsa_jwk_json("K1");
        value.as_object_mut().unwrap().remove("n");

        let err = SigningKey::from_jwk(&jwk_from(value)).unwrap_err();
        assert_eq!(err, JwkError::MissingParameter("n"));
    }

    #[test]
    fn test_rsa_key_invalid_base64_rejected() {
        let mut value = rsa_jwk_json("K1");
        value["n"] = serde_json::json!("!!!not-base64!!!");

        let err = SigningKey::from_jwk(&jwk_from(value)).unwrap_err();
        assert!(matches!(err, JwkError::InvalidKeyMaterial(_)));
    }

    #[test]
    fn test_ec_key_algorithm_follows_curve() {
        let value = serde_json::json!({
            "kid": "ec-1",
            "kty": "EC",
            "crv": "P-384",
            "x": "dGVzdC14LWNvb3JkaW5hdGU",
            "y": "dGVzdC15LWNvb3JkaW5hdGU",
        });
        let key = SigningKey::from_jwk(&jwk_from(value)).unwrap();

        assert_eq!(key.family(), KeyFamily::Ec);
        assert_eq!(key.algorithm(), Algorithm::ES384);
    }

    #[test]
    fn test_ec_key_unknown_curve_rejected() {
        let value = serde_json::json!({
            "kid": "ec-1",
            "kty": "EC",
            "crv": "secp256k1",
            "x": "eA",
            "y": "eQ",
        });
        let err = SigningKey::from_jwk(&jwk_from(value)).unwrap_err();
        assert_eq!(err, JwkError::UnsupportedCurve("secp256k1".to_string()));
    }

    #[test]
    fn test_okp_key_from_jwk() {
        let fixture = ed25519_test_key(1, "ed-1");
        let key = SigningKey::from_jwk(&jwk_from(fixture.jwk_json())).unwrap();

        assert_eq!(key.family(), KeyFamily::Okp);
        assert_eq!(key.algorithm(), Algorithm::EdDSA);
        assert!(key.permits(Algorithm::EdDSA));
        assert!(!key.permits(Algorithm::RS256));
    }

    #[test]
    fn test_key_set_skips_unusable_entries() {
        let jwks: JwksResponse = serde_json::from_value(serde_json::json!({
            "keys": [
                rsa_jwk_json("K1"),
                {"kid": "enc", "kty": "RSA", "use": "enc", "alg": "RSA-OAEP", "n": RSA_KEY_2.modulus, "e": RSA_KEY_2.exponent},
                {"kid": "hmac", "kty": "oct", "k": "c2VjcmV0"},
                {"kty": "RSA", "n": RSA_KEY_2.modulus, "e": RSA_KEY_2.exponent},
                "not-an-object"
            ]
        }))
        .unwrap();

        let set = KeySet::from_jwks(jwks);

        assert_eq!(set.len(), 1);
        assert_eq!(set.key_ids(), vec!["K1"]);
        assert!(set.get("enc").is_none());
        assert!(set.get("hmac").is_none());
    }

    #[test]
    fn test_key_set_duplicate_kid_keeps_first() {
        let mut second = rsa_jwk_json("K1");
        second["alg"] = serde_json::json!("PS256");

        let jwks = JwksResponse {
            keys: vec![rsa_jwk_json("K1"), second],
        };
        let set = KeySet::from_jwks(jwks);

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("K1").unwrap().algorithm(), Algorithm::RS256);
    }

    #[test]
    fn test_key_set_from_keys() {
        let k1 = SigningKey::from_jwk(&jwk_from(rsa_jwk_json("K1"))).unwrap();
        let k2 = SigningKey::from_jwk(&jwk_from(rsa_jwk_json("K2"))).unwrap();

        let set = KeySet::from_keys([k2, k1]);

        assert_eq!(set.key_ids(), vec!["K1", "K2"]);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_empty_key_set() {
        let set = KeySet::default();
        assert!(set.is_empty());
        assert!(set.get("K1").is_none());
        assert!(set.key_ids().is_empty());
    }

    #[test]
    fn test_signing_key_debug_omits_material() {
        let key = SigningKey::from_jwk(&jwk_from(rsa_jwk_json("K1"))).unwrap();
        let debug = format!("{:?}", key);

        assert!(debug.contains("K1"));
        assert!(!debug.contains(RSA_KEY_1.modulus));
    }
}
