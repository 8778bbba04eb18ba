//! Configuration for oidc-guard.
//!
//! Two layers:
//!
//! - [`KeyCacheSettings`] carries the three values the key cache needs (base
//!   URL, realm, refresh interval). The library core never reads the
//!   environment; hosts build these settings however they like.
//! - [`Config`] is the demo host configuration, loaded from environment
//!   variables (or a map of them, for testing).

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default JWKS refresh interval in minutes.
pub const DEFAULT_REFRESH_INTERVAL_MINUTES: u64 = 5;

/// Default clock skew tolerance in seconds for `exp`/`nbf` checks.
///
/// Zero means temporal claims are compared exactly against the wall clock.
pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 0;

/// Maximum accepted clock skew tolerance in seconds (10 minutes).
pub const MAX_CLOCK_SKEW_SECONDS: i64 = 600;

/// Default HTTP bind address for the demo host.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Path template appended to the provider base URL.
const CERTS_PATH: &str = "protocol/openid-connect/certs";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid provider configuration: {0}")]
    InvalidProvider(String),

    #[error("Invalid JWKS refresh interval: {0}")]
    InvalidRefreshInterval(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),
}

/// Settings for the JWKS key cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCacheSettings {
    base_url: String,
    realm: String,
    refresh_interval: Duration,
}

impl KeyCacheSettings {
    /// Build settings from the provider base URL, realm and a refresh
    /// interval in whole minutes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidProvider` if the base URL or realm is
    /// empty, and `ConfigError::InvalidRefreshInterval` if the interval is
    /// below one minute.
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        refresh_interval_minutes: u64,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let realm = realm.into();

        if base_url.is_empty() {
            return Err(ConfigError::InvalidProvider(
                "base URL must not be empty".to_string(),
            ));
        }
        if realm.is_empty() || realm.contains('/') {
            return Err(ConfigError::InvalidProvider(format!(
                "realm must be a non-empty path segment, got '{}'",
                realm
            )));
        }
        if refresh_interval_minutes < 1 {
            return Err(ConfigError::InvalidRefreshInterval(
                "refresh interval must be at least 1 minute".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            realm,
            refresh_interval: Duration::from_secs(refresh_interval_minutes.saturating_mul(60)),
        })
    }

    /// Override the refresh interval with an arbitrary duration.
    ///
    /// Deployments configure whole minutes through [`KeyCacheSettings::new`];
    /// sub-minute intervals exist for tests that exercise rotation.
    #[must_use]
    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// JWKS endpoint: `{base}/realms/{realm}/protocol/openid-connect/certs`.
    pub fn jwks_url(&self) -> String {
        format!("{}/realms/{}/{}", self.base_url, self.realm, CERTS_PATH)
    }
}

/// Demo host configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key cache settings (provider base URL, realm, refresh interval).
    pub key_cache: KeyCacheSettings,

    /// Clock skew tolerance in seconds for temporal claim checks.
    pub jwt_clock_skew_seconds: i64,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let base_url = vars
            .get("OIDC_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("OIDC_BASE_URL".to_string()))?
            .clone();

        let realm = vars
            .get("OIDC_REALM")
            .ok_or_else(|| ConfigError::MissingEnvVar("OIDC_REALM".to_string()))?
            .clone();

        let refresh_interval_minutes =
            if let Some(value_str) = vars.get("JWKS_REFRESH_INTERVAL_MINUTES") {
                value_str.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidRefreshInterval(format!(
                        "JWKS_REFRESH_INTERVAL_MINUTES must be a positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?
            } else {
                DEFAULT_REFRESH_INTERVAL_MINUTES
            };

        let key_cache = KeyCacheSettings::new(base_url, realm, refresh_interval_minutes)?;

        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value < 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not be negative, got {}",
                    value
                )));
            }

            if value > MAX_CLOCK_SKEW_SECONDS {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_CLOCK_SKEW_SECONDS
        };

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Ok(Self {
            key_cache,
            jwt_clock_skew_seconds,
            bind_address,
        })
    }
}
