//! # Guard Test Utilities
//!
//! Shared test utilities for oidc-guard.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (two fixed RSA keys, seeded Ed25519 keys)
//! - Token signing and tampering helpers
//! - Claim builders (TestTokenBuilder)
//! - A mock identity provider serving a realm JWKS
//! - Polling helpers for background refresh
//!
//! ## Usage
//!
//! ```rust,ignore
//! use guard_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let provider =
//!         MockIdentityProvider::with_keys(TEST_REALM, &[RSA_KEY_1.jwk_json("K1")]).await;
//!
//!     let token = RSA_KEY_1
//!         .signer("K1")
//!         .sign(&TestTokenBuilder::new().expires_in(60).build());
//! }
//! ```

pub mod crypto_fixtures;
pub mod eventual;
pub mod mock_provider;
pub mod token_builders;

// Re-export commonly used items
pub use crypto_fixtures::*;
pub use eventual::*;
pub use mock_provider::*;
pub use token_builders::*;
