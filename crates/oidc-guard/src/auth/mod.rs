//! Token authentication against the identity provider's realm keys.
//!
//! # Components
//!
//! - `jwks` - Key cache holding the realm's public signing keys, refreshed in the background
//! - `jwt` - Token verification against the cached keys
//! - `claims` - Claim set of a verified token

pub mod claims;
pub mod jwks;
pub mod jwt;

pub use claims::Claims;
pub use jwks::{spawn_refresher, KeyCache, KeySet, SigningKey};
pub use jwt::{KeySource, TokenError, TokenVerifier};
