//! oidc-guard
//!
//! Bearer token authentication for HTTP services backed by an
//! OpenID-Connect identity provider.
//!
//! # Modules
//!
//! - `auth` - JWKS key cache, token verifier and claim access
//! - `config` - Key cache settings and host configuration
//! - `errors` - Error types and their HTTP rendering
//! - `handlers` - HTTP request handlers of the demo host
//! - `middleware` - Request authenticator for axum routers
//! - `models` - User record and response shapes
//! - `observability` - Metrics definitions
//! - `routes` - Router and application state of the demo host

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
