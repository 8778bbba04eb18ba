//! Middleware for oidc-guard.
//!
//! # Components
//!
//! - `auth` - Bearer token authentication for protected routes

pub mod auth;

pub use auth::{require_auth, user_details, AuthState, UserExt};
