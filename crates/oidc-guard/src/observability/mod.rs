//! Observability for oidc-guard.
//!
//! Provides metric definitions for key refreshes and token validation.

pub mod metrics;
