//! HTTP routes for the oidc-guard demo host.
//!
//! Defines the Axum router and application state.

use crate::auth::{KeyCache, TokenVerifier};
use crate::config::Config;
use crate::handlers;
use crate::middleware::{require_auth, AuthState};
use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Realm signing keys, refreshed in the background.
    pub key_cache: Arc<KeyCache>,

    /// Token verifier bound to `key_cache`.
    pub verifier: Arc<TokenVerifier>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Key cache status - public
/// - `/metrics` - Prometheus metrics endpoint - public
/// - `/v1/me` - Current user endpoint - requires authentication
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        verifier: Arc::clone(&state.verifier),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/v1/me", get(handlers::get_me))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
