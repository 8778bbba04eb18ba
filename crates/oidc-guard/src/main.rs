//! oidc-guard demo host
//!
//! Serves a single authenticated endpoint (`/v1/me`) in front of an
//! OpenID-Connect identity provider.
//!
//! # Startup
//!
//! 1. Load configuration from the environment
//! 2. Install the Prometheus recorder
//! 3. Fetch the realm JWKS (fatal on failure) and start the refresher
//! 4. Serve HTTP until SIGINT/SIGTERM
//!
//! Shutdown cancels the refresher and waits `GUARD_DRAIN_SECONDS`.

use oidc_guard::auth::{KeyCache, TokenVerifier};
use oidc_guard::config::Config;
use oidc_guard::observability::metrics::init_metrics_recorder;
use oidc_guard::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oidc_guard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting oidc-guard");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        jwks_url = %config.key_cache.jwks_url(),
        refresh_interval_secs = config.key_cache.refresh_interval().as_secs(),
        bind_address = %config.bind_address,
        jwt_clock_skew_seconds = config.jwt_clock_skew_seconds,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let shutdown_token = CancellationToken::new();

    let key_cache = KeyCache::connect(config.key_cache.clone(), shutdown_token.child_token())
        .await
        .map_err(|e| {
            error!("Failed to load signing keys: {}", e);
            e
        })?;

    let verifier = Arc::new(TokenVerifier::with_leeway(
        key_cache.clone(),
        config.jwt_clock_skew_seconds,
    ));

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let state = Arc::new(AppState {
        key_cache,
        verifier,
        config,
    });
    let app = routes::build_routes(state, metrics_handle);

    info!("oidc-guard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token))
        .await?;

    info!("oidc-guard shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
///
/// Cancels `shutdown_token` (stopping the JWKS refresher) and returns once
/// the drain period is complete.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    shutdown_token.cancel();

    // Graceful shutdown drain period
    let drain_secs: u64 = std::env::var("GUARD_DRAIN_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    if drain_secs > 0 {
        warn!("Draining connections for {} seconds...", drain_secs);
        tokio::time::sleep(Duration::from_secs(drain_secs)).await;
        info!("Drain period complete");
    } else {
        info!("Skipping drain period (GUARD_DRAIN_SECONDS=0)");
    }
}
