//! Health check handler.
//!
//! `/health` reports whether the key cache currently holds any signing keys.
//! An empty key set keeps the process alive but rejects every token, so it
//! is reported as `degraded` with 503.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

#[tracing::instrument(skip_all, name = "guard.health")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let jwks_keys = state.key_cache.key_count();

    if jwks_keys == 0 {
        tracing::warn!(target: "guard.health", "Key cache holds no signing keys");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                jwks_keys,
            }),
        );
    }

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            jwks_keys,
        }),
    )
}
