//! Current user handler.
//!
//! Returns the user record attached by the auth middleware.

use crate::models::User;
use axum::{Extension, Json};
use tracing::instrument;

/// Handler for GET /v1/me
///
/// Requires valid authentication via the auth middleware.
///
/// ## Response
///
/// Returns 200 OK with the user record:
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "username": "alice",
///   "firstName": "Alice",
///   "lastName": "Anders",
///   "email": "alice@example.com",
///   "enabled": false
/// }
/// ```
#[instrument(skip_all, name = "guard.handlers.me")]
pub async fn get_me(Extension(user): Extension<User>) -> Json<User> {
    tracing::debug!(target: "guard.handlers.me", "Returning user record");
    Json(user)
}
