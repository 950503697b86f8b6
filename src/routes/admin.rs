use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Admin Router Module
///
/// Account administration. `/api/auth/**` (other than login) requires the `ADMIN` role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/auth/register
        .route("/api/auth/register", post(handlers::register_user))
}
