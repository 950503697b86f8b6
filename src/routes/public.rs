use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints matched by `Public` rules: health probe, the credential check, and the
/// read-only public view of the catalog.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Load balancer probe.
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/login
        .route("/api/auth/login", post(handlers::login))
        // GET /api/destinations/public
        .route("/api/destinations/public", get(handlers::get_public_destinations))
        // GET /api/destinations/public/{id}
        .route(
            "/api/destinations/public/{id}",
            get(handlers::get_public_destination),
        )
}
