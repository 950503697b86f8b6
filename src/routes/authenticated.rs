use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Authenticated Router Module
///
/// Catalog management. Every path here falls under the `/api/destinations/**` rule, so a
/// handler only runs once the middleware has attached a `Principal`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /api/destinations
        .route(
            "/api/destinations",
            get(handlers::list_destinations).post(handlers::create_destination),
        )
        // GET /api/destinations/search?query=
        // A static segment, so it takes precedence over `{id}`.
        .route("/api/destinations/search", get(handlers::search_destinations))
        // GET/PUT/DELETE /api/destinations/{id}
        .route(
            "/api/destinations/{id}",
            get(handlers::get_destination)
                .put(handlers::update_destination)
                .delete(handlers::delete_destination),
        )
        // PATCH /api/destinations/{id}/rate?rating=
        .route("/api/destinations/{id}/rate", patch(handlers::rate_destination))
}
