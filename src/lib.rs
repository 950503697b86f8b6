use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod policy;
pub mod rating;
pub mod repository;
pub mod seed;

pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use auth::{AuthService, AuthState, Principal};
pub use config::AppConfig;
pub use error::AppError;
pub use identity::{IdentityState, InMemoryIdentityStore};
pub use policy::AccessPolicy;
pub use rating::{RatingAggregator, RatingState};
pub use repository::{DestinationState, InMemoryDestinationStore};

use credentials::{Argon2Hasher, HasherState};

/// ApiDoc
///
/// OpenAPI document for every handler, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::register_user,
        handlers::create_destination, handlers::list_destinations, handlers::search_destinations,
        handlers::get_destination, handlers::update_destination, handlers::rate_destination,
        handlers::delete_destination, handlers::get_public_destinations,
        handlers::get_public_destination
    ),
    components(
        schemas(
            models::Destination, models::DestinationRequest, models::RegisterRequest,
            models::LoginRequest, models::LoginResponse, models::UserProfile,
        )
    ),
    tags(
        (name = "travel-catalog", description = "Destination catalog API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request may touch, wired once at startup and cloned cheaply into each
/// handler. The caller's identity is not here: it travels with the request as a `Principal`.
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityState,
    pub destinations: DestinationState,
    pub auth: AuthState,
    pub ratings: RatingState,
    pub policy: Arc<AccessPolicy>,
    pub config: AppConfig,
}

impl AppState {
    /// Wires the in-memory stores, the Argon2 hasher and the default policy table.
    pub fn in_memory(config: AppConfig) -> Result<Self, AppError> {
        let hasher: HasherState = Arc::new(Argon2Hasher::new(
            config.hash_memory_kib,
            config.hash_iterations,
        )?);

        let identity: IdentityState = Arc::new(InMemoryIdentityStore::new(hasher.clone()));
        let destinations: DestinationState = Arc::new(InMemoryDestinationStore::new());
        let auth = Arc::new(AuthService::new(identity.clone(), hasher)?);
        let ratings = Arc::new(RatingAggregator::new(destinations.clone()));

        Ok(Self {
            identity,
            destinations,
            auth,
            ratings,
            policy: Arc::new(AccessPolicy::default()),
            config,
        })
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for DestinationState {
    fn from_ref(app_state: &AppState) -> DestinationState {
        app_state.destinations.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

/// create_router
///
/// Assembles the routing tree. The `access_control` middleware wraps every route,
/// including unmatched paths, so nothing is reachable without a policy decision.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .merge(admin::admin_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::access_control,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, correlated by the generated `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
