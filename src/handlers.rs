use crate::{
    AppState,
    auth::{AuthState, Principal},
    error::{AppError, Result},
    models::{
        Destination, DestinationRequest, LoginRequest, LoginResponse, RegisterRequest,
        UserProfile,
    },
    repository::DestinationState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

// --- Query Structs ---

/// SearchQuery
///
/// Query parameters for `GET /api/destinations/search`. A missing or empty `query`
/// matches every destination.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// RateQuery
///
/// Query parameters for `PATCH /api/destinations/{id}/rate`.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RateQuery {
    /// Integer rating, 1 to 10 inclusive.
    pub rating: i32,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("destination {id}"))
}

// --- Auth Handlers ---

/// login
///
/// [Public Route] Checks a username/password pair and reports the resolved roles.
/// Requests themselves authenticate with HTTP Basic; this endpoint only confirms credentials.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(auth): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let principal = auth
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        username: principal.username,
        roles: principal.roles.into_iter().collect(),
    }))
}

/// register_user
///
/// [Admin Route] Creates a new account with a single role (default `USER`).
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = UserProfile),
        (status = 400, description = "Username already taken"),
        (status = 403, description = "Caller lacks the ADMIN role")
    )
)]
pub async fn register_user(
    principal: Principal,
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let user = state
        .identity
        .register(&payload.username, &payload.password, &payload.role)
        .await?;

    tracing::info!(by = %principal.username, username = %user.username, "account registered");
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

// --- Destination Handlers ---

/// create_destination
///
/// [Authenticated Route] Adds a destination. Rating fields always start at zero.
#[utoipa::path(
    post,
    path = "/api/destinations",
    request_body = DestinationRequest,
    responses((status = 201, description = "Created", body = Destination))
)]
pub async fn create_destination(
    principal: Principal,
    State(state): State<AppState>,
    Json(payload): Json<DestinationRequest>,
) -> (StatusCode, Json<Destination>) {
    let destination = state.destinations.create(payload).await;
    tracing::debug!(by = %principal.username, destination_id = destination.id, "create handled");
    (StatusCode::CREATED, Json(destination))
}

/// list_destinations
///
/// [Authenticated Route] All destinations, ascending by id.
#[utoipa::path(
    get,
    path = "/api/destinations",
    responses((status = 200, description = "All destinations", body = [Destination]))
)]
pub async fn list_destinations(State(state): State<AppState>) -> Json<Vec<Destination>> {
    Json(state.destinations.list().await)
}

/// search_destinations
///
/// [Authenticated Route] Case-insensitive match on name or location.
/// An empty result is reported as 404.
#[utoipa::path(
    get,
    path = "/api/destinations/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matches", body = [Destination]),
        (status = 404, description = "No destination matched")
    )
)]
pub async fn search_destinations(
    State(state): State<AppState>,
    Query(filter): Query<SearchQuery>,
) -> Result<Json<Vec<Destination>>> {
    let found = state.destinations.search(&filter.query).await;
    if found.is_empty() {
        return Err(AppError::NotFound(format!("no destination matches {:?}", filter.query)));
    }
    Ok(Json(found))
}

/// get_destination
///
/// [Authenticated Route] One destination by id.
#[utoipa::path(
    get,
    path = "/api/destinations/{id}",
    params(("id" = i64, Path, description = "Destination ID")),
    responses(
        (status = 200, description = "Found", body = Destination),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Destination>> {
    state
        .destinations
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// update_destination
///
/// [Authenticated Route] Replaces name, location and description. The rating fields are
/// preserved whatever the body contains.
#[utoipa::path(
    put,
    path = "/api/destinations/{id}",
    params(("id" = i64, Path, description = "Destination ID")),
    request_body = DestinationRequest,
    responses(
        (status = 200, description = "Updated", body = Destination),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_destination(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DestinationRequest>,
) -> Result<Json<Destination>> {
    let updated = state
        .destinations
        .update(id, payload)
        .await
        .ok_or_else(|| not_found(id))?;

    tracing::debug!(by = %principal.username, destination_id = id, "update handled");
    Ok(Json(updated))
}

/// rate_destination
///
/// [Authenticated Route] Folds one rating (1-10) into the destination's running average.
#[utoipa::path(
    patch,
    path = "/api/destinations/{id}/rate",
    params(("id" = i64, Path, description = "Destination ID"), RateQuery),
    responses(
        (status = 200, description = "Rating recorded", body = Destination),
        (status = 400, description = "Rating outside 1..=10"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn rate_destination(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RateQuery>,
) -> Result<Json<Destination>> {
    let updated = state.ratings.evaluate(id, query.rating).await?;
    tracing::debug!(by = %principal.username, destination_id = id, "rating handled");
    Ok(Json(updated))
}

/// delete_destination
///
/// [Authenticated Route] Removes a destination. A second delete of the same id is a 404.
#[utoipa::path(
    delete,
    path = "/api/destinations/{id}",
    params(("id" = i64, Path, description = "Destination ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_destination(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if !state.destinations.delete(id).await {
        return Err(not_found(id));
    }

    tracing::debug!(by = %principal.username, destination_id = id, "delete handled");
    Ok(StatusCode::NO_CONTENT)
}

// --- Public Catalog Handlers ---

/// get_public_destinations
///
/// [Public Route] Anonymous read-only listing of the catalog.
#[utoipa::path(
    get,
    path = "/api/destinations/public",
    responses((status = 200, description = "All destinations", body = [Destination]))
)]
pub async fn get_public_destinations(
    State(destinations): State<DestinationState>,
) -> Json<Vec<Destination>> {
    Json(destinations.list().await)
}

/// get_public_destination
///
/// [Public Route] Anonymous read-only view of one destination.
#[utoipa::path(
    get,
    path = "/api/destinations/public/{id}",
    params(("id" = i64, Path, description = "Destination ID")),
    responses(
        (status = 200, description = "Found", body = Destination),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_public_destination(
    State(destinations): State<DestinationState>,
    Path(id): Path<i64>,
) -> Result<Json<Destination>> {
    destinations.get(id).await.map(Json).ok_or_else(|| not_found(id))
}
