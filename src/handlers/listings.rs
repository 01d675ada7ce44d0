use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::models::EventListing;
use crate::services::catalog::{
    listing_share_text, CatalogStats, CreateListingRequest, ListingResponse,
};
use crate::{ApiResponse, AppState};

/// Storefront grid filters.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CatalogQuery {
    /// Nigerian state to filter by. Omitted or "Nigeria" returns everything.
    pub region: Option<String>,
    /// Case-insensitive match against titles and event types.
    pub q: Option<String>,
}

/// A catalog row plus the ready-to-share blurb for the card's share button.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: ListingResponse,
    pub share_text: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/events",
    summary = "Browse events",
    description = "List catalog events, optionally filtered by state and search term",
    params(
        ("region" = Option<String>, Query, description = "State filter; omit or pass Nigeria for all states"),
        ("q" = Option<String>, Query, description = "Search term matched against title and event type"),
    ),
    responses(
        (status = 200, description = "Events retrieved successfully", body = ApiResponse<Vec<ListingResponse>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<CatalogQuery>,
) -> Result<Json<ApiResponse<Vec<ListingResponse>>>, ServiceError> {
    // An empty region means the picker was never touched.
    let region = params.region.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let listings = state
        .services
        .catalog
        .search(region, params.q.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(listings)))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    summary = "Get event",
    description = "Retrieve a single event with its maps link and share text",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event retrieved successfully", body = ApiResponse<ListingDetail>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ListingDetail>>, ServiceError> {
    let listing = state
        .services
        .catalog
        .get_listing(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Event {} not found", id)))?;

    let share_text = listing_share_text(&listing.listing);
    Ok(Json(ApiResponse::success(ListingDetail {
        listing,
        share_text,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/by-title/{title}",
    summary = "Get event by title",
    description = "Retrieve an event by its exact title, as the checkout page references it",
    params(("title" = String, Path, description = "Exact event title")),
    responses(
        (status = 200, description = "Event retrieved successfully", body = ApiResponse<EventListing>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "events"
)]
pub async fn get_event_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<ApiResponse<EventListing>>, ServiceError> {
    let listing = state
        .services
        .catalog
        .find_by_title(&title)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Event \"{}\" not found", title)))?;
    Ok(Json(ApiResponse::success(listing)))
}

#[utoipa::path(
    post,
    path = "/api/v1/events",
    summary = "Create event",
    description = "Create a catalog event from the organizer wizard payload",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Event created successfully", body = ApiResponse<ListingResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "An event with this title already exists", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ListingResponse>>), ServiceError> {
    let listing = state.services.catalog.create_listing(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            listing,
            "🎉 Event created successfully!",
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/stats",
    summary = "Catalog stats",
    description = "Tickets-sold and revenue rollup per event for the organizer dashboard",
    responses(
        (status = 200, description = "Stats retrieved successfully", body = ApiResponse<CatalogStats>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "events"
)]
pub async fn catalog_stats(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<ApiResponse<CatalogStats>>, ServiceError> {
    let stats = state.services.catalog.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Creates the router for event catalog endpoints
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events))
        .route("/", post(create_event))
        .route("/stats", get(catalog_stats))
        .route("/by-title/:title", get(get_event_by_title))
        .route("/:id", get(get_event))
}
