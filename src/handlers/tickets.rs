use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::models::TicketRecord;
use crate::services::tickets::share_text;
use crate::{ApiResponse, AppState};

/// A saved ticket plus the prefilled share message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: TicketRecord,
    pub share_text: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/my-tickets",
    summary = "My tickets",
    description = "List the signed-in buyer's saved tickets, newest purchase first",
    responses(
        (status = 200, description = "Tickets retrieved successfully", body = ApiResponse<Vec<TicketRecord>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn my_tickets(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<TicketRecord>>>, ServiceError> {
    let tickets = state.services.tickets.my_tickets(&identity.user_id).await?;
    Ok(Json(ApiResponse::success(tickets)))
}

#[utoipa::path(
    get,
    path = "/api/v1/my-tickets/{id}",
    summary = "Ticket detail",
    description = "Retrieve one of the buyer's tickets with its share message. \
                   Tickets owned by other accounts read as not found.",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket retrieved successfully", body = ApiResponse<TicketDetail>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Ticket not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn ticket_detail(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TicketDetail>>, ServiceError> {
    let ticket = state
        .services
        .tickets
        .ticket_detail(&identity.user_id, &id)
        .await?;
    let share_text = share_text(&ticket);
    Ok(Json(ApiResponse::success(TicketDetail {
        ticket,
        share_text,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/my-tickets/verify/{code}",
    summary = "Find ticket by verification code",
    description = "Look one of the buyer's tickets up by its eight-character verification code",
    params(("code" = String, Path, description = "Verification code printed on the ticket")),
    responses(
        (status = 200, description = "Ticket retrieved successfully", body = ApiResponse<TicketRecord>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "No ticket with that code", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn find_by_verification_code(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<TicketRecord>>, ServiceError> {
    let ticket = state
        .services
        .tickets
        .find_by_verification_code(&identity.user_id, &code)
        .await?;
    Ok(Json(ApiResponse::success(ticket)))
}

/// Creates the router for the ticket wallet endpoints
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(my_tickets))
        .route("/verify/:code", get(find_by_verification_code))
        .route("/:id", get(ticket_detail))
}
