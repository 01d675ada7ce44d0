use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{generate_token, AuthenticatedUser, Identity};
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

/// Payload for the development token mint. Every field optional; a bare
/// request gets an anonymous buyer without an email.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DevTokenRequest {
    pub user_id: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "Ada Obi")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    summary = "Mint development token",
    description = "Issues a signed bearer token for local development and tests. \
                   Disabled in production, where tokens come from the identity provider.",
    request_body = DevTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<TokenResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 403, description = "Disabled outside development", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn mint_dev_token(
    State(state): State<AppState>,
    Json(request): Json<DevTokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ServiceError> {
    if state.config.is_production() {
        return Err(ServiceError::Forbidden(
            "Token minting is disabled in production".to_string(),
        ));
    }

    let user_id = request
        .user_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let token = generate_token(
        &state.auth_config,
        &user_id,
        request.email.as_deref(),
        request.name.as_deref(),
    )?;

    info!(user_id, "minted development token");
    Ok(Json(ApiResponse::success(TokenResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth_config.token_expiration.as_secs(),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    summary = "Current identity",
    description = "Echo the identity carried by the bearer token",
    responses(
        (status = 200, description = "Identity retrieved", body = ApiResponse<Identity>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "auth"
)]
pub async fn current_identity(
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<ApiResponse<Identity>>, ServiceError> {
    Ok(Json(ApiResponse::success(identity)))
}

/// Creates the router for auth endpoints
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(mint_dev_token))
        .route("/me", get(current_identity))
}
