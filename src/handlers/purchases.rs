use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};

use crate::auth::MaybeAuthenticated;
use crate::errors::ServiceError;
use crate::services::purchases::{BeginPurchaseRequest, BeginPurchaseResponse, PurchaseReceipt};
use crate::{ApiResponse, AppState};

#[utoipa::path(
    post,
    path = "/api/v1/purchases",
    summary = "Begin purchase",
    description = "Open a payment session for one ticket to the named event. \
                   The returned reference identifies the attempt until it is completed or cancelled.",
    request_body = BeginPurchaseRequest,
    responses(
        (status = 201, description = "Payment session opened", body = ApiResponse<BeginPurchaseResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Not signed in, or no usable email on the account", body = crate::errors::ErrorResponse),
        (status = 402, description = "Provider rejected the session", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such event", body = crate::errors::ErrorResponse),
        (status = 503, description = "Payment system not ready", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "purchases"
)]
pub async fn begin_purchase(
    State(state): State<AppState>,
    MaybeAuthenticated(identity): MaybeAuthenticated,
    Json(request): Json<BeginPurchaseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BeginPurchaseResponse>>), ServiceError> {
    // Sign-in gate runs before anything touches the gateway.
    let identity = identity.ok_or(ServiceError::SignInRequired)?;
    let response = state.services.purchases.begin(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchases/{reference}/complete",
    summary = "Complete purchase",
    description = "Settle a pending purchase after the provider flow returns. On success the \
                   ticket is saved and the receipt points at the buyer's wallet.",
    params(("reference" = String, Path, description = "Purchase reference from begin")),
    responses(
        (status = 200, description = "Purchase settled", body = ApiResponse<PurchaseReceipt>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Identity lost mid-flight or session owned by another account", body = crate::errors::ErrorResponse),
        (status = 402, description = "Payment failed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown purchase reference", body = crate::errors::ErrorResponse),
        (status = 409, description = "Purchase already completed", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "purchases"
)]
pub async fn complete_purchase(
    State(state): State<AppState>,
    MaybeAuthenticated(identity): MaybeAuthenticated,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<PurchaseReceipt>>, ServiceError> {
    // Signing out between begin and complete reads as a lost session, not
    // a fresh sign-in prompt.
    let identity = identity.ok_or(ServiceError::SessionLost)?;
    let receipt = state
        .services
        .purchases
        .complete(&identity, &reference)
        .await?;
    Ok(Json(ApiResponse::success(receipt)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchases/{reference}/cancel",
    summary = "Cancel purchase",
    description = "Abandon a pending purchase. Nothing is written; a later retry starts fresh.",
    params(("reference" = String, Path, description = "Purchase reference from begin")),
    responses(
        (status = 200, description = "Purchase cancelled", body = ApiResponse<PurchaseReceipt>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Identity lost mid-flight or session owned by another account", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown purchase reference", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "purchases"
)]
pub async fn cancel_purchase(
    State(state): State<AppState>,
    MaybeAuthenticated(identity): MaybeAuthenticated,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<PurchaseReceipt>>, ServiceError> {
    let identity = identity.ok_or(ServiceError::SessionLost)?;
    let receipt = state
        .services
        .purchases
        .cancel(&identity, &reference)
        .await?;
    Ok(Json(ApiResponse::success(receipt)))
}

/// Creates the router for purchase endpoints
pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(begin_purchase))
        .route("/:reference/complete", post(complete_purchase))
        .route("/:reference/cancel", post(cancel_purchase))
}
