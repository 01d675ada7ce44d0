use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gateway::GatewayError;
use crate::store::StoreError;

/// Body returned for every failed request.
///
/// `error` is the canonical reason phrase of the status, `message` is what
/// the storefront shows the buyer, and `details` carries the toast title
/// when one applies.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Not Found",
    "message": "No event selected. Please try again.",
    "details": null,
    "request_id": "9d2c1e4a-51cb-4e0f-8f3a-6b7d0c5e2a18",
    "timestamp": "2026-03-14T18:02:11.000Z"
}))]
pub struct ErrorResponse {
    #[schema(example = "Not Found")]
    pub error: String,
    #[schema(example = "No event selected. Please try again.")]
    pub message: String,
    /// Toast title or validation context, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Sign in Required")]
    pub details: Option<String>,
    /// Correlates the failure with server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "9d2c1e4a-51cb-4e0f-8f3a-6b7d0c5e2a18")]
    pub request_id: Option<String>,
    #[schema(example = "2026-03-14T18:02:11.000Z")]
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    // Storage and infrastructure.
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    /// Ticket write or read-back failed. The display text is the store
    /// error's own buyer-facing message; payment has already settled when
    /// this surfaces.
    #[error("{}", .0.user_message())]
    TicketSave(#[from] StoreError),

    // Lookups.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Purchase was started without a resolvable listing.
    #[error("No event selected. Please try again.")]
    NoListingSelected,

    // Request shape.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Identity. The three message-only variants carry the auth gate's
    // buyer-facing copy.
    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("You must be logged in to purchase tickets.")]
    SignInRequired,

    #[error("Please log in to continue.")]
    EmailRequired,

    #[error("User session lost. Please log in again.")]
    SessionLost,

    // Payments.
    #[error("Payment system loading. Please try again.")]
    GatewayNotReady,

    #[error("Payment error: {0}")]
    PaymentFailed(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    // Internal.
    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<GatewayError> for ServiceError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotReady => ServiceError::GatewayNotReady,
            GatewayError::Rejected(msg) => ServiceError::PaymentFailed(msg),
            GatewayError::Transport(msg) => ServiceError::ExternalServiceError(msg),
        }
    }
}

impl ServiceError {
    /// Single place where variants are assigned an HTTP status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::NoListingSelected => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidInput(_) | Self::InvalidOperation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::AuthError(_)
            | Self::Unauthorized(_)
            | Self::JwtError(_)
            | Self::SignInRequired
            | Self::EmailRequired
            | Self::SessionLost => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::GatewayNotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
            Self::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            Self::TicketSave(store_err) => match store_err {
                StoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::QuotaExceeded(_) => StatusCode::INSUFFICIENT_STORAGE,
                // A missing tickets collection is a deployment defect, not
                // a client error.
                StoreError::NotFound(_) | StoreError::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::DatabaseError(_)
            | Self::EventError(_)
            | Self::InternalServerError
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body. Infrastructure failures are
    /// collapsed to a generic line so connection strings and channel state
    /// never reach the client.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalServerError | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Extra context paired with some buyer-facing errors, shown as the
    /// toast title on the storefront.
    fn response_details(&self) -> Option<String> {
        match self {
            Self::SignInRequired => Some("Sign in Required".to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.response_details(),
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}
