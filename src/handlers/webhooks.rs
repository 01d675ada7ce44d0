use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha512;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::gateway::{PaymentOutcome, ProviderTransaction};
use crate::AppState;

type HmacSha512 = Hmac<Sha512>;

/// Paystack signs the raw body with the account's secret and puts the hex
/// digest here.
const SIGNATURE_HEADER: &str = "x-paystack-signature";

#[utoipa::path(
    post,
    path = "/api/v1/webhooks/payments",
    summary = "Payment provider webhook",
    description = "Receives charge events from the payment provider. A recorded outcome \
                   short-circuits the provider lookup when the buyer completes the purchase.",
    request_body = String,
    responses(
        (status = 200, description = "Webhook accepted"),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid signature", body = crate::errors::ErrorResponse),
    ),
    tag = "webhooks"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    // Verify signature if configured
    if let Some(secret) = state.config.payment_webhook_secret.as_deref() {
        if !verify_signature(&headers, &body, secret) {
            warn!("Payment webhook signature verification failed");
            return Err(ServiceError::Unauthorized(
                "invalid webhook signature".to_string(),
            ));
        }
    }

    let json: Value = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::InvalidInput(format!("invalid json: {}", e)))?;

    // The webhook only records outcomes; completion stays the single path
    // that settles a purchase and writes the ticket.
    let event_type = json.get("event").and_then(|v| v.as_str()).unwrap_or("");
    let data = json.get("data").cloned().unwrap_or(Value::Null);
    match event_type {
        "charge.success" => match data.get("reference").and_then(|v| v.as_str()) {
            Some(reference) => {
                let transaction = ProviderTransaction {
                    reference: reference.to_string(),
                    status: "success".to_string(),
                    amount: data.get("amount").and_then(|v| v.as_u64()),
                    paid_at: parse_paid_at(&data),
                    channel: data
                        .get("channel")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                };
                state
                    .services
                    .purchases
                    .confirm(reference, PaymentOutcome::Success(transaction));
            }
            None => info!("charge.success event carried no reference"),
        },
        "charge.failed" => match data.get("reference").and_then(|v| v.as_str()) {
            Some(reference) => {
                let detail = data
                    .get("gateway_response")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                state
                    .services
                    .purchases
                    .confirm(reference, PaymentOutcome::Failed(detail));
            }
            None => info!("charge.failed event carried no reference"),
        },
        _ => {
            info!("Unhandled payment webhook type: {}", event_type);
        }
    }

    Ok((StatusCode::OK, "ok"))
}

fn parse_paid_at(data: &Value) -> Option<DateTime<Utc>> {
    data.get("paid_at")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

fn verify_signature(headers: &HeaderMap, payload: &Bytes, secret: &str) -> bool {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok()) else {
        return false;
    };

    let mut mac = match HmacSha512::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());
    constant_time_eq(&expected, signature)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}

/// Creates the router for provider callback endpoints
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payments", post(payment_webhook))
}
