//! Tixline ticketing API: event catalog, Paystack purchases, ticket wallet.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod pricing;
pub mod services;
pub mod store;
pub mod tracing;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth_config: auth::AuthConfig,
    pub gateway: Arc<dyn gateway::PaymentGateway>,
    pub services: handlers::AppServices,
}

/// Uniform JSON envelope for every successful route.
///
/// `success` is always present; `data`, `message` and `errors` fill in per
/// response. `meta` carries the request id so a storefront error report
/// can be matched to server logs.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    /// Snapshot of the task-local request id plus the current time.
    fn capture() -> Self {
        let request_id =
            crate::tracing::current_request_id().map(|rid| rid.as_str().to_string());
        Self {
            request_id,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    fn envelope(success: bool) -> Self {
        Self {
            success,
            data: None,
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn success(data: T) -> Self {
        let mut response = Self::envelope(true);
        response.data = Some(data);
        response
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        let mut response = Self::success(data);
        response.message = Some(message.into());
        response
    }

    pub fn error(message: String) -> Self {
        let mut response = Self::envelope(false);
        response.message = Some(message);
        response
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        let mut response = Self::envelope(false);
        response.message = Some("Validation failed".to_string());
        response.errors = Some(errors);
        response
    }
}

/// Handler return type: enveloped JSON or a [`errors::ServiceError`].
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Everything mounted under /api/v1.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Dev token mint + identity echo
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/events", handlers::listings::listing_routes())
        .nest("/purchases", handlers::purchases::purchase_routes())
        .nest("/my-tickets", handlers::tickets::ticket_routes())
        // Provider callbacks, signature-verified rather than token-authed
        .nest("/webhooks", handlers::webhooks::webhook_routes())
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let status = json!({
        "status": "ok",
        "service": "tixline-api",
        "version": env!("CARGO_PKG_VERSION"),
        "git": option_env!("GIT_HASH").unwrap_or("unknown"),
        "build_time": option_env!("BUILD_TIME").unwrap_or("unknown"),
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let database = if state.db.ping().await.is_ok() {
        "healthy"
    } else {
        "unhealthy"
    };

    // A not-ready gateway does not degrade overall health; purchases
    // report "payment system loading" on their own.
    let payment_gateway = if state.gateway.is_ready() {
        "ready"
    } else {
        "loading"
    };

    let health = json!({
        "status": database,
        "checks": {
            "database": database,
            "payment_gateway": payment_gateway,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health)))
}
