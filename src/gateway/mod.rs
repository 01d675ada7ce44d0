//! Payment provider integration.
//!
//! The provider's callback-style widget API is modeled as an awaitable
//! contract: `initiate` opens a payment session and `resolve` reports the
//! outcome as an explicit tagged union. The purchase state machine consumes
//! [`PaymentOutcome`] values and never registers callbacks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::PurchaseSession;

pub mod mock;
pub mod paystack;

pub use mock::MockGateway;
pub use paystack::PaystackGateway;

/// What the provider reports for one payment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// Charge settled; carries the provider's transaction details.
    Success(ProviderTransaction),
    /// The buyer backed out inside the provider's UI. Not a failure.
    Cancelled,
    /// Provider-reported error, with detail when the provider gave one.
    Failed(Option<String>),
}

/// Provider-side view of a settled transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProviderTransaction {
    pub reference: String,
    #[schema(example = "success")]
    pub status: String,
    /// Settled amount in kobo, when the provider reports one.
    pub amount: Option<u64>,
    pub paid_at: Option<DateTime<Utc>>,
    pub channel: Option<String>,
}

impl ProviderTransaction {
    /// Minimal settled transaction for a reference; used by adapters that
    /// have no richer detail to attach.
    pub fn settled(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            status: "success".to_string(),
            amount: None,
            paid_at: Some(Utc::now()),
            channel: None,
        }
    }
}

/// Failures of the gateway itself, as opposed to provider-reported payment
/// outcomes.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway has no usable provider configuration yet.
    #[error("payment gateway is not ready")]
    NotReady,

    /// The provider rejected the session descriptor.
    #[error("provider rejected the session: {0}")]
    Rejected(String),

    /// Transport-level failure talking to the provider.
    #[error("provider transport error: {0}")]
    Transport(String),
}

/// Narrow contract over the external payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Readiness flag; mirrors the provider widget's script-loaded state.
    /// `initiate` must not be called while this is false.
    fn is_ready(&self) -> bool;

    /// Opens a payment session for the descriptor. Side effects happen on
    /// the provider's side; control returns here immediately.
    async fn initiate(&self, session: &PurchaseSession) -> Result<(), GatewayError>;

    /// Looks up the outcome of a previously initiated session.
    async fn resolve(&self, reference: &str) -> Result<PaymentOutcome, GatewayError>;
}
