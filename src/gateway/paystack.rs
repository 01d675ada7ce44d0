//! Paystack REST adapter.
//!
//! Talks to the Paystack transaction API with the secret key. The hosted
//! checkout page plays the role the inline widget plays on the storefront;
//! `resolve` maps the provider's verify endpoint onto [`PaymentOutcome`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{GatewayError, PaymentGateway, PaymentOutcome, ProviderTransaction};
use crate::models::PurchaseSession;

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct PaystackGateway {
    client: Client,
    base_url: String,
    secret_key: Option<String>,
}

impl PaystackGateway {
    /// Build an adapter with a default client and sensible timeouts. A
    /// missing secret key yields a gateway that reports not-ready instead
    /// of failing construction.
    pub fn new(secret_key: Option<String>, base_url: Option<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to construct http client: {}", e)))?;

        Ok(Self::with_client(secret_key, base_url, client))
    }

    /// Build an adapter from an existing client (useful for testing).
    pub fn with_client(
        secret_key: Option<String>,
        base_url: Option<String>,
        client: Client,
    ) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            secret_key: secret_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn secret(&self) -> Result<&str, GatewayError> {
        self.secret_key.as_deref().ok_or(GatewayError::NotReady)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for PaystackGateway {
    fn is_ready(&self) -> bool {
        self.secret_key.is_some()
    }

    #[instrument(skip(self, session), fields(reference = %session.reference))]
    async fn initiate(&self, session: &PurchaseSession) -> Result<(), GatewayError> {
        let secret = self.secret()?;
        let url = format!("{}/transaction/initialize", self.base_url);

        let body = serde_json::json!({
            "email": session.payer_email,
            "amount": session.amount,
            "currency": session.currency,
            "reference": session.reference,
            "metadata": session.metadata,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(secret)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("initialize request failed: {}", e)))?;

        let status = response.status();
        let envelope: Envelope<InitializeData> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("unreadable initialize response: {}", e)))?;

        if !status.is_success() || !envelope.status {
            return Err(GatewayError::Rejected(envelope.message));
        }

        debug!(reference = %session.reference, "payment session opened with provider");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve(&self, reference: &str) -> Result<PaymentOutcome, GatewayError> {
        let secret = self.secret()?;
        let url = format!("{}/transaction/verify/{}", self.base_url, reference);

        let response = self
            .client
            .get(&url)
            .bearer_auth(secret)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("verify request failed: {}", e)))?;

        let status = response.status();
        let envelope: Envelope<VerifyData> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("unreadable verify response: {}", e)))?;

        if !status.is_success() || !envelope.status {
            return Err(GatewayError::Rejected(envelope.message));
        }

        let data = envelope
            .data
            .ok_or_else(|| GatewayError::Rejected("verify response carried no data".to_string()))?;

        Ok(outcome_from_verify(data))
    }
}

/// Maps the provider's charge status onto the outcome union. Anything that
/// is neither settled nor buyer-abandoned counts as a failure, with the
/// provider's own response text as detail when present.
fn outcome_from_verify(data: VerifyData) -> PaymentOutcome {
    match data.status.as_str() {
        "success" => PaymentOutcome::Success(ProviderTransaction {
            reference: data.reference,
            status: data.status,
            amount: data.amount,
            paid_at: data.paid_at,
            channel: data.channel,
        }),
        "abandoned" => PaymentOutcome::Cancelled,
        other => {
            warn!(status = other, reference = %data.reference, "charge did not settle");
            PaymentOutcome::Failed(data.gateway_response)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    #[allow(dead_code)]
    authorization_url: String,
    #[allow(dead_code)]
    access_code: String,
    #[allow(dead_code)]
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    reference: String,
    amount: Option<u64>,
    gateway_response: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    channel: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify_data(status: &str) -> VerifyData {
        VerifyData {
            status: status.to_string(),
            reference: "1700000000000-AB12CD".to_string(),
            amount: Some(500_000),
            gateway_response: Some("Declined by financial institution".to_string()),
            paid_at: None,
            channel: Some("card".to_string()),
        }
    }

    #[test]
    fn settled_charge_maps_to_success() {
        let outcome = outcome_from_verify(verify_data("success"));
        match outcome {
            PaymentOutcome::Success(tx) => {
                assert_eq!(tx.reference, "1700000000000-AB12CD");
                assert_eq!(tx.amount, Some(500_000));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn abandoned_charge_maps_to_cancelled() {
        assert_eq!(
            outcome_from_verify(verify_data("abandoned")),
            PaymentOutcome::Cancelled
        );
    }

    #[test]
    fn failed_charge_carries_provider_detail() {
        let outcome = outcome_from_verify(verify_data("failed"));
        assert_eq!(
            outcome,
            PaymentOutcome::Failed(Some("Declined by financial institution".to_string()))
        );
    }

    #[test]
    fn missing_secret_key_reports_not_ready() {
        let gateway = PaystackGateway::new(None, None).unwrap();
        assert!(!gateway.is_ready());

        let gateway = PaystackGateway::new(Some("  ".to_string()), None).unwrap();
        assert!(!gateway.is_ready());

        let gateway = PaystackGateway::new(Some("sk_test_abc".to_string()), None).unwrap();
        assert!(gateway.is_ready());
    }

    #[test]
    fn verify_envelope_deserializes() {
        let raw = r#"{
            "status": true,
            "message": "Verification successful",
            "data": {
                "status": "success",
                "reference": "1700000000000-AB12CD",
                "amount": 500000,
                "gateway_response": "Successful",
                "paid_at": "2024-05-01T12:30:00Z",
                "channel": "card"
            }
        }"#;

        let envelope: Envelope<VerifyData> = serde_json::from_str(raw).unwrap();
        assert!(envelope.status);
        let data = envelope.data.unwrap();
        assert_eq!(data.amount, Some(500_000));
        assert!(data.paid_at.is_some());
    }
}
