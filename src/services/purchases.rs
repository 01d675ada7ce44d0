use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::Identity;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::gateway::{PaymentGateway, PaymentOutcome, ProviderTransaction};
use crate::models::{EventListing, PurchaseSession, PurchaseState, SessionMetadata, TicketRecord};
use crate::pricing::normalize_display_price;
use crate::services::catalog::CatalogService;
use crate::services::tickets::build_ticket_record;
use crate::store::TicketStore;

/// Receipt copy shown after a ticket is saved.
pub const SUCCESS_MESSAGE: &str = "🎟️ Payment Successful! Your ticket has been saved.";
/// Informational note after a buyer backs out. Not an error.
pub const CANCELLED_MESSAGE: &str = "Payment cancelled";
/// Where the buyer lands after a successful purchase.
pub const RECEIPT_REDIRECT: &str = "/my-tickets";

const REFERENCE_SUFFIX_LEN: usize = 6;
const GENERIC_PAYMENT_FAILURE: &str = "Unknown error";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BeginPurchaseRequest {
    /// Title of the listing the buyer selected. Listings are looked up by
    /// title; an unknown title reads as no selection.
    #[schema(example = "Jazz Night")]
    pub event_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BeginPurchaseResponse {
    #[schema(example = "1767225600123-x4Kd9Q")]
    pub reference: String,
    /// Amount in kobo the provider will charge.
    #[schema(example = 200000)]
    pub amount: u64,
    #[schema(example = "NGN")]
    pub currency: String,
    pub event_title: String,
    pub state: PurchaseState,
}

/// Outcome of a completed (or cancelled) purchase attempt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseReceipt {
    pub state: PurchaseState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<TicketRecord>,
}

/// One in-flight purchase attempt, kept until its outcome settles it.
struct PendingPurchase {
    session: PurchaseSession,
    listing: EventListing,
    identity: Identity,
    state: PurchaseState,
    /// Outcome recorded by the provider webhook, consumed by `complete`
    /// instead of a second provider round-trip.
    confirmed: Option<PaymentOutcome>,
}

/// Drives the purchase state machine from begin to settled outcome.
///
/// Sessions live in a concurrent map keyed by provider reference. Settling
/// removes the entry atomically, so each reference issues at most one
/// ticket no matter how completion attempts race.
pub struct PurchaseService {
    catalog: Arc<CatalogService>,
    store: Arc<dyn TicketStore>,
    gateway: Arc<dyn PaymentGateway>,
    event_sender: Option<Arc<EventSender>>,
    currency: String,
    pending: DashMap<String, PendingPurchase>,
}

impl PurchaseService {
    pub fn new(
        catalog: Arc<CatalogService>,
        store: Arc<dyn TicketStore>,
        gateway: Arc<dyn PaymentGateway>,
        event_sender: Option<Arc<EventSender>>,
        currency: String,
    ) -> Self {
        Self {
            catalog,
            store,
            gateway,
            event_sender,
            currency,
            pending: DashMap::new(),
        }
    }

    /// Opens a payment session for a listing.
    ///
    /// The identity and gateway gates run before any side effect: a caller
    /// without an email, or a gateway that is not ready, fails fast with
    /// nothing registered and nothing opened.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn begin(
        &self,
        identity: &Identity,
        request: BeginPurchaseRequest,
    ) -> Result<BeginPurchaseResponse, ServiceError> {
        let payer_email = identity
            .email
            .clone()
            .filter(|email| !email.trim().is_empty())
            .ok_or(ServiceError::EmailRequired)?;

        let listing = self
            .catalog
            .find_by_title(&request.event_title)
            .await?
            .ok_or(ServiceError::NoListingSelected)?;

        let amount = normalize_display_price(listing.price.as_deref());
        let reference = new_reference();

        let session = PurchaseSession {
            reference: reference.clone(),
            amount,
            currency: self.currency.clone(),
            payer_email,
            metadata: SessionMetadata::for_event(Some(&listing.title)),
        };

        if !self.gateway.is_ready() {
            return Err(ServiceError::GatewayNotReady);
        }

        self.gateway.initiate(&session).await?;

        let response = BeginPurchaseResponse {
            reference: reference.clone(),
            amount,
            currency: session.currency.clone(),
            event_title: listing.title.clone(),
            state: PurchaseState::AwaitingPayment,
        };

        self.pending.insert(
            reference.clone(),
            PendingPurchase {
                session,
                listing,
                identity: identity.clone(),
                state: PurchaseState::AwaitingPayment,
                confirmed: None,
            },
        );

        info!(%reference, amount, event_title = %response.event_title, "purchase session opened");

        self.emit(Event::PurchaseStarted {
            reference,
            event_title: response.event_title.clone(),
            amount,
        })
        .await;

        Ok(response)
    }

    /// Settles an in-flight purchase from its provider outcome.
    ///
    /// Uses the webhook-confirmed outcome when one arrived, otherwise asks
    /// the provider. Resolution happens before the session is removed so a
    /// transport failure leaves the attempt retryable.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn complete(
        &self,
        identity: &Identity,
        reference: &str,
    ) -> Result<PurchaseReceipt, ServiceError> {
        let confirmed = {
            let entry = self.pending.get(reference).ok_or_else(|| {
                ServiceError::NotFound(format!("No pending purchase with reference {}", reference))
            })?;
            if entry.identity.user_id != identity.user_id {
                warn!(%reference, "completion attempted by a different user");
                return Err(ServiceError::SessionLost);
            }
            entry.confirmed.clone()
        };

        let outcome = match confirmed {
            Some(outcome) => outcome,
            None => self.gateway.resolve(reference).await?,
        };

        let Some((_, pending)) = self.pending.remove(reference) else {
            return Err(ServiceError::Conflict(format!(
                "Purchase {} was already completed",
                reference
            )));
        };

        self.settle(pending, outcome).await
    }

    /// Explicit buyer cancellation outside the provider's UI. Resets the
    /// attempt; a retry starts over with a fresh reference.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn cancel(
        &self,
        identity: &Identity,
        reference: &str,
    ) -> Result<PurchaseReceipt, ServiceError> {
        {
            let entry = self.pending.get(reference).ok_or_else(|| {
                ServiceError::NotFound(format!("No pending purchase with reference {}", reference))
            })?;
            if entry.identity.user_id != identity.user_id {
                return Err(ServiceError::SessionLost);
            }
        }

        let Some((_, pending)) = self.pending.remove(reference) else {
            return Err(ServiceError::NotFound(format!(
                "No pending purchase with reference {}",
                reference
            )));
        };

        self.settle(pending, PaymentOutcome::Cancelled).await
    }

    /// Records a provider-confirmed outcome against an in-flight session;
    /// the buyer's completion call consumes it instead of asking the
    /// provider again. Unknown references are ignored so webhook retries
    /// for settled purchases stay harmless.
    #[instrument(skip(self, outcome))]
    pub fn confirm(&self, reference: &str, outcome: PaymentOutcome) -> bool {
        match self.pending.get_mut(reference) {
            Some(mut entry) => {
                info!(%reference, "provider outcome recorded for in-flight purchase");
                entry.confirmed = Some(outcome);
                true
            }
            None => {
                info!(%reference, "provider outcome for unknown or settled reference ignored");
                false
            }
        }
    }

    /// Whether a purchase attempt is still awaiting its outcome.
    pub fn is_pending(&self, reference: &str) -> bool {
        self.pending.contains_key(reference)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// State of an in-flight attempt; settled attempts read as `None`.
    pub fn state(&self, reference: &str) -> Option<PurchaseState> {
        self.pending.get(reference).map(|entry| entry.state)
    }

    async fn settle(
        &self,
        pending: PendingPurchase,
        outcome: PaymentOutcome,
    ) -> Result<PurchaseReceipt, ServiceError> {
        let reference = pending.session.reference.clone();

        match outcome {
            PaymentOutcome::Success(tx) => self.issue_ticket(pending, tx).await,
            PaymentOutcome::Cancelled => {
                info!(%reference, "Payment cancelled");
                self.emit(Event::PurchaseCancelled { reference }).await;
                Ok(PurchaseReceipt {
                    state: PurchaseState::Cancelled,
                    message: CANCELLED_MESSAGE.to_string(),
                    redirect_to: None,
                    ticket: None,
                })
            }
            PaymentOutcome::Failed(detail) => {
                warn!(%reference, ?detail, "provider reported payment failure");
                self.emit(Event::PaymentFailed {
                    reference,
                    detail: detail.clone(),
                })
                .await;
                Err(ServiceError::PaymentFailed(
                    detail.unwrap_or_else(|| GENERIC_PAYMENT_FAILURE.to_string()),
                ))
            }
        }
    }

    async fn issue_ticket(
        &self,
        pending: PendingPurchase,
        tx: ProviderTransaction,
    ) -> Result<PurchaseReceipt, ServiceError> {
        let PendingPurchase {
            session,
            listing,
            identity,
            ..
        } = pending;
        let reference = session.reference.clone();

        self.emit(Event::PaymentCaptured {
            reference: reference.clone(),
            amount: tx.amount,
        })
        .await;

        let record = build_ticket_record(&listing, &identity, &session, Some(tx.reference.as_str()));

        let stored_id = match self.store.add_ticket(record.clone()).await {
            Ok(id) => id,
            Err(store_err) => {
                error!(
                    %reference,
                    error = %store_err,
                    code = store_err.code(),
                    "ticket write failed after payment capture"
                );
                self.emit(Event::TicketWriteFailed {
                    reference: reference.clone(),
                    user_id: identity.user_id.clone(),
                    detail: store_err.to_string(),
                })
                .await;
                return Err(ServiceError::TicketSave(store_err));
            }
        };

        // Read back strictly after the write. A miss is logged and never
        // surfaced; the write itself did not fail.
        let verified = match self.store.get_ticket(&stored_id).await {
            Ok(Some(stored)) => Some(stored),
            Ok(None) => {
                warn!(%reference, ticket_id = %stored_id, "ticket read-back found no document");
                None
            }
            Err(e) => {
                warn!(%reference, ticket_id = %stored_id, error = %e, "ticket read-back failed");
                None
            }
        };

        let ticket = verified.unwrap_or(record);

        info!(%reference, ticket_id = %ticket.ticket_id, "ticket issued");

        self.emit(Event::TicketIssued {
            ticket_id: ticket.ticket_id,
            user_id: identity.user_id.clone(),
            event_title: ticket.event_title.clone(),
        })
        .await;

        Ok(PurchaseReceipt {
            state: PurchaseState::Succeeded,
            message: SUCCESS_MESSAGE.to_string(),
            redirect_to: Some(RECEIPT_REDIRECT.to_string()),
            ticket: Some(ticket),
        })
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send purchase event");
            }
        }
    }
}

/// Unique provider reference: unix millis plus a random alphanumeric
/// suffix, so two attempts started in the same millisecond still differ.
fn new_reference() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFERENCE_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}
