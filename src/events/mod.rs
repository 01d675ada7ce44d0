//! Fire-and-forget domain events, drained by a logging loop.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Cloneable publishing handle shared across services.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Queues an event for the processing loop. The error is printable so
    /// callers can log it without caring about the channel type.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// What the purchase pipeline and catalog announce to the log stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Purchase lifecycle events
    PurchaseStarted {
        reference: String,
        event_title: String,
        amount: u64,
    },
    PaymentCaptured {
        reference: String,
        amount: Option<u64>,
    },
    PurchaseCancelled {
        reference: String,
    },
    PaymentFailed {
        reference: String,
        detail: Option<String>,
    },

    // Ticket events
    TicketIssued {
        ticket_id: Uuid,
        user_id: String,
        event_title: String,
    },
    /// Payment captured but the ticket write failed. The operator runbook
    /// reconciles these against the provider dashboard.
    TicketWriteFailed {
        reference: String,
        user_id: String,
        detail: String,
    },

    // Catalog events
    ListingCreated {
        listing_id: Uuid,
        title: String,
    },
}

/// Drains the channel and turns each event into a structured log line.
/// Runs until every [`EventSender`] clone has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::PurchaseStarted {
                reference,
                event_title,
                amount,
            } => {
                info!(%reference, %event_title, amount, "purchase started");
            }
            Event::PaymentCaptured { reference, amount } => {
                info!(%reference, ?amount, "payment captured");
            }
            Event::PurchaseCancelled { reference } => {
                info!(%reference, "purchase cancelled by buyer");
            }
            Event::PaymentFailed { reference, detail } => {
                warn!(%reference, ?detail, "payment failed");
            }
            Event::TicketIssued {
                ticket_id,
                user_id,
                event_title,
            } => {
                info!(%ticket_id, %user_id, %event_title, "ticket issued");
            }
            Event::TicketWriteFailed {
                reference,
                user_id,
                detail,
            } => {
                error!(%reference, %user_id, %detail, "ticket write failed after capture; needs reconciliation");
            }
            Event::ListingCreated { listing_id, title } => {
                info!(%listing_id, %title, "listing created");
            }
        }
    }

    info!("Event processing loop stopped");
}
