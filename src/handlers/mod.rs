pub mod auth;
pub mod listings;
pub mod purchases;
pub mod tickets;
pub mod webhooks;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::gateway::PaymentGateway;
use crate::services::{CatalogService, PurchaseService, TicketService};
use crate::store::TicketStore;

// Handler modules take state as crate::handlers::AppState.
pub use crate::AppState;

/// The three service objects every handler reaches through. All of them
/// share one ticket store handle, so a ticket written during settlement is
/// immediately visible to wallet reads.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub purchases: Arc<PurchaseService>,
    pub tickets: Arc<TicketService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        store: Arc<dyn TicketStore>,
        gateway: Arc<dyn PaymentGateway>,
        event_sender: Option<Arc<EventSender>>,
        currency: String,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(
            db,
            store.clone(),
            event_sender.clone(),
        ));
        let purchases = Arc::new(PurchaseService::new(
            catalog.clone(),
            store.clone(),
            gateway,
            event_sender,
            currency,
        ));
        let tickets = Arc::new(TicketService::new(store));

        Self {
            catalog,
            purchases,
            tickets,
        }
    }
}
