//! In-process gateway for local development and tests.
//!
//! Stands in for the hosted provider when no secret key is configured.
//! Outcomes can be scripted per reference; unscripted references settle
//! successfully so the purchase flow stays demoable offline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;
use tracing::debug;

use super::{GatewayError, PaymentGateway, PaymentOutcome, ProviderTransaction};
use crate::models::PurchaseSession;

pub struct MockGateway {
    ready: AtomicBool,
    reject_initiate: AtomicBool,
    outcomes: DashMap<String, PaymentOutcome>,
    initiated: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            reject_initiate: AtomicBool::new(false),
            outcomes: DashMap::new(),
            initiated: Mutex::new(Vec::new()),
        }
    }

    /// Flip the readiness flag, e.g. to exercise the not-ready precondition.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Make the next `initiate` calls fail at the provider boundary.
    pub fn reject_initiations(&self, reject: bool) {
        self.reject_initiate.store(reject, Ordering::SeqCst);
    }

    /// Script what `resolve` reports for a reference.
    pub fn script_outcome(&self, reference: impl Into<String>, outcome: PaymentOutcome) {
        self.outcomes.insert(reference.into(), outcome);
    }

    /// References that reached `initiate`, in call order.
    pub fn initiated_references(&self) -> Vec<String> {
        self.initiated.lock().unwrap().clone()
    }

    pub fn initiated_count(&self) -> usize {
        self.initiated.lock().unwrap().len()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn initiate(&self, session: &PurchaseSession) -> Result<(), GatewayError> {
        if self.reject_initiate.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected("scripted rejection".to_string()));
        }

        self.initiated
            .lock()
            .unwrap()
            .push(session.reference.clone());
        debug!(reference = %session.reference, amount = session.amount, "mock payment session opened");
        Ok(())
    }

    async fn resolve(&self, reference: &str) -> Result<PaymentOutcome, GatewayError> {
        let outcome = self
            .outcomes
            .get(reference)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| PaymentOutcome::Success(ProviderTransaction::settled(reference)));
        Ok(outcome)
    }
}
