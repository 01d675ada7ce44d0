//! In-process ticket store for tests and local runs without a database.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use super::{StoreError, TicketStore};
use crate::models::TicketRecord;

#[derive(Debug, Default)]
pub struct MemoryTicketStore {
    tickets: DashMap<String, TicketRecord>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tickets. Test-facing convenience.
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn add_ticket(&self, mut record: TicketRecord) -> Result<String, StoreError> {
        let now = Utc::now();
        record.purchased_at = now;
        record.created_at = now;

        let id = record.ticket_id.to_string();
        debug!(ticket_id = %id, "storing ticket in memory");
        self.tickets.insert(id.clone(), record);
        Ok(id)
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<TicketRecord>, StoreError> {
        Ok(self.tickets.get(id).map(|entry| entry.value().clone()))
    }

    async fn tickets_for_user(&self, user_id: &str) -> Result<Vec<TicketRecord>, StoreError> {
        let mut tickets: Vec<TicketRecord> = self
            .tickets
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        tickets.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(tickets)
    }

    async fn tickets_for_event(&self, event_title: &str) -> Result<Vec<TicketRecord>, StoreError> {
        let mut tickets: Vec<TicketRecord> = self
            .tickets
            .iter()
            .filter(|entry| entry.value().event_title == event_title)
            .map(|entry| entry.value().clone())
            .collect();
        tickets.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(tickets)
    }

    async fn find_by_code(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<Option<TicketRecord>, StoreError> {
        let wanted = code.to_ascii_uppercase();
        Ok(self
            .tickets
            .iter()
            .find(|entry| {
                let ticket = entry.value();
                ticket.user_id == user_id && ticket.verification_code == wanted
            })
            .map(|entry| entry.value().clone()))
    }
}
