//! Relational adapter for the ticket store contract.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::{StoreError, TicketStore};
use crate::entities::ticket;
use crate::models::TicketRecord;

#[derive(Debug, Clone)]
pub struct DatabaseTicketStore {
    db: Arc<DatabaseConnection>,
}

impl DatabaseTicketStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TicketStore for DatabaseTicketStore {
    #[instrument(skip(self, record), fields(ticket_id = %record.ticket_id))]
    async fn add_ticket(&self, mut record: TicketRecord) -> Result<String, StoreError> {
        let now = Utc::now();
        record.purchased_at = now;
        record.created_at = now;

        let row = ticket::Model::from_record(&record);
        let id = row.id;

        let active = ticket::ActiveModel {
            id: Set(row.id),
            verification_code: Set(row.verification_code),
            event_title: Set(row.event_title),
            event_date: Set(row.event_date),
            event_time: Set(row.event_time),
            event_venue: Set(row.event_venue),
            event_location: Set(row.event_location),
            ticket_type: Set(row.ticket_type),
            ticket_quantity: Set(row.ticket_quantity),
            amount_paid: Set(row.amount_paid),
            amount_raw: Set(row.amount_raw),
            payment_ref: Set(row.payment_ref),
            payment_status: Set(row.payment_status),
            payment_date: Set(row.payment_date),
            customer_email: Set(row.customer_email),
            customer_name: Set(row.customer_name),
            user_id: Set(row.user_id),
            status: Set(row.status),
            verification_status: Set(row.verification_status),
            purchased_at: Set(row.purchased_at),
            created_at: Set(row.created_at),
        };

        active
            .insert(self.db.as_ref())
            .await
            .map_err(StoreError::classify_db)?;

        Ok(id.to_string())
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<TicketRecord>, StoreError> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = ticket::Entity::find_by_id(uuid)
            .one(self.db.as_ref())
            .await
            .map_err(StoreError::classify_db)?;

        Ok(row.map(TicketRecord::from))
    }

    async fn tickets_for_user(&self, user_id: &str) -> Result<Vec<TicketRecord>, StoreError> {
        let rows = ticket::Entity::find()
            .filter(ticket::Column::UserId.eq(user_id))
            .order_by_desc(ticket::Column::PurchasedAt)
            .all(self.db.as_ref())
            .await
            .map_err(StoreError::classify_db)?;

        Ok(rows.into_iter().map(TicketRecord::from).collect())
    }

    async fn tickets_for_event(&self, event_title: &str) -> Result<Vec<TicketRecord>, StoreError> {
        let rows = ticket::Entity::find()
            .filter(ticket::Column::EventTitle.eq(event_title))
            .order_by_desc(ticket::Column::PurchasedAt)
            .all(self.db.as_ref())
            .await
            .map_err(StoreError::classify_db)?;

        Ok(rows.into_iter().map(TicketRecord::from).collect())
    }

    async fn find_by_code(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<Option<TicketRecord>, StoreError> {
        let row = ticket::Entity::find()
            .filter(ticket::Column::UserId.eq(user_id))
            .filter(ticket::Column::VerificationCode.eq(code.to_ascii_uppercase()))
            .one(self.db.as_ref())
            .await
            .map_err(StoreError::classify_db)?;

        Ok(row.map(TicketRecord::from))
    }
}
