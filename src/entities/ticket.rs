use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TicketRecord;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    /// Ticket identity; doubles as the stored document identity the
    /// purchase flow reads back after a write.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub verification_code: String,

    // Event snapshot at purchase time.
    pub event_title: String,
    pub event_date: String,
    pub event_time: String,
    pub event_venue: String,
    pub event_location: String,
    pub ticket_type: String,
    pub ticket_quantity: i32,

    // Payment confirmation.
    pub amount_paid: String,
    pub amount_raw: Option<String>,
    pub payment_ref: String,
    pub payment_status: String,
    pub payment_date: DateTime<Utc>,

    // Owner.
    pub customer_email: String,
    pub customer_name: String,
    pub user_id: String,

    pub status: String,
    pub verification_status: String,

    pub purchased_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TicketRecord {
    fn from(row: Model) -> Self {
        TicketRecord {
            ticket_id: row.id,
            verification_code: row.verification_code,
            event_title: row.event_title,
            event_date: row.event_date,
            event_time: row.event_time,
            event_venue: row.event_venue,
            event_location: row.event_location,
            ticket_type: row.ticket_type,
            ticket_quantity: row.ticket_quantity.max(0) as u32,
            amount_paid: row.amount_paid,
            amount_raw: row.amount_raw,
            payment_ref: row.payment_ref,
            payment_status: row.payment_status,
            payment_date: row.payment_date,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            user_id: row.user_id,
            status: row.status,
            verification_status: row.verification_status,
            purchased_at: row.purchased_at,
            created_at: row.created_at,
        }
    }
}

impl Model {
    pub fn from_record(record: &TicketRecord) -> Self {
        Self {
            id: record.ticket_id,
            verification_code: record.verification_code.clone(),
            event_title: record.event_title.clone(),
            event_date: record.event_date.clone(),
            event_time: record.event_time.clone(),
            event_venue: record.event_venue.clone(),
            event_location: record.event_location.clone(),
            ticket_type: record.ticket_type.clone(),
            ticket_quantity: record.ticket_quantity as i32,
            amount_paid: record.amount_paid.clone(),
            amount_raw: record.amount_raw.clone(),
            payment_ref: record.payment_ref.clone(),
            payment_status: record.payment_status.clone(),
            payment_date: record.payment_date,
            customer_email: record.customer_email.clone(),
            customer_name: record.customer_name.clone(),
            user_id: record.user_id.clone(),
            status: record.status.clone(),
            verification_status: record.verification_status.clone(),
            purchased_at: record.purchased_at,
            created_at: record.created_at,
        }
    }
}
