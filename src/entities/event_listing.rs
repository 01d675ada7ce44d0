use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::EventListing;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_listings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Catalog identity. Tickets snapshot this value; there is no foreign
    /// key back from tickets.
    pub title: String,

    pub date: Option<String>,
    pub time: Option<String>,
    pub venue: Option<String>,
    pub state: Option<String>,
    pub price: Option<String>,
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub img: Option<String>,
    pub featured: bool,
    pub available: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EventListing {
    fn from(row: Model) -> Self {
        EventListing {
            title: row.title,
            date: row.date,
            time: row.time,
            venue: row.venue,
            state: row.state,
            price: row.price,
            event_type: row.event_type,
            status: row.status,
            img: row.img,
            featured: row.featured,
            available: row.available,
            description: row.description,
        }
    }
}

impl ActiveModel {
    /// Stages a fresh row for insert from a domain listing.
    pub fn from_listing(listing: &EventListing) -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            title: Set(listing.title.clone()),
            date: Set(listing.date.clone()),
            time: Set(listing.time.clone()),
            venue: Set(listing.venue.clone()),
            state: Set(listing.state.clone()),
            price: Set(listing.price.clone()),
            event_type: Set(listing.event_type.clone()),
            status: Set(listing.status.clone()),
            img: Set(listing.img.clone()),
            featured: Set(listing.featured),
            available: Set(listing.available),
            description: Set(listing.description.clone()),
            created_at: Set(Utc::now()),
        }
    }
}
