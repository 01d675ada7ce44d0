use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::event_listing;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::EventListing;
use crate::pricing::normalize_display_price;
use crate::store::TicketStore;

/// Region value meaning "no region filter". The storefront's state picker
/// starts on the country itself.
pub const REGION_ALL: &str = "Nigeria";

/// Event types the creation wizard accepts.
pub const EVENT_TYPES: [&str; 9] = [
    "Festival",
    "Sports Tournament",
    "Stand Up Comedy",
    "Conference",
    "Technology Event",
    "Corporate Event",
    "Private Event/Party",
    "Drive-in Event",
    "Comedy Show",
];

const MAX_TAGS: usize = 10;
const DEFAULT_EVENT_LENGTH_HOURS: i64 = 3;

/// West Africa Time, UTC+1. Nigeria has no daylight saving.
const WAT_OFFSET_SECONDS: i32 = 3600;

fn wat_offset() -> FixedOffset {
    FixedOffset::east_opt(WAT_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// A catalog row with its storage identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub listing: EventListing,
    /// Maps search link for the venue, when the listing has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for the organizer's event creation wizard.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateListingRequest {
    #[validate(length(min = 3, message = "Event name must be at least 3 characters"))]
    #[schema(example = "Jazz Night")]
    pub title: String,

    /// Organizer brand shown on the dashboard. Validated like the wizard
    /// does but not part of the public catalog row.
    #[validate(length(min = 1, message = "Brand is required"))]
    #[schema(example = "Terra Live")]
    pub brand: String,

    pub starts_at: DateTime<Utc>,
    /// Defaults to three hours after the start when omitted.
    pub ends_at: Option<DateTime<Utc>>,

    #[validate(length(min = 1, message = "Venue is required"))]
    #[schema(example = "Terra Kulture Arena")]
    pub venue: String,

    #[schema(example = "Lagos")]
    pub state: Option<String>,

    #[schema(example = "Festival")]
    pub event_type: String,

    /// Optional external event page.
    pub link: Option<String>,

    #[schema(example = "₦5,000")]
    pub price: Option<String>,

    pub img: Option<String>,
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateListingRequest {
    /// Checks the wizard rules that validator attributes cannot express.
    fn validate_schedule_and_type(&self, now: DateTime<Utc>) -> Result<(), ServiceError> {
        if !EVENT_TYPES.contains(&self.event_type.as_str()) {
            return Err(ServiceError::ValidationError(
                "Please select an event type".to_string(),
            ));
        }

        if let Some(link) = self.link.as_deref().filter(|l| !l.trim().is_empty()) {
            Url::parse(link).map_err(|_| {
                ServiceError::ValidationError("Please enter a valid URL".to_string())
            })?;
        }

        if self.starts_at < now {
            return Err(ServiceError::ValidationError(
                "Start date cannot be in the past".to_string(),
            ));
        }

        let ends_at = self.effective_end();
        if ends_at <= self.starts_at {
            return Err(ServiceError::ValidationError(
                "End date must be after start date".to_string(),
            ));
        }

        if self.tags.len() > MAX_TAGS {
            return Err(ServiceError::ValidationError(format!(
                "At most {} tags are allowed",
                MAX_TAGS
            )));
        }

        Ok(())
    }

    fn effective_end(&self) -> DateTime<Utc> {
        self.ends_at
            .unwrap_or(self.starts_at + Duration::hours(DEFAULT_EVENT_LENGTH_HOURS))
    }

    /// Renders the wizard payload into a catalog row. Dates and times are
    /// display strings in West Africa Time.
    fn into_listing(self) -> EventListing {
        let local_start = self.starts_at.with_timezone(&wat_offset());
        EventListing {
            title: self.title.trim().to_string(),
            date: Some(local_start.format("%a, %d %b %Y").to_string()),
            time: Some(local_start.format("%-I:%M %P WAT").to_string()),
            venue: Some(self.venue.trim().to_string()),
            state: self.state.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            price: self.price.filter(|p| !p.trim().is_empty()),
            event_type: Some(self.event_type),
            status: None,
            img: self.img.filter(|i| !i.trim().is_empty()),
            featured: false,
            available: true,
            description: self.description.filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Tickets-sold and revenue rollup for one listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingStats {
    pub title: String,
    pub tickets_sold: u64,
    /// Gross revenue in kobo, from the stored price strings.
    pub revenue_kobo: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogStats {
    pub total_events: u64,
    pub total_tickets_sold: u64,
    pub total_revenue_kobo: u64,
    pub events: Vec<ListingStats>,
}

/// Catalog browsing, creation, and organizer rollups.
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    store: Arc<dyn TicketStore>,
    event_sender: Option<Arc<EventSender>>,
}

impl CatalogService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        store: Arc<dyn TicketStore>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            store,
            event_sender,
        }
    }

    fn model_to_response(model: event_listing::Model) -> ListingResponse {
        let maps_url = match (model.venue.as_deref(), model.state.as_deref()) {
            (Some(venue), Some(state)) => Some(maps_url(venue, state)),
            _ => None,
        };
        ListingResponse {
            id: model.id,
            created_at: model.created_at,
            maps_url,
            listing: model.into(),
        }
    }

    /// Lists listings matching the storefront grid predicate: the region
    /// passes when it equals the listing's state or the country-wide
    /// sentinel is selected, and the query (case-insensitive) must appear
    /// in the title or the event type.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        region: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<ListingResponse>, ServiceError> {
        let rows = event_listing::Entity::find()
            .order_by_asc(event_listing::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load listings");
                ServiceError::DatabaseError(e)
            })?;

        let needle = query.unwrap_or("").trim().to_lowercase();

        // The catalog is small; filtering in process keeps the predicate
        // identical to the storefront grid.
        let listings: Vec<ListingResponse> = rows
            .into_iter()
            .map(Self::model_to_response)
            .filter(|row| {
                let region_ok = match region {
                    None => true,
                    Some(selected) if selected == REGION_ALL => true,
                    Some(selected) => row.listing.state.as_deref() == Some(selected),
                };
                if !region_ok {
                    return false;
                }
                if needle.is_empty() {
                    return true;
                }
                let title_hit = row.listing.title.to_lowercase().contains(&needle);
                let type_hit = row
                    .listing
                    .event_type
                    .as_deref()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&needle);
                title_hit || type_hit
            })
            .collect();

        info!(count = listings.len(), "catalog search complete");
        Ok(listings)
    }

    /// Retrieves a listing by ID
    #[instrument(skip(self), fields(listing_id = %listing_id))]
    pub async fn get_listing(
        &self,
        listing_id: Uuid,
    ) -> Result<Option<ListingResponse>, ServiceError> {
        let row = event_listing::Entity::find_by_id(listing_id)
            .one(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, listing_id = %listing_id, "Failed to fetch listing");
                ServiceError::DatabaseError(e)
            })?;

        Ok(row.map(Self::model_to_response))
    }

    /// Exact-title lookup. Purchases reference listings by title; there is
    /// no foreign key from tickets.
    #[instrument(skip(self))]
    pub async fn find_by_title(&self, title: &str) -> Result<Option<EventListing>, ServiceError> {
        let row = event_listing::Entity::find()
            .filter(event_listing::Column::Title.eq(title))
            .one(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, title, "Failed to fetch listing by title");
                ServiceError::DatabaseError(e)
            })?;

        Ok(row.map(EventListing::from))
    }

    /// Creates a listing from the wizard payload.
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_listing(
        &self,
        request: CreateListingRequest,
    ) -> Result<ListingResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(flatten_validation_message(&e)))?;
        request.validate_schedule_and_type(Utc::now())?;

        let listing = request.into_listing();

        if self.find_by_title(&listing.title).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A listing titled '{}' already exists",
                listing.title
            )));
        }

        let model = event_listing::ActiveModel::from_listing(&listing)
            .insert(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, title = %listing.title, "Failed to create listing");
                ServiceError::DatabaseError(e)
            })?;

        info!(listing_id = %model.id, title = %model.title, "Listing created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ListingCreated {
                    listing_id: model.id,
                    title: model.title.clone(),
                })
                .await
            {
                warn!(error = %e, listing_id = %model.id, "Failed to send listing created event");
            }
        }

        Ok(Self::model_to_response(model))
    }

    /// Per-listing tickets-sold and revenue rollup, title-matched against
    /// the persisted tickets.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<CatalogStats, ServiceError> {
        let listings = self.search(None, None).await?;

        let mut events = Vec::with_capacity(listings.len());
        let mut total_tickets = 0u64;
        let mut total_revenue = 0u64;

        for row in &listings {
            let tickets = self.store.tickets_for_event(&row.listing.title).await?;
            let sold = tickets.len() as u64;
            let revenue: u64 = tickets
                .iter()
                .map(|t| {
                    normalize_display_price(
                        t.amount_raw.as_deref().or(Some(t.amount_paid.as_str())),
                    )
                })
                .sum();

            total_tickets += sold;
            total_revenue += revenue;
            events.push(ListingStats {
                title: row.listing.title.clone(),
                tickets_sold: sold,
                revenue_kobo: revenue,
            });
        }

        Ok(CatalogStats {
            total_events: listings.len() as u64,
            total_tickets_sold: total_tickets,
            total_revenue_kobo: total_revenue,
            events,
        })
    }
}

/// Builds the maps search URL printed on listing cards.
pub fn maps_url(venue: &str, state: &str) -> String {
    let query = format!("{}, {}, Nigeria", venue, state);
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(&query)
    )
}

/// Text for the share button on a listing card.
pub fn listing_share_text(listing: &EventListing) -> String {
    format!(
        "Check out {} at {}!",
        listing.title,
        listing.venue.as_deref().unwrap_or("Venue TBA")
    )
}

/// URL encoding helper
mod urlencoding {
    pub fn encode(s: &str) -> String {
        url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
    }
}

fn flatten_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| errors.to_string())
}
