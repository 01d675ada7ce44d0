use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Identity;
use crate::errors::ServiceError;
use crate::models::{
    EventListing, PurchaseSession, TicketRecord, PAYMENT_STATUS_SUCCESS, TICKET_STATUS_CONFIRMED,
    VERIFICATION_STATUS_ACTIVE,
};
use crate::pricing::format_kobo;
use crate::store::TicketStore;

/// Fallbacks applied when a listing or identity omits display fields.
/// Stored tickets never carry empty strings.
const FALLBACK_TITLE: &str = "Untitled Event";
const FALLBACK_DATE: &str = "TBA";
const FALLBACK_TIME: &str = "6:00 pm WAT";
const FALLBACK_VENUE: &str = "Venue TBA";
const FALLBACK_LOCATION: &str = "Location TBA";
const FALLBACK_TICKET_TYPE: &str = "General Admission";
const FALLBACK_CUSTOMER_NAME: &str = "Customer";
const FALLBACK_PAYMENT_REF: &str = "unknown";

/// Builds the complete ticket record for a settled payment.
///
/// All defaulting lives here: callers hand over whatever they have and the
/// builder guarantees every field is populated. Deterministic apart from the
/// generated ticket ID and timestamps; the store overwrites the timestamps
/// at write time.
pub fn build_ticket_record(
    listing: &EventListing,
    identity: &Identity,
    session: &PurchaseSession,
    payment_ref: Option<&str>,
) -> TicketRecord {
    let ticket_id = Uuid::new_v4();
    let verification_code = ticket_id.simple().to_string()[..8].to_ascii_uppercase();
    let now = Utc::now();

    let title = non_empty(Some(&listing.title)).unwrap_or(FALLBACK_TITLE);
    let customer_name = identity
        .display_name
        .as_deref()
        .and_then(|name| non_empty(Some(name)))
        .map(str::to_string)
        .or_else(|| email_local_part(&session.payer_email))
        .unwrap_or_else(|| FALLBACK_CUSTOMER_NAME.to_string());

    TicketRecord {
        ticket_id,
        verification_code,
        event_title: title.to_string(),
        event_date: or_fallback(listing.date.as_deref(), FALLBACK_DATE),
        event_time: or_fallback(listing.time.as_deref(), FALLBACK_TIME),
        event_venue: or_fallback(listing.venue.as_deref(), FALLBACK_VENUE),
        event_location: or_fallback(listing.state.as_deref(), FALLBACK_LOCATION),
        ticket_type: or_fallback(listing.event_type.as_deref(), FALLBACK_TICKET_TYPE),
        ticket_quantity: 1,
        amount_paid: listing
            .price
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| format_kobo(session.amount)),
        amount_raw: listing.price.clone(),
        payment_ref: non_empty(payment_ref)
            .unwrap_or(FALLBACK_PAYMENT_REF)
            .to_string(),
        payment_status: PAYMENT_STATUS_SUCCESS.to_string(),
        payment_date: now,
        customer_email: session.payer_email.clone(),
        customer_name,
        user_id: identity.user_id.clone(),
        status: TICKET_STATUS_CONFIRMED.to_string(),
        verification_status: VERIFICATION_STATUS_ACTIVE.to_string(),
        purchased_at: now,
        created_at: now,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    non_empty(value).unwrap_or(fallback).to_string()
}

fn email_local_part(email: &str) -> Option<String> {
    email
        .split('@')
        .next()
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

/// Text for the WhatsApp share link on a saved ticket.
pub fn share_text(ticket: &TicketRecord) -> String {
    format!(
        "Check out my event ticket for {title} on Tixline!\nEvent: {title}\nDate: {date} at {time}\nVenue: {venue}, {location}\nTicket ID: {id}\nVerification Code: {code}",
        title = ticket.event_title,
        date = ticket.event_date,
        time = ticket.event_time,
        venue = ticket.event_venue,
        location = ticket.event_location,
        id = ticket.ticket_id,
        code = ticket.verification_code,
    )
}

/// Read side of the ticket wallet.
pub struct TicketService {
    store: Arc<dyn TicketStore>,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// All tickets owned by a buyer, newest purchase first.
    #[instrument(skip(self))]
    pub async fn my_tickets(&self, user_id: &str) -> Result<Vec<TicketRecord>, ServiceError> {
        let tickets = self.store.tickets_for_user(user_id).await?;
        info!(user_id, count = tickets.len(), "fetched ticket wallet");
        Ok(tickets)
    }

    /// A single ticket, scoped to its owner. Another buyer's ticket reads
    /// as absent rather than forbidden.
    #[instrument(skip(self))]
    pub async fn ticket_detail(
        &self,
        user_id: &str,
        ticket_id: &str,
    ) -> Result<TicketRecord, ServiceError> {
        let ticket = self.store.get_ticket(ticket_id).await?;
        match ticket {
            Some(record) if record.user_id == user_id => Ok(record),
            _ => Err(ServiceError::NotFound(format!(
                "Ticket {} not found",
                ticket_id
            ))),
        }
    }

    /// Check-in lookup by verification code, scoped to the owner.
    #[instrument(skip(self))]
    pub async fn find_by_verification_code(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<TicketRecord, ServiceError> {
        self.store
            .find_by_code(user_id, code)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No ticket with verification code {}", code))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionMetadata;
    use crate::store::MemoryTicketStore;

    fn identity(display_name: Option<&str>) -> Identity {
        Identity {
            user_id: "u-7f3a2b".to_string(),
            email: Some("ada@example.com".to_string()),
            display_name: display_name.map(str::to_string),
        }
    }

    fn session(amount: u64) -> PurchaseSession {
        PurchaseSession {
            reference: "1700000000000-AB12CD".to_string(),
            amount,
            currency: "NGN".to_string(),
            payer_email: "ada@example.com".to_string(),
            metadata: SessionMetadata::for_event(Some("Jazz Night")),
        }
    }

    fn title_only_listing() -> EventListing {
        EventListing {
            title: "Jazz Night".to_string(),
            date: None,
            time: None,
            venue: None,
            state: None,
            price: None,
            event_type: None,
            status: None,
            img: None,
            featured: false,
            available: true,
            description: None,
        }
    }

    // ==================== Builder Tests ====================

    #[test]
    fn title_only_listing_fills_every_default() {
        let record = build_ticket_record(
            &title_only_listing(),
            &identity(None),
            &session(500_000),
            Some("tx123"),
        );

        assert_eq!(record.event_title, "Jazz Night");
        assert_eq!(record.event_date, "TBA");
        assert_eq!(record.event_time, "6:00 pm WAT");
        assert_eq!(record.event_venue, "Venue TBA");
        assert_eq!(record.event_location, "Location TBA");
        assert_eq!(record.ticket_type, "General Admission");
        assert_eq!(record.ticket_quantity, 1);
        assert_eq!(record.amount_paid, "₦5,000");
        assert_eq!(record.amount_raw, None);
        assert_eq!(record.payment_ref, "tx123");
        assert_eq!(record.payment_status, "success");
        assert_eq!(record.status, "confirmed");
        assert_eq!(record.verification_status, "active");
        // Local part of the email, no display name supplied
        assert_eq!(record.customer_name, "ada");
        assert_eq!(record.customer_email, "ada@example.com");
        assert_eq!(record.user_id, "u-7f3a2b");
    }

    #[test]
    fn verification_code_is_first_eight_of_ticket_id() {
        let record = build_ticket_record(
            &title_only_listing(),
            &identity(None),
            &session(500_000),
            Some("tx123"),
        );

        assert_eq!(record.verification_code.len(), 8);
        assert_eq!(
            record.verification_code,
            record.ticket_id.simple().to_string()[..8].to_ascii_uppercase()
        );
        assert!(record
            .verification_code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn listing_fields_win_over_defaults() {
        let listing = EventListing {
            title: "Jazz Night".to_string(),
            date: Some("Sat, 14 Mar 2026".to_string()),
            time: Some("7:00 pm WAT".to_string()),
            venue: Some("Terra Kulture Arena".to_string()),
            state: Some("Lagos".to_string()),
            price: Some("₦2,000".to_string()),
            event_type: Some("Music".to_string()),
            status: None,
            img: None,
            featured: false,
            available: true,
            description: None,
        };

        let record =
            build_ticket_record(&listing, &identity(None), &session(200_000), Some("tx123"));

        assert_eq!(record.event_date, "Sat, 14 Mar 2026");
        assert_eq!(record.event_time, "7:00 pm WAT");
        assert_eq!(record.event_venue, "Terra Kulture Arena");
        assert_eq!(record.event_location, "Lagos");
        assert_eq!(record.ticket_type, "Music");
        // Display price stored verbatim, raw copy alongside
        assert_eq!(record.amount_paid, "₦2,000");
        assert_eq!(record.amount_raw.as_deref(), Some("₦2,000"));
    }

    #[test]
    fn blank_title_falls_back() {
        let mut listing = title_only_listing();
        listing.title = "   ".to_string();
        let record = build_ticket_record(
            &listing,
            &identity(None),
            &session(500_000),
            Some("tx123"),
        );
        assert_eq!(record.event_title, "Untitled Event");
    }

    #[test]
    fn display_name_beats_email_local_part() {
        let record = build_ticket_record(
            &title_only_listing(),
            &identity(Some("Ada Obi")),
            &session(500_000),
            Some("tx123"),
        );
        assert_eq!(record.customer_name, "Ada Obi");
    }

    #[test]
    fn missing_reference_records_unknown() {
        let record =
            build_ticket_record(&title_only_listing(), &identity(None), &session(500_000), None);
        assert_eq!(record.payment_ref, "unknown");
    }

    // ==================== Share Text Tests ====================

    #[test]
    fn share_text_lists_event_and_verification_code() {
        let record = build_ticket_record(
            &title_only_listing(),
            &identity(Some("Ada Obi")),
            &session(500_000),
            Some("tx123"),
        );
        let text = share_text(&record);

        assert!(text.starts_with("Check out my event ticket for Jazz Night on Tixline!"));
        assert!(text.contains("Event: Jazz Night"));
        assert!(text.contains("Date: TBA at 6:00 pm WAT"));
        assert!(text.contains("Venue: Venue TBA, Location TBA"));
        assert!(text.contains(&format!("Ticket ID: {}", record.ticket_id)));
        assert!(text.contains(&format!(
            "Verification Code: {}",
            record.verification_code
        )));
    }

    // ==================== Wallet Tests ====================

    #[tokio::test]
    async fn ticket_detail_is_owner_scoped() {
        let store = Arc::new(MemoryTicketStore::new());
        let service = TicketService::new(store.clone());

        let record = build_ticket_record(
            &title_only_listing(),
            &identity(None),
            &session(500_000),
            Some("tx123"),
        );
        let id = store.add_ticket(record).await.unwrap();

        let found = service.ticket_detail("u-7f3a2b", &id).await.unwrap();
        assert_eq!(found.event_title, "Jazz Night");

        let err = service.ticket_detail("someone-else", &id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn verification_code_lookup_round_trips() {
        let store = Arc::new(MemoryTicketStore::new());
        let service = TicketService::new(store.clone());

        let record = build_ticket_record(
            &title_only_listing(),
            &identity(None),
            &session(500_000),
            Some("tx123"),
        );
        let code = record.verification_code.clone();
        store.add_ticket(record).await.unwrap();

        let found = service
            .find_by_verification_code("u-7f3a2b", &code)
            .await
            .unwrap();
        assert_eq!(found.verification_code, code);

        let err = service
            .find_by_verification_code("u-7f3a2b", "ZZZZZZZZ")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
