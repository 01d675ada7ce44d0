use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Payment status stamped on every ticket issued by this flow.
pub const PAYMENT_STATUS_SUCCESS: &str = "success";
/// Lifecycle status stamped on every ticket issued by this flow.
pub const TICKET_STATUS_CONFIRMED: &str = "confirmed";
/// Verification status stamped on every ticket issued by this flow.
pub const VERIFICATION_STATUS_ACTIVE: &str = "active";

/// A purchasable event as shown in the catalog.
///
/// Listings are read-only input to the purchase flow; tickets copy the
/// fields they need at purchase time instead of referencing the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventListing {
    #[schema(example = "Jazz Night")]
    pub title: String,
    #[schema(example = "Sat, 14 Mar 2026")]
    pub date: Option<String>,
    #[schema(example = "7:00 pm WAT")]
    pub time: Option<String>,
    #[schema(example = "Terra Kulture Arena")]
    pub venue: Option<String>,
    /// State/region the event takes place in.
    #[schema(example = "Lagos")]
    pub state: Option<String>,
    /// Human-entered display price, normalized to kobo at purchase time.
    #[schema(example = "₦5,000")]
    pub price: Option<String>,
    #[schema(example = "Music")]
    pub event_type: Option<String>,
    #[schema(example = "Selling fast")]
    pub status: Option<String>,
    pub img: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_available")]
    pub available: bool,
    pub description: Option<String>,
}

fn default_available() -> bool {
    true
}

/// Transient descriptor for one payment attempt.
///
/// The reference is unique per attempt; it is the only duplicate-charge
/// safeguard the provider sees, so a retried purchase always gets a fresh
/// session and a fresh reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseSession {
    /// Idempotent provider reference, `{unix-millis}-{random suffix}`.
    #[schema(example = "1767225600123-x4Kd9Q")]
    pub reference: String,
    /// Amount in kobo. Always positive.
    #[schema(example = 500000)]
    pub amount: u64,
    #[schema(example = "NGN")]
    pub currency: String,
    pub payer_email: String,
    pub metadata: SessionMetadata,
}

/// Key/value annotations forwarded to the payment provider for
/// reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionMetadata {
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomField {
    pub display_name: String,
    pub variable_name: String,
    pub value: String,
}

impl SessionMetadata {
    /// Annotates a session with the event it pays for.
    pub fn for_event(title: Option<&str>) -> Self {
        Self {
            custom_fields: vec![CustomField {
                display_name: "Event".to_string(),
                variable_name: "event".to_string(),
                value: title.unwrap_or("Event").to_string(),
            }],
        }
    }
}

/// States a purchase attempt moves through.
///
/// `AwaitingPayment` is entered the instant the provider session opens.
/// Cancellation and failure both reset the attempt; only `Succeeded`
/// produces a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseState {
    Idle,
    AwaitingPayment,
    Succeeded,
    Cancelled,
    Failed,
}

/// Persisted proof-of-purchase. Written exactly once per successful
/// payment, never mutated or deleted by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketRecord {
    /// Generated ticket identity.
    pub ticket_id: Uuid,
    /// First 8 characters of the ticket ID, uppercased. Used for manual
    /// and QR check-in.
    #[schema(example = "B3F2A9C1")]
    pub verification_code: String,

    // Event snapshot, copied at purchase time. The listing may change or
    // disappear later without affecting issued tickets.
    pub event_title: String,
    pub event_date: String,
    pub event_time: String,
    pub event_venue: String,
    pub event_location: String,
    pub ticket_type: String,
    pub ticket_quantity: u32,

    // Payment confirmation.
    #[schema(example = "₦5,000")]
    pub amount_paid: String,
    /// Listing price string verbatim, when the listing had one.
    pub amount_raw: Option<String>,
    #[schema(example = "1767225600123-x4Kd9Q")]
    pub payment_ref: String,
    #[schema(example = "success")]
    pub payment_status: String,
    pub payment_date: DateTime<Utc>,

    // Owner, copied from the authenticated session.
    pub customer_email: String,
    pub customer_name: String,
    pub user_id: String,

    #[schema(example = "confirmed")]
    pub status: String,
    #[schema(example = "active")]
    pub verification_status: String,

    // Stamped by the store at write time.
    pub purchased_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
