//! Property-based tests for price normalization and ticket building.
//!
//! These tests use proptest to verify invariants across a wide range of
//! inputs, helping to catch edge cases that unit tests might miss.

use proptest::prelude::*;

use tixline_api::auth::Identity;
use tixline_api::models::{EventListing, PurchaseSession, SessionMetadata};
use tixline_api::pricing::{format_kobo, normalize_display_price, FALLBACK_AMOUNT_KOBO};
use tixline_api::services::tickets::build_ticket_record;

// Strategies for generating test data
fn decorated_naira_strategy() -> impl Strategy<Value = (String, u64)> {
    (1u64..10_000_000, "[₦N ]{0,3}", "[ a-z]{0,6}").prop_map(|(major, prefix, suffix)| {
        let display = format!("{}{}{}", prefix, format_kobo(major * 100), suffix);
        (display, major)
    })
}

fn digit_free_strategy() -> impl Strategy<Value = String> {
    "[₦a-zA-Z ,.!-]{0,24}".prop_map(|s| s)
}

fn blankish_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("   ".to_string())),
    ]
}

fn listing_with(fields: [Option<String>; 5], price: Option<String>) -> EventListing {
    let [date, time, venue, state, event_type] = fields;
    EventListing {
        title: "Jazz Night".to_string(),
        date,
        time,
        venue,
        state,
        price,
        event_type,
        status: None,
        img: None,
        featured: false,
        available: true,
        description: None,
    }
}

fn session_with(amount: u64, payer_email: &str) -> PurchaseSession {
    PurchaseSession {
        reference: "1767225600123-x4Kd9Q".to_string(),
        amount,
        currency: "NGN".to_string(),
        payer_email: payer_email.to_string(),
        metadata: SessionMetadata::for_event(Some("Jazz Night")),
    }
}

fn identity_with(display_name: Option<String>) -> Identity {
    Identity {
        user_id: "u-prop".to_string(),
        email: Some("buyer@example.com".to_string()),
        display_name,
    }
}

// Property: price normalization recovers the major units from any
// decorated display string
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn decorated_prices_normalize_to_their_digits((display, major) in decorated_naira_strategy()) {
        prop_assert_eq!(normalize_display_price(Some(&display)), major * 100);
    }

    #[test]
    fn digit_free_prices_fall_back(display in digit_free_strategy()) {
        prop_assert_eq!(normalize_display_price(Some(&display)), FALLBACK_AMOUNT_KOBO);
    }

    #[test]
    fn normalization_never_returns_zero(display in ".*") {
        prop_assert!(normalize_display_price(Some(&display)) > 0);
    }

    #[test]
    fn zero_priced_strings_fall_back(display in "[₦ ]{0,2}0{1,6}(\\.0{2})?") {
        prop_assert_eq!(normalize_display_price(Some(&display)), FALLBACK_AMOUNT_KOBO);
    }

    #[test]
    fn overlong_digit_runs_fall_back(display in "[0-9]{25,40}") {
        prop_assert_eq!(normalize_display_price(Some(&display)), FALLBACK_AMOUNT_KOBO);
    }
}

// Property: format and normalize agree on whole-naira amounts
proptest! {
    #[test]
    fn format_then_normalize_round_trips(major in 1u64..1_000_000_000_000) {
        let kobo = major * 100;
        prop_assert_eq!(normalize_display_price(Some(&format_kobo(kobo))), kobo);
    }

    #[test]
    fn formatted_amounts_group_thousands(major in 1_000u64..1_000_000_000) {
        let formatted = format_kobo(major * 100);
        prop_assert!(formatted.contains(','), "expected grouping in {}", formatted);
        let digits: String = formatted.chars().filter(char::is_ascii_digit).collect();
        prop_assert_eq!(digits, major.to_string());
    }
}

// Property: the ticket builder populates every display field no matter
// how sparse the listing is
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn sparse_listings_still_produce_complete_tickets(
        date in blankish_strategy(),
        time in blankish_strategy(),
        venue in blankish_strategy(),
        state in blankish_strategy(),
        event_type in blankish_strategy(),
        payment_ref in blankish_strategy(),
    ) {
        let listing = listing_with([date, time, venue, state, event_type], None);
        let session = session_with(200_000, "ada@example.com");
        let identity = identity_with(None);

        let record = build_ticket_record(&listing, &identity, &session, payment_ref.as_deref());

        prop_assert_eq!(record.event_date, "TBA");
        prop_assert_eq!(record.event_time, "6:00 pm WAT");
        prop_assert_eq!(record.event_venue, "Venue TBA");
        prop_assert_eq!(record.event_location, "Location TBA");
        prop_assert_eq!(record.ticket_type, "General Admission");
        prop_assert_eq!(record.payment_ref, "unknown");
        // With no listed price the paid amount renders from the session
        prop_assert_eq!(record.amount_paid, "2,000");
        prop_assert_eq!(record.ticket_quantity, 1);
    }

    #[test]
    fn verification_codes_are_short_uppercase_hex(_seed in any::<u64>()) {
        let listing = listing_with([None, None, None, None, None], Some("₦2,000".to_string()));
        let session = session_with(200_000, "ada@example.com");
        let identity = identity_with(Some("Ada Obi".to_string()));

        let record = build_ticket_record(&listing, &identity, &session, Some("tx123"));

        prop_assert_eq!(record.verification_code.len(), 8);
        prop_assert!(record
            .verification_code
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn customer_name_falls_back_to_the_email_local_part(local in "[a-z][a-z0-9]{0,9}") {
        let listing = listing_with([None, None, None, None, None], Some("₦2,000".to_string()));
        let email = format!("{}@example.com", local);
        let session = session_with(200_000, &email);
        let identity = identity_with(None);

        let record = build_ticket_record(&listing, &identity, &session, Some("tx123"));

        prop_assert_eq!(record.customer_name, local);
        prop_assert_eq!(record.customer_email, email);
    }

    #[test]
    fn listed_prices_are_preserved_verbatim(major in 1u64..10_000_000) {
        let price = format!("₦{}", format_kobo(major * 100));
        let listing = listing_with([None, None, None, None, None], Some(price.clone()));
        let session = session_with(major * 100, "ada@example.com");
        let identity = identity_with(Some("Ada Obi".to_string()));

        let record = build_ticket_record(&listing, &identity, &session, Some("tx123"));

        prop_assert_eq!(record.amount_paid, price.clone());
        prop_assert_eq!(record.amount_raw, Some(price));
        prop_assert_eq!(record.customer_name, "Ada Obi");
    }
}
