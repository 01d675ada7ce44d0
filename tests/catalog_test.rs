mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tixline_api::gateway::{PaymentOutcome, ProviderTransaction};

use common::{listing, read_json, TestApp};

/// A complete, valid organizer wizard payload. Tests flip one field at a
/// time to hit a specific validation rule.
fn wizard_payload() -> Value {
    json!({
        "title": "Beach Rave Countdown",
        "brand": "Tixline Live",
        "starts_at": (Utc::now() + Duration::days(30)).to_rfc3339(),
        "venue": "Landmark Beach",
        "state": "Lagos",
        "event_type": "Festival",
        "price": "₦10,000",
        "tags": ["beach", "rave"]
    })
}

/// Buys one ticket for the titled listing as the default buyer.
async fn buy_ticket(app: &TestApp, title: &str) {
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/purchases",
            Some(json!({ "event_title": title })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let reference = body["data"]["reference"]
        .as_str()
        .expect("purchase reference")
        .to_string();
    app.gateway.script_outcome(
        &reference,
        PaymentOutcome::Success(ProviderTransaction::settled(&reference)),
    );
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/purchases/{}/complete", reference),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn browsing_filters_by_state_and_search_term() {
    let app = TestApp::new().await;
    app.seed_listing(&listing("Jazz Night", Some("₦2,000"))).await;
    let mut abuja = listing("Abuja Tech Mixer", Some("₦3,000"));
    abuja.state = Some("Abuja".to_string());
    abuja.event_type = Some("Technology Event".to_string());
    app.seed_listing(&abuja).await;
    let mut comedy = listing("Lagos Laughs", Some("₦1,500"));
    comedy.event_type = Some("Stand Up Comedy".to_string());
    app.seed_listing(&comedy).await;

    // Browsing is public; no token on any of these
    let response = app.request(Method::GET, "/api/v1/events", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().expect("listings").len(), 3);

    let response = app
        .request(Method::GET, "/api/v1/events?region=Lagos", None, None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().expect("listings").len(), 2);

    // The country-wide sentinel and an untouched picker mean no filter
    let response = app
        .request(Method::GET, "/api/v1/events?region=Nigeria", None, None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().expect("listings").len(), 3);

    let response = app
        .request(Method::GET, "/api/v1/events?region=", None, None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().expect("listings").len(), 3);

    // Search matches titles and event types, case-insensitively
    let response = app
        .request(Method::GET, "/api/v1/events?q=JAZZ", None, None)
        .await;
    let body = read_json(response).await;
    let hits = body["data"].as_array().expect("listings");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"].as_str(), Some("Jazz Night"));

    let response = app
        .request(Method::GET, "/api/v1/events?q=comedy", None, None)
        .await;
    let body = read_json(response).await;
    let hits = body["data"].as_array().expect("listings");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"].as_str(), Some("Lagos Laughs"));

    let response = app
        .request(Method::GET, "/api/v1/events?region=Abuja&q=tech", None, None)
        .await;
    let body = read_json(response).await;
    let hits = body["data"].as_array().expect("listings");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"].as_str(), Some("Abuja Tech Mixer"));
}

#[tokio::test]
async fn event_detail_carries_maps_link_and_share_text() {
    let app = TestApp::new().await;
    let id = app.seed_listing(&listing("Jazz Night", Some("₦2,000"))).await;

    let response = app
        .request(Method::GET, &format!("/api/v1/events/{}", id), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["id"].as_str(), Some(id.to_string().as_str()));
    assert_eq!(body["data"]["title"].as_str(), Some("Jazz Night"));
    assert_eq!(
        body["data"]["share_text"].as_str(),
        Some("Check out Jazz Night at Terra Kulture Arena!")
    );
    let maps_url = body["data"]["maps_url"].as_str().expect("maps url");
    assert!(maps_url.contains("Terra+Kulture+Arena%2C+Lagos%2C+Nigeria"));

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/events/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_lookup_by_exact_title() {
    let app = TestApp::new().await;
    app.seed_listing(&listing("Jazz Night", Some("₦2,000"))).await;

    let response = app
        .request(Method::GET, "/api/v1/events/by-title/Jazz%20Night", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["title"].as_str(), Some("Jazz Night"));
    assert_eq!(body["data"]["venue"].as_str(), Some("Terra Kulture Arena"));

    let response = app
        .request(Method::GET, "/api/v1/events/by-title/Ghost%20Show", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_an_event_renders_the_catalog_row() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::POST, "/api/v1/events", Some(wizard_payload()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"].as_str(), Some("🎉 Event created successfully!"));
    assert_eq!(body["data"]["title"].as_str(), Some("Beach Rave Countdown"));
    assert!(body["data"]["id"].as_str().is_some());
    // Wizard dates render as display strings in West Africa Time
    assert!(body["data"]["date"].as_str().is_some());
    assert!(body["data"]["time"].as_str().expect("time").contains("WAT"));
    assert!(body["data"]["maps_url"]
        .as_str()
        .expect("maps url")
        .contains("Landmark+Beach"));

    // The new listing is browsable straight away
    let response = app
        .request(Method::GET, "/api/v1/events?q=beach", None, None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().expect("listings").len(), 1);

    // Same title again is a conflict
    let response = app
        .request_authenticated(Method::POST, "/api/v1/events", Some(wizard_payload()))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(
        body["message"].as_str(),
        Some("Conflict: A listing titled 'Beach Rave Countdown' already exists")
    );
}

#[tokio::test]
async fn wizard_validation_matches_the_storefront_copy() {
    let app = TestApp::new().await;

    let cases: Vec<(Value, &str)> = vec![
        (
            {
                let mut p = wizard_payload();
                p["title"] = json!("DJ");
                p
            },
            "Validation error: Event name must be at least 3 characters",
        ),
        (
            {
                let mut p = wizard_payload();
                p["brand"] = json!("");
                p
            },
            "Validation error: Brand is required",
        ),
        (
            {
                let mut p = wizard_payload();
                p["venue"] = json!("");
                p
            },
            "Validation error: Venue is required",
        ),
        (
            {
                let mut p = wizard_payload();
                p["event_type"] = json!("Karaoke Battle");
                p
            },
            "Validation error: Please select an event type",
        ),
        (
            {
                let mut p = wizard_payload();
                p["link"] = json!("not-a-url");
                p
            },
            "Validation error: Please enter a valid URL",
        ),
        (
            {
                let mut p = wizard_payload();
                p["starts_at"] = json!((Utc::now() - Duration::days(1)).to_rfc3339());
                p
            },
            "Validation error: Start date cannot be in the past",
        ),
        (
            {
                let mut p = wizard_payload();
                let starts = Utc::now() + Duration::days(30);
                p["starts_at"] = json!(starts.to_rfc3339());
                p["ends_at"] = json!((starts - Duration::hours(2)).to_rfc3339());
                p
            },
            "Validation error: End date must be after start date",
        ),
        (
            {
                let mut p = wizard_payload();
                p["tags"] = json!((0..11).map(|i| format!("tag-{}", i)).collect::<Vec<_>>());
                p
            },
            "Validation error: At most 10 tags are allowed",
        ),
    ];

    for (payload, expected) in cases {
        let response = app
            .request_authenticated(Method::POST, "/api/v1/events", Some(payload))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["message"].as_str(), Some(expected));
    }
}

#[tokio::test]
async fn event_creation_requires_a_signed_in_organizer() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/v1/events", Some(wizard_payload()), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stats_roll_up_tickets_sold_and_revenue_per_listing() {
    let app = TestApp::new().await;
    app.seed_listing(&listing("Jazz Night", Some("₦2,000"))).await;
    app.seed_listing(&listing("Quiet Show", Some("₦1,000"))).await;

    buy_ticket(&app, "Jazz Night").await;
    buy_ticket(&app, "Jazz Night").await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/events/stats", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["total_events"].as_u64(), Some(2));
    assert_eq!(body["data"]["total_tickets_sold"].as_u64(), Some(2));
    assert_eq!(body["data"]["total_revenue_kobo"].as_u64(), Some(400_000));

    let events = body["data"]["events"].as_array().expect("per-listing stats");
    let jazz = events
        .iter()
        .find(|e| e["title"] == json!("Jazz Night"))
        .expect("jazz night stats");
    assert_eq!(jazz["tickets_sold"].as_u64(), Some(2));
    assert_eq!(jazz["revenue_kobo"].as_u64(), Some(400_000));
    let quiet = events
        .iter()
        .find(|e| e["title"] == json!("Quiet Show"))
        .expect("quiet show stats");
    assert_eq!(quiet["tickets_sold"].as_u64(), Some(0));
    assert_eq!(quiet["revenue_kobo"].as_u64(), Some(0));

    // The rollup is organizer-facing; anonymous calls are rejected
    let response = app
        .request(Method::GET, "/api/v1/events/stats", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
