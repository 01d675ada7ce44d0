//! Seed script - populates the catalog with demo event listings
//!
//! Run with: cargo run --bin seed-listings -- --migrate
//!
//! Listings already present (matched by title) are left untouched, so the
//! script is safe to re-run against a live database.

use clap::Parser;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use tracing::info;

use tixline_api::db;
use tixline_api::entities::event_listing;
use tixline_api::models::EventListing;

#[derive(Parser, Debug)]
#[command(
    name = "seed-listings",
    about = "Populate the Tixline catalog with demo event listings"
)]
struct Args {
    /// Database to seed; falls back to DATABASE_URL, then the bundled sqlite file
    #[arg(long)]
    database_url: Option<String>,

    /// Apply schema migrations before seeding
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite://tixline.db?mode=rwc".to_string());

    info!("=== Tixline Catalog Seed ===");
    info!("Connecting to database: {}", database_url);
    let db = db::establish_connection(&database_url).await?;

    if args.migrate {
        db::run_migrations(&db).await?;
    }

    info!("Creating event listings...");
    let (created, skipped) = create_listings(&db).await?;
    info!("  Created {} listings ({} already present)", created, skipped);

    info!("");
    info!("Try these API calls:");
    info!("  curl http://localhost:8080/api/v1/events");
    info!("  curl 'http://localhost:8080/api/v1/events?region=Lagos&q=fest'");
    info!("");
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    Ok(())
}

async fn create_listings(db: &sea_orm::DatabaseConnection) -> anyhow::Result<(usize, usize)> {
    let mut created = 0;
    let mut skipped = 0;

    for listing in demo_listings() {
        let exists = event_listing::Entity::find()
            .filter(event_listing::Column::Title.eq(listing.title.clone()))
            .one(db)
            .await?
            .is_some();

        if exists {
            skipped += 1;
            continue;
        }

        event_listing::ActiveModel::from_listing(&listing)
            .insert(db)
            .await?;
        created += 1;
    }

    Ok((created, skipped))
}

fn demo_listings() -> Vec<EventListing> {
    let rows = vec![
        // (title, date, time, venue, state, price, event_type, status, featured)
        (
            "Felabration Afrobeat Night",
            "Sat, 17 Oct 2026",
            "7:00 pm WAT",
            "New Afrika Shrine",
            "Lagos",
            Some("₦5,000"),
            "Festival",
            Some("Selling fast"),
            true,
        ),
        (
            "Lagos Tech Connect 2026",
            "Thu, 12 Nov 2026",
            "9:00 am WAT",
            "Landmark Centre",
            "Lagos",
            Some("₦15,000"),
            "Technology Event",
            Some("Early bird"),
            true,
        ),
        (
            "Owambe Comedy Splash",
            "Fri, 04 Dec 2026",
            "8:00 pm WAT",
            "Eko Hotel & Suites",
            "Lagos",
            Some("₦7,500"),
            "Comedy Show",
            None,
            false,
        ),
        (
            "Abuja Fintech Summit",
            "Tue, 09 Mar 2027",
            "10:00 am WAT",
            "International Conference Centre",
            "Abuja",
            Some("₦25,000"),
            "Conference",
            None,
            false,
        ),
        (
            "Port Harcourt Five-a-Side Cup",
            "Sat, 23 Jan 2027",
            "4:00 pm WAT",
            "Yakubu Gowon Stadium",
            "Rivers",
            Some("₦2,000"),
            "Sports Tournament",
            None,
            false,
        ),
        (
            "Ibadan Drive-in Cinema Night",
            "Sat, 06 Feb 2027",
            "6:30 pm WAT",
            "University of Ibadan Grounds",
            "Oyo",
            Some("₦3,500"),
            "Drive-in Event",
            None,
            false,
        ),
        // Unpriced listing; purchases fall back to the standard charge.
        (
            "Kano Durbar Cultural Festival",
            "Sun, 28 Mar 2027",
            "12:00 pm WAT",
            "Kofar Mata Grounds",
            "Kano",
            None,
            "Festival",
            Some("Free entry"),
            false,
        ),
        (
            "Stand Up Naija Live",
            "Fri, 30 Apr 2027",
            "8:30 pm WAT",
            "Muson Centre",
            "Lagos",
            Some("₦10,000"),
            "Stand Up Comedy",
            None,
            false,
        ),
    ];

    rows.into_iter()
        .map(
            |(title, date, time, venue, state, price, event_type, status, featured)| EventListing {
                title: title.to_string(),
                date: Some(date.to_string()),
                time: Some(time.to_string()),
                venue: Some(venue.to_string()),
                state: Some(state.to_string()),
                price: price.map(str::to_string),
                event_type: Some(event_type.to_string()),
                status: status.map(str::to_string),
                img: None,
                featured,
                available: true,
                description: None,
            },
        )
        .collect()
}
