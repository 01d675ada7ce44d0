use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tixline API",
        version = "0.2.0",
        description = r#"
# Tixline Event Ticketing API

Backend for the Tixline marketplace: browse and create event listings, buy
tickets through a hosted payment provider, and read back the saved tickets.

## Purchase flow

1. `POST /api/v1/purchases` opens a payment session for one ticket and
   returns a unique reference.
2. The buyer pays inside the provider's checkout.
3. `POST /api/v1/purchases/{reference}/complete` settles the attempt: on a
   successful charge the ticket is written and the receipt points at
   `/my-tickets`; a cancelled charge settles silently.

Amounts are denominated in kobo (NGN minor units). Display prices such as
`₦2,000` are normalized server-side before charging.

## Authentication

Buyer-facing endpoints take a JWT in the Authorization header:

```
Authorization: Bearer <token>
```

Outside production, `POST /api/v1/auth/token` mints test tokens.

## Error Handling

Errors share one envelope with appropriate HTTP status codes:

```json
{
  "error": "Not Found",
  "message": "No event selected. Please try again.",
  "request_id": "9d2c1e4a-51cb-4e0f-8f3a-6b7d0c5e2a18",
  "timestamp": "2026-01-01T00:00:00.000Z"
}
```
        "#,
        contact(
            name = "Tixline Engineering",
            email = "engineering@tixline.app",
            url = "https://tixline.app"
        ),
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "https://api.tixline.app", description = "Production server"),
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "events", description = "Catalog browsing and listing creation"),
        (name = "purchases", description = "Payment session lifecycle"),
        (name = "tickets", description = "The buyer's saved tickets"),
        (name = "auth", description = "Token endpoints"),
        (name = "webhooks", description = "Payment provider callbacks")
    ),
    paths(
        // Catalog
        crate::handlers::listings::list_events,
        crate::handlers::listings::get_event,
        crate::handlers::listings::get_event_by_title,
        crate::handlers::listings::create_event,
        crate::handlers::listings::catalog_stats,

        // Purchases
        crate::handlers::purchases::begin_purchase,
        crate::handlers::purchases::complete_purchase,
        crate::handlers::purchases::cancel_purchase,

        // Ticket wallet
        crate::handlers::tickets::my_tickets,
        crate::handlers::tickets::ticket_detail,
        crate::handlers::tickets::find_by_verification_code,

        // Auth
        crate::handlers::auth::mint_dev_token,
        crate::handlers::auth::current_identity,

        // Webhooks
        crate::handlers::webhooks::payment_webhook,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::errors::ErrorResponse,

            // Catalog types
            crate::models::EventListing,
            crate::services::catalog::ListingResponse,
            crate::services::catalog::CreateListingRequest,
            crate::services::catalog::CatalogStats,
            crate::services::catalog::ListingStats,
            crate::handlers::listings::ListingDetail,

            // Purchase types
            crate::models::PurchaseState,
            crate::services::purchases::BeginPurchaseRequest,
            crate::services::purchases::BeginPurchaseResponse,
            crate::services::purchases::PurchaseReceipt,
            crate::gateway::ProviderTransaction,

            // Ticket types
            crate::models::TicketRecord,
            crate::handlers::tickets::TicketDetail,

            // Auth types
            crate::auth::Identity,
            crate::handlers::auth::DevTokenRequest,
            crate::handlers::auth::TokenResponse
        )
    )
)]
pub struct ApiDocV1;

/// Interactive docs at /swagger-ui, backed by the generated document.
pub fn swagger_ui() -> SwaggerUi {
    let config = utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true);
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(config)
}
