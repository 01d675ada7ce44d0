use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use sea_orm::ActiveModelTrait;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use tixline_api::{
    auth::{generate_token, AuthConfig, Claims},
    config::AppConfig,
    db,
    entities::event_listing,
    events::{self, EventSender},
    gateway::{MockGateway, PaymentGateway},
    handlers::AppServices,
    models::EventListing,
    store::{DatabaseTicketStore, TicketStore},
    AppState,
};

pub const TEST_JWT_SECRET: &str =
    "integration-test-secret-with-plenty-of-unique-characters-9081726354fedcba";

/// Harness around a full application state backed by an in-memory SQLite
/// database and the scriptable mock gateway.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    /// The scriptable gateway behind `state.gateway`.
    pub gateway: Arc<MockGateway>,
    token: String,
    user_id: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Boots the full router on an in-memory database.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Construct a test application after tweaking the base configuration,
    /// e.g. to set a webhook secret.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        // A single pooled connection keeps the in-memory database alive
        // and shared for the lifetime of the harness.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        tweak(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let store: Arc<dyn TicketStore> = Arc::new(DatabaseTicketStore::new(db_arc.clone()));
        let gateway = Arc::new(MockGateway::new());
        let gateway_dyn: Arc<dyn PaymentGateway> = gateway.clone();

        let auth_config = AuthConfig::from_app_config(&cfg);

        let services = AppServices::new(
            db_arc.clone(),
            store,
            gateway_dyn.clone(),
            Some(event_sender),
            cfg.default_currency.clone(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            auth_config: auth_config.clone(),
            gateway: gateway_dyn,
            services,
        };

        let user_id = Uuid::new_v4().to_string();
        let token = generate_token(
            &auth_config,
            &user_id,
            Some("ada@example.com"),
            Some("Ada Obi"),
        )
        .expect("mint test token");

        let router = Router::new()
            .nest("/api/v1", tixline_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            gateway,
            token,
            user_id,
            _event_task: event_task,
        }
    }

    /// Access the bearer token for the default signed-in buyer.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// User ID the default token was minted for.
    #[allow(dead_code)]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Mint a token for an arbitrary identity.
    #[allow(dead_code)]
    pub fn token_for(&self, user_id: &str, email: Option<&str>, name: Option<&str>) -> String {
        generate_token(&self.state.auth_config, user_id, email, name)
            .expect("mint token for test identity")
    }

    /// A structurally valid token whose expiry is well in the past.
    #[allow(dead_code)]
    pub fn expired_token(&self) -> String {
        let config = &self.state.auth_config;
        let now = Utc::now();
        let claims = Claims {
            sub: self.user_id.clone(),
            name: Some("Ada Obi".to_string()),
            email: Some("ada@example.com".to_string()),
            jti: Uuid::new_v4().to_string(),
            iat: (now - chrono::Duration::hours(3)).timestamp(),
            exp: (now - chrono::Duration::hours(2)).timestamp(),
            nbf: (now - chrono::Duration::hours(3)).timestamp(),
            iss: config.jwt_issuer.clone(),
            aud: config.jwt_audience.clone(),
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .expect("encode expired token")
    }

    /// One-shot a request against the router, optionally with a bearer
    /// token and a JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(bearer) = token {
            request = request.header("authorization", format!("Bearer {}", bearer));
        }

        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("build json request"),
            None => request.body(Body::empty()).expect("build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should be infallible")
    }

    /// Same as [`TestApp::request`] but signed with the default buyer's token.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// POST a raw (non-JSON-helper) body with extra headers; used for
    /// webhook deliveries where the signature covers the exact bytes.
    #[allow(dead_code)]
    pub async fn post_raw(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder.body(Body::from(body)).expect("build raw request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should be infallible")
    }

    /// Insert a listing row directly, bypassing the creation wizard's
    /// schedule validation.
    pub async fn seed_listing(&self, listing: &EventListing) -> Uuid {
        let model = event_listing::ActiveModel::from_listing(listing)
            .insert(self.state.db.as_ref())
            .await
            .expect("seed listing for tests");
        model.id
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// A catalog listing with sensible Lagos defaults.
pub fn listing(title: &str, price: Option<&str>) -> EventListing {
    EventListing {
        title: title.to_string(),
        date: Some("Sat, 14 Mar 2026".to_string()),
        time: Some("7:00 pm WAT".to_string()),
        venue: Some("Terra Kulture Arena".to_string()),
        state: Some("Lagos".to_string()),
        price: price.map(str::to_string),
        event_type: Some("Festival".to_string()),
        status: None,
        img: None,
        featured: false,
        available: true,
        description: None,
    }
}

/// Read a response body as JSON.
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is valid json")
}
