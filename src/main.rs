use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use http::HeaderValue;
use tokio::{signal, sync::mpsc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::{error, info, warn};

use tixline_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("migration run failed: {}", e);
            e
        })?;
    }
    let db = Arc::new(db_pool);

    // Event loop for purchase/catalog telemetry
    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let event_sender = Arc::new(api::events::EventSender::new(event_tx));
    tokio::spawn(api::events::process_events(event_rx));

    let store: Arc<dyn api::store::TicketStore> =
        Arc::new(api::store::DatabaseTicketStore::new(db.clone()));

    let gateway: Arc<dyn api::gateway::PaymentGateway> =
        if cfg.payment_provider.eq_ignore_ascii_case("paystack") {
            info!("payment provider: paystack");
            Arc::new(api::gateway::PaystackGateway::new(
                cfg.paystack_secret_key.clone(),
                cfg.payment_base_url.clone(),
            )?)
        } else {
            info!("payment provider: mock (offline settlement)");
            Arc::new(api::gateway::MockGateway::new())
        };
    if !gateway.is_ready() {
        warn!("payment gateway has no secret key; purchases will report the payment system as loading");
    }

    let auth_config = api::auth::AuthConfig::from_app_config(&cfg);

    let services = api::handlers::AppServices::new(
        db.clone(),
        store,
        gateway.clone(),
        Some(event_sender.clone()),
        cfg.default_currency.clone(),
    );

    let cors = cors_layer(&cfg)?;

    let app_state = api::AppState {
        db,
        config: cfg.clone(),
        auth_config,
        gateway,
        services,
    };

    let app = Router::<api::AppState>::new()
        .route("/", get(|| async { "tixline-api up" }))
        .nest("/api/v1", api::api_v1_routes())
        .merge(api::openapi::swagger_ui())
        .layer(api::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .layer(axum::middleware::from_fn(
            api::tracing::request_id_middleware,
        ))
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("🚀 tixline-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves the CORS policy from config. Outside development this refuses
/// to start without either explicit origins or the any-origin override,
/// so a deployment cannot silently run wide open.
fn cors_layer(cfg: &api::config::AppConfig) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let origins = parse_origins(cfg.cors_allowed_origins.as_deref());

    if !origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(cfg.cors_allow_credentials));
    }

    if cfg.should_allow_permissive_cors() {
        let reason = if cfg.is_development() {
            "development environment"
        } else {
            "any-origin override"
        };
        info!("permissive CORS enabled ({})", reason);
        return Ok(CorsLayer::permissive());
    }

    error!("refusing to start without a CORS policy");
    Err("no CORS policy: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true".into())
}

fn parse_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect()
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};
        let mut sigterm = unix_signal(SignalKind::terminate()).expect("SIGTERM handler");
        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await.expect("Ctrl+C handler");
}
