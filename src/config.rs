use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration, deserialized from config files and `APP__*`
/// environment variables. Validation runs once at load time; the rest of
/// the app treats these values as trusted.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// SeaORM connection string.
    pub database_url: String,

    /// Signing secret for access tokens. Checked for length and obvious
    /// placeholder values.
    #[validate(length(min = 64), custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// Access token lifetime in seconds, between five minutes and a day.
    #[validate(range(min = 300, max = 86400))]
    pub jwt_expiration: usize,

    /// Bind address.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// "development", "staging" or "production". Gates the dev token mint
    /// and the permissive CORS fallback.
    pub environment: String,

    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    #[serde(default)]
    pub log_json: bool,

    /// Apply pending schema migrations at startup.
    #[serde(default)]
    pub auto_migrate: bool,

    // ---- CORS ----
    /// Comma-separated allowed origins. Required outside development
    /// unless `cors_allow_any_origin` is set.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default)]
    pub cors_allow_any_origin: bool,

    #[serde(default)]
    pub cors_allow_credentials: bool,

    // ---- Database pool tuning ----
    #[serde(default = "default_max_db_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_min_db_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_db_connect_timeout")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "default_db_idle_timeout")]
    pub db_idle_timeout_secs: u64,

    #[serde(default = "default_db_acquire_timeout")]
    pub db_acquire_timeout_secs: u64,

    /// Buffer size of the in-process event channel.
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,

    // ---- Payments ----
    /// "paystack" for real charges, "mock" for offline settlement.
    #[serde(default = "default_payment_provider")]
    #[validate(custom = "validate_payment_provider")]
    pub payment_provider: String,

    /// Server-side Paystack key. Required for the paystack provider
    /// outside development.
    #[serde(default)]
    pub paystack_secret_key: Option<String>,

    /// Publishable key handed to the storefront checkout widget.
    #[serde(default)]
    pub paystack_public_key: Option<String>,

    /// Override for the provider API base URL, used against sandboxes.
    #[serde(default)]
    pub payment_base_url: Option<String>,

    /// Shared secret for webhook signature checks. Unsigned webhooks are
    /// accepted when this is unset.
    #[serde(default)]
    pub payment_webhook_secret: Option<String>,

    /// Currency code for charge amounts; amounts themselves are minor
    /// units (kobo for NGN).
    #[serde(default = "default_currency")]
    pub default_currency: String,

    // ---- Token claims ----
    #[serde(default = "default_auth_issuer")]
    pub auth_issuer: String,

    #[serde(default = "default_auth_audience")]
    pub auth_audience: String,
}

impl AppConfig {
    /// Builds a config with the required fields set and everything else at
    /// its default. Mostly a test and tooling convenience; the server goes
    /// through [`load_config`].
    pub fn new(
        database_url: String,
        jwt_secret: String,
        jwt_expiration: usize,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: default_max_db_connections(),
            db_min_connections: default_min_db_connections(),
            db_connect_timeout_secs: default_db_connect_timeout(),
            db_idle_timeout_secs: default_db_idle_timeout(),
            db_acquire_timeout_secs: default_db_acquire_timeout(),
            event_channel_capacity: default_event_channel_capacity(),
            payment_provider: default_payment_provider(),
            paystack_secret_key: None,
            paystack_public_key: None,
            payment_base_url: None,
            payment_webhook_secret: None,
            default_currency: default_currency(),
            auth_issuer: default_auth_issuer(),
            auth_audience: default_auth_audience(),
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// True when at least one non-blank origin is configured.
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_deref()
            .is_some_and(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
    }

    /// Permissive CORS is the development default and an explicit opt-in
    /// everywhere else.
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Cross-field checks that the derive-level validators cannot express.
    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            errors.add(
                "cors_allowed_origins",
                validation_failure(
                    "cors_allowed_origins_required",
                    "Outside development, set APP__CORS_ALLOWED_ORIGINS or opt in to \
                     permissive CORS with APP__CORS_ALLOW_ANY_ORIGIN=true",
                ),
            );
        }

        let paystack_selected = self.payment_provider.eq_ignore_ascii_case("paystack");
        let key_missing = self
            .paystack_secret_key
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty();
        if paystack_selected && key_missing && !self.is_development() {
            errors.add(
                "paystack_secret_key",
                validation_failure(
                    "paystack_secret_key_required",
                    "The paystack provider needs APP__PAYSTACK_SECRET_KEY outside development",
                ),
            );
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

fn validation_failure(code: &'static str, message: &str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.to_string().into());
    err
}

// Serde default helpers. Referenced by name from the struct attributes.

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_max_db_connections() -> u32 {
    16
}

fn default_min_db_connections() -> u32 {
    2
}

fn default_db_connect_timeout() -> u64 {
    30
}

fn default_db_idle_timeout() -> u64 {
    600
}

fn default_db_acquire_timeout() -> u64 {
    8
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_payment_provider() -> String {
    "mock".to_string()
}

fn default_currency() -> String {
    "NGN".to_string()
}

fn default_auth_issuer() -> String {
    "tixline-api".to_string()
}

fn default_auth_audience() -> String {
    "tixline-web".to_string()
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(validation_failure(
            "log_level",
            "Must be one of: trace, debug, info, warn, error",
        ))
    }
}

fn validate_payment_provider(provider: &str) -> Result<(), ValidationError> {
    if provider.eq_ignore_ascii_case("paystack") || provider.eq_ignore_ascii_case("mock") {
        Ok(())
    } else {
        Err(validation_failure(
            "payment_provider",
            "Must be one of: paystack, mock",
        ))
    }
}

fn validate_event_channel_capacity(capacity: usize) -> Result<(), ValidationError> {
    if capacity == 0 {
        return Err(validation_failure(
            "event_channel_capacity",
            "event_channel_capacity must be greater than 0",
        ));
    }
    Ok(())
}

/// Rejects secrets a deployment could plausibly ship by accident: too
/// short, a known placeholder, a repeated character, or too little
/// character variety to have come from a generator.
fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();

    if trimmed.len() < 64 {
        return Err(validation_failure(
            "jwt_secret",
            "JWT secret must be at least 64 characters",
        ));
    }

    let lowered = trimmed.to_ascii_lowercase();
    for fragment in ["changeme", "password", "default", "12345", "abcdef"] {
        if lowered.contains(fragment) {
            return Err(validation_failure(
                "jwt_secret",
                "JWT secret looks like a placeholder; generate one with `openssl rand -base64 64`",
            ));
        }
    }

    let distinct: HashSet<char> = trimmed.chars().collect();
    if distinct.len() < 10 {
        return Err(validation_failure(
            "jwt_secret",
            "JWT secret needs more character variety; generate one with `openssl rand -base64 64`",
        ));
    }

    Ok(())
}

/// Installs the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the configured level applies to this crate plus tower-http
/// request spans.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let directive = match env::var("RUST_LOG") {
        Ok(custom) if !custom.trim().is_empty() => custom,
        _ => format!("tixline_api={},tower_http=debug", level),
    };

    if json {
        let _ = fmt().with_env_filter(directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(directive).try_init();
    }
}

/// Name of the config profile to layer on top of `config/default.toml`.
fn config_profile() -> String {
    env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string())
}

/// Loads and validates the runtime configuration.
///
/// Later sources override earlier ones: built-in defaults, then
/// `config/default.toml`, then `config/{profile}.toml`, then
/// `config/docker.toml` when `DOCKER` is set, then `APP__*` environment
/// variables. All files are optional; `jwt_secret` is the one setting with
/// no fallback.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let profile = config_profile();
    info!(profile, "loading configuration");

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "no {}/ directory; using built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let mut builder = Config::builder()
        .set_default("environment", DEFAULT_ENV)?
        .set_default("database_url", "sqlite://tixline.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8080)?
        .set_default("jwt_expiration", 3600)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, profile)).required(false));

    if env::var("DOCKER").is_ok() {
        builder =
            builder.add_source(File::with_name(&format!("{}/docker", CONFIG_DIR)).required(false));
    }

    let raw = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // Catch a missing secret before deserialization so the operator gets
    // one clear message instead of a serde field error.
    if raw.get_string("jwt_secret").is_err() {
        error!("jwt_secret is not configured; set APP__JWT_SECRET to a secure random string of at least 64 characters");
        error!("generate one with: openssl rand -base64 64");
        return Err(AppConfigError::Load(ConfigError::NotFound(
            "jwt_secret is required but not configured. Set APP__JWT_SECRET.".into(),
        )));
    }

    let cfg: AppConfig = raw.try_deserialize()?;

    cfg.validate().map_err(|e| {
        error!("configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;
    cfg.validate_additional_constraints().map_err(|e| {
        error!("configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!(environment = %cfg.environment, provider = %cfg.payment_provider, "configuration loaded");
    Ok(cfg)
}
