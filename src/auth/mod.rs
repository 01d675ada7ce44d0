use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::AppState;

/// Payload of a Tixline access token. `name` and `email` are private
/// claims; the rest are the registered set.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub name: Option<String>,
    pub email: Option<String>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// The signed-in buyer as seen by handlers and services.
///
/// Fields are carried exactly as the token supplied them; display-name and
/// email fallbacks are applied where tickets are built, not here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    #[schema(example = "u-7f3a2b")]
    pub user_id: String,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "Ada Obi")]
    pub display_name: Option<String>,
}

impl Identity {
    fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            display_name: claims.name,
        }
    }
}

/// Signing key and token policy shared by the mint and verify paths.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_issuer: config.auth_issuer.clone(),
            jwt_audience: config.auth_audience.clone(),
            token_expiration: Duration::from_secs(config.jwt_expiration as u64),
        }
    }
}

/// Mints an HS256 token with a fresh `jti` and the configured lifetime.
pub fn generate_token(
    config: &AuthConfig,
    user_id: &str,
    email: Option<&str>,
    name: Option<&str>,
) -> Result<String, ServiceError> {
    let now = Utc::now();
    let exp = now
        + ChronoDuration::from_std(config.token_expiration)
            .map_err(|_| ServiceError::AuthError("Invalid token duration".to_string()))?;

    let claims = Claims {
        sub: user_id.to_string(),
        name: name.map(str::to_string),
        email: email.map(str::to_string),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        nbf: now.timestamp(),
        iss: config.jwt_issuer.clone(),
        aud: config.jwt_audience.clone(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ServiceError::JwtError(e.to_string()))
}

/// Checks signature, issuer, and audience. An expired signature maps to
/// the session-lost prompt rather than a bare JWT error.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, ServiceError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_audience(&[&config.jwt_audience]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServiceError::SessionLost,
        _ => ServiceError::JwtError(e.to_string()),
    })
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Extractor for routes that require a signed-in buyer. Rejects with the
/// sign-in prompt when no usable token is attached.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = bearer_token(parts).ok_or(ServiceError::SignInRequired)?;
        let claims = verify_token(&app_state.auth_config, &token)?;
        Ok(AuthenticatedUser(Identity::from_claims(claims)))
    }
}

/// Extractor for routes that work with or without a signed-in buyer.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Identity>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthenticated
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let identity = bearer_token(parts)
            .and_then(|token| verify_token(&app_state.auth_config, &token).ok())
            .map(Identity::from_claims);
        Ok(MaybeAuthenticated(identity))
    }
}
