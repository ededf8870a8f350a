use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde_json::{Map, Value};

use crate::{
    claims::ClaimsAccessor,
    config::{AppConfig, Env},
    models::SessionRecord,
    session::SessionState,
};

/// LoginClaims
///
/// The identity claims carried by a verified Auth0 token. Produced only by the extractor
/// below, so a handler that receives one knows the token's signature, expiry and audience
/// were checked.
#[derive(Debug, Clone)]
pub struct LoginClaims(pub Map<String, Value>);

/// LoginClaims Extractor
///
/// 1. Local bypass: in `Env::Local` with `AUTH_DEV_BYPASS` set, `x-dev-email` + `x-dev-role`
///    headers build the claims directly, so the dashboard can be exercised without an Auth0
///    tenant.
/// 2. Bearer token extraction from `Authorization`.
/// 3. JWT validation (RS256 when a public key is configured, HS256 otherwise; `exp` and
///    `aud` always validated).
///
/// Rejection: `StatusCode::UNAUTHORIZED` on any failure.
impl<S> FromRequestParts<S> for LoginClaims
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local && config.dev_bypass {
            if let Some(claims) = dev_bypass_claims(parts, &config) {
                tracing::debug!("login accepted through local development bypass");
                return Ok(LoginClaims(claims));
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        verify_token(token, &config).map(LoginClaims)
    }
}

/// Validates an Auth0 token and returns its claims untouched.
pub fn verify_token(token: &str, config: &AppConfig) -> Result<Map<String, Value>, StatusCode> {
    let (key, algorithm) = match &config.jwt_public_key_pem {
        Some(pem) => {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                tracing::error!("configured RSA public key is unusable: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            (key, Algorithm::RS256)
        }
        None => (
            DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            Algorithm::HS256,
        ),
    };

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;

    // ID tokens carry the client id as audience, access tokens the API audience.
    let mut audiences = vec![config.auth0_audience.clone()];
    if let Some(client_id) = &config.auth0_client_id {
        audiences.push(client_id.clone());
    }
    validation.set_audience(&audiences);

    match decode::<Map<String, Value>>(token, &key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::info!("login rejected: token expired"),
                ErrorKind::InvalidAudience => tracing::warn!("login rejected: audience mismatch"),
                _ => tracing::warn!("login rejected: {}", e),
            }
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

fn dev_bypass_claims(parts: &Parts, config: &AppConfig) -> Option<Map<String, Value>> {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let email = header("x-dev-email")?;
    let role = header("x-dev-role")?;

    let accessor = ClaimsAccessor::new(&config.auth0_audience);
    let mut claims = Map::new();
    claims.insert("email".to_string(), Value::String(email));
    claims.insert(
        accessor.roles_key().to_string(),
        Value::Array(vec![Value::String(role)]),
    );
    Some(claims)
}

/// ActiveSession
///
/// Extractor for endpoints that need a logged-in identity. Reads the session store; a
/// missing record rejects with 401, a store failure with 500.
#[derive(Debug, Clone)]
pub struct ActiveSession(pub SessionRecord);

impl<S> FromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionState::from_ref(state);

        match session.read().await {
            Ok(Some(record)) => Ok(ActiveSession(record)),
            Ok(None) => Err(StatusCode::UNAUTHORIZED),
            Err(e) => {
                tracing::error!("session store read failed: {}", e);
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
