use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use time::OffsetDateTime;
use tracing::{error, warn};
use uuid::Uuid;

use super::{blacklist, claims::TokenKind, jwt::JwtKeys};
use crate::{error::ApiError, state::AppState};

/// Extracts and validates the bearer token, returning the customer ID.
pub struct AuthUser(pub Uuid);

/// Like [`AuthUser`], but keeps the raw token around (logout needs it).
pub struct BearerSession {
    pub customer_id: Uuid,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("MISSING_TOKEN", "missing Authorization header"))?;

    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("INVALID_TOKEN", "invalid auth scheme"))
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<BearerSession, ApiError> {
    let token = bearer_token(parts)?;

    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::unauthorized("INVALID_TOKEN", "invalid or expired token")
    })?;

    if claims.kind != TokenKind::Access {
        return Err(ApiError::unauthorized("INVALID_TOKEN", "access token required"));
    }

    let revoked = blacklist::is_blacklisted(&state.db, token).await.map_err(|e| {
        error!(error = %e, "blacklist lookup failed");
        ApiError::Internal(e)
    })?;
    if revoked {
        warn!(customer_id = %claims.sub, "revoked token presented");
        return Err(ApiError::unauthorized("TOKEN_REVOKED", "token has been revoked"));
    }

    let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
        .map_err(|e| ApiError::Internal(e.into()))?;

    Ok(BearerSession {
        customer_id: claims.sub,
        token: token.to_string(),
        expires_at,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = authenticate(parts, state).await?;
        Ok(AuthUser(session.customer_id))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for BearerSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await
    }
}
