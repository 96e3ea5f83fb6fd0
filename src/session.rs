// SPDX-License-Identifier: MIT

//! Signed session cookie and the bridge between session and token store.
//!
//! The session is a JWT carrying the current user's copy of the
//! credential record. The bridge is the only reader of those session
//! fields; the token store stays the sole source of truth for
//! refreshed tokens.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::TokenRecord;
use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "strava_session";

/// Cookie lifetime (30 days), independent of the Strava token expiry.
const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// Session claims: the per-browser copy of the credential record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (Strava athlete ID)
    pub sub: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Strava token expiry (Unix timestamp), distinct from the
    /// cookie's own `exp`.
    pub expires_at: i64,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Cookie expiration (Unix timestamp)
    pub exp: usize,
}

/// Create the session cookie for a freshly exchanged credential record.
pub fn create_session_cookie(
    record: &TokenRecord,
    signing_key: &[u8],
) -> Result<Cookie<'static>, AppError> {
    let now = chrono::Utc::now().timestamp() as usize;

    let claims = SessionClaims {
        sub: record.athlete_id.to_string(),
        access_token: record.access_token.clone(),
        refresh_token: record.refresh_token.clone(),
        expires_at: record.expires_at,
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Session encode failed: {}", e)))?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    Ok(cookie)
}

/// Read and verify the session cookie, if any.
pub fn read_session(jar: &CookieJar, signing_key: &[u8]) -> Option<SessionClaims> {
    let cookie = jar.get(SESSION_COOKIE)?;

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<SessionClaims>(cookie.value(), &key, &validation)
        .map(|data| data.claims)
        .ok()
}

/// Resolve a valid access token for the current user.
///
/// Seeds the token store from the session copy when the store has no
/// record for that athlete (e.g. after a restart where the cookie
/// outlived the in-memory store), then delegates to the token
/// lifecycle for resolve/refresh.
pub async fn resolve_session_token(state: &AppState, jar: &CookieJar) -> Result<String, AppError> {
    let claims =
        read_session(jar, &state.config.session_signing_key).ok_or(AppError::Unauthorized)?;
    let athlete_id: u64 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

    if state.store.get(athlete_id).is_none() {
        tracing::debug!(athlete_id, "Seeding token store from session");
        state.store.put(TokenRecord {
            athlete_id,
            access_token: claims.access_token,
            refresh_token: claims.refresh_token,
            expires_at: claims.expires_at,
        });
    }

    state
        .strava
        .resolve_access_token(athlete_id)
        .await?
        .ok_or(AppError::Unauthorized)
}
