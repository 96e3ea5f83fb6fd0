// SPDX-License-Identifier: MIT

//! Strava API client and token lifecycle management.
//!
//! Handles:
//! - OAuth code exchange and token refresh
//! - Proxied athlete/activity reads (opaque JSON passthrough)
//! - Activity detail fetch for webhook logging

use crate::error::AppError;
use crate::store::{TokenRecord, TokenStore};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Margin before expiry when we refresh early, so a token does not
/// expire mid-flight.
const TOKEN_REFRESH_SKEW_SECS: i64 = 30;

/// Timeout applied to every outbound call; Strava has none of its own
/// and an unbounded call would hang the handler.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Low-level Strava HTTP client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_base_urls(
            client_id,
            client_secret,
            "https://www.strava.com/api/v3".to_string(),
            "https://www.strava.com/oauth".to_string(),
        )
    }

    /// Client pointed at alternate base URLs (used by tests).
    pub fn with_base_urls(
        client_id: String,
        client_secret: String,
        api_base: String,
        oauth_base: String,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_base,
            oauth_base,
            client_id,
            client_secret,
        }
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let url = format!("{}/token", self.oauth_base);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaAuth(format!("Token exchange request failed: {}", e)))?;

        check_auth_response_json(response).await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let url = format!("{}/token", self.oauth_base);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaAuth(format!("Token refresh request failed: {}", e)))?;

        check_auth_response_json(response).await
    }

    /// Get the authenticated athlete's profile as opaque JSON.
    pub async fn get_athlete(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/athlete", self.api_base);
        self.get_json(&url, access_token, &[]).await
    }

    /// Get the athlete's recent activities as opaque JSON.
    pub async fn get_activities(
        &self,
        access_token: &str,
        per_page: u32,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/athlete/activities", self.api_base);
        self.get_json(&url, access_token, &[("per_page", per_page.to_string())])
            .await
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<ActivityDetail, AppError> {
        let url = format!("{}/activities/{}", self.api_base, activity_id);
        self.get_json(&url, access_token, &[]).await
    }

    /// Generic GET request with bearer auth and JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Check an OAuth endpoint response and parse the JSON body.
///
/// Exchange/refresh failures must stay distinguishable from plain API
/// failures so the caller never proceeds with a stale token.
async fn check_auth_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "Strava token endpoint rejected request");
        return Err(AppError::StravaAuth(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::StravaAuth(format!("Malformed token response: {}", e)))
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub athlete: AthleteRef,
}

/// Athlete reference embedded in the token exchange response.
#[derive(Debug, Clone, Deserialize)]
pub struct AthleteRef {
    pub id: u64,
}

/// Subset of an activity detail used for webhook logging.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
}

/// High-level Strava service that manages token lifecycle and API calls.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    store: Arc<dyn TokenStore>,
}

impl StravaService {
    pub fn new(client: StravaClient, store: Arc<dyn TokenStore>) -> Self {
        Self { client, store }
    }

    /// Get a currently valid access token for the given athlete.
    ///
    /// Returns `Ok(None)` when no record exists (caller treats this as
    /// unauthenticated). An unexpired token is returned unchanged with
    /// no network call. An expired token triggers exactly one refresh;
    /// on success the stored record is overwritten with the new triple.
    /// Refresh failure surfaces as `StravaAuth` and leaves the old
    /// record in place.
    pub async fn resolve_access_token(&self, athlete_id: u64) -> Result<Option<String>, AppError> {
        let Some(record) = self.store.get(athlete_id) else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        if now + TOKEN_REFRESH_SKEW_SECS < record.expires_at {
            return Ok(Some(record.access_token));
        }

        tracing::info!(athlete_id, "Access token expired, refreshing");
        let refreshed = self.client.refresh_token(&record.refresh_token).await?;

        let access_token = refreshed.access_token.clone();
        self.store.put(TokenRecord {
            athlete_id,
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token,
            expires_at: refreshed.expires_at,
        });

        tracing::info!(athlete_id, "Token refreshed and stored");
        Ok(Some(access_token))
    }

    /// Handle OAuth callback: exchange code for tokens and store them.
    pub async fn handle_oauth_callback(&self, code: &str) -> Result<TokenRecord, AppError> {
        let exchanged = self.client.exchange_code(code).await?;

        let record = TokenRecord {
            athlete_id: exchanged.athlete.id,
            access_token: exchanged.access_token,
            refresh_token: exchanged.refresh_token,
            expires_at: exchanged.expires_at,
        };
        self.store.put(record.clone());

        tracing::info!(
            athlete_id = record.athlete_id,
            "OAuth code exchanged, tokens stored"
        );
        Ok(record)
    }

    /// Get the athlete profile, passed through verbatim.
    pub async fn get_athlete(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        self.client.get_athlete(access_token).await
    }

    /// Get recent activities, passed through verbatim.
    pub async fn get_activities(
        &self,
        access_token: &str,
        per_page: u32,
    ) -> Result<serde_json::Value, AppError> {
        self.client.get_activities(access_token, per_page).await
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<ActivityDetail, AppError> {
        self.client.get_activity(access_token, activity_id).await
    }
}
