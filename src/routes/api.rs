// SPDX-License-Identifier: MIT

//! Proxy routes for the current user's Strava data.
//!
//! Upstream bodies are passed through verbatim; the proxy deliberately
//! does not validate or reshape their schema.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::session::resolve_session_token;
use crate::AppState;

const DEFAULT_PER_PAGE: u32 = 10;
/// Strava's page-size cap.
const MAX_PER_PAGE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/athlete", get(get_athlete))
        .route("/activities", get(get_activities))
}

/// Get the current user's Strava profile.
async fn get_athlete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>> {
    let token = resolve_session_token(&state, &jar).await?;
    let profile = state.strava.get_athlete(&token).await?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
struct ActivitiesQuery {
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// Get the current user's recent activities.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<serde_json::Value>> {
    let token = resolve_session_token(&state, &jar).await?;
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
    let activities = state.strava.get_activities(&token, per_page).await?;
    Ok(Json(activities))
}
