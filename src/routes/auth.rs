// SPDX-License-Identifier: MIT

//! Strava OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::session::create_session_cookie;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/callback", get(callback))
}

/// Landing page with static links.
async fn index() -> Html<&'static str> {
    Html(r#"<a href="/login">Connect with Strava</a> | <a href="/activities">My activities</a>"#)
}

/// Start OAuth flow - redirect to Strava authorization.
async fn login(State(state): State<Arc<AppState>>) -> Redirect {
    let auth_url = format!(
        "https://www.strava.com/oauth/authorize?\
         client_id={}&\
         redirect_uri={}&\
         response_type=code&\
         scope=read,activity:read_all",
        state.config.client_id,
        urlencoding::encode(&state.config.redirect_uri),
    );

    tracing::info!(
        client_id = %state.config.client_id,
        "Starting OAuth flow, redirecting to Strava"
    );

    Redirect::temporary(&auth_url)
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, create session.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Html<&'static str>)> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::BadRequest(format!("OAuth error: {}", error)));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    // Exchange the code and store the record server-side (for webhooks)
    let record = state.strava.handle_oauth_callback(&code).await?;

    // Mirror the record into the session for the current-user endpoints
    let cookie = create_session_cookie(&record, &state.config.session_signing_key)?;

    Ok((
        jar.add(cookie),
        Html(r#"Connected — <a href="/athlete">My profile</a> | <a href="/activities">My activities</a>"#),
    ))
}
