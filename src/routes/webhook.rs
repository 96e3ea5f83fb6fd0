// SPDX-License-Identifier: MIT

//! Webhook routes for Strava push events.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/strava-webhook", get(verify).post(handle_event))
}

/// Strava webhook verification query params.
#[derive(Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: String,
    #[serde(rename = "hub.challenge")]
    challenge: String,
    #[serde(rename = "hub.verify_token")]
    verify_token: String,
}

/// Verification response.
#[derive(Serialize)]
struct VerifyResponse {
    #[serde(rename = "hub.challenge")]
    challenge: String,
}

/// Verify webhook subscription (GET).
async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    if params.mode == "subscribe" && params.verify_token == state.config.webhook_verify_token {
        tracing::info!("Webhook subscription verified");
        (
            StatusCode::OK,
            Json(VerifyResponse {
                challenge: params.challenge,
            }),
        )
            .into_response()
    } else {
        tracing::warn!(
            mode = %params.mode,
            "Webhook verification failed: invalid token"
        );
        (StatusCode::FORBIDDEN, "Verification failed").into_response()
    }
}

/// Strava webhook event payload.
#[derive(Deserialize, Debug)]
struct WebhookEvent {
    object_type: String, // "activity" or "athlete"
    object_id: u64,
    aspect_type: String, // "create", "update", "delete"
    owner_id: u64,
}

/// Handle incoming webhook events (POST).
///
/// Always acknowledges with an empty 200 regardless of processing
/// outcome, so Strava does not retry delivery indefinitely. The body
/// is taken as a raw string so even unparseable payloads are
/// acknowledged.
async fn handle_event(State(state): State<Arc<AppState>>, body: String) -> StatusCode {
    let event: WebhookEvent = match serde_json::from_str(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse webhook event");
            return StatusCode::OK;
        }
    };

    tracing::info!(
        object_type = %event.object_type,
        object_id = event.object_id,
        aspect_type = %event.aspect_type,
        owner_id = event.owner_id,
        "Webhook event received"
    );

    match (event.object_type.as_str(), event.aspect_type.as_str()) {
        ("activity", "create") => {
            if let Err(e) = log_new_activity(&state, event.owner_id, event.object_id).await {
                tracing::error!(
                    error = %e,
                    activity_id = event.object_id,
                    "Failed to process new activity event"
                );
            }
        }
        _ => {
            tracing::debug!(
                object_type = %event.object_type,
                aspect_type = %event.aspect_type,
                "Ignoring unhandled event type"
            );
        }
    }

    StatusCode::OK
}

/// Fetch a newly created activity and log a short summary.
///
/// Webhook calls carry no session, so the owner's token is resolved
/// straight from the token store.
async fn log_new_activity(
    state: &AppState,
    athlete_id: u64,
    activity_id: u64,
) -> crate::error::Result<()> {
    let Some(token) = state.strava.resolve_access_token(athlete_id).await? else {
        tracing::warn!(athlete_id, "No stored token for athlete, skipping activity fetch");
        return Ok(());
    };

    let detail = state.strava.get_activity(&token, activity_id).await?;

    tracing::info!(
        athlete_id,
        activity_id,
        name = detail.name.as_deref().unwrap_or(""),
        distance = detail.distance.unwrap_or(0.0),
        "New activity received"
    );

    Ok(())
}
