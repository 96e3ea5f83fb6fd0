// SPDX-License-Identifier: MIT

//! Shared test helpers: app construction and a mock Strava upstream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Json};
use serde_json::json;

use strava_relay::config::Config;
use strava_relay::routes::create_router;
use strava_relay::services::{StravaClient, StravaService};
use strava_relay::store::{MemoryTokenStore, TokenStore};
use strava_relay::AppState;

/// Create a test app wired to the given upstream base URL.
#[allow(dead_code)]
pub fn create_test_app_with(base_url: &str) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());

    let client = StravaClient::with_base_urls(
        config.client_id.clone(),
        config.client_secret.clone(),
        format!("{}/api/v3", base_url),
        format!("{}/oauth", base_url),
    );
    let strava = StravaService::new(client, store.clone());

    let state = Arc::new(AppState {
        config,
        store,
        strava,
    });

    (create_router(state.clone()), state)
}

/// Create a test app pointed at an unroutable upstream, so any
/// outbound call fails fast instead of hanging.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with("http://127.0.0.1:1")
}

/// Handle to a mock Strava server spawned on an ephemeral port.
#[allow(dead_code)]
pub struct MockStrava {
    pub base_url: String,
    /// Number of POSTs the token endpoint has served.
    pub token_calls: Arc<AtomicUsize>,
}

/// Spawn a mock Strava upstream serving the OAuth token endpoint and
/// the three API reads the relay uses.
#[allow(dead_code)]
pub async fn spawn_mock_strava() -> MockStrava {
    let token_calls = Arc::new(AtomicUsize::new(0));
    let counter = token_calls.clone();

    let token_handler = move |Form(form): Form<HashMap<String, String>>| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            let expires_at = chrono::Utc::now().timestamp() + 6 * 3600;

            if form.get("grant_type").map(String::as_str) == Some("authorization_code") {
                Json(json!({
                    "access_token": "exchanged_access",
                    "refresh_token": "exchanged_refresh",
                    "expires_at": expires_at,
                    "athlete": {"id": 4242, "firstname": "Test", "lastname": "Athlete"}
                }))
            } else {
                Json(json!({
                    "access_token": "refreshed_access",
                    "refresh_token": "refreshed_refresh",
                    "expires_at": expires_at
                }))
            }
        }
    };

    let app = axum::Router::new()
        .route("/oauth/token", post(token_handler))
        .route(
            "/api/v3/athlete",
            get(|| async { Json(json!({"id": 4242, "firstname": "Test", "lastname": "Athlete"})) }),
        )
        .route(
            "/api/v3/athlete/activities",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                // Echo per_page so tests can observe what the relay sent
                Json(json!({
                    "per_page": query.get("per_page").cloned().unwrap_or_default(),
                    "activities": [{"id": 99, "name": "Morning Run", "distance": 5000.0}]
                }))
            }),
        )
        .route(
            "/api/v3/activities/{id}",
            get(|Path(id): Path<u64>| async move {
                Json(json!({"id": id, "name": "Morning Run", "distance": 5000.0}))
            }),
        );

    let base_url = serve_on_ephemeral_port(app).await;

    MockStrava {
        base_url,
        token_calls,
    }
}

/// Spawn a mock upstream whose token endpoint always rejects.
#[allow(dead_code)]
pub async fn spawn_rejecting_token_server() -> String {
    let app = axum::Router::new().route(
        "/oauth/token",
        post(|| async { (StatusCode::BAD_REQUEST, r#"{"message":"invalid_grant"}"#) }),
    );

    serve_on_ephemeral_port(app).await
}

async fn serve_on_ephemeral_port(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });

    format!("http://{}", addr)
}
