// SPDX-License-Identifier: MIT

//! Strava-Relay API Server
//!
//! OAuth relay and webhook receiver for Strava: authorizes users,
//! keeps tokens fresh in memory, and proxies profile/activity reads.

use std::sync::Arc;

use strava_relay::{
    config::Config,
    services::{StravaClient, StravaService},
    store::{MemoryTokenStore, TokenStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment; fail fast on missing vars
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Strava-Relay API");

    // Process-lifetime in-memory token store, shared by the session
    // bridge and the webhook path
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());

    let client = StravaClient::new(config.client_id.clone(), config.client_secret.clone());
    let strava = StravaService::new(client, store.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        strava,
    });

    let app = strava_relay::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured logging with an env-filter.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_relay=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
