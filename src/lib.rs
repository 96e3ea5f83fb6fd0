// SPDX-License-Identifier: MIT

//! Strava-Relay: a thin OAuth relay and webhook receiver for Strava.
//!
//! This crate lets a user authorize the app via Strava OAuth, keeps the
//! resulting tokens in an in-memory store (refreshing them when they
//! expire), proxies two read endpoints, and acknowledges webhook push
//! events.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod session;
pub mod store;

use std::sync::Arc;

use config::Config;
use services::StravaService;
use store::TokenStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn TokenStore>,
    pub strava: StravaService,
}
