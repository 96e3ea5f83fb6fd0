// SPDX-License-Identifier: MIT

//! External service clients.

pub mod strava;

pub use strava::{StravaClient, StravaService};
