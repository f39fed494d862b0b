// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Relay: server-side OAuth relay for a browser Strava client
//!
//! Keeps the Strava client secret on the server while the single-page app
//! completes the OAuth flow and reads activities through this proxy.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::OAuthRelay;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub relay: OAuthRelay,
}
