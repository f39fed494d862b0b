// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Relay API Server
//!
//! Relays OAuth code exchange, token refresh and a few authenticated reads
//! between a browser client and Strava.

use std::sync::Arc;
use strava_relay::{
    config::Config,
    services::{HttpTransport, OAuthRelay},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        client_id_set = config.credentials.client_id.is_some(),
        expected_redirect_uri = %config.expected_redirect_uri,
        max_attempts = config.retry.max_attempts,
        "Starting Strava-Relay API"
    );

    let relay = OAuthRelay::new(&config, Arc::new(HttpTransport::new()));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        relay,
    });

    // Build router
    let app = strava_relay::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_relay=debug".parse().expect("static directive"))
                .add_directive("info".parse().expect("static directive")),
        )
        .with(format)
        .init();
}
