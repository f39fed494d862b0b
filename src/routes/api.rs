// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava read routes and the debug endpoint.

use crate::error::Result;
use crate::middleware::BearerToken;
use crate::time_utils::server_time;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Version string reported by the debug endpoint.
const RUNTIME_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(get_activities))
        .route("/api/athlete/zones", get(get_athlete_zones))
        .route("/api/debug-info", get(debug_info))
}

// ─── Activities ──────────────────────────────────────────────

/// Proxy `GET /athlete/activities`; pagination and filters pass through.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>> {
    let activities = state
        .relay
        .fetch_activities(token.as_deref(), &params)
        .await?;
    Ok(Json(activities))
}

// ─── Athlete Zones ───────────────────────────────────────────

async fn get_athlete_zones(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
) -> Result<Json<Value>> {
    let zones = state.relay.fetch_athlete_zones(token.as_deref()).await?;
    Ok(Json(zones))
}

// ─── Debug ───────────────────────────────────────────────────

/// Server configuration summary. Never includes the credentials themselves.
#[derive(Serialize)]
pub struct DebugInfoResponse {
    pub client_id_set: bool,
    pub expected_redirect_uri: String,
    pub server_time: String,
    pub runtime_version: String,
}

async fn debug_info(State(state): State<Arc<AppState>>) -> Json<DebugInfoResponse> {
    Json(DebugInfoResponse {
        client_id_set: state.config.credentials.client_id.is_some(),
        expected_redirect_uri: state.config.expected_redirect_uri.clone(),
        server_time: server_time(),
        runtime_version: RUNTIME_VERSION.to_string(),
    })
}
