// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strava_relay::config::Config;
use strava_relay::routes::create_router;
use strava_relay::services::{OAuthRelay, StravaTransport, TransportFault, UpstreamResponse};
use strava_relay::AppState;

/// One request the relay sent to Strava.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub form: Vec<(String, String)>,
    pub access_token: Option<String>,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

/// Transport that replays scripted outcomes and records every call.
///
/// Once the script runs out, further calls fail with a `Request` fault.
#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Result<UpstreamResponse, TransportFault>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scripted(
        outcomes: impl IntoIterator<Item = Result<UpstreamResponse, TransportFault>>,
    ) -> Arc<Self> {
        let transport = Self::default();
        transport.script.lock().unwrap().extend(outcomes);
        Arc::new(transport)
    }

    /// Script `failures` connection faults followed by one JSON response.
    pub fn failing_then(failures: usize, status: u16, body: &str) -> Arc<Self> {
        let mut outcomes: Vec<_> = (0..failures)
            .map(|i| Err(TransportFault::Connect(format!("connection refused #{}", i + 1))))
            .collect();
        outcomes.push(Ok(UpstreamResponse::new(status, body)));
        Self::scripted(outcomes)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next(&self, call: RecordedCall) -> Result<UpstreamResponse, TransportFault> {
        self.calls.lock().unwrap().push(call);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFault::Request("no scripted response".to_string())))
    }
}

#[async_trait]
impl StravaTransport for FakeTransport {
    async fn post_form(
        &self,
        url: &str,
        form: &[(&'static str, &str)],
        timeout: Duration,
    ) -> Result<UpstreamResponse, TransportFault> {
        self.next(RecordedCall {
            method: "POST",
            url: url.to_string(),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            access_token: None,
            query: Vec::new(),
            timeout: Some(timeout),
        })
    }

    async fn get(
        &self,
        url: &str,
        access_token: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, TransportFault> {
        self.next(RecordedCall {
            method: "GET",
            url: url.to_string(),
            form: Vec::new(),
            access_token: Some(access_token.to_string()),
            query: query.to_vec(),
            timeout: None,
        })
    }
}

/// Relay over the given transport with the test config.
#[allow(dead_code)]
pub fn test_relay(config: &Config, transport: Arc<FakeTransport>) -> OAuthRelay {
    OAuthRelay::new(config, transport)
}

/// Create a test app over a fake transport.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    transport: Arc<FakeTransport>,
) -> (axum::Router, Arc<AppState>) {
    let relay = OAuthRelay::new(&config, transport);
    let state = Arc::new(AppState { config, relay });
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn create_test_app(transport: Arc<FakeTransport>) -> axum::Router {
    create_test_app_with(Config::test_default(), transport).0
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
