// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava HTTP transport.
//!
//! The relay talks to Strava only through [`StravaTransport`], which keeps
//! "Strava answered with status N" apart from "we never got an answer".

use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::time::Duration;

pub const STRAVA_AUTHORIZATION_URL: &str = "https://www.strava.com/oauth/authorize";
pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/api/v3/oauth/token";
pub const STRAVA_ACTIVITIES_URL: &str = "https://www.strava.com/api/v3/athlete/activities";
pub const STRAVA_ATHLETE_ZONES_URL: &str = "https://www.strava.com/api/v3/athlete/zones";

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parsed body, or `None` when Strava sent something that is not JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Failure to complete an exchange with Strava.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportFault {
    #[error("Connection to Strava failed: {0}")]
    Connect(String),

    #[error("Request to Strava timed out: {0}")]
    Timeout(String),

    #[error("Request to Strava failed: {0}")]
    Request(String),
}

impl TransportFault {
    /// Network-level faults worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportFault::Connect(_) | TransportFault::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportFault {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportFault::Timeout(e.to_string())
        } else if e.is_connect()
            || (!e.is_builder() && !e.is_redirect() && connection_dropped(&e))
        {
            TransportFault::Connect(e.to_string())
        } else {
            TransportFault::Request(e.to_string())
        }
    }
}

/// Whether the error chain shows a connection that opened and then went
/// away: reset, aborted, or closed before the response completed.
fn connection_dropped(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(h) = e.downcast_ref::<hyper::Error>() {
            if h.is_incomplete_message() || h.is_closed() {
                return true;
            }
        }
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        source = e.source();
    }
    false
}

/// Outbound HTTP capability used by the relay.
#[async_trait]
pub trait StravaTransport: Send + Sync {
    /// POST a form-encoded body, giving up after `timeout`.
    async fn post_form(
        &self,
        url: &str,
        form: &[(&'static str, &str)],
        timeout: Duration,
    ) -> Result<UpstreamResponse, TransportFault>;

    /// GET with a bearer token and query parameters.
    async fn get(
        &self,
        url: &str,
        access_token: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, TransportFault>;
}

/// `reqwest`-backed transport used in production.
#[derive(Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn read(response: reqwest::Response) -> Result<UpstreamResponse, TransportFault> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }
}

#[async_trait]
impl StravaTransport for HttpTransport {
    async fn post_form(
        &self,
        url: &str,
        form: &[(&'static str, &str)],
        timeout: Duration,
    ) -> Result<UpstreamResponse, TransportFault> {
        let response = self
            .http
            .post(url)
            .form(form)
            .timeout(timeout)
            .send()
            .await?;

        Self::read(response).await
    }

    async fn get(
        &self,
        url: &str,
        access_token: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse, TransportFault> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;

        Self::read(response).await
    }
}
