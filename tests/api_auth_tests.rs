// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer-authenticated read routes and CORS tests.
//!
//! These tests verify that:
//! 1. Read routes reject requests without a token and never call Strava
//! 2. Tokens and query parameters are forwarded unchanged
//! 3. Strava failures are relayed with their status
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use strava_relay::services::strava::{STRAVA_ACTIVITIES_URL, STRAVA_ATHLETE_ZONES_URL};
use strava_relay::services::{TransportFault, UpstreamResponse};
use tower::ServiceExt;

mod common;
use common::FakeTransport;

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_activities_without_token() {
    let transport = FakeTransport::new();
    let app = common::create_test_app(transport.clone());

    let response = app.oneshot(get("/api/activities", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        common::body_json(response).await,
        json!({"error": "No access token provided"})
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_activities_with_blank_bearer() {
    let transport = FakeTransport::new();
    let app = common::create_test_app(transport.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/activities")
                .header(header::AUTHORIZATION, "Bearer ")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_activities_forwards_token_and_query() {
    let transport = FakeTransport::scripted([Ok(UpstreamResponse::new(
        200,
        r#"[{"id":1,"name":"Morning Run"},{"id":2,"name":"Ride"}]"#,
    ))]);
    let app = common::create_test_app(transport.clone());

    let response = app
        .oneshot(get(
            "/api/activities?page=2&per_page=30&after=1700000000",
            Some("strava-token"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body[0]["name"], "Morning Run");
    assert_eq!(body.as_array().unwrap().len(), 2);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, STRAVA_ACTIVITIES_URL);
    assert_eq!(calls[0].access_token.as_deref(), Some("strava-token"));
    assert_eq!(
        calls[0].query,
        vec![
            ("page".to_string(), "2".to_string()),
            ("per_page".to_string(), "30".to_string()),
            ("after".to_string(), "1700000000".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_activities_relays_json_error_body() {
    let strava_error = json!({
        "message": "Authorization Error",
        "errors": [{"resource": "Athlete", "field": "access_token", "code": "invalid"}]
    });
    let transport = FakeTransport::scripted([Ok(UpstreamResponse::new(
        401,
        strava_error.to_string(),
    ))]);
    let app = common::create_test_app(transport.clone());

    let response = app
        .oneshot(get("/api/activities", Some("expired")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::body_json(response).await, strava_error);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_activities_non_json_error_body() {
    let transport = FakeTransport::scripted([Ok(UpstreamResponse::new(
        429,
        "Rate Limit Exceeded",
    ))]);
    let app = common::create_test_app(transport);

    let response = app
        .oneshot(get("/api/activities", Some("tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        common::body_json(response).await,
        json!({"error": "Strava API error: 429"})
    );
}

#[tokio::test]
async fn test_activities_transport_fault_is_not_retried() {
    let transport = FakeTransport::scripted([
        Err(TransportFault::Connect("dns error".into())),
        Ok(UpstreamResponse::new(200, "[]")),
    ]);
    let app = common::create_test_app(transport.clone());

    let response = app
        .oneshot(get("/api/activities", Some("tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("dns error"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_activities_non_json_success_body() {
    let transport = FakeTransport::scripted([Ok(UpstreamResponse::new(200, "<html>"))]);
    let app = common::create_test_app(transport);

    let response = app
        .oneshot(get("/api/activities", Some("tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        common::body_json(response).await,
        json!({"error": "Strava returned a non-JSON body for activities"})
    );
}

#[tokio::test]
async fn test_athlete_zones() {
    let zones = json!({"heart_rate": {"custom_zones": false, "zones": [{"min": 0, "max": 115}]}});
    let transport = FakeTransport::scripted([Ok(UpstreamResponse::new(200, zones.to_string()))]);
    let app = common::create_test_app(transport.clone());

    let response = app
        .oneshot(get("/api/athlete/zones?ignored=1", Some("tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await, zones);

    let calls = transport.calls();
    assert_eq!(calls[0].url, STRAVA_ATHLETE_ZONES_URL);
    assert!(calls[0].query.is_empty());
}

#[tokio::test]
async fn test_athlete_zones_without_token() {
    let transport = FakeTransport::new();
    let app = common::create_test_app(transport.clone());

    let response = app.oneshot(get("/api/athlete/zones", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = common::create_test_app(FakeTransport::new());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/exchange-token")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_health() {
    let app = common::create_test_app(FakeTransport::new());

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await["status"], "ok");
}
