// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod relay;
pub mod strava;

pub use relay::OAuthRelay;
pub use strava::{HttpTransport, StravaTransport, TransportFault, UpstreamResponse};
