//! Per-client request rate limiting
//!
//! Token bucket per peer IP, applied as route middleware so the gate itself
//! never sees it.

use crate::error::{ApiError, ServerError};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type KeyedLimiter = GovernorRateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<KeyedLimiter>,
    clock: DefaultClock,
    per_minute: u32,
}

impl RateLimit {
    pub fn per_minute(per_minute: u32) -> Result<Self, ServerError> {
        let burst = NonZeroU32::new(per_minute)
            .ok_or_else(|| ServerError::Config("rate limit must be at least 1 per minute".to_string()))?;

        Ok(Self {
            limiter: Arc::new(GovernorRateLimiter::keyed(Quota::per_minute(burst))),
            clock: DefaultClock::default(),
            per_minute,
        })
    }

    /// Take one token for `client`, or report how long until one is free
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        self.limiter
            .check_key(&client)
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    pub fn limit(&self) -> u32 {
        self.per_minute
    }

    /// Drop buckets that have fully refilled
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

pub async fn enforce(State(limit): State<RateLimit>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limit.check(peer) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            tracing::warn!("{} - RATE LIMITED: {} {}", peer, request.method(), request.uri().path());
            ApiError::RateLimited {
                per_minute: limit.limit(),
                retry_after_secs: wait.as_secs().max(1),
            }
            .into_response()
        }
    }
}
