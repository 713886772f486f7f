//! Per-client request rate limiting.

use crate::api::error::ApiError;
use crate::api::state::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use tracing::warn;

/// Tracked clients beyond which idle entries are pruned.
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Keyed limiter allowing a fixed number of requests per minute per IP.
pub struct ClientRateLimiter {
    limiter: Option<DefaultKeyedRateLimiter<IpAddr>>,
}

impl std::fmt::Debug for ClientRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRateLimiter")
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}

impl ClientRateLimiter {
    /// Allows `requests` per minute per client; `0` disables limiting.
    #[must_use]
    pub fn per_minute(requests: u32) -> Self {
        let limiter = NonZeroU32::new(requests)
            .map(|n| RateLimiter::keyed(Quota::per_minute(n)));
        Self { limiter }
    }

    /// Records one request from `client`; `false` when over quota.
    #[must_use]
    pub fn check(&self, client: IpAddr) -> bool {
        let Some(limiter) = &self.limiter else {
            return true;
        };
        if limiter.len() > MAX_TRACKED_CLIENTS {
            limiter.retain_recent();
        }
        limiter.check_key(&client).is_ok()
    }
}

/// Middleware answering 429 once a client exhausts its quota.
pub async fn limit_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // Requests without connection info (in-process tests) share one bucket.
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ConnectInfo(addr)| addr.ip());

    if state.limiter.check(client) {
        next.run(request).await
    } else {
        warn!(%client, "Rate limit exceeded");
        ApiError::RateLimited.into_response()
    }
}
