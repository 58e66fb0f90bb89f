// Per-client request throttle for the api route group
// Keyed by client IP; answers 429 with Retry-After once the quota is spent

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};

use crate::{app::AppState, utils::service_error::ServiceError};

type KeyedLimiter<C> =
    RateLimiter<String, DefaultKeyedStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Idle clients are dropped from the limiter once per this many checks
const PRUNE_EVERY: u64 = 1024;

/// Client address as seen by the server, or "unknown" when the connection
/// info is unavailable (e.g. requests driven through `oneshot`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    fn from_extensions(extensions: &axum::http::Extensions) -> Self {
        if let Some(ip) = extensions.get::<ClientIp>() {
            return ip.clone();
        }
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| ClientIp(addr.ip().to_string()))
            .unwrap_or_else(|| ClientIp("unknown".to_string()))
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp::from_extensions(&parts.extensions))
    }
}

pub struct ApiThrottle<C: Clock = DefaultClock> {
    limiter: KeyedLimiter<C>,
    clock: C,
    per_minute: u32,
    checks: AtomicU64,
}

impl ApiThrottle {
    /// `None` when the quota is zero, which disables throttling
    pub fn per_minute(limit: u32) -> Option<Self> {
        Self::with_clock(limit, DefaultClock::default())
    }
}

impl<C: Clock> ApiThrottle<C> {
    pub fn with_clock(limit: u32, clock: C) -> Option<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(limit)?);
        Some(Self {
            limiter: RateLimiter::new(quota, DefaultKeyedStateStore::default(), &clock),
            clock,
            per_minute: limit,
            checks: AtomicU64::new(0),
        })
    }

    pub fn limit(&self) -> u32 {
        self.per_minute
    }

    /// Take one request from `key`'s quota. On rejection returns the number of
    /// seconds until the next request would be admitted (at least 1).
    pub fn check(&self, key: &str) -> Result<(), u64> {
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_EVERY == 0 {
            self.prune();
        }

        self.limiter.check_key(&key.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            wait.as_secs().max(1)
        })
    }

    /// Forget clients whose quota has fully replenished; their next request
    /// starts from a fresh bucket either way
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        tracing::debug!(before, after = self.limiter.len(), "Pruned idle throttle keys");
    }

    /// Number of clients currently held by the limiter
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

/// Middleware for the api route group
pub async fn throttle_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let client_ip = ClientIp::from_extensions(request.extensions());

    if let Some(throttle) = &app_state.throttle {
        if let Err(retry_after_seconds) = throttle.check(&client_ip.0) {
            tracing::warn!(
                client = %client_ip.0,
                path = %request.uri().path(),
                limit = throttle.limit(),
                "Rate limit exceeded"
            );
            return ServiceError::TooManyRequests {
                retry_after_seconds,
            }
            .into_response();
        }
    }

    request.extensions_mut().insert(client_ip);
    next.run(request).await
}
