// Per-route rate limiting using tower-governor
//
// Each limited route gets its own limiter keyed by client IP
// (X-Forwarded-For / X-Real-IP / Forwarded, then the peer address).
// A route allowing N requests per W seconds starts with a burst of N and
// regains one request every ceil(W / N) seconds.

use axum::routing::MethodRouter;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::GovernorLayer;

use super::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteLimit {
    pub requests: u32,
    pub window_secs: u64,
}

impl RouteLimit {
    pub const fn new(requests: u32, window_secs: u64) -> Self {
        RouteLimit {
            requests,
            window_secs,
        }
    }

    /// Seconds after which one more request is allowed.
    pub fn replenish_secs(&self) -> u64 {
        self.window_secs
            .div_ceil(u64::from(self.requests.max(1)))
            .max(1)
    }
}

/// Contact listing: a burst of 1, then one more request every 5 seconds.
pub const LIST_LIMIT: RouteLimit = RouteLimit::new(1, 5);
/// Every other limited contacts route: a burst of 2, then one more request
/// every 3 seconds.
pub const ROUTE_LIMIT: RouteLimit = RouteLimit::new(2, 5);

/// Wrap `route` in its own limiter, or return it untouched when limiting is off.
pub fn limited(
    route: MethodRouter<AppState>,
    limit: RouteLimit,
    enabled: bool,
) -> MethodRouter<AppState> {
    if !enabled {
        return route;
    }

    let config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(limit.replenish_secs())
            .burst_size(limit.requests.max(1))
            .use_headers()
            .finish()
            .expect("Rate limiter configuration with nonzero period and burst is valid"),
    );

    route.layer(GovernorLayer { config })
}
