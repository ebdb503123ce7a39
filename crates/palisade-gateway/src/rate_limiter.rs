use axum::extract::{ConnectInfo, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

/// Fixed-window per-IP rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<IpAddr, (Instant, u32)>>,
    max_requests_per_minute: u32,
}

impl RateLimiter {
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_requests_per_minute,
        }
    }

    /// Record one request from `ip`; false when the window is exhausted
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut entry = self.windows.entry(ip).or_insert((now, 0));
        let (window_start, count) = *entry.value();

        if now.duration_since(window_start) >= WINDOW {
            *entry.value_mut() = (now, 1);
            true
        } else if count < self.max_requests_per_minute {
            entry.value_mut().1 += 1;
            true
        } else {
            false
        }
    }

    /// Drop expired windows (call periodically)
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, (window_start, _)| now.duration_since(*window_start) < WINDOW);
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    rate_limiter: Arc<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    if !rate_limiter.check(addr.ip()) {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response();
    }

    next.run(request).await
}
