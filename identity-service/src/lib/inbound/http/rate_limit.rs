use std::collections::HashMap;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::TOO_MANY_REQUESTS;

/// At most `max_requests` per client address in each `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter keyed by client IP address.
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `client`. Returns false once the window is used up.
    pub fn try_acquire(&self, client: IpAddr) -> bool {
        self.try_acquire_at(client, Instant::now())
    }

    fn try_acquire_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        windows.retain(|_, window| now.duration_since(window.started) < self.limit.window);

        let window = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if window.count >= self.limit.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

/// Middleware rejecting requests over the limit with 429.
///
/// Needs the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub async fn throttle(
    State(limiter): State<Arc<RateLimiter>>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !limiter.try_acquire(client.ip()) {
        tracing::warn!(
            client = %client.ip(),
            path = %req.uri().path(),
            "Rate limit exceeded"
        );
        return Err(ApiError::TooManyRequests(TOO_MANY_REQUESTS.to_string()));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimit {
            max_requests: 3,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_fourth_request_in_window_rejected() {
        let limiter = limiter();
        let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let start = Instant::now();

        for second in 0..3 {
            assert!(limiter.try_acquire_at(client, start + Duration::from_secs(second)));
        }
        assert!(!limiter.try_acquire_at(client, start + Duration::from_secs(59)));
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter();
        let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let start = Instant::now();

        for _ in 0..3 {
            assert!(limiter.try_acquire_at(client, start));
        }
        assert!(!limiter.try_acquire_at(client, start));
        assert!(limiter.try_acquire_at(client, start + Duration::from_secs(60)));
    }

    #[test]
    fn test_clients_counted_separately() {
        let limiter = limiter();
        let first = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let second = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.try_acquire_at(first, now));
        }
        assert!(!limiter.try_acquire_at(first, now));
        assert!(limiter.try_acquire_at(second, now));
    }
}
