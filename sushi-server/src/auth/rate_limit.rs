//! Application-layer rate limiting for the back-office login
//!
//! Fixed windows keyed by route and client key (IP address or email).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::ServerState;
use crate::utils::{AppError, ErrorCode};

/// Login attempts per IP per minute
pub const LOGIN_PER_IP_PER_MINUTE: u32 = 5;
/// Login attempts per email per hour
pub const LOGIN_PER_EMAIL_PER_HOUR: u32 = 20;

struct Entry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (key -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, Entry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(
        &self,
        route: &'static str,
        key: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(key.to_owned()).or_insert_with(|| Entry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Drop entries whose window started more than an hour ago
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(3600);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Client IP: first X-Forwarded-For entry, then the peer address.
pub fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

pub fn too_many_attempts() -> AppError {
    AppError::with_message(
        ErrorCode::TooManyAttempts,
        "Too many login attempts, try again later",
    )
}

/// Rate limit middleware for login: 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request);
    if !state
        .rate_limiter
        .check("login", &ip, LOGIN_PER_IP_PER_MINUTE, 60)
        .await
    {
        security_log!("WARN", "login_rate_limited", ip = ip);
        return Err(too_many_attempts());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn window_allows_up_to_max() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("login", "10.0.0.1", 5, 60).await);
        }
        assert!(!limiter.check("login", "10.0.0.1", 5, 60).await);
        // Other keys and routes have their own windows
        assert!(limiter.check("login", "10.0.0.2", 5, 60).await);
        assert!(limiter.check("login_email", "10.0.0.1", 5, 60).await);
    }

    #[tokio::test]
    async fn elapsed_window_resets() {
        let limiter = RateLimiter::new();
        // A zero-length window is always elapsed
        for _ in 0..3 {
            assert!(limiter.check("login", "k", 1, 0).await);
        }
        // Fresh entries survive cleanup and keep counting
        limiter.cleanup().await;
        assert!(!limiter.check("login", "k", 1, 60).await);
    }

    #[test]
    fn forwarded_for_wins() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&req), "203.0.113.9");

        let bare = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(extract_ip(&bare), "unknown");
    }
}
