use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }

    pub fn per_hour(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(3600),
        }
    }
}

/// In-memory fixed-window limiter, keyed by caller. Single instance only.
#[derive(Clone)]
pub struct RateLimitState {
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
    auth: RateLimitPolicy,
    demo: RateLimitPolicy,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
    window: Duration,
}

impl RateLimitState {
    pub fn new(auth: RateLimitPolicy, demo: RateLimitPolicy) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            auth,
            demo,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RateLimitPolicy::per_minute(config.auth_rate_limit),
            RateLimitPolicy::per_hour(config.demo_rate_limit),
        )
    }

    /// Counts one request against `key`. Returns the remaining allowance, or
    /// the time until the window reopens.
    pub async fn check(&self, key: &str, policy: RateLimitPolicy) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
            window: policy.window,
        });

        if now.duration_since(entry.window_start) > entry.window {
            entry.count = 0;
            entry.window_start = now;
            entry.window = policy.window;
        }

        if entry.count >= policy.max_requests {
            let retry_after = entry
                .window
                .saturating_sub(now.duration_since(entry.window_start));
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(policy.max_requests - entry.count)
    }

    /// Drops entries whose window closed more than one window ago.
    pub async fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.window_start) < entry.window * 2);
        before - entries.len()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

pub fn spawn_rate_limit_cleanup(limiter: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let removed = limiter.cleanup().await;
            if removed > 0 {
                tracing::debug!(removed = removed, "Pruned rate limit entries");
            }
        }
    });
}

async fn enforce(
    state: &AppState,
    key: String,
    policy: RateLimitPolicy,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match state.rate_limiter.check(&key, policy).await {
        Ok(remaining) => {
            tracing::debug!(key = %key, remaining = remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                key = %key,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

/// Per IP and path, so login and register are limited separately.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("{}:{}", addr.ip(), req.uri().path());
    let policy = state.rate_limiter.auth;
    enforce(&state, key, policy, req, next).await
}

pub async fn rate_limit_demo(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("demo:{}", addr.ip());
    let policy = state.rate_limiter.demo;
    enforce(&state, key, policy, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimitState {
        RateLimitState::new(RateLimitPolicy::per_minute(5), RateLimitPolicy::per_hour(2))
    }

    #[tokio::test]
    async fn test_rate_limit_allows_under_limit() {
        let limiter = limiter();
        let policy = limiter.auth;

        for i in 0..policy.max_requests {
            let result = limiter.check("test_key", policy).await;
            assert!(result.is_ok(), "Request {} should be allowed", i + 1);
        }
    }

    #[tokio::test]
    async fn test_rate_limit_blocks_over_limit() {
        let limiter = limiter();
        let policy = limiter.auth;

        for _ in 0..policy.max_requests {
            let _ = limiter.check("test_key", policy).await;
        }

        let result = limiter.check("test_key", policy).await;
        assert!(result.is_err(), "Request over limit should be blocked");
    }

    #[tokio::test]
    async fn test_remaining_counts_down() {
        let limiter = limiter();
        let policy = limiter.demo;

        assert_eq!(limiter.check("demo:1.2.3.4", policy).await, Ok(1));
        assert_eq!(limiter.check("demo:1.2.3.4", policy).await, Ok(0));
        let retry = limiter.check("demo:1.2.3.4", policy).await.unwrap_err();
        assert!(retry <= Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_different_keys_have_separate_limits() {
        let limiter = limiter();
        let policy = limiter.auth;

        for _ in 0..policy.max_requests {
            let _ = limiter.check("key1", policy).await;
        }

        let result = limiter.check("key2", policy).await;
        assert!(result.is_ok(), "Different key should have separate limit");
    }

    #[tokio::test]
    async fn test_window_reopens_after_expiry() {
        let limiter = limiter();
        let policy = RateLimitPolicy {
            max_requests: 1,
            window: Duration::from_millis(20),
        };

        assert!(limiter.check("k", policy).await.is_ok());
        assert!(limiter.check("k", policy).await.is_err());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(limiter.check("k", policy).await.is_ok());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_live_entries() {
        let limiter = limiter();
        let _ = limiter.check("live", limiter.auth).await;
        let expired = RateLimitPolicy {
            max_requests: 1,
            window: Duration::from_millis(5),
        };
        let _ = limiter.check("stale", expired).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(limiter.cleanup().await, 1);
        assert_eq!(limiter.len().await, 1);
    }

    #[test]
    fn test_policy_from_config() {
        let limiter = RateLimitState::from_config(&Config::for_tests());
        assert_eq!(limiter.auth, RateLimitPolicy::per_minute(5));
        assert_eq!(limiter.demo, RateLimitPolicy::per_hour(10));
    }
}
