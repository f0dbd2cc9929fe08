//! Per-client token-bucket rate limiting
//!
//! Each client key gets its own bucket in a shared [`RateLimitStore`]. The
//! middleware forwards a request when the bucket has a token and answers 429
//! otherwise. Idle clients are swept by an [`EvictionTask`] owned by the
//! [`RateLimiter`].

mod bucket;
mod clock;
mod store;

pub use bucket::TokenBucket;
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{EvictionTask, RateLimitStore, StoreStats, IDLE_WINDOWS};

use crate::response::{codes, ErrorResponse, RequestMeta};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use config_rs::RateLimitSettings;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_RATE: f64 = 10.0;
pub const DEFAULT_BURST: u32 = 20;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MESSAGE: &str = "Rate limit exceeded. Too many requests.";

/// Error detail sent with every 429
const REJECTION_DETAILS: &str = "Rate limit exceeded";

/// Derives the client key from a request; an empty key disables limiting for it
pub type KeyFn = Arc<dyn Fn(&Request) -> String + Send + Sync>;

/// Requests for which this returns true bypass the limiter entirely
pub type SkipFn = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Limiter settings.
///
/// Setters ignore values that would make the limiter unusable (non-positive
/// or non-finite rate, zero burst, zero window, empty message), leaving the
/// previous value in place.
#[derive(Clone)]
pub struct RateLimitConfig {
    rate: f64,
    burst: u32,
    window: Duration,
    key_fn: KeyFn,
    skip_fn: SkipFn,
    message: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            burst: DEFAULT_BURST,
            window: DEFAULT_WINDOW,
            key_fn: Arc::new(client_ip),
            skip_fn: Arc::new(|_: &Request| false),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl fmt::Debug for RateLimitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitConfig")
            .field("rate", &self.rate)
            .field("burst", &self.burst)
            .field("window", &self.window)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl RateLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// General API traffic: 100 req/s, burst 200, `/health` exempt
    pub fn api() -> Self {
        Self::new()
            .rate(100.0)
            .burst(200)
            .skip_fn(|req: &Request| req.uri().path() == "/health")
    }

    /// Sensitive operations: 5 req/s, burst 10
    pub fn strict() -> Self {
        Self::new()
            .rate(5.0)
            .burst(10)
            .message("Rate limit exceeded for sensitive operation")
    }

    /// The API preset with rate, burst and window taken from `settings`
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::api()
            .rate(settings.rate)
            .burst(settings.burst)
            .window(settings.window)
    }

    pub fn rate(mut self, rate: f64) -> Self {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
        self
    }

    pub fn burst(mut self, burst: u32) -> Self {
        if burst > 0 {
            self.burst = burst;
        }
        self
    }

    pub fn window(mut self, window: Duration) -> Self {
        if !window.is_zero() {
            self.window = window;
        }
        self
    }

    pub fn key_fn<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&Request) -> String + Send + Sync + 'static,
    {
        self.key_fn = Arc::new(key_fn);
        self
    }

    pub fn skip_fn<F>(mut self, skip_fn: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.skip_fn = Arc::new(skip_fn);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.message = message;
        }
        self
    }

    pub fn rate_per_second(&self) -> f64 {
        self.rate
    }

    pub fn burst_size(&self) -> u32 {
        self.burst
    }

    pub fn window_duration(&self) -> Duration {
        self.window
    }

    pub fn rejection_message(&self) -> &str {
        &self.message
    }
}

/// Source IP of the connection, or an empty string when the server was not
/// started with connect info.
pub fn client_ip(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

/// Outcome of checking one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Forward,
    Reject { retry_after: Duration },
}

/// Middleware state: a config, the store it draws buckets from, and the
/// store's eviction task.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<RateLimitStore>,
    _eviction: EvictionTask,
}

impl RateLimiter {
    /// Build the limiter and start sweeping `store` every configured window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: RateLimitConfig, store: Arc<RateLimitStore>) -> Self {
        let eviction = store.spawn_eviction(config.window);
        tracing::info!(
            rate = config.rate,
            burst = config.burst,
            window_secs = config.window.as_secs(),
            "Rate limiter initialized"
        );

        Self {
            config,
            store,
            _eviction: eviction,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RateLimitStore> {
        &self.store
    }

    /// Key to limit this request under, or `None` when it bypasses the
    /// limiter (skipped, or no key could be derived).
    pub fn client_key(&self, req: &Request) -> Option<String> {
        if (self.config.skip_fn)(req) {
            return None;
        }

        let key = (self.config.key_fn)(req);
        if key.is_empty() {
            tracing::debug!(path = %req.uri().path(), "No client key, skipping rate limit");
            return None;
        }
        Some(key)
    }

    /// Take a token from the bucket for `key`
    pub async fn acquire(&self, key: &str) -> Decision {
        let bucket = self
            .store
            .bucket_for(key, self.config.rate, self.config.burst)
            .await;
        let now = self.store.now();

        if bucket.allow(now) {
            Decision::Forward
        } else {
            Decision::Reject {
                retry_after: bucket.retry_after(now),
            }
        }
    }

    fn reject(&self, meta: &RequestMeta, retry_after: Duration) -> Response {
        let body = ErrorResponse::new(codes::RATE_LIMIT_EXCEEDED, &self.config.message, meta)
            .with_details(REJECTION_DETAILS);
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

        // Whole seconds, rounded up, never zero
        let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        response
    }
}

/// Axum middleware; install with `middleware::from_fn_with_state`
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(key) = limiter.client_key(&req) else {
        return next.run(req).await;
    };

    match limiter.acquire(&key).await {
        Decision::Forward => next.run(req).await,
        Decision::Reject { retry_after } => {
            let meta = RequestMeta::of(&req);
            tracing::warn!(client_key = %key, path = %meta.path, "Rate limit exceeded");
            limiter.reject(&meta, retry_after)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    fn request_from(ip: [u8; 4], path: &str) -> Request {
        let mut req = http::Request::builder().uri(path).body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 40000))));
        req
    }

    fn limiter_with_clock(config: RateLimitConfig) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new();
        let store = Arc::new(RateLimitStore::with_clock(Arc::new(clock.clone())));
        (RateLimiter::new(config, store), clock)
    }

    async fn check(limiter: &RateLimiter, req: &Request) -> Decision {
        match limiter.client_key(req) {
            Some(key) => limiter.acquire(&key).await,
            None => Decision::Forward,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.rate_per_second(), 10.0);
        assert_eq!(config.burst_size(), 20);
        assert_eq!(config.window_duration(), Duration::from_secs(60));
        assert_eq!(config.rejection_message(), DEFAULT_MESSAGE);
    }

    #[test]
    fn test_config_ignores_unusable_values() {
        let config = RateLimitConfig::new()
            .rate(0.0)
            .rate(f64::NAN)
            .burst(0)
            .window(Duration::ZERO)
            .message("");
        assert_eq!(config.rate_per_second(), DEFAULT_RATE);
        assert_eq!(config.burst_size(), DEFAULT_BURST);
        assert_eq!(config.window_duration(), DEFAULT_WINDOW);
        assert_eq!(config.rejection_message(), DEFAULT_MESSAGE);
    }

    #[test]
    fn test_presets() {
        let api = RateLimitConfig::api();
        assert_eq!(api.rate_per_second(), 100.0);
        assert_eq!(api.burst_size(), 200);
        assert!((api.skip_fn)(&request_from([127, 0, 0, 1], "/health")));
        assert!(!(api.skip_fn)(&request_from([127, 0, 0, 1], "/api/v1/contatos")));

        let strict = RateLimitConfig::strict();
        assert_eq!(strict.rate_per_second(), 5.0);
        assert_eq!(strict.burst_size(), 10);
        assert_eq!(
            strict.rejection_message(),
            "Rate limit exceeded for sensitive operation"
        );
    }

    #[test]
    fn test_from_settings_overrides_api_preset() {
        let settings = RateLimitSettings {
            rate: 3.0,
            burst: 7,
            window: Duration::from_secs(10),
        };
        let config = RateLimitConfig::from_settings(&settings);
        assert_eq!(config.rate_per_second(), 3.0);
        assert_eq!(config.burst_size(), 7);
        assert_eq!(config.window_duration(), Duration::from_secs(10));
        assert!((config.skip_fn)(&request_from([127, 0, 0, 1], "/health")));
    }

    #[test]
    fn test_client_ip() {
        assert_eq!(client_ip(&request_from([192, 168, 0, 9], "/")), "192.168.0.9");

        let bare = http::Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(client_ip(&bare), "");
    }

    #[tokio::test]
    async fn test_forward_then_reject() {
        let (limiter, _clock) = limiter_with_clock(RateLimitConfig::new().rate(1.0).burst(1));
        let req = request_from([10, 0, 0, 1], "/api/v1/contatos");
        assert_eq!(limiter.config().burst_size(), 1);

        assert_eq!(check(&limiter, &req).await, Decision::Forward);
        assert_eq!(
            check(&limiter, &req).await,
            Decision::Reject {
                retry_after: Duration::from_secs(1)
            }
        );
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (limiter, _clock) = limiter_with_clock(RateLimitConfig::new().rate(1.0).burst(1));

        assert_eq!(check(&limiter, &request_from([10, 0, 0, 1], "/")).await, Decision::Forward);
        assert_eq!(check(&limiter, &request_from([10, 0, 0, 2], "/")).await, Decision::Forward);
        assert_eq!(limiter.store().len().await, 2);
    }

    #[tokio::test]
    async fn test_refill_after_time_passes() {
        let (limiter, clock) = limiter_with_clock(RateLimitConfig::new().rate(2.0).burst(1));
        let req = request_from([10, 0, 0, 1], "/");

        assert_eq!(check(&limiter, &req).await, Decision::Forward);
        assert!(matches!(check(&limiter, &req).await, Decision::Reject { .. }));

        clock.advance(Duration::from_millis(500));
        assert_eq!(check(&limiter, &req).await, Decision::Forward);
    }

    #[tokio::test]
    async fn test_skip_bypasses_store() {
        let config = RateLimitConfig::new().rate(1.0).burst(1).skip_fn(|_: &Request| true);
        let (limiter, _clock) = limiter_with_clock(config);
        let req = request_from([10, 0, 0, 1], "/");

        for _ in 0..5 {
            assert_eq!(check(&limiter, &req).await, Decision::Forward);
        }
        assert_eq!(limiter.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_empty_key_fails_open() {
        let (limiter, _clock) = limiter_with_clock(RateLimitConfig::new().rate(1.0).burst(1));
        let req = http::Request::builder().uri("/").body(Body::empty()).unwrap();

        for _ in 0..5 {
            assert_eq!(check(&limiter, &req).await, Decision::Forward);
        }
        assert_eq!(limiter.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_custom_key_fn() {
        let config = RateLimitConfig::new()
            .rate(1.0)
            .burst(1)
            .key_fn(|req: &Request| {
                req.headers()
                    .get("x-api-key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            });
        let (limiter, _clock) = limiter_with_clock(config);

        let keyed = || {
            http::Request::builder()
                .uri("/")
                .header("x-api-key", "abc")
                .body(Body::empty())
                .unwrap()
        };
        assert_eq!(check(&limiter, &keyed()).await, Decision::Forward);
        assert!(matches!(check(&limiter, &keyed()).await, Decision::Reject { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_bounded_by_burst() {
        let (limiter, _clock) = limiter_with_clock(RateLimitConfig::new().rate(1.0).burst(25));
        let limiter = Arc::new(limiter);

        let tasks: Vec<_> = (0..100)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire("10.0.0.1").await == Decision::Forward })
            })
            .collect();

        let mut forwarded = 0;
        for task in tasks {
            if task.await.unwrap() {
                forwarded += 1;
            }
        }
        // The manual clock never moves, so no refill happens
        assert_eq!(forwarded, 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_keys_bounded_by_refill() {
        let (limiter, clock) = limiter_with_clock(RateLimitConfig::new().rate(2.0).burst(3));
        let limiter = Arc::new(limiter);
        let keys: Vec<String> = (1..=5).map(|n| format!("10.0.0.{}", n)).collect();
        let mut forwarded = vec![0usize; keys.len()];

        // Waves of 20 requests per key, with 1.5s then 0.5s between them
        for pause in [None, Some(Duration::from_millis(1500)), Some(Duration::from_millis(500))] {
            if let Some(pause) = pause {
                clock.advance(pause);
            }

            let mut tasks = Vec::new();
            for (index, key) in keys.iter().enumerate() {
                for _ in 0..20 {
                    let limiter = Arc::clone(&limiter);
                    let key = key.clone();
                    tasks.push(tokio::spawn(async move {
                        (index, limiter.acquire(&key).await == Decision::Forward)
                    }));
                }
            }
            for task in tasks {
                let (index, allowed) = task.await.unwrap();
                if allowed {
                    forwarded[index] += 1;
                }
            }
        }

        // burst + floor(2s elapsed * 2/s)
        let bound = 3 + 4;
        for count in forwarded {
            assert!(count <= bound);
            assert_eq!(count, bound);
        }
    }

    #[tokio::test]
    async fn test_reject_response() {
        let (limiter, _clock) = limiter_with_clock(RateLimitConfig::new());
        let meta = RequestMeta {
            path: "/api/v1/contatos".to_string(),
            method: "POST".to_string(),
        };

        let response = limiter.reject(&meta, Duration::from_millis(100));
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }
}
