//! Per-client bucket store and its eviction task

use super::bucket::TokenBucket;
use super::clock::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Idle clients are evicted after this many windows
pub const IDLE_WINDOWS: u32 = 3;

#[derive(Debug)]
struct RateLimitClient {
    bucket: Arc<TokenBucket>,
    last_seen: Instant,
}

#[derive(Debug, Default)]
struct StoreInner {
    clients: HashMap<String, RateLimitClient>,
    last_sweep: Option<DateTime<Utc>>,
}

/// Snapshot of the store
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub active_clients: usize,
    pub timestamp: DateTime<Utc>,
    pub last_sweep: Option<DateTime<Utc>>,
}

/// Map of client key to token bucket.
///
/// Lookups and sweeps share one async lock; the bucket itself is handed out as
/// an `Arc` so the token check happens after the lock is released.
#[derive(Debug)]
pub struct RateLimitStore {
    inner: Mutex<StoreInner>,
    clock: Arc<dyn Clock>,
}

impl Default for RateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            clock,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Bucket for `key`, created full on first sight. Marks the client as seen.
    pub async fn bucket_for(&self, key: &str, rate: f64, burst: u32) -> Arc<TokenBucket> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().await;

        let client = inner
            .clients
            .entry(key.to_string())
            .or_insert_with(|| {
                tracing::debug!(client_key = %key, "New rate limit client");
                RateLimitClient {
                    bucket: Arc::new(TokenBucket::new(rate, burst, now)),
                    last_seen: now,
                }
            });
        client.last_seen = now;

        Arc::clone(&client.bucket)
    }

    /// Drop every client not seen for `max_idle` or longer. Returns how many
    /// were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = self.clock.now();
        let mut inner = self.inner.lock().await;

        let before = inner.clients.len();
        inner
            .clients
            .retain(|_, client| now.saturating_duration_since(client.last_seen) < max_idle);
        inner.last_sweep = Some(Utc::now());

        before - inner.clients.len()
    }

    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.lock().await;
        StoreStats {
            active_clients: inner.clients.len(),
            timestamp: Utc::now(),
            last_sweep: inner.last_sweep,
        }
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clients.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.clients.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Start sweeping this store every `window`, evicting clients idle for
    /// [`IDLE_WINDOWS`] windows.
    ///
    /// The task only holds a weak reference and stops once the store is gone,
    /// or when the returned handle is dropped.
    pub fn spawn_eviction(self: &Arc<Self>, window: Duration) -> EvictionTask {
        let store = Arc::downgrade(self);
        let first_sweep = tokio::time::Instant::now() + window;
        let handle = tokio::spawn(eviction_loop(store, first_sweep, window));
        EvictionTask { handle }
    }
}

async fn eviction_loop(
    store: Weak<RateLimitStore>,
    first_sweep: tokio::time::Instant,
    window: Duration,
) {
    let max_idle = window * IDLE_WINDOWS;
    let mut ticker = tokio::time::interval_at(first_sweep, window);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(live) = store.upgrade() else {
            tracing::debug!("Rate limit store dropped, stopping eviction");
            break;
        };

        let evicted = live.evict_idle(max_idle).await;
        if evicted > 0 {
            let active_clients = live.len().await;
            tracing::debug!(evicted, active_clients, "Evicted idle rate limit clients");
        }
    }
}

/// Handle to a running eviction loop; aborts the loop when dropped
#[derive(Debug)]
pub struct EvictionTask {
    handle: JoinHandle<()>,
}

impl EvictionTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for EvictionTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
