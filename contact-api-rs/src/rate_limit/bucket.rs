//! Token bucket

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket with continuous refill.
///
/// Starts full. `allow` takes the internal lock, so a single bucket can be
/// shared between concurrent requests for the same client.
#[derive(Debug)]
pub struct TokenBucket {
    rate: f64,
    burst: u32,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn new(rate: f64, burst: u32, now: Instant) -> Self {
        Self {
            rate,
            burst,
            state: Mutex::new(BucketState {
                tokens: f64::from(burst),
                last_refill: now,
            }),
        }
    }

    /// Refill for the time elapsed since the last call, then take one token
    /// if there is one.
    pub fn allow(&self, now: Instant) -> bool {
        let mut state = self.lock();
        self.refill(&mut state, now);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens currently available, after refilling up to `now`
    pub fn available(&self, now: Instant) -> f64 {
        let mut state = self.lock();
        self.refill(&mut state, now);
        state.tokens
    }

    /// Time until the next token is available
    pub fn retry_after(&self, now: Instant) -> Duration {
        let mut state = self.lock();
        self.refill(&mut state, now);

        let missing = 1.0 - state.tokens;
        if missing <= 0.0 || self.rate <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(missing / self.rate)
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        // A clock that jumped backwards refills nothing.
        let elapsed = now.saturating_duration_since(state.last_refill);
        if elapsed.is_zero() {
            return;
        }

        let refilled = state.tokens + elapsed.as_secs_f64() * self.rate;
        state.tokens = refilled.min(f64::from(self.burst));
        state.last_refill = now;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
