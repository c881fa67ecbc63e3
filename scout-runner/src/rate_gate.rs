//! Minimum-interval gate for throttled collaborators.
//!
//! The gate is owned by the client it throttles. Callers block in
//! [`RateGate::wait`] until at least `min_interval` has passed since the
//! previous admitted call. Concurrent callers are serialized.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::provider::{DataError, SocialPost, SocialProvider};

#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Block until a call is allowed, then record it. Returns how long the
    /// caller waited.
    pub fn wait(&self) -> Duration {
        // poisoning leaves the timestamp valid
        let mut last = self
            .last_call
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let waited = match *last {
            Some(prev) => {
                let elapsed = prev.elapsed();
                if elapsed < self.min_interval {
                    let remaining = self.min_interval - elapsed;
                    std::thread::sleep(remaining);
                    remaining
                } else {
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        };

        *last = Some(Instant::now());
        waited
    }
}

/// A social provider throttled by its own gate.
pub struct RateLimitedSocial<P> {
    inner: P,
    gate: RateGate,
}

impl<P: SocialProvider> RateLimitedSocial<P> {
    pub fn new(inner: P, min_interval: Duration) -> Self {
        Self {
            inner,
            gate: RateGate::new(min_interval),
        }
    }
}

impl<P: SocialProvider> SocialProvider for RateLimitedSocial<P> {
    fn posts(&self, symbol: &str) -> Result<Vec<SocialPost>, DataError> {
        self.gate.wait();
        self.inner.posts(symbol)
    }
}
