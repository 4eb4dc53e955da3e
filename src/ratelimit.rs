//! Token-bucket admission control shared by a gateway's public and private
//! call paths.

use std::time::Instant;

use parking_lot::Mutex;
use tokio::time::{sleep, Duration};

/// `(capacity, refill_rate)` pair for one limiter instance.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub capacity: f64,
    pub refill_rate: f64,
}

/// Per-venue default public/private rate limits, looked up by venue name.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeLimit {
    pub public_capacity: u32,
    pub public_rate: f64,
    pub private_capacity: u32,
    pub private_rate: f64,
}

pub fn default_limit(venue: &str) -> ExchangeLimit {
    match venue {
        "ex-a" => ExchangeLimit {
            public_capacity: 10,
            public_rate: 10.0,
            private_capacity: 8,
            private_rate: 8.0,
        },
        "ex-b" => ExchangeLimit {
            public_capacity: 20,
            public_rate: 20.0,
            private_capacity: 15,
            private_rate: 15.0,
        },
        _ => ExchangeLimit {
            public_capacity: 10,
            public_rate: 10.0,
            private_capacity: 10,
            private_rate: 10.0,
        },
    }
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Classic token bucket: `capacity` burst, `refill_rate` tokens/sec
/// long-run. `acquire` refills lazily under a short critical section, then
/// suspends (outside the lock) if there aren't enough tokens yet.
pub struct TokenBucket {
    config: RateLimitConfig,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        assert!(refill_rate > 0.0, "refill_rate must be positive");
        Self {
            config: RateLimitConfig {
                capacity: capacity as f64,
                refill_rate,
            },
            state: Mutex::new(BucketState {
                tokens: capacity as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Acquire `n` tokens, blocking the caller until they're available.
    pub async fn acquire(&self, n: f64) {
        if n <= 0.0 {
            return;
        }
        loop {
            let wait = {
                let mut state = self.state.lock();
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.last_refill = now;
                let refilled = elapsed * self.config.refill_rate;
                if refilled > 0.0 {
                    state.tokens = (state.tokens + refilled).min(self.config.capacity);
                }
                if state.tokens >= n {
                    state.tokens -= n;
                    None
                } else {
                    let deficit = n - state.tokens;
                    Some(deficit / self.config.refill_rate)
                }
            };
            match wait {
                None => return,
                Some(secs) => sleep(Duration::from_secs_f64(secs.max(0.001))).await,
            }
        }
    }
}
