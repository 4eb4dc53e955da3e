//! Trips after `failure_threshold` consecutive failures and stays open for
//! `cool_down`; a single success resets the counter.

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub cool_down: std::time::Duration,
}

struct State {
    failures: u32,
    open_until: Option<Instant>,
}

pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State {
                failures: 0,
                open_until: None,
            }),
        }
    }

    pub fn allow(&self) -> bool {
        let mut state = self.state.lock();
        let now = Instant::now();
        if let Some(open_until) = state.open_until {
            if now < open_until {
                return false;
            }
            state.failures = 0;
            state.open_until = None;
        }
        true
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        state.failures = 0;
        state.open_until = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.failures += 1;
        if state.failures >= self.config.failure_threshold {
            state.open_until = Some(Instant::now() + self.config.cool_down);
            warn!(cool_down = ?self.config.cool_down, "circuit breaker tripped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 3,
            cool_down: std::time::Duration::from_millis(50),
        }
    }

    #[test]
    fn stays_closed_under_threshold() {
        let breaker = CircuitBreaker::new(config());
        breaker.record_failure();
        breaker.record_failure();
        assert!(breaker.allow());
    }

    #[test]
    fn trips_at_threshold_and_blocks() {
        let breaker = CircuitBreaker::new(config());
        for _ in 0..3 {
            breaker.record_failure();
        }
        assert!(!breaker.allow());
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new(config());
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert!(breaker.allow());
    }

    #[tokio::test]
    async fn reopens_after_cool_down() {
        let breaker = CircuitBreaker::new(config());
        for _ in 0..3 {
            breaker.record_failure();
        }
        assert!(!breaker.allow());
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;
        assert!(breaker.allow());
    }
}
