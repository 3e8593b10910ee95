//! One retry policy object shared by everything that talks to the network,
//! instead of per-call-site sleep loops.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            multiplier: 1.8,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based; attempt 0 is the first
    /// try and gets no delay).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.powi(attempt as i32 - 1);
        let delay = self.base_delay.mul_f64(factor.max(0.0));
        delay.min(self.max_delay)
    }

    /// `delay_for` plus up to 250ms of jitter, so parallel workers do not
    /// retry in lockstep.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let delay = self.delay_for(attempt);
        if delay.is_zero() {
            return delay;
        }
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..250));
        (delay + jitter).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_non_decreasing_and_capped() {
        let policy = RetryPolicy::default();
        let mut previous = Duration::ZERO;
        for attempt in 0..12 {
            let delay = policy.delay_for(attempt);
            assert!(delay >= previous, "attempt {} went backwards", attempt);
            assert!(delay <= policy.max_delay);
            previous = delay;
        }
    }

    #[test]
    fn test_first_attempt_is_immediate() {
        assert_eq!(RetryPolicy::default().delay_for(0), Duration::ZERO);
        assert_eq!(RetryPolicy::default().jittered_delay(0), Duration::ZERO);
    }

    #[test]
    fn test_base_and_growth() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        // capped
        assert_eq!(policy.delay_for(8), Duration::from_secs(1));
    }

    #[test]
    fn test_jitter_stays_capped() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(900),
            multiplier: 10.0,
            max_delay: Duration::from_secs(1),
        };
        for _ in 0..50 {
            assert!(policy.jittered_delay(3) <= policy.max_delay);
        }
    }
}
