//! Run configuration
//!
//! All timing knobs live here: the simulated call latency, the jitter
//! windows the unguarded aggregate opens inside its mutation sequence, the
//! optional join-barrier timeout, and the RNG seed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inclusive millisecond range delays are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower bound in milliseconds
    pub min_ms: u64,
    /// Upper bound in milliseconds
    pub max_ms: u64,
}

impl DelayRange {
    /// No delay at all
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a new range
    #[inline]
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draw one duration from the range.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }

    /// Whether every sample is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.min_ms == 0 && self.max_ms == 0
    }
}

/// Harness configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Latency range of the simulated slow call
    pub latency: DelayRange,
    /// Preemption window between the position read and the log append
    /// (unguarded variant only)
    pub jitter: DelayRange,
    /// Stall between the counter read and its write-back
    /// (unguarded variant only)
    pub counter_jitter: DelayRange,
    /// Optional cap on how long the runner waits at the join barrier
    pub join_timeout: Option<Duration>,
    /// Seed for the latency schedule and jitter sampling
    pub seed: u64,
}

impl RunConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With slow-call latency range
    #[inline]
    #[must_use]
    pub fn with_latency(mut self, latency: DelayRange) -> Self {
        self.latency = latency;
        self
    }

    /// With append jitter window
    #[inline]
    #[must_use]
    pub fn with_jitter(mut self, jitter: DelayRange) -> Self {
        self.jitter = jitter;
        self
    }

    /// With counter write-back stall
    #[inline]
    #[must_use]
    pub fn with_counter_jitter(mut self, counter_jitter: DelayRange) -> Self {
        self.counter_jitter = counter_jitter;
        self
    }

    /// With a join-barrier timeout
    #[inline]
    #[must_use]
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = Some(timeout);
        self
    }

    /// With RNG seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            // 2-4 seconds, the latency profile of the modeled remote API
            latency: DelayRange::new(2000, 4000),
            jitter: DelayRange::new(10, 50),
            counter_jitter: DelayRange::new(0, 2),
            join_timeout: None,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sample_stays_within_range() {
        let range = DelayRange::new(10, 50);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let d = range.sample(&mut rng);
            assert!(d >= Duration::from_millis(10));
            assert!(d <= Duration::from_millis(50));
        }
    }

    #[test]
    fn zero_range_always_samples_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(DelayRange::ZERO.sample(&mut rng), Duration::ZERO);
        assert!(DelayRange::ZERO.is_zero());
    }

    #[test]
    fn degenerate_range_samples_min() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = DelayRange::new(25, 25);
        assert_eq!(range.sample(&mut rng), Duration::from_millis(25));
    }

    #[test]
    fn config_builder() {
        let config = RunConfig::new()
            .with_latency(DelayRange::ZERO)
            .with_jitter(DelayRange::new(1, 2))
            .with_join_timeout(Duration::from_secs(30))
            .with_seed(7);
        assert!(config.latency.is_zero());
        assert_eq!(config.jitter, DelayRange::new(1, 2));
        assert_eq!(config.join_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.seed, 7);
    }
}
