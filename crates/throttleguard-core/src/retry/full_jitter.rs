//! Exponential backoff with full jitter.

use super::strategy::BackoffStrategy;
use crate::config::{
    DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRIES, RetryConfig,
};
use rand::Rng;
use std::time::Duration;

/// Exponential backoff where each wait is sampled uniformly from the window.
///
/// # Formula
///
/// For retry `n` (0-indexed, counting only transient failures):
/// ```text
/// window = min(initial_backoff * 2^n, max_backoff)
/// delay  = uniform(0, window)
/// ```
///
/// Sampling the whole window keeps independent callers that hit the same
/// rate limit from retrying in lockstep.
#[derive(Debug, Clone)]
pub struct FullJitterBackoff {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl FullJitterBackoff {
    /// Create a new builder.
    pub fn builder() -> FullJitterBackoffBuilder {
        FullJitterBackoffBuilder::default()
    }

    /// Backoff derived from a validated configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries(),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }
}

impl Default for FullJitterBackoff {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl From<RetryConfig> for FullJitterBackoff {
    fn from(config: RetryConfig) -> Self {
        Self::from_config(&config)
    }
}

impl BackoffStrategy for FullJitterBackoff {
    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn window(&self, attempt: u32) -> Duration {
        // Overflow of either the factor or the product means we are far past the cap.
        1u32.checked_shl(attempt)
            .and_then(|factor| self.initial_backoff.checked_mul(factor))
            .map_or(self.max_backoff, |window| window.min(self.max_backoff))
    }

    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }

        let window = self.window(attempt);
        let sampled = rand::thread_rng().gen_range(0.0..=window.as_secs_f64());
        Some(Duration::from_secs_f64(sampled).min(window))
    }
}

/// Builder for [`FullJitterBackoff`].
///
/// A `max_backoff` below `initial_backoff` is raised to `initial_backoff`;
/// use [`RetryConfig::builder`] when invalid bounds should be rejected.
#[derive(Debug, Default)]
pub struct FullJitterBackoffBuilder {
    max_retries: Option<u32>,
    initial_backoff: Option<Duration>,
    max_backoff: Option<Duration>,
}

impl FullJitterBackoffBuilder {
    /// Set the maximum number of retries.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the window before the first retry.
    ///
    /// Default: 1s
    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = Some(backoff);
        self
    }

    /// Set the cap on the window.
    ///
    /// Default: 20s
    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = Some(backoff);
        self
    }

    /// Build the backoff, using defaults for unset parameters.
    pub fn build(self) -> FullJitterBackoff {
        let initial_backoff = self.initial_backoff.unwrap_or(DEFAULT_INITIAL_BACKOFF);
        FullJitterBackoff {
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            initial_backoff,
            max_backoff: self
                .max_backoff
                .unwrap_or(DEFAULT_MAX_BACKOFF)
                .max(initial_backoff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn jitter(max_retries: u32, initial_ms: u64, max_ms: u64) -> FullJitterBackoff {
        FullJitterBackoff::builder()
            .max_retries(max_retries)
            .initial_backoff(Duration::from_millis(initial_ms))
            .max_backoff(Duration::from_millis(max_ms))
            .build()
    }

    #[test]
    fn test_window_doubles_until_cap() {
        let backoff = jitter(10, 1_000, 20_000);

        assert_eq!(backoff.window(0), Duration::from_secs(1));
        assert_eq!(backoff.window(1), Duration::from_secs(2));
        assert_eq!(backoff.window(2), Duration::from_secs(4));
        assert_eq!(backoff.window(3), Duration::from_secs(8));
        assert_eq!(backoff.window(4), Duration::from_secs(16));
        // 1s * 2^5 = 32s, clamped
        assert_eq!(backoff.window(5), Duration::from_secs(20));
        assert_eq!(backoff.window(6), Duration::from_secs(20));
    }

    #[test]
    fn test_window_survives_huge_attempts() {
        let backoff = jitter(u32::MAX, 1_000, 20_000);

        assert_eq!(backoff.window(31), Duration::from_secs(20));
        assert_eq!(backoff.window(32), Duration::from_secs(20));
        assert_eq!(backoff.window(u32::MAX), Duration::from_secs(20));
    }

    #[test]
    fn test_no_delay_outside_budget() {
        let backoff = jitter(3, 1_000, 20_000);

        assert!(backoff.next_delay(2).is_some());
        assert!(backoff.next_delay(3).is_none());
        assert!(backoff.next_delay(4).is_none());

        let none = jitter(0, 1_000, 20_000);
        assert!(none.next_delay(0).is_none());
    }

    #[test]
    fn test_delays_vary() {
        let backoff = jitter(5, 1_000, 20_000);

        let delays: Vec<_> = (0..20).map(|_| backoff.next_delay(4).unwrap()).collect();
        let all_same = delays.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same, "Full jitter should produce varying delays");
    }

    #[test]
    fn test_builder_defaults() {
        let backoff = FullJitterBackoff::builder().build();

        assert_eq!(backoff.max_retries, 3);
        assert_eq!(backoff.initial_backoff, Duration::from_secs(1));
        assert_eq!(backoff.max_backoff, Duration::from_secs(20));
    }

    #[test]
    fn test_builder_raises_inverted_cap() {
        let backoff = jitter(3, 5_000, 1_000);
        assert_eq!(backoff.max_backoff, Duration::from_secs(5));
        assert_eq!(backoff.window(0), Duration::from_secs(5));
    }

    #[test]
    fn test_from_config() {
        let config = RetryConfig::builder()
            .max_retries(7)
            .initial_backoff(Duration::from_millis(100))
            .max_backoff(Duration::from_secs(3))
            .build()
            .unwrap();
        let backoff = FullJitterBackoff::from(config);

        assert_eq!(backoff.max_retries(), 7);
        assert_eq!(backoff.window(0), Duration::from_millis(100));
        assert_eq!(backoff.window(10), Duration::from_secs(3));
    }

    proptest! {
        #[test]
        fn prop_delay_within_window(
            initial_ms in 1u64..5_000,
            extra_ms in 0u64..60_000,
            attempt in 0u32..64,
        ) {
            let backoff = jitter(u32::MAX, initial_ms, initial_ms + extra_ms);
            let window = backoff.window(attempt);
            let delay = backoff.next_delay(attempt).unwrap();

            prop_assert!(delay <= window);
            prop_assert!(window <= Duration::from_millis(initial_ms + extra_ms));
        }

        #[test]
        fn prop_window_non_decreasing(
            initial_ms in 1u64..5_000,
            extra_ms in 0u64..60_000,
            attempt in 0u32..63,
        ) {
            let backoff = jitter(u32::MAX, initial_ms, initial_ms + extra_ms);
            prop_assert!(backoff.window(attempt) <= backoff.window(attempt + 1));
        }
    }
}
