use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;

/// How many times a retryable failure is sent again, and how long to wait in between.
///
/// The default sends every request once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    /// Upper bound on the delay before jitter is applied.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped at
    /// `max_delay`, scaled by a jitter factor in `0.7..1.0`.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let mut rng = StdRng::from_entropy();
        let exp = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base
            .saturating_mul(exp)
            .min(self.max_delay)
            .mul_f64(rng.gen_range(0.7..1.0))
    }
}
