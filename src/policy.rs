//! # Poll Policies
//!
//! Decide how many times to poll and how long to wait before each poll.
//!
//! The default is [`FixedDelay`]: ten attempts, ten seconds apart, no jitter
//! and no growth. [`ExponentialBackoff`] swaps in a growing, capped delay
//! without changing the job state machine.

use std::fmt::Debug;
use std::time::Duration;

/// Observed defaults of the PDF4me polling loop
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Poll budget and delay schedule
pub trait PollPolicy: Send + Sync + Debug {
    /// Total number of status GETs allowed
    fn max_attempts(&self) -> u32;

    /// Sleep before the given 1-based attempt
    fn delay_for(&self, attempt: u32) -> Duration;
}

/// Same delay before every attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl FixedDelay {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl PollPolicy for FixedDelay {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_for(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

/// `base * multiplier^(attempt - 1)`, capped at `max_delay`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl ExponentialBackoff {
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            multiplier,
            max_delay,
        }
    }
}

impl PollPolicy for ExponentialBackoff {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        // NaN and overflow collapse to the cap
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}
