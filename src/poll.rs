//! Mutable bookkeeping for one poll loop.

use std::time::Duration;
use tokio::time::Instant;

/// Attempt counter and budget for one in-flight job.
///
/// Created when a job enters `Polling`, dropped when the loop exits. Not
/// `Clone`: each job owns exactly one.
#[derive(Debug)]
pub struct PollState {
    poll_url: String,
    attempts: u32,
    max_attempts: u32,
    started_at: Instant,
}

impl PollState {
    pub fn new(poll_url: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            poll_url: poll_url.into(),
            attempts: 0,
            max_attempts,
            started_at: Instant::now(),
        }
    }

    /// URL received in the `Location` header, never recomputed
    pub fn poll_url(&self) -> &str {
        &self.poll_url
    }

    /// GETs issued so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Count the next attempt, returning its 1-based number
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Time spent in the loop, measured on tokio's clock so paused tests see
    /// simulated time
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
