//! Retry and timeout policy for one submission

use std::time::Duration;

/// Policy knobs governing a single `submit` call
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitPolicy {
    /// Overall confirmation deadline, measured from the send
    pub timeout_ms: u64,

    /// Base delay between status polls
    pub poll_interval_ms: u64,

    /// Cap on the backed-off poll delay
    pub poll_max_interval_ms: u64,

    /// Reconnect attempts absorbed per submission before surfacing
    pub max_reconnect_attempts: u32,

    /// Jitter applied to poll delays (0.0 - 1.0)
    pub jitter_factor: f64,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            poll_interval_ms: 500,
            poll_max_interval_ms: 5_000,
            max_reconnect_attempts: 3,
            jitter_factor: 0.1,
        }
    }
}

impl SubmitPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Capped exponential backoff with jitter for the polling loop
///
/// Unbounded in attempts; the poll loop is bounded by the submission
/// deadline, not by a retry count.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    base_delay_ms: u64,
    max_delay_ms: u64,
    multiplier: f64,
    jitter_factor: f64,
}

impl BackoffSchedule {
    pub fn new(base_delay_ms: u64, max_delay_ms: u64, multiplier: f64, jitter_factor: f64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
            multiplier,
            jitter_factor,
        }
    }

    pub fn from_policy(policy: &SubmitPolicy) -> Self {
        Self::new(
            policy.poll_interval_ms,
            policy.poll_max_interval_ms,
            2.0,
            policy.jitter_factor,
        )
    }

    /// Delay before poll attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay_ms = self.base_delay_ms as f64 * self.multiplier.powi(attempt.min(32) as i32);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64);

        // Jitter spreads concurrent pollers apart
        let jitter = (rand::random::<f64>() - 0.5) * 2.0 * self.jitter_factor;
        let jittered = (delay_ms * (1.0 + jitter)).max(0.0) as u64;

        Duration::from_millis(jittered)
    }
}
