// src/client/retry.rs — Bounded retry state machine with linear backoff
//
// Attempts are numbered 1..=max_attempts. After a retriable failure on
// attempt n (n < max) the dispatcher waits `base_delay * n` and tries again.
// Waiting goes through a `Sleeper` so tests can observe delays without a
// wall clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::RequestOutcome;

/// Base unit of the linear backoff.
pub const BASE_DELAY_MS: u64 = 1_000;

/// Suspends the current task. The only scheduler the dispatcher sees.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers every requested delay.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(duration);
    }
}

/// Where a logical request stands.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryState {
    /// About to issue attempt n.
    Attempting(u32),
    /// Attempt n failed and may be retried; back off before attempt n + 1.
    Waiting(u32),
    /// Final outcome, returned to the caller as-is.
    Done(RequestOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }

    /// Wait after failed attempt `attempt` (1-based): linear, not exponential.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Transition after attempt `attempt` produced `outcome`.
    pub fn after_attempt(&self, attempt: u32, outcome: RequestOutcome) -> RetryState {
        let retry = match &outcome {
            Ok(_) => false,
            Err(e) => e.is_retriable() && attempt < self.max_attempts,
        };
        if retry {
            RetryState::Waiting(attempt)
        } else {
            RetryState::Done(outcome)
        }
    }
}
