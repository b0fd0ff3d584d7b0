//! Bounded polling with backoff, timeout and cancellation.
//!
//! The mirror node indexes events asynchronously; a fixed sleep before the
//! first query is a flakiness magnet. `poll_until` keeps re-running a probe
//! with growing delays until it yields a value, the deadline passes, or the
//! caller cancels.

use anyhow::Result;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct PollConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
    pub timeout_ms: u64,
    pub jitter: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 10000,
            exponential_base: 2.0,
            timeout_ms: 30000,
            jitter: true,
        }
    }
}

impl PollConfig {
    pub fn new(base_delay_ms: u64, timeout_ms: u64) -> Self {
        Self {
            base_delay_ms,
            timeout_ms,
            ..Default::default()
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let delay_ms = self.base_delay_ms as f64 * self.exponential_base.powi(attempt as i32);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64);

        let delay_ms = if self.jitter {
            delay_ms * rand::thread_rng().gen_range(0.5..=1.5)
        } else {
            delay_ms
        };

        Duration::from_millis(delay_ms as u64)
    }
}

/// Outcome of a bounded poll. Timing out is a normal result, not an error.
#[derive(Debug)]
pub enum PollOutcome<T> {
    Found(T),
    TimedOut,
    Cancelled,
}

impl<T> PollOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            PollOutcome::Found(v) => Some(v),
            _ => None,
        }
    }
}

/// Repeatedly runs `probe` until it returns `Some`, the timeout elapses, or
/// `token` is cancelled. A probe error is logged and treated like an empty
/// probe; the poll itself never fails.
pub async fn poll_until<T, F, Fut>(
    config: PollConfig,
    operation_name: &str,
    token: &CancellationToken,
    probe: F,
) -> PollOutcome<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(config.timeout_ms);

    for attempt in 0.. {
        if token.is_cancelled() {
            debug!("{} poll cancelled on attempt {}", operation_name, attempt + 1);
            return PollOutcome::Cancelled;
        }

        match probe().await {
            Ok(Some(value)) => {
                debug!("{} found on attempt {}", operation_name, attempt + 1);
                return PollOutcome::Found(value);
            }
            Ok(None) => {
                debug!("{} not ready (attempt {})", operation_name, attempt + 1);
            }
            Err(e) => {
                debug!("{} probe failed (attempt {}): {}", operation_name, attempt + 1, e);
            }
        }

        let delay = config.delay_for(attempt);
        let now = tokio::time::Instant::now();
        if now + delay >= deadline {
            debug!("{} timed out after {} attempts", operation_name, attempt + 1);
            return PollOutcome::TimedOut;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = token.cancelled() => return PollOutcome::Cancelled,
        }
    }

    unreachable!()
}
