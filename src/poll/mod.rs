//! Backoff-driven retry loop used by the readiness orchestrator.
//!
//! The loop is generic over the polled operation: nothing in here knows about
//! codespaces. Callers inject a [`BackoffPolicy`] so tests can swap in a
//! near-zero-delay policy without touching orchestration logic.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of a single poll attempt.
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// The awaited condition holds; stop polling and yield the value.
    Ready(T),
    /// Condition not met yet; sleep per policy and try again.
    NotYet,
    /// Unrecoverable failure; stop immediately without a backoff delay.
    Fatal(E),
}

/// Terminal failures of [`retry_with_backoff`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum PollError<E>
where
    E: std::error::Error + 'static,
{
    /// The operation reported an unrecoverable failure.
    #[error(transparent)]
    Fatal(E),
    /// The policy's wall-clock budget ran out while still not ready.
    #[error("retry budget exhausted")]
    TimedOut,
    /// The governing cancellation token fired.
    #[error("operation canceled")]
    Canceled,
}

/// Exponential backoff parameters for a poll loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the second attempt.
    pub initial_interval: Duration,
    /// Per-attempt growth factor applied to the delay.
    pub multiplier: f64,
    /// Upper bound on any single delay.
    pub max_interval: Duration,
    /// Wall-clock budget after which retrying stops unconditionally.
    pub max_elapsed: Duration,
}

/// Defaults tuned for a codespace cold start: roughly one-second probes that
/// stretch gently towards ten seconds, giving up after five minutes.
const DEFAULT_POLICY: BackoffPolicy = BackoffPolicy {
    initial_interval: Duration::from_secs(1),
    multiplier: 1.1,
    max_interval: Duration::from_secs(10),
    max_elapsed: Duration::from_secs(300),
};

impl Default for BackoffPolicy {
    fn default() -> Self {
        DEFAULT_POLICY
    }
}

impl BackoffPolicy {
    /// Computes the delay that follows `current`, capped at
    /// [`max_interval`](Self::max_interval).
    ///
    /// Multipliers below one are clamped so the delay never shrinks.
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        current
            .mul_f64(self.multiplier.max(1.0))
            .min(self.max_interval)
    }
}

/// Runs `operation` until it yields [`Attempt::Ready`], sleeping between
/// attempts per `policy`.
///
/// Attempts are strictly sequential. An [`Attempt::Fatal`] outcome stops the
/// loop at once; [`Attempt::NotYet`] continues until `policy.max_elapsed` is
/// exhausted, which yields [`PollError::TimedOut`]. The cancellation token is
/// observed before every attempt and during every sleep, so a cancellation
/// ends the loop within one sleep-or-check interval as
/// [`PollError::Canceled`], never as a timeout.
///
/// # Errors
///
/// Returns [`PollError`] when the operation fails permanently, the budget is
/// exhausted, or the token is canceled.
pub async fn retry_with_backoff<T, E, F>(
    policy: &BackoffPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, PollError<E>>
where
    E: std::error::Error + 'static,
    F: AsyncFnMut() -> Attempt<T, E>,
{
    let started = Instant::now();
    let mut interval = policy.initial_interval;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Canceled);
        }

        match operation().await {
            Attempt::Ready(value) => return Ok(value),
            Attempt::Fatal(err) => return Err(PollError::Fatal(err)),
            Attempt::NotYet => {}
        }

        if started.elapsed() >= policy.max_elapsed {
            return Err(PollError::TimedOut);
        }

        debug!(delay = ?interval, "not ready, backing off");
        tokio::select! {
            () = cancel.cancelled() => return Err(PollError::Canceled),
            () = sleep(interval) => {}
        }

        interval = policy.next_interval(interval);
    }
}

#[cfg(test)]
mod tests;
