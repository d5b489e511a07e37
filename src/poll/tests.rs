//! Tests for the backoff retry primitive.

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::{Attempt, BackoffPolicy, PollError, retry_with_backoff};

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("boom")]
struct Boom;

fn fast_policy() -> BackoffPolicy {
    BackoffPolicy {
        initial_interval: Duration::from_millis(1),
        multiplier: 1.0,
        max_interval: Duration::from_millis(1),
        max_elapsed: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn yields_value_once_ready() {
    let cancel = CancellationToken::new();
    let mut remaining = 3_u32;
    let result = retry_with_backoff(&fast_policy(), &cancel, async || {
        if remaining == 0 {
            Attempt::Ready("done")
        } else {
            remaining -= 1;
            Attempt::<&str, Boom>::NotYet
        }
    })
    .await;
    assert!(matches!(result, Ok("done")), "unexpected outcome: {result:?}");
}

#[tokio::test]
async fn fatal_error_stops_without_further_attempts() {
    let cancel = CancellationToken::new();
    let mut attempts = 0_u32;
    let result: Result<(), _> = retry_with_backoff(&fast_policy(), &cancel, async || {
        attempts += 1;
        Attempt::Fatal(Boom)
    })
    .await;
    assert_eq!(result, Err(PollError::Fatal(Boom)));
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn exhausted_budget_times_out() {
    let cancel = CancellationToken::new();
    let policy = BackoffPolicy {
        max_elapsed: Duration::ZERO,
        ..fast_policy()
    };
    let mut attempts = 0_u32;
    let result: Result<(), PollError<Boom>> = retry_with_backoff(&policy, &cancel, async || {
        attempts += 1;
        Attempt::NotYet
    })
    .await;
    assert_eq!(result, Err(PollError::TimedOut));
    assert_eq!(attempts, 1, "budget check happens after the attempt");
}

#[tokio::test]
async fn pre_canceled_token_skips_all_attempts() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut attempts = 0_u32;
    let result: Result<(), PollError<Boom>> =
        retry_with_backoff(&fast_policy(), &cancel, async || {
            attempts += 1;
            Attempt::NotYet
        })
        .await;
    assert_eq!(result, Err(PollError::Canceled));
    assert_eq!(attempts, 0);
}

#[tokio::test]
async fn cancellation_interrupts_the_sleep() {
    let cancel = CancellationToken::new();
    let policy = BackoffPolicy {
        initial_interval: Duration::from_secs(30),
        multiplier: 1.0,
        max_interval: Duration::from_secs(30),
        max_elapsed: Duration::from_secs(300),
    };
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        retry_with_backoff::<(), Boom, _>(&policy, &cancel, async || Attempt::NotYet),
    )
    .await;
    assert!(
        matches!(result, Ok(Err(PollError::Canceled))),
        "sleep should abort on cancellation: {result:?}"
    );
}

#[test]
fn intervals_grow_until_capped() {
    let policy = BackoffPolicy {
        initial_interval: Duration::from_secs(1),
        multiplier: 2.0,
        max_interval: Duration::from_secs(3),
        max_elapsed: Duration::from_secs(300),
    };
    let second = policy.next_interval(policy.initial_interval);
    assert_eq!(second, Duration::from_secs(2));
    let third = policy.next_interval(second);
    assert_eq!(third, Duration::from_secs(3));
    assert_eq!(policy.next_interval(third), Duration::from_secs(3));
}

#[test]
fn shrinking_multipliers_are_clamped() {
    let policy = BackoffPolicy {
        multiplier: 0.5,
        ..BackoffPolicy::default()
    };
    let next = policy.next_interval(Duration::from_secs(2));
    assert_eq!(next, Duration::from_secs(2));
}
