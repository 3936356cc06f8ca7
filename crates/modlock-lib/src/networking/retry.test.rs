use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

#[test]
fn test_delays_increase_linearly() {
    let policy = RetryPolicy::default();

    assert_eq!(policy.delay_before(1), Duration::ZERO);
    assert_eq!(policy.delay_before(2), Duration::from_millis(500));
    assert_eq!(policy.delay_before(3), Duration::from_secs(1));
    assert_eq!(policy.total_delay(), Duration::from_millis(1500));
}

#[test]
fn test_zero_attempts_clamped_to_one() {
    let policy = RetryPolicy::new(0, DEFAULT_UNIT);
    assert_eq!(policy.attempts(), 1);
    assert_eq!(policy.total_delay(), Duration::ZERO);
}

#[tokio::test]
async fn test_all_attempts_fail() {
    let policy = RetryPolicy::new(3, Duration::from_millis(40));
    let calls = Arc::new(AtomicU32::new(0));

    let started = Instant::now();
    let result: Result<(), _> = policy
        .run("always failing", |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("connection refused")
            }
        })
        .await;
    let elapsed = started.elapsed();

    let exhausted = result.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(exhausted.attempts, 3);
    assert_eq!(exhausted.last_error, "connection refused");
    // 0 + 20ms + 40ms of waiting, and nothing after the final failure
    assert!(elapsed >= Duration::from_millis(60));
    assert!(elapsed < Duration::from_millis(60 + 500));
}

#[tokio::test]
async fn test_success_stops_retrying() {
    let policy = RetryPolicy::new(5, Duration::from_millis(1));
    let calls = Arc::new(AtomicU32::new(0));

    let value = policy
        .run("flaky", |attempt| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 { Err("timeout") } else { Ok(attempt) }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_exhausted_display_includes_attempts() {
    let exhausted = RetryExhausted {
        attempts: 3,
        last_error: "HTTP 503",
    };
    assert_eq!(exhausted.to_string(), "gave up after 3 attempt(s): HTTP 503");
}
