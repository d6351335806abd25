#![allow(missing_docs)]

mod common;

use std::time::Duration;
use bouncer::{
    CheckOptions,
    CleanupTask,
    Policy,
    RateLimitConfig,
    RateLimiter,
    RateLimiters,
    Strategy
};
use common::{init_tracing, ManualClock};
use tokio_util::sync::CancellationToken;

fn limiter(clock: &ManualClock) -> RateLimiter<ManualClock> {
    RateLimiter::with_time_source(
        RateLimitConfig::new(
            3,
            Duration::from_secs(1),
            Duration::from_secs(5),
            Strategy::SlidingWindow),
        clock.clone())
}

#[test]
fn it_derives_interval_from_window() {
    let clock = ManualClock::new(0);
    let task = CleanupTask::new(limiter(&clock));

    assert_eq!(task.interval(), Duration::from_secs(1));
    assert_eq!(task.every(Duration::ZERO).interval(), Duration::from_millis(1));

    let limiters = RateLimiters::new();
    for policy in Policy::ALL {
        assert_eq!(limiters.config(policy).cleanup_interval(), Duration::from_secs(5 * 60));
    }
}

#[tokio::test]
async fn it_sweeps_outdated_state_in_background() {
    init_tracing();

    let clock = ManualClock::new(1_000_000);
    let limiter = limiter(&clock);

    for _ in 0..3 {
        limiter.check_limit("x", CheckOptions::failure());
    }
    limiter.check_limit("y", CheckOptions::success());
    assert_eq!(limiter.tracked_identifiers(), 2);

    let token = CancellationToken::new();
    let handle = CleanupTask::new(limiter.clone())
        .every(Duration::from_millis(10))
        .with_label("TEST")
        .spawn(token.clone());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(limiter.tracked_identifiers(), 2, "Nothing is outdated yet");

    // past window + block duration
    clock.advance(6_001);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while limiter.tracked_identifiers() > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(limiter.tracked_identifiers(), 0);

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("cleanup should stop once cancelled")
        .unwrap();
}

#[tokio::test]
async fn it_stops_every_policy_task_on_cancel() {
    let limiters = RateLimiters::new();
    let token = CancellationToken::new();

    let mut tasks = limiters.spawn_cleanup(token.clone());
    assert_eq!(tasks.len(), Policy::ALL.len());

    token.cancel();

    let joined = tokio::time::timeout(Duration::from_secs(1), async {
        let mut joined = 0;
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
            joined += 1;
        }
        joined
    })
    .await
    .unwrap();

    assert_eq!(joined, Policy::ALL.len());
}
