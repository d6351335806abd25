#![allow(missing_docs)]

mod common;

use bouncer::{CheckOptions, Policy, RateLimiters, Settings};
use common::{init_tracing, ManualClock, HOUR_MS, MINUTE_MS};

// 2026-01-01T00:00:00Z, an exact multiple of an hour
const START_MS: u64 = 1_767_225_600_000;

#[test]
fn it_locks_out_login_after_five_failures() {
    init_tracing();

    let clock = ManualClock::new(START_MS);
    let limiters = RateLimiters::builder().build_with_time_source(clock.clone());
    let email = "alice@example.com";

    for i in 0..5 {
        let result = limiters.check(Policy::Login, email, CheckOptions::failure());
        assert!(result.allowed, "Attempt {} should be allowed", i + 1);
        clock.advance(1_000);
    }

    let result = limiters.check(Policy::Login, email, CheckOptions::success());
    assert!(!result.allowed);
    assert!(result.is_blocked);
    assert_eq!(result.remaining_attempts, 0);
    // blocked at the 5th attempt, 1s ago
    assert_eq!(result.retry_after_secs, Some(30 * 60 - 1));

    clock.advance(30 * MINUTE_MS);

    let result = limiters.check(Policy::Login, email, CheckOptions::probe());
    assert!(result.allowed);
    assert!(!result.is_blocked);
    assert_eq!(result.remaining_attempts, 5);
}

#[test]
fn it_lets_admin_reset_a_password_reset_lockout() {
    init_tracing();

    let clock = ManualClock::new(START_MS);
    let limiters = RateLimiters::builder().build_with_time_source(clock.clone());
    let email = "bob@example.com";

    for _ in 0..3 {
        limiters.check(Policy::PasswordReset, email, CheckOptions::failure());
    }

    let result = limiters.check(Policy::PasswordReset, email, CheckOptions::probe());
    assert!(result.is_blocked);
    assert_eq!(result.retry_after_secs, Some(24 * 60 * 60));

    assert!(limiters.reset(Policy::PasswordReset, email));

    let result = limiters.check(Policy::PasswordReset, email, CheckOptions::probe());
    assert!(result.allowed);
    assert!(!result.is_blocked);
    assert_eq!(result.remaining_attempts, 3);
    assert_eq!(result.total_attempts, 0);
}

#[test]
fn it_throttles_api_without_blocking_successful_calls() {
    let clock = ManualClock::new(START_MS);
    let limiters = RateLimiters::builder().build_with_time_source(clock.clone());

    for _ in 0..100 {
        assert!(limiters.check(Policy::ApiGeneral, "token", CheckOptions::success()).allowed);
    }

    let result = limiters.check(Policy::ApiGeneral, "token", CheckOptions::success());
    assert!(!result.allowed);
    assert!(!result.is_blocked);
    assert_eq!(result.reset_at_ms, START_MS + 15 * MINUTE_MS);

    clock.set(START_MS + 15 * MINUTE_MS);

    let result = limiters.check(Policy::ApiGeneral, "token", CheckOptions::success());
    assert!(result.allowed);
    assert_eq!(result.total_attempts, 1);
}

#[test]
fn it_starts_a_new_register_window_on_the_hour() {
    let clock = ManualClock::new(START_MS + HOUR_MS - 1);
    let limiters = RateLimiters::builder().build_with_time_source(clock.clone());

    for _ in 0..2 {
        limiters.check(Policy::Register, "198.51.100.4", CheckOptions::success());
    }
    assert_eq!(limiters.check(Policy::Register, "198.51.100.4", CheckOptions::probe()).remaining_attempts, 1);

    clock.advance(2);

    let result = limiters.check(Policy::Register, "198.51.100.4", CheckOptions::probe());
    assert_eq!(result.remaining_attempts, 3);
    assert_eq!(result.reset_at_ms, START_MS + 2 * HOUR_MS);
}

#[test]
fn it_never_leaks_between_identifiers() {
    let clock = ManualClock::new(START_MS);
    let limiters = RateLimiters::builder().build_with_time_source(clock);

    for _ in 0..5 {
        limiters.check(Policy::Login, "a", CheckOptions::failure());
    }

    let result = limiters.check(Policy::Login, "b", CheckOptions::probe());
    assert!(result.allowed);
    assert!(!result.is_blocked);
    assert_eq!(result.remaining_attempts, 5);
}

#[test]
fn it_builds_from_json_settings() {
    let settings = Settings::from_json(r#"{
        "login": { "max_attempts": 2, "block_duration_ms": 60000, "strategy": "fixed_window" }
    }"#).unwrap();

    let clock = ManualClock::new(START_MS);
    let limiters = RateLimiters::builder()
        .with_settings(&settings)
        .unwrap()
        .build_with_time_source(clock);

    limiters.check(Policy::Login, "carol", CheckOptions::failure());
    let result = limiters.check(Policy::Login, "carol", CheckOptions::failure());

    assert!(result.is_blocked);
    assert_eq!(result.retry_after_secs, Some(60));
}
