//! Assertion helpers for plugin ordering and outcomes

#![allow(dead_code)]

use remi_engine::{RemiError, Target};

use super::mocks::InvocationTracker;

/// Assert that `first` was invoked before `second`
pub fn assert_runs_before(tracker: &InvocationTracker, first: &str, second: &str) {
    let calls = tracker.calls();
    let a = calls.iter().position(|c| c == first);
    let b = calls.iter().position(|c| c == second);
    match (a, b) {
        (Some(a), Some(b)) => assert!(
            a < b,
            "Expected '{}' to run before '{}', got {:?}",
            first, second, calls
        ),
        _ => panic!(
            "Expected both '{}' and '{}' to run, got {:?}",
            first, second, calls
        ),
    }
}

/// Assert the exact invocation order
pub fn assert_invocation_order(tracker: &InvocationTracker, expected: &[&str]) {
    assert_eq!(tracker.calls(), expected, "Unexpected invocation order");
}

/// Assert that no plugin body ran
pub fn assert_nothing_invoked(tracker: &InvocationTracker) {
    assert!(
        tracker.calls().is_empty(),
        "Expected no invocations, got {:?}",
        tracker.calls()
    );
}

/// Assert the registry contents, in completion order
pub fn assert_registered(target: &Target, expected: &[&str]) {
    assert_eq!(target.registered_names(), expected, "Unexpected registry contents");
}

/// Assert a `RegistrationFailure` for the named plugin
pub fn assert_failed_plugin(err: &RemiError, plugin: &str) {
    assert!(
        matches!(err, RemiError::RegistrationFailure { name, .. } if name == plugin),
        "Expected registration failure of '{}', got {:?}",
        plugin,
        err
    );
}
