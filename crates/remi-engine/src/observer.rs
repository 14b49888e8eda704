//! Registration observation and logging
//!
//! [`SequenceObserver`] receives a callback at every plugin state change:
//! `Pending -> Running -> Completed | Failed`, plus one for plugins that
//! are skipped because the target already has them. [`TracingObserver`]
//! is the default and logs through `tracing`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::builder::Registration;
use crate::error::RemiError;

/// Observer trait for plugin registration events
///
/// Only the three per-plugin callbacks are required; `on_plan` and
/// `on_skipped` default to no-ops.
///
/// # Example
///
/// ```rust
/// use remi_engine::{Registration, RemiBuilder, RemiError, SequenceObserver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct FailureCounter(AtomicUsize);
///
/// impl SequenceObserver for FailureCounter {
///     fn on_plugin_start(&self, _registration: &Registration) {}
///
///     fn on_plugin_completed(&self, _registration: &Registration, _duration: Duration) {}
///
///     fn on_plugin_failed(&self, registration: &Registration, error: &RemiError) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///         eprintln!("{} failed: {error}", registration.name);
///     }
/// }
///
/// let remi = RemiBuilder::new().observer(FailureCounter::default()).build();
/// ```
pub trait SequenceObserver: Send + Sync {
    /// Called once per `register` call with the resolved order
    fn on_plan(&self, order: &[Arc<Registration>]) {
        let _ = order;
    }

    /// Called for a submitted plugin that is already registered
    fn on_skipped(&self, name: &str) {
        let _ = name;
    }

    /// Called right before the plugin's interceptor chain starts
    fn on_plugin_start(&self, registration: &Registration);

    /// Called after the plugin completed and was recorded
    fn on_plugin_completed(&self, registration: &Registration, duration: Duration);

    /// Called when the plugin failed or timed out; no further plugins run
    fn on_plugin_failed(&self, registration: &Registration, error: &RemiError);
}

/// Observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl SequenceObserver for NoOpObserver {
    fn on_plugin_start(&self, _registration: &Registration) {}

    fn on_plugin_completed(&self, _registration: &Registration, _duration: Duration) {}

    fn on_plugin_failed(&self, _registration: &Registration, _error: &RemiError) {}
}

/// Observer that logs registration events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_plan`, `on_skipped`, `on_plugin_start`: DEBUG
/// - `on_plugin_completed`: INFO
/// - `on_plugin_failed`: ERROR
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl SequenceObserver for TracingObserver {
    fn on_plan(&self, order: &[Arc<Registration>]) {
        tracing::debug!(
            plugins = order.len(),
            order = ?order.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "registration plan resolved"
        );
    }

    fn on_skipped(&self, name: &str) {
        tracing::debug!(plugin = %name, "already registered, skipping");
    }

    fn on_plugin_start(&self, registration: &Registration) {
        tracing::debug!(
            plugin = %registration.name,
            version = registration.version.as_deref().unwrap_or("-"),
            "registering plugin"
        );
    }

    fn on_plugin_completed(&self, registration: &Registration, duration: Duration) {
        tracing::info!(
            plugin = %registration.name,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "plugin registered"
        );
    }

    fn on_plugin_failed(&self, registration: &Registration, error: &RemiError) {
        tracing::error!(
            plugin = %registration.name,
            error = %error,
            "plugin registration failed"
        );
    }
}

/// Observer that collects counters and the event order
///
/// Useful for testing and metrics collection.
#[derive(Debug, Default)]
pub struct StatsObserver {
    /// Plugin start events
    pub starts: AtomicU32,
    /// Plugin completion events
    pub completions: AtomicU32,
    /// Plugin failure events
    pub failures: AtomicU32,
    /// Skipped plugin events
    pub skips: AtomicU32,
    events: Mutex<Vec<String>>,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn completions(&self) -> u32 {
        self.completions.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn skips(&self) -> u32 {
        self.skips.load(Ordering::SeqCst)
    }

    /// Events as `"<kind>:<plugin>"`, in the order they were observed
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn push(&self, kind: &str, name: &str) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(format!("{}:{}", kind, name));
    }
}

impl SequenceObserver for StatsObserver {
    fn on_plan(&self, order: &[Arc<Registration>]) {
        for registration in order {
            self.push("planned", &registration.name);
        }
    }

    fn on_skipped(&self, name: &str) {
        self.skips.fetch_add(1, Ordering::SeqCst);
        self.push("skipped", name);
    }

    fn on_plugin_start(&self, registration: &Registration) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.push("start", &registration.name);
    }

    fn on_plugin_completed(&self, registration: &Registration, _duration: Duration) {
        self.completions.fetch_add(1, Ordering::SeqCst);
        self.push("completed", &registration.name);
    }

    fn on_plugin_failed(&self, registration: &Registration, _error: &RemiError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        self.push("failed", &registration.name);
    }
}

/// Implement SequenceObserver for Arc<T> where T: SequenceObserver
impl<T: SequenceObserver + ?Sized> SequenceObserver for Arc<T> {
    fn on_plan(&self, order: &[Arc<Registration>]) {
        (**self).on_plan(order)
    }

    fn on_skipped(&self, name: &str) {
        (**self).on_skipped(name)
    }

    fn on_plugin_start(&self, registration: &Registration) {
        (**self).on_plugin_start(registration)
    }

    fn on_plugin_completed(&self, registration: &Registration, duration: Duration) {
        (**self).on_plugin_completed(registration, duration)
    }

    fn on_plugin_failed(&self, registration: &Registration, error: &RemiError) {
        (**self).on_plugin_failed(registration, error)
    }
}
