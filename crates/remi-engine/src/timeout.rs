//! Per-plugin completion deadline
//!
//! The plugin runs on its own tokio task and the guard races that task
//! against the deadline. When the deadline wins the task is detached, not
//! aborted: the plugin keeps running and may still touch the target after
//! its registration has been reported as timed out. This bounds how long
//! `register` waits; it does not cancel plugin work.
//!
//! If the caller drops the future returned by [`TimeoutGuard::run`] before
//! either side wins, the task is aborted. A cancelled `register` releases
//! the target's sequence lock, and a retry must not overlap a leftover copy
//! of the same plugin.

use std::any::Any;
use std::future::Future;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinError};
use tracing::warn;

use crate::error::{RemiError, Result};

/// Races a plugin's completion against a deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutGuard {
    timeout: Duration,
}

impl TimeoutGuard {
    /// Guard with the given deadline; `Duration::ZERO` waits indefinitely
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Guard that waits indefinitely
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_enabled(&self) -> bool {
        !self.timeout.is_zero()
    }

    /// Run `work` for the plugin `name` and map its outcome
    pub async fn run<F>(&self, name: &str, work: F) -> Result<()>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handle = tokio::spawn(work);
        let abort = AbortOnDrop::new(handle.abort_handle());

        let joined = if self.is_enabled() {
            match tokio::time::timeout(self.timeout, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    abort.disarm();
                    warn!(
                        plugin = %name,
                        timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                        "Plugin did not complete in time; leaving it running detached"
                    );
                    return Err(RemiError::registration_timeout(name, self.timeout));
                }
            }
        } else {
            handle.await
        };

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(RemiError::registration_failure(name, err)),
            Err(join_err) => Err(RemiError::registration_failure(
                name,
                join_error_to_anyhow(join_err),
            )),
        }
    }
}

/// Aborts the plugin task unless disarmed first
struct AbortOnDrop {
    handle: Option<AbortHandle>,
}

impl AbortOnDrop {
    fn new(handle: AbortHandle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn disarm(mut self) {
        self.handle = None;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Default for TimeoutGuard {
    fn default() -> Self {
        Self::new(remi_core::DEFAULT_REGISTRATION_TIMEOUT)
    }
}

fn join_error_to_anyhow(err: JoinError) -> anyhow::Error {
    if err.is_panic() {
        anyhow::anyhow!("plugin panicked: {}", panic_message(err.into_panic()))
    } else {
        anyhow::anyhow!("plugin task was cancelled")
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
