//! Sequential plugin execution
//!
//! Runs an already-ordered list of registrations one at a time. A plugin
//! is recorded on the target only once it completes; the first failure
//! stops the sequence and everything completed before it stays recorded.
//! Each plugin gets an empty `plugins.<name>` namespace on the target before
//! its context is created.

use std::sync::Arc;
use std::time::Instant;

use crate::builder::Registration;
use crate::context::PluginContext;
use crate::error::Result;
use crate::hooks::HookChain;
use crate::observer::SequenceObserver;
use crate::target::Target;
use crate::timeout::TimeoutGuard;

/// Drives ordered registrations through the interceptor chain
pub struct Sequencer<'a> {
    hooks: &'a HookChain,
    guard: TimeoutGuard,
    observer: &'a dyn SequenceObserver,
}

impl<'a> Sequencer<'a> {
    pub fn new(hooks: &'a HookChain, guard: TimeoutGuard, observer: &'a dyn SequenceObserver) -> Self {
        Self {
            hooks,
            guard,
            observer,
        }
    }

    /// Run `ordered` against `target`, stopping at the first failure
    pub async fn sequence(&self, target: &Target, ordered: Vec<Arc<Registration>>) -> Result<()> {
        for registration in ordered {
            self.run_one(target, registration).await?;
        }
        Ok(())
    }

    async fn run_one(&self, target: &Target, registration: Arc<Registration>) -> Result<()> {
        target.update_plugin_namespace(&registration.name, |_| ());
        let ctx = PluginContext::new(target, &registration.name);
        self.observer.on_plugin_start(&registration);

        let started = Instant::now();
        let work = self.hooks.entry().run(ctx, Arc::clone(&registration));

        match self.guard.run(&registration.name, work).await {
            Ok(()) => {
                target.record(Arc::clone(&registration));
                self.observer
                    .on_plugin_completed(&registration, started.elapsed());
                Ok(())
            }
            Err(err) => {
                self.observer.on_plugin_failed(&registration, &err);
                Err(err)
            }
        }
    }
}
