//! Engine facade
//!
//! [`Remi`] owns the engine configuration (main plugin, deadline, core
//! plugins), the interceptor chain and the observer. A single engine can
//! register onto any number of targets; everything a target needs to stay
//! idempotent lives on the target itself.

use remi_core::{EngineConfig, Options};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::builder::build_batch;
use crate::error::Result;
use crate::graph::DependencyResolver;
use crate::hooks::{HookChain, Interceptor};
use crate::observer::{SequenceObserver, TracingObserver};
use crate::plugin::{IntoDescriptors, PluginDescriptor};
use crate::sequencer::Sequencer;
use crate::target::Target;
use crate::timeout::TimeoutGuard;

/// Engine-level add-on, installed once when the engine is built
pub trait Extension: Send + Sync {
    /// Install into `remi`, usually by adding interceptors
    fn install(&self, remi: &mut Remi, options: &Options);
}

impl<F> Extension for F
where
    F: Fn(&mut Remi, &Options) + Send + Sync,
{
    fn install(&self, remi: &mut Remi, options: &Options) {
        self(remi, options)
    }
}

/// Builder for [`Remi`]
///
/// # Example
///
/// ```rust
/// use remi_engine::RemiBuilder;
/// use std::time::Duration;
///
/// let remi = RemiBuilder::new()
///     .main("app")
///     .registration_timeout(Duration::from_secs(2))
///     .build();
/// assert_eq!(remi.main(), Some("app"));
/// ```
pub struct RemiBuilder {
    main: Option<String>,
    timeout: Duration,
    core_plugins: Vec<PluginDescriptor>,
    extensions: Vec<(Box<dyn Extension>, Options)>,
    observer: Arc<dyn SequenceObserver>,
}

impl Default for RemiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RemiBuilder {
    pub fn new() -> Self {
        Self {
            main: None,
            timeout: remi_core::DEFAULT_REGISTRATION_TIMEOUT,
            core_plugins: Vec::new(),
            extensions: Vec::new(),
            observer: Arc::new(TracingObserver::new()),
        }
    }

    /// Builder seeded with the main plugin and deadline of a loaded config
    pub fn from_config(config: &EngineConfig) -> Self {
        let builder = Self::new().registration_timeout(config.registration_timeout());
        match config.main() {
            Some(main) => builder.main(main),
            None => builder,
        }
    }

    /// Plugin that must run first in every batch it is part of
    pub fn main(mut self, name: impl Into<String>) -> Self {
        self.main = Some(name.into());
        self
    }

    /// Per-plugin completion deadline; `Duration::ZERO` waits indefinitely
    pub fn registration_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Plugin prepended to every `register` call
    pub fn core_plugin(mut self, plugin: impl Into<PluginDescriptor>) -> Self {
        self.core_plugins.push(plugin.into());
        self
    }

    pub fn core_plugins(mut self, plugins: impl IntoDescriptors) -> Self {
        self.core_plugins.extend(plugins.into_descriptors());
        self
    }

    /// Extension installed at build time, after those added before it
    pub fn extension(mut self, extension: impl Extension + 'static, options: Options) -> Self {
        self.extensions.push((Box::new(extension), options));
        self
    }

    /// Replace the default [`TracingObserver`]
    pub fn observer(mut self, observer: impl SequenceObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn build(self) -> Remi {
        let mut remi = Remi {
            main: self.main,
            guard: TimeoutGuard::new(self.timeout),
            core_plugins: self.core_plugins,
            hooks: HookChain::new(),
            observer: self.observer,
        };

        for (extension, options) in &self.extensions {
            extension.install(&mut remi, options);
        }
        debug!(
            extensions = self.extensions.len(),
            interceptors = remi.hooks.len(),
            "Engine built"
        );

        remi
    }
}

/// Plugin registration engine
pub struct Remi {
    main: Option<String>,
    guard: TimeoutGuard,
    core_plugins: Vec<PluginDescriptor>,
    hooks: HookChain,
    observer: Arc<dyn SequenceObserver>,
}

impl Default for Remi {
    fn default() -> Self {
        Self::new()
    }
}

impl Remi {
    /// Engine with default settings: no main plugin, 10s deadline
    pub fn new() -> Self {
        RemiBuilder::new().build()
    }

    pub fn builder() -> RemiBuilder {
        RemiBuilder::new()
    }

    pub fn main(&self) -> Option<&str> {
        self.main.as_deref()
    }

    pub fn registration_timeout(&self) -> Duration {
        self.guard.timeout()
    }

    /// Number of installed interceptors
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Install an interceptor around every plugin registration.
    ///
    /// The most recently installed interceptor runs first.
    pub fn hook(&mut self, interceptor: impl Interceptor) -> &mut Self {
        self.hooks.install(Arc::new(interceptor));
        self
    }

    /// Install several interceptors, in iteration order
    pub fn hooks<I>(&mut self, interceptors: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Interceptor>>,
    {
        for interceptor in interceptors {
            self.hooks.install(interceptor);
        }
        self
    }

    /// Register `plugins` onto `target`
    pub async fn register(&self, target: &Target, plugins: impl IntoDescriptors) -> Result<()> {
        self.register_with(target, plugins, Options::new()).await
    }

    /// Register `plugins` onto `target` with options shared by every plugin.
    ///
    /// Shared options win over each plugin's own options. Plugins already
    /// registered on `target` are skipped; the rest run one at a time in
    /// dependency order. Resolution errors are returned before any plugin
    /// runs; the first plugin failure stops the sequence.
    pub async fn register_with(
        &self,
        target: &Target,
        plugins: impl IntoDescriptors,
        shared: Options,
    ) -> Result<()> {
        let mut descriptors = self.core_plugins.clone();
        descriptors.extend(plugins.into_descriptors());

        let _sequence = target.lock_sequence().await;

        let batch = build_batch(descriptors, &shared)?;
        let registered: HashSet<String> = target.registered_names().into_iter().collect();

        let mut fresh = Vec::with_capacity(batch.len());
        for registration in batch {
            if registered.contains(&registration.name) {
                self.observer.on_skipped(&registration.name);
            } else {
                fresh.push(Arc::new(registration));
            }
        }

        let order = DependencyResolver::new(&registered)
            .with_main(self.main.as_deref())
            .resolve(&fresh)?;
        self.observer.on_plan(&order);

        if order.is_empty() {
            debug!("Nothing to register");
            return Ok(());
        }

        let count = order.len();
        Sequencer::new(&self.hooks, self.guard, self.observer.as_ref())
            .sequence(target, order)
            .await?;

        info!(plugins = count, "Registered plugins");
        Ok(())
    }
}

impl std::fmt::Debug for Remi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remi")
            .field("main", &self.main)
            .field("timeout", &self.guard.timeout())
            .field("core_plugins", &self.core_plugins.len())
            .field("interceptors", &self.hooks.len())
            .finish()
    }
}
