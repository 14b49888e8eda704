//! Plugin bodies and raw descriptors
//!
//! A plugin body comes in two calling conventions: a closure returning a
//! future, or a closure handed a single-use [`Done`] callback. Both are
//! adapted onto [`RegisterFn`] so the rest of the engine only ever awaits
//! one future type.

use anyhow::anyhow;
use async_trait::async_trait;
use remi_core::{Options, PluginAttributes};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::context::PluginContext;

/// Initialization routine of a plugin
///
/// Closures are adapted through [`PluginBody::from_async`] and
/// [`PluginBody::from_callback`]; implement the trait directly when the
/// plugin carries its own state.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use remi_core::{Options, PluginAttributes};
/// use remi_engine::{Plugin, PluginBody, PluginContext, RegisterFn};
///
/// struct Database {
///     url: String,
/// }
///
/// #[async_trait]
/// impl RegisterFn for Database {
///     async fn register(&self, ctx: PluginContext, _options: Options) -> anyhow::Result<()> {
///         ctx.root().set("db_url", self.url.clone());
///         Ok(())
///     }
/// }
///
/// let plugin = Plugin::new(
///     PluginAttributes::named("db"),
///     PluginBody::from_handler(Database { url: "postgres://localhost".into() }),
/// );
/// ```
#[async_trait]
pub trait RegisterFn: Send + Sync {
    /// Run the plugin against its scoped context
    async fn register(&self, ctx: PluginContext, options: Options) -> anyhow::Result<()>;
}

/// Single-use completion callback for callback-style plugins
///
/// Consumed by whichever method signals completion, so a plugin cannot
/// complete twice. Dropping it without signalling fails the plugin.
#[derive(Debug)]
pub struct Done {
    tx: oneshot::Sender<anyhow::Result<()>>,
}

impl Done {
    fn channel() -> (Self, oneshot::Receiver<anyhow::Result<()>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Signal successful completion
    pub fn ok(self) {
        self.finish(Ok(()));
    }

    /// Signal failure
    pub fn fail(self, err: impl Into<anyhow::Error>) {
        self.finish(Err(err.into()));
    }

    /// Signal completion with an explicit result
    pub fn finish(self, result: anyhow::Result<()>) {
        // receiver is gone only if the guard already gave up on this plugin
        let _ = self.tx.send(result);
    }
}

struct AsyncBody<F>(F);

#[async_trait]
impl<F, Fut> RegisterFn for AsyncBody<F>
where
    F: Fn(PluginContext, Options) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn register(&self, ctx: PluginContext, options: Options) -> anyhow::Result<()> {
        (self.0)(ctx, options).await
    }
}

struct CallbackBody<F>(F);

#[async_trait]
impl<F> RegisterFn for CallbackBody<F>
where
    F: Fn(PluginContext, Options, Done) + Send + Sync,
{
    async fn register(&self, ctx: PluginContext, options: Options) -> anyhow::Result<()> {
        let (done, signal) = Done::channel();
        (self.0)(ctx, options, done);
        signal
            .await
            .unwrap_or_else(|_| Err(anyhow!("plugin dropped its completion callback without calling it")))
    }
}

/// Shared handle to a plugin's initialization routine
#[derive(Clone)]
pub struct PluginBody(Arc<dyn RegisterFn>);

impl PluginBody {
    /// Body from a closure returning a future
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(PluginContext, Options) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self(Arc::new(AsyncBody(f)))
    }

    /// Body from a closure that signals completion through [`Done`]
    pub fn from_callback<F>(f: F) -> Self
    where
        F: Fn(PluginContext, Options, Done) + Send + Sync + 'static,
    {
        Self(Arc::new(CallbackBody(f)))
    }

    /// Body from a custom [`RegisterFn`] implementation
    pub fn from_handler(handler: impl RegisterFn + 'static) -> Self {
        Self(Arc::new(handler))
    }

    pub async fn register(&self, ctx: PluginContext, options: Options) -> anyhow::Result<()> {
        self.0.register(ctx, options).await
    }
}

impl std::fmt::Debug for PluginBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PluginBody")
    }
}

/// A plugin body together with its attributes
#[derive(Debug, Clone)]
pub struct Plugin {
    pub attributes: PluginAttributes,
    pub body: PluginBody,
}

impl Plugin {
    pub fn new(attributes: PluginAttributes, body: PluginBody) -> Self {
        Self { attributes, body }
    }

    pub fn from_async<F, Fut>(attributes: PluginAttributes, f: F) -> Self
    where
        F: Fn(PluginContext, Options) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(attributes, PluginBody::from_async(f))
    }

    pub fn from_callback<F>(attributes: PluginAttributes, f: F) -> Self
    where
        F: Fn(PluginContext, Options, Done) + Send + Sync + 'static,
    {
        Self::new(attributes, PluginBody::from_callback(f))
    }

    /// Wrap with plugin-specific options
    pub fn with_options(self, options: Options) -> PluginDescriptor {
        PluginDescriptor::Object {
            register: Some(RegisterSource::Plugin(self)),
            options,
        }
    }
}

/// Exported surface of a plugin module, which may or may not provide a plugin
#[derive(Debug, Clone, Default)]
pub struct PluginModule {
    pub register: Option<Plugin>,
}

impl PluginModule {
    pub fn new(plugin: Plugin) -> Self {
        Self {
            register: Some(plugin),
        }
    }
}

/// What an object descriptor's `register` field points at
#[derive(Debug, Clone)]
pub enum RegisterSource {
    Plugin(Plugin),
    /// A required module wrapping the plugin
    Module(PluginModule),
}

/// Raw plugin descriptor as accepted by [`crate::Remi::register`]
#[derive(Debug, Clone)]
pub enum PluginDescriptor {
    /// A bare plugin with no options of its own
    Plugin(Plugin),
    /// `{ register, options }`
    Object {
        register: Option<RegisterSource>,
        options: Options,
    },
}

impl PluginDescriptor {
    /// Descriptor for a plugin exported by a module
    pub fn module(module: PluginModule, options: Options) -> Self {
        Self::Object {
            register: Some(RegisterSource::Module(module)),
            options,
        }
    }

    /// Resolve to the plugin and its own options, if a plugin is present
    pub(crate) fn into_parts(self) -> (Option<Plugin>, Options) {
        match self {
            Self::Plugin(plugin) => (Some(plugin), Options::new()),
            Self::Object { register, options } => {
                let plugin = match register {
                    Some(RegisterSource::Plugin(plugin)) => Some(plugin),
                    Some(RegisterSource::Module(module)) => module.register,
                    None => None,
                };
                (plugin, options)
            }
        }
    }
}

impl From<Plugin> for PluginDescriptor {
    fn from(plugin: Plugin) -> Self {
        Self::Plugin(plugin)
    }
}

/// Anything that can be submitted to `register`: one descriptor or many
pub trait IntoDescriptors {
    fn into_descriptors(self) -> Vec<PluginDescriptor>;
}

impl IntoDescriptors for PluginDescriptor {
    fn into_descriptors(self) -> Vec<PluginDescriptor> {
        vec![self]
    }
}

impl IntoDescriptors for Plugin {
    fn into_descriptors(self) -> Vec<PluginDescriptor> {
        vec![self.into()]
    }
}

impl<T: Into<PluginDescriptor>> IntoDescriptors for Vec<T> {
    fn into_descriptors(self) -> Vec<PluginDescriptor> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<PluginDescriptor>, const N: usize> IntoDescriptors for [T; N] {
    fn into_descriptors(self) -> Vec<PluginDescriptor> {
        self.into_iter().map(Into::into).collect()
    }
}
