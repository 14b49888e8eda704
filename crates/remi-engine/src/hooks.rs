//! Interceptor chain around "register one plugin"
//!
//! Interceptors see each plugin's scoped context and registration before
//! the plugin body does, and may replace either before forwarding. Each
//! newly installed interceptor wraps the pipeline composed so far, so the
//! most recently installed one runs first and the plugin body runs last.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

use crate::builder::Registration;
use crate::context::PluginContext;

/// One stage of the chain
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use remi_engine::{Interceptor, Next, PluginContext, Registration, Remi};
/// use std::sync::Arc;
///
/// struct Stamp;
///
/// #[async_trait]
/// impl Interceptor for Stamp {
///     async fn intercept(
///         &self,
///         mut ctx: PluginContext,
///         registration: Arc<Registration>,
///         next: Next,
///     ) -> anyhow::Result<()> {
///         ctx.set("registered_by", "remi");
///         tracing::debug!(plugin = %registration.name, "stamped");
///         next.run(ctx, registration).await
///     }
/// }
///
/// let mut remi = Remi::new();
/// remi.hook(Stamp);
/// assert_eq!(remi.hook_count(), 1);
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Handle one plugin. Call `next.run(..)` to continue down the chain;
    /// returning without doing so completes the plugin without running its
    /// body.
    async fn intercept(
        &self,
        ctx: PluginContext,
        registration: Arc<Registration>,
        next: Next,
    ) -> anyhow::Result<()>;
}

/// Continuation to the rest of the chain.
///
/// `run` takes `self`, so an interceptor forwards at most once.
pub struct Next {
    stages: Arc<[Arc<dyn Interceptor>]>,
    position: usize,
}

impl Next {
    /// Continue with the next interceptor, or the plugin body at the end
    pub fn run(
        self,
        ctx: PluginContext,
        registration: Arc<Registration>,
    ) -> BoxFuture<'static, anyhow::Result<()>> {
        match self.stages.get(self.position).cloned() {
            Some(stage) => {
                let next = Next {
                    stages: self.stages,
                    position: self.position + 1,
                };
                Box::pin(async move { stage.intercept(ctx, registration, next).await })
            }
            None => Box::pin(async move {
                let options = registration.options.clone();
                registration.body.register(ctx, options).await
            }),
        }
    }

    /// Number of interceptors still ahead of the plugin body
    pub fn remaining(&self) -> usize {
        self.stages.len().saturating_sub(self.position)
    }
}

/// Interceptor built from a closure
pub struct InterceptorFn<F>(F);

/// Wrap a closure as an [`Interceptor`]
pub fn interceptor_fn<F, Fut>(f: F) -> InterceptorFn<F>
where
    F: Fn(PluginContext, Arc<Registration>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    InterceptorFn(f)
}

#[async_trait]
impl<F, Fut> Interceptor for InterceptorFn<F>
where
    F: Fn(PluginContext, Arc<Registration>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn intercept(
        &self,
        ctx: PluginContext,
        registration: Arc<Registration>,
        next: Next,
    ) -> anyhow::Result<()> {
        (self.0)(ctx, registration, next).await
    }
}

/// Installed interceptors, kept composed outermost first
#[derive(Clone)]
pub struct HookChain {
    stages: Arc<[Arc<dyn Interceptor>]>,
}

impl Default for HookChain {
    fn default() -> Self {
        Self::new()
    }
}

impl HookChain {
    pub fn new() -> Self {
        Self {
            stages: Arc::from(Vec::<Arc<dyn Interceptor>>::new()),
        }
    }

    /// Wrap the current pipeline with `interceptor`
    pub fn install(&mut self, interceptor: Arc<dyn Interceptor>) {
        let mut stages = Vec::with_capacity(self.stages.len() + 1);
        stages.push(interceptor);
        stages.extend(self.stages.iter().cloned());
        self.stages = stages.into();
    }

    /// Entry point of the composed pipeline
    pub fn entry(&self) -> Next {
        Next {
            stages: Arc::clone(&self.stages),
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
