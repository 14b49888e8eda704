//! Per-plugin public namespaces
//!
//! Every plugin owns `plugins.<name>` on the root. With the extension
//! installed a plugin publishes values there through [`ExposeExt`], and
//! later plugins read them from their context's `plugins` property.

use async_trait::async_trait;
use remi_core::Options;
use remi_engine::{
    Extension, Interceptor, Next, PluginContext, Props, Registration, Remi, PLUGINS_KEY,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Installs the expose interceptor
#[derive(Debug, Clone, Copy, Default)]
pub struct ExposeExtension;

impl Extension for ExposeExtension {
    fn install(&self, remi: &mut Remi, _options: &Options) {
        remi.hook(ExposeInterceptor);
    }
}

/// Marks a context as allowed to expose, and under which name
#[derive(Debug, Clone)]
struct Exposer {
    plugin: String,
}

struct ExposeInterceptor;

#[async_trait]
impl Interceptor for ExposeInterceptor {
    async fn intercept(
        &self,
        mut ctx: PluginContext,
        registration: Arc<Registration>,
        next: Next,
    ) -> anyhow::Result<()> {
        ctx.insert_extension(Exposer {
            plugin: registration.name.clone(),
        });
        next.run(ctx, registration).await
    }
}

/// Expose methods available on a plugin context
pub trait ExposeExt {
    /// Publish `key` under this plugin's namespace
    fn expose(&mut self, key: impl Into<String>, value: impl Into<Value>) -> anyhow::Result<()>;

    /// Publish every entry of `values` under this plugin's namespace
    fn expose_all(&mut self, values: Props) -> anyhow::Result<()>;

    /// Namespace of `plugin` as currently seen by this context
    fn exposed(&self, plugin: &str) -> Option<&Value>;
}

impl ExposeExt for PluginContext {
    fn expose(&mut self, key: impl Into<String>, value: impl Into<Value>) -> anyhow::Result<()> {
        let mut values = Props::new();
        values.insert(key.into(), value.into());
        self.expose_all(values)
    }

    fn expose_all(&mut self, values: Props) -> anyhow::Result<()> {
        let plugin = self
            .extension::<Exposer>()
            .map(|exposer| exposer.plugin.clone())
            .ok_or_else(|| anyhow::anyhow!("expose extension is not installed"))?;

        debug!(plugin = %plugin, keys = values.len(), "Exposing plugin values");
        self.root()
            .update_plugin_namespace(&plugin, |namespace| namespace.extend(values));

        // keep this context's view of `plugins` in step with the root
        if let Some(plugins) = self.root().get(PLUGINS_KEY) {
            self.set(PLUGINS_KEY, plugins);
        }
        Ok(())
    }

    fn exposed(&self, plugin: &str) -> Option<&Value> {
        self.get(PLUGINS_KEY).and_then(|plugins| plugins.get(plugin))
    }
}
