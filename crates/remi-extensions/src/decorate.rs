//! Context decoration
//!
//! With the extension installed a plugin can call
//! [`DecorateExt::decorate`] to add a property to its own context and to
//! its target's root, so every later plugin on that target sees it too.
//! Options given to the extension are default decorations applied to every
//! context. Plugin decorations live only on the target they were made on.

use async_trait::async_trait;
use remi_core::Options;
use remi_engine::{Extension, Interceptor, Next, PluginContext, Props, Registration, Remi};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Default decorations configured on the extension
#[derive(Debug, Clone, Default)]
pub struct Decorations {
    defaults: Arc<Props>,
}

impl Decorations {
    pub fn new(defaults: Props) -> Self {
        Self {
            defaults: Arc::new(defaults),
        }
    }

    pub fn defaults(&self) -> &Props {
        &self.defaults
    }

    pub fn contains(&self, key: &str) -> bool {
        self.defaults.contains_key(key)
    }
}

/// Installs the decoration interceptor
#[derive(Debug, Clone, Copy, Default)]
pub struct DecorateExtension;

impl Extension for DecorateExtension {
    fn install(&self, remi: &mut Remi, options: &Options) {
        remi.hook(DecorateInterceptor {
            decorations: Decorations::new(options.clone()),
        });
    }
}

struct DecorateInterceptor {
    decorations: Decorations,
}

#[async_trait]
impl Interceptor for DecorateInterceptor {
    async fn intercept(
        &self,
        mut ctx: PluginContext,
        registration: Arc<Registration>,
        next: Next,
    ) -> anyhow::Result<()> {
        for (key, value) in self.decorations.defaults() {
            // a decoration made earlier on this target wins over the default
            if !ctx.props().contains_key(key) {
                ctx.set(key.clone(), value.clone());
            }
        }
        ctx.insert_extension(self.decorations.clone());
        next.run(ctx, registration).await
    }
}

/// Decoration methods available on a plugin context
pub trait DecorateExt {
    /// Add `key` to this context and to the root
    fn decorate(&mut self, key: impl Into<String>, value: impl Into<Value>) -> anyhow::Result<()>;

    /// Add every entry of `values` to this context and to the root
    fn decorate_all(&mut self, values: Props) -> anyhow::Result<()>;
}

impl DecorateExt for PluginContext {
    fn decorate(&mut self, key: impl Into<String>, value: impl Into<Value>) -> anyhow::Result<()> {
        let mut values = Props::new();
        values.insert(key.into(), value.into());
        self.decorate_all(values)
    }

    fn decorate_all(&mut self, values: Props) -> anyhow::Result<()> {
        if self.extension::<Decorations>().is_none() {
            anyhow::bail!("decorate extension is not installed");
        }

        for (key, value) in values {
            debug!(plugin = %self.plugin_name(), key = %key, "Decorating");
            self.root().set(key.clone(), value.clone());
            self.set(key, value);
        }
        Ok(())
    }
}
