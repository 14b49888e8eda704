//! Per-plugin realm information

use async_trait::async_trait;
use remi_core::Options;
use remi_engine::{Extension, Interceptor, Next, PluginContext, Registration, Remi};
use serde::Serialize;
use std::sync::Arc;

/// Context property holding the serialized [`Realm`]
pub const REALM_KEY: &str = "realm";

/// Name and effective options of the plugin a context belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Realm {
    pub plugin: String,
    pub plugin_options: Options,
}

impl Realm {
    fn of(registration: &Registration) -> Self {
        Self {
            plugin: registration.name.clone(),
            plugin_options: registration.options.clone(),
        }
    }
}

/// Installs the realm interceptor
#[derive(Debug, Clone, Copy, Default)]
pub struct RealmExtension;

impl Extension for RealmExtension {
    fn install(&self, remi: &mut Remi, _options: &Options) {
        remi.hook(RealmInterceptor);
    }
}

struct RealmInterceptor;

#[async_trait]
impl Interceptor for RealmInterceptor {
    async fn intercept(
        &self,
        mut ctx: PluginContext,
        registration: Arc<Registration>,
        next: Next,
    ) -> anyhow::Result<()> {
        let realm = Realm::of(&registration);
        ctx.set(REALM_KEY, serde_json::to_value(&realm)?);
        ctx.insert_extension(realm);
        next.run(ctx, registration).await
    }
}

/// Realm accessor on a plugin context
pub trait RealmExt {
    fn realm(&self) -> Option<&Realm>;
}

impl RealmExt for PluginContext {
    fn realm(&self) -> Option<&Realm> {
        self.extension::<Realm>()
    }
}
