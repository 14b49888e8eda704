//! Stock extension integration tests
//!
//! Tests each extension installed on a real engine:
//! - decorate: context and root decoration
//! - expose: per-plugin namespaces
//! - realm: plugin name and options on the context

use remi_core::{options_from_value, PluginAttributes};
use remi_engine::{Plugin, PluginContext, RemiBuilder, Target};
use remi_extensions::{
    DecorateExt, DecorateExtension, ExposeExt, ExposeExtension, RealmExt, RealmExtension,
    REALM_KEY,
};
use serde_json::{json, Value};

fn plugin<F, Fut>(attributes: PluginAttributes, body: F) -> Plugin
where
    F: Fn(PluginContext, remi_core::Options) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Plugin::from_async(attributes, body)
}

fn options(value: Value) -> remi_core::Options {
    options_from_value(value).unwrap()
}

#[cfg(test)]
mod decorate {
    use super::*;

    #[tokio::test]
    async fn test_decoration_visible_locally_and_to_later_plugins() {
        let remi = RemiBuilder::new()
            .extension(DecorateExtension, Default::default())
            .build();
        let target = Target::new();
        let first = plugin(PluginAttributes::named("plugin1"), |mut ctx, _opts| async move {
            ctx.decorate("foo", 1)?;
            anyhow::ensure!(ctx.get("foo") == Some(&json!(1)), "not decorated locally");
            Ok(())
        });
        let second = plugin(
            PluginAttributes::named("plugin2").with_dependency("plugin1"),
            |ctx, _opts| async move {
                anyhow::ensure!(ctx.get("foo") == Some(&json!(1)), "decoration not shared");
                Ok(())
            },
        );

        remi.register(&target, vec![second, first]).await.unwrap();

        assert_eq!(target.get("foo"), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_decorate_with_multiple_properties() {
        let remi = RemiBuilder::new()
            .extension(DecorateExtension, Default::default())
            .build();
        let target = Target::new();
        let p = plugin(PluginAttributes::named("p"), |mut ctx, _opts| async move {
            ctx.decorate_all(options(json!({ "foo": 1, "bar": "x" })))?;
            anyhow::ensure!(ctx.get("bar") == Some(&json!("x")), "not decorated locally");
            Ok(())
        });

        remi.register(&target, p).await.unwrap();

        assert_eq!(target.get("foo"), Some(json!(1)));
        assert_eq!(target.get("bar"), Some(json!("x")));
    }

    #[tokio::test]
    async fn test_extension_options_are_initial_decorations() {
        let remi = RemiBuilder::new()
            .extension(DecorateExtension, options(json!({ "env": "test" })))
            .build();
        let p = plugin(PluginAttributes::named("p"), |ctx, _opts| async move {
            anyhow::ensure!(ctx.get("env") == Some(&json!("test")), "missing initial decoration");
            Ok(())
        });

        remi.register(&Target::new(), p).await.unwrap();
    }

    #[tokio::test]
    async fn test_decorate_without_extension_fails_plugin() {
        let p = plugin(PluginAttributes::named("p"), |mut ctx, _opts| async move {
            ctx.decorate("foo", 1)
        });

        let err = RemiBuilder::new()
            .build()
            .register(&Target::new(), p)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("decorate extension is not installed"));
    }

    #[tokio::test]
    async fn test_decorations_stay_on_their_target() {
        let remi = RemiBuilder::new()
            .extension(DecorateExtension, Default::default())
            .build();
        let one = Target::new();
        let two = Target::new();
        let a = plugin(PluginAttributes::named("a"), |mut ctx, _opts| async move {
            ctx.decorate("secret", "from-target-one")
        });
        let b = plugin(PluginAttributes::named("b"), |ctx, _opts| async move {
            anyhow::ensure!(ctx.get("secret").is_none(), "decoration leaked across targets");
            Ok(())
        });

        remi.register(&one, a).await.unwrap();
        remi.register(&two, b).await.unwrap();

        assert_eq!(one.get("secret"), Some(json!("from-target-one")));
        assert_eq!(two.get("secret"), None);
    }

    #[tokio::test]
    async fn test_target_decoration_overrides_default_for_later_calls() {
        let remi = RemiBuilder::new()
            .extension(DecorateExtension, options(json!({ "env": "default" })))
            .build();
        let target = Target::new();
        let first = plugin(PluginAttributes::named("first"), |mut ctx, _opts| async move {
            ctx.decorate("env", "custom")
        });
        let second = plugin(PluginAttributes::named("second"), |ctx, _opts| async move {
            anyhow::ensure!(ctx.get("env") == Some(&json!("custom")), "default won");
            Ok(())
        });

        remi.register(&target, first).await.unwrap();
        remi.register(&target, second).await.unwrap();

        let fresh = plugin(PluginAttributes::named("fresh"), |ctx, _opts| async move {
            anyhow::ensure!(ctx.get("env") == Some(&json!("default")), "missing default");
            Ok(())
        });
        remi.register(&Target::new(), fresh).await.unwrap();
    }
}

#[cfg(test)]
mod expose {
    use super::*;

    #[tokio::test]
    async fn test_expose_property() {
        let remi = RemiBuilder::new()
            .extension(ExposeExtension, Default::default())
            .build();
        let target = Target::new();
        let p = plugin(PluginAttributes::named("plugin"), |mut ctx, _opts| async move {
            ctx.expose("foo", 1)
        });

        remi.register(&target, p).await.unwrap();

        assert_eq!(target.plugin_namespace("plugin"), Some(json!({ "foo": 1 })));
    }

    #[tokio::test]
    async fn test_expose_object_and_read_from_later_plugin() {
        let remi = RemiBuilder::new()
            .extension(ExposeExtension, Default::default())
            .build();
        let target = Target::new();
        let producer = plugin(PluginAttributes::named("producer"), |mut ctx, _opts| async move {
            ctx.expose_all(options(json!({ "foo": 1, "bar": 3 })))?;
            anyhow::ensure!(
                ctx.exposed("producer") == Some(&json!({ "foo": 1, "bar": 3 })),
                "own namespace not refreshed"
            );
            Ok(())
        });
        let consumer = plugin(
            PluginAttributes::named("consumer").with_dependency("producer"),
            |ctx, _opts| async move {
                let bar = ctx.exposed("producer").and_then(|ns| ns.get("bar")).cloned();
                anyhow::ensure!(bar == Some(json!(3)), "exposed value not visible");
                Ok(())
            },
        );

        remi.register(&target, vec![consumer, producer]).await.unwrap();

        assert_eq!(
            target.plugin_namespace("producer"),
            Some(json!({ "foo": 1, "bar": 3 }))
        );
        assert_eq!(target.plugin_namespace("consumer"), Some(json!({})));
    }
}

#[cfg(test)]
mod realm {
    use super::*;

    #[tokio::test]
    async fn test_realm_carries_plugin_name_and_options() {
        let remi = RemiBuilder::new()
            .extension(RealmExtension, Default::default())
            .build();
        let p = plugin(PluginAttributes::named("plugin1"), |ctx, _opts| async move {
            let realm = ctx
                .realm()
                .ok_or_else(|| anyhow::anyhow!("realm missing"))?;
            anyhow::ensure!(realm.plugin == "plugin1", "wrong plugin");
            anyhow::ensure!(realm.plugin_options.get("foo") == Some(&json!(1)), "wrong options");
            anyhow::ensure!(
                ctx.get(REALM_KEY) == Some(&json!({ "plugin": "plugin1", "pluginOptions": { "foo": 1 } })),
                "realm property missing"
            );
            Ok(())
        });

        remi.register(&Target::new(), p.with_options(options(json!({ "foo": 1 }))))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_all_extensions_together() {
        let remi = RemiBuilder::new()
            .extension(DecorateExtension, Default::default())
            .extension(ExposeExtension, Default::default())
            .extension(RealmExtension, Default::default())
            .build();
        assert_eq!(remi.hook_count(), 3);

        let target = Target::new();
        let p = plugin(PluginAttributes::named("all"), |mut ctx, _opts| async move {
            let name = ctx
                .realm()
                .map(|realm| realm.plugin.clone())
                .unwrap_or_default();
            ctx.decorate("decorated_by", name.clone())?;
            ctx.expose("name", name)
        });

        remi.register(&target, p).await.unwrap();

        assert_eq!(target.get("decorated_by"), Some(json!("all")));
        assert_eq!(target.plugin_namespace("all"), Some(json!({ "name": "all" })));
    }
}
