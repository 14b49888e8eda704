//! The demo hub: a target plus two plugins
//!
//! `foo` stores a greeting on the hub's root. `bar` depends on `foo` and
//! repeats the greeting from its own scoped context `sayTimes` times.

use remi_core::{options_from_value, PluginAttributes};
use remi_engine::{IntoDescriptors, Plugin, PluginDescriptor, Remi, Target};
use serde_json::json;
use tracing::debug;

/// Root property written by `foo`
pub const FOO_SAYS: &str = "fooSays";

/// Root property collecting every line `bar` printed
pub const BAR_SAID: &str = "barSaid";

/// A registration target with its own engine
pub struct Hub {
    remi: Remi,
    target: Target,
}

impl Hub {
    pub fn new(remi: Remi) -> Self {
        Self {
            remi,
            target: Target::new(),
        }
    }

    pub async fn register(&self, plugins: impl IntoDescriptors) -> remi_engine::Result<()> {
        self.register_with(plugins, Default::default()).await
    }

    pub async fn register_with(
        &self,
        plugins: impl IntoDescriptors,
        shared: remi_core::Options,
    ) -> remi_engine::Result<()> {
        self.remi.register_with(&self.target, plugins, shared).await
    }

    pub fn target(&self) -> &Target {
        &self.target
    }
}

pub fn foo() -> Plugin {
    Plugin::from_callback(
        PluginAttributes::named("foo").with_version("0.0.0"),
        |ctx, _opts, done| {
            ctx.root().set(FOO_SAYS, "Hello world!");
            done.ok();
        },
    )
}

pub fn bar() -> Plugin {
    Plugin::from_async(
        PluginAttributes::named("bar")
            .with_version("0.0.0")
            .with_dependency("foo"),
        |ctx, opts| async move {
            let times = opts.get("sayTimes").and_then(|v| v.as_u64()).unwrap_or(1);
            let said = ctx
                .get(FOO_SAYS)
                .and_then(|v| v.as_str())
                .unwrap_or("nothing");
            debug!(times, "bar is repeating foo");

            let lines = sayings(said, times);
            for line in &lines {
                println!("{}", line);
            }
            ctx.root().set(BAR_SAID, lines);
            Ok(())
        },
    )
}

/// The hub's plugin batch, `bar` listed first as in the classic demo
pub fn demo_plugins(say_times: u64) -> anyhow::Result<Vec<PluginDescriptor>> {
    let bar_options = options_from_value(json!({ "sayTimes": say_times }))?;
    Ok(vec![bar().with_options(bar_options), foo().into()])
}

fn sayings(said: &str, times: u64) -> Vec<String> {
    (0..times).map(|_| format!("Foo says: {}", said)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sayings() {
        assert_eq!(sayings("hi", 2), vec!["Foo says: hi", "Foo says: hi"]);
        assert!(sayings("hi", 0).is_empty());
    }

    #[tokio::test]
    async fn test_bar_hears_foo_even_when_listed_first() {
        let hub = Hub::new(Remi::new());

        hub.register(demo_plugins(3).unwrap()).await.unwrap();

        assert_eq!(hub.target().registered_names(), vec!["foo", "bar"]);
        assert_eq!(hub.target().get(FOO_SAYS), Some(json!("Hello world!")));
        assert_eq!(
            hub.target().get(BAR_SAID),
            Some(json!([
                "Foo says: Hello world!",
                "Foo says: Hello world!",
                "Foo says: Hello world!"
            ]))
        );
    }

    #[tokio::test]
    async fn test_registering_again_is_a_no_op() {
        let hub = Hub::new(Remi::new());

        hub.register(demo_plugins(1).unwrap()).await.unwrap();
        hub.target().set(BAR_SAID, json!([]));
        hub.register(demo_plugins(1).unwrap()).await.unwrap();

        assert_eq!(hub.target().get(BAR_SAID), Some(json!([])));
    }
}
