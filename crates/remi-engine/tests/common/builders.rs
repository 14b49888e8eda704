//! Plugin builders for creating test fixtures

#![allow(dead_code)]

use remi_core::{options_from_value, Options, PluginAttributes};
use remi_engine::{Plugin, PluginDescriptor};
use serde_json::Value;
use std::time::Duration;

use super::constants::TEST_PLUGIN_VERSION;
use super::mocks::InvocationTracker;

/// What a test plugin does after recording its invocation
#[derive(Clone, Debug)]
pub enum Behavior {
    Succeed,
    Fail(String),
    /// Never completes
    Hang,
    /// Completes after a delay
    Delay(Duration),
    /// Panics inside the plugin body
    Panic,
}

/// Builder for test plugins
///
/// # Example
///
/// ```ignore
/// let plugin = PluginBuilder::new("a")
///     .depends_on("b")
///     .tracked(&tracker)
///     .build();
/// ```
pub struct PluginBuilder {
    attributes: PluginAttributes,
    behavior: Behavior,
    callback: bool,
    tracker: InvocationTracker,
    options: Option<Options>,
}

impl PluginBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            attributes: PluginAttributes::named(name).with_version(TEST_PLUGIN_VERSION),
            behavior: Behavior::Succeed,
            callback: false,
            tracker: InvocationTracker::new(),
            options: None,
        }
    }

    pub fn depends_on(mut self, name: &str) -> Self {
        self.attributes = self.attributes.with_dependency(name);
        self
    }

    pub fn runs_before(mut self, name: &str) -> Self {
        self.attributes = self.attributes.with_before(name);
        self
    }

    pub fn tracked(mut self, tracker: &InvocationTracker) -> Self {
        self.tracker = tracker.clone();
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.behavior = Behavior::Fail(message.to_string());
        self
    }

    pub fn hanging(mut self) -> Self {
        self.behavior = Behavior::Hang;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.behavior = Behavior::Delay(delay);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.behavior = Behavior::Panic;
        self
    }

    /// Use the completion-callback calling convention
    pub fn callback_style(mut self) -> Self {
        self.callback = true;
        self
    }

    /// Plugin-specific options, given as a JSON object
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options_from_value(options).unwrap());
        self
    }

    pub fn build(self) -> Plugin {
        let name = self.attributes.resolved_name().unwrap_or_default().to_string();
        let tracker = self.tracker;
        let behavior = self.behavior;

        if self.callback {
            return Plugin::from_callback(self.attributes, move |_ctx, opts, done| {
                tracker.record(&name);
                tracker.record_options(&name, &opts);
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    done.finish(run_behavior(behavior).await);
                });
            });
        }

        Plugin::from_async(self.attributes, move |_ctx, opts| {
            tracker.record(&name);
            tracker.record_options(&name, &opts);
            run_behavior(behavior.clone())
        })
    }

    /// Build as a descriptor, carrying options when set
    pub fn descriptor(self) -> PluginDescriptor {
        let options = self.options.clone();
        let plugin = self.build();
        match options {
            Some(options) => plugin.with_options(options),
            None => plugin.into(),
        }
    }
}

async fn run_behavior(behavior: Behavior) -> anyhow::Result<()> {
    match behavior {
        Behavior::Succeed => Ok(()),
        Behavior::Fail(message) => Err(anyhow::anyhow!(message)),
        Behavior::Hang => std::future::pending().await,
        Behavior::Delay(delay) => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
        Behavior::Panic => panic!("plugin blew up"),
    }
}

/// Independent plugins named after `names`, all tracked
pub fn independent_plugins(names: &[&str], tracker: &InvocationTracker) -> Vec<Plugin> {
    names
        .iter()
        .map(|name| PluginBuilder::new(name).tracked(tracker).build())
        .collect()
}
