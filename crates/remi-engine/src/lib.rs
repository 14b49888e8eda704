//! # remi-engine
//!
//! Dependency-ordered plugin registration:
//! - Descriptor normalization into [`Registration`]s
//! - Dependency and `before` resolution with an optional main plugin
//! - An interceptor chain wrapping every plugin registration
//! - Sequential execution with a per-plugin deadline
//! - An idempotent registry kept on each [`Target`]
//!
//! # Example
//!
//! ```rust,no_run
//! use remi_core::PluginAttributes;
//! use remi_engine::{Plugin, Remi, Target};
//!
//! # async fn run() -> remi_engine::Result<()> {
//! let greeter = Plugin::from_async(PluginAttributes::named("greeter"), |ctx, _opts| async move {
//!     ctx.root().set("greeting", "hello");
//!     Ok(())
//! });
//!
//! let target = Target::new();
//! Remi::new().register(&target, greeter).await?;
//! assert!(target.is_registered("greeter"));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod context;
pub mod engine;
pub mod error;
pub mod graph;
pub mod hooks;
pub mod observer;
pub mod plugin;
pub mod registry;
pub mod sequencer;
pub mod target;
pub mod timeout;

pub use builder::{build_batch, Registration};
pub use context::{Extensions, PluginContext};
pub use engine::{Extension, Remi, RemiBuilder};
pub use error::{RemiError, Result};
pub use graph::DependencyResolver;
pub use hooks::{interceptor_fn, HookChain, Interceptor, InterceptorFn, Next};
pub use observer::{NoOpObserver, SequenceObserver, StatsObserver, TracingObserver};
pub use plugin::{
    Done, IntoDescriptors, Plugin, PluginBody, PluginDescriptor, PluginModule, RegisterFn,
    RegisterSource,
};
pub use registry::Registry;
pub use target::{Props, Target, PLUGINS_KEY};
pub use timeout::TimeoutGuard;
