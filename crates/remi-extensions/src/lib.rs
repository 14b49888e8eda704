//! # remi-extensions
//!
//! Stock extensions for remi, each built only on the interceptor chain:
//! - [`DecorateExtension`]: properties added to a plugin's context and the root
//! - [`ExposeExtension`]: a public `plugins.<name>` namespace per plugin
//! - [`RealmExtension`]: the plugin's own name and options on its context

pub mod decorate;
pub mod expose;
pub mod realm;

pub use decorate::{DecorateExt, DecorateExtension, Decorations};
pub use expose::{ExposeExt, ExposeExtension};
pub use realm::{Realm, RealmExt, RealmExtension, REALM_KEY};
