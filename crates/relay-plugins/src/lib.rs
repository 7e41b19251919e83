//! Plugin framework for the relay dispatch daemon.
//!
//! A plugin is a named command handler satisfying the [`Plugin`] capability:
//! a unique string identity plus a `run` entry point that reports its
//! outcome through a continuation supplied by the dispatcher. Plugins are
//! registered once at startup in a [`PluginRegistry`] and instantiated
//! lazily: the first command naming a plugin constructs its singleton
//! instance, and every later command reuses it, so open resources and
//! counters persist across commands.
//!
//! Registration is an explicit static list: the daemon names each plugin
//! constructor when building the registry. There is no runtime discovery,
//! and identity collisions are rejected when the registry is built.

mod capability;
mod error;
mod registry;

pub mod builtin;

pub use self::capability::{Continuation, Plugin};
pub use self::error::PluginError;
pub use self::registry::{PluginConstructor, PluginRegistry, PluginRegistryBuilder};
