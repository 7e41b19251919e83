//! The plugin capability implemented by every command handler.

use std::collections::BTreeMap;

use serde_json::Value;

use relay_protocol::StatusKind;

use crate::error::PluginError;

/// Callback a plugin invokes to report its outcome.
///
/// The dispatcher supplies the continuation and packages whatever the
/// plugin reports into the response envelope; the dispatcher never
/// synthesizes an outcome on a plugin's behalf.
pub type Continuation<'a> = &'a mut dyn FnMut(StatusKind, Value);

/// A named command handler.
///
/// Implementations take `&mut self` because instances are singletons: one
/// instance serves every command addressed to its identity within a run,
/// and state mutated by one command is visible to the next.
pub trait Plugin: Send {
    /// Unique identity this plugin is addressed by.
    fn id(&self) -> &str;

    /// Executes one command.
    ///
    /// `data` is the envelope's argument map, forwarded verbatim. The
    /// implementation must invoke `continuation` exactly once with its
    /// outcome before returning.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] for failures the plugin cannot express as
    /// a status outcome. The dispatcher reports such failures to the peer
    /// as an unknown plugin error and keeps the connection alive.
    fn run(
        &mut self,
        continuation: Continuation<'_>,
        data: &BTreeMap<String, String>,
    ) -> Result<(), PluginError>;
}
