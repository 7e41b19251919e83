//! The dispatcher's own plugin identity.
//!
//! The dispatcher answers commands addressed to `server` itself. It is
//! registered as an already-active instance: the daemon is necessarily
//! running before any command can arrive, so there is nothing to construct
//! lazily.

use std::collections::BTreeMap;

use tracing::{debug, info};

use relay_plugins::{Continuation, Plugin, PluginError};
use relay_protocol::{DISPATCHER_ID, StatusKind, empty_values};

use crate::transport::QuitHandle;

use super::DISPATCH_TARGET;

/// Plugin handling commands addressed to the dispatcher itself.
///
/// `quit` is the only supported command: it reports success and then asks
/// the transport to end its listen cycle. This is the one sanctioned way
/// to unwind the listen loop.
#[derive(Debug)]
pub struct ServerPlugin {
    quit: QuitHandle,
}

impl ServerPlugin {
    /// Builds the plugin around the transport's quit handle.
    #[must_use]
    pub fn new(quit: QuitHandle) -> Self {
        Self { quit }
    }
}

impl Plugin for ServerPlugin {
    fn id(&self) -> &str {
        DISPATCHER_ID
    }

    fn run(
        &mut self,
        continuation: Continuation<'_>,
        data: &BTreeMap<String, String>,
    ) -> Result<(), PluginError> {
        match data.get("command").map(String::as_str) {
            None => continuation(StatusKind::UnspecifiedCommand, empty_values()),
            Some("quit") => {
                continuation(StatusKind::Success, empty_values());
                info!(
                    target: DISPATCH_TARGET,
                    "quit command accepted, ending listen cycle"
                );
                self.quit.request_quit();
            }
            Some(other) => {
                debug!(
                    target: DISPATCH_TARGET,
                    command = other,
                    "unsupported server command"
                );
                continuation(StatusKind::UnsupportedCommand, empty_values());
            }
        }
        Ok(())
    }
}
