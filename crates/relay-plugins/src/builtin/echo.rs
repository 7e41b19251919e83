//! Plugin reflecting its arguments back to the peer.

use std::collections::BTreeMap;

use relay_protocol::StatusKind;

use crate::capability::{Continuation, Plugin};
use crate::error::PluginError;

/// Identity the echo plugin is registered under.
pub const ECHO_ID: &str = "echo";

/// Reflects the command's argument map back as the response values.
///
/// Mostly useful for probing the dispatch path end to end.
#[derive(Debug, Default)]
pub struct EchoPlugin;

impl EchoPlugin {
    /// Builds the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for EchoPlugin {
    fn id(&self) -> &str {
        ECHO_ID
    }

    fn run(
        &mut self,
        continuation: Continuation<'_>,
        data: &BTreeMap<String, String>,
    ) -> Result<(), PluginError> {
        let values = serde_json::to_value(data)
            .map_err(|source| PluginError::execution_with_source(ECHO_ID, "arguments are not representable as JSON", source))?;
        continuation(StatusKind::Success, values);
        Ok(())
    }
}
