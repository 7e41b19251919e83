//! Error taxonomy for the command dispatch path.

use std::io;

use thiserror::Error;

use relay_plugins::PluginError;
use relay_protocol::{ProtocolError, StatusKind};

/// Failures surfaced while routing one command.
///
/// Every variant except [`DispatchError::Deliver`] maps to a status-coded
/// response and is fully recovered inside the router.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request bytes could not be decoded as a command envelope.
    #[error("malformed envelope: {message}")]
    MalformedEnvelope {
        /// Description of the decode failure.
        message: String,
        /// Underlying JSON error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request decoded but is missing a required field.
    #[error("invalid envelope: {message}")]
    InvalidEnvelope {
        /// Description of the schema violation.
        message: String,
    },

    /// No plugin is registered under the requested name.
    #[error("plugin '{name}' is not registered")]
    UnresolvedPlugin {
        /// Name that failed to resolve.
        name: String,
    },

    /// The resolved plugin failed while executing the command.
    #[error("plugin '{name}' invocation failed: {source}")]
    PluginInvocation {
        /// Identity of the failing plugin.
        name: String,
        /// Failure raised by the plugin.
        #[source]
        source: PluginError,
    },

    /// The response could not be delivered to the peer.
    #[error("failed to deliver response: {0}")]
    Deliver(#[from] io::Error),
}

impl DispatchError {
    /// Creates an unresolved-plugin error.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedPlugin { name: name.into() }
    }

    /// Creates a plugin-invocation error.
    pub fn invocation(name: impl Into<String>, source: PluginError) -> Self {
        Self::PluginInvocation {
            name: name.into(),
            source,
        }
    }

    /// Status reported to the peer for this failure.
    ///
    /// Delivery failures have no status: there is no channel left to
    /// report one on.
    #[must_use]
    pub fn status(&self) -> Option<StatusKind> {
        match self {
            Self::MalformedEnvelope { .. } | Self::InvalidEnvelope { .. } => {
                Some(StatusKind::InvalidJson)
            }
            Self::UnresolvedPlugin { .. } => Some(StatusKind::PluginNotFound),
            Self::PluginInvocation { .. } => Some(StatusKind::PluginErrorUnknown),
            Self::Deliver(_) => None,
        }
    }
}

impl From<ProtocolError> for DispatchError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::Malformed { message, source } => {
                Self::MalformedEnvelope { message, source }
            }
            ProtocolError::Invalid { message } => Self::InvalidEnvelope { message },
        }
    }
}
