//! Domain errors raised by plugin registration and execution.

use thiserror::Error;

/// Errors arising from plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Two registrations declared the same plugin identity.
    #[error("plugin '{id}' is already registered")]
    DuplicateId {
        /// Identity that collided.
        id: String,
    },

    /// The plugin raised a failure while executing a command.
    #[error("plugin '{name}' failed: {message}")]
    Execution {
        /// Identity of the failing plugin.
        name: String,
        /// Human-readable failure description.
        message: String,
        /// Underlying error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PluginError {
    /// Creates a duplicate-identity error.
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Creates an execution failure without an underlying source.
    pub fn execution(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates an execution failure wrapping an underlying error.
    pub fn execution_with_source(
        name: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Execution {
            name: name.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Short label naming this failure's kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. } => "duplicate_id",
            Self::Execution { .. } => "execution",
        }
    }
}
