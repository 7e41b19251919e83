//! Typed errors raised while decoding command envelopes.

use thiserror::Error;

/// Errors surfaced while turning raw request bytes into an envelope.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Payload could not be decoded as a JSON command envelope.
    #[error("malformed envelope: {message}")]
    Malformed {
        /// Description of the decode failure.
        message: String,
        /// Underlying JSON error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Payload decoded but violates the envelope schema.
    #[error("invalid envelope: {message}")]
    Invalid {
        /// Description of the schema violation.
        message: String,
    },
}

impl ProtocolError {
    /// Creates a malformed-envelope error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a malformed-envelope error from a JSON decode failure.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::Malformed {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates an invalid-envelope error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
