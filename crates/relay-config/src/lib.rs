//! Declarative configuration shared by the relay binaries.
//!
//! The daemon's configuration surface is deliberately small: a socket
//! endpoint to listen on, the transport collaborator to bind, and the
//! logging knobs. Values resolve from built-in defaults with command-line
//! overrides applied by the daemon's CLI layer.

mod defaults;
mod logging;
mod socket;
mod transport;

use serde::{Deserialize, Serialize};

pub use self::defaults::{DEFAULT_TCP_PORT, default_log_filter, default_socket_endpoint};
pub use self::logging::{LogFormat, LogFormatParseError};
pub use self::socket::{SocketEndpoint, SocketParseError, SocketPreparationError};
pub use self::transport::{TransportKind, TransportKindParseError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Endpoint the socket transport binds.
    pub listen: SocketEndpoint,
    /// Transport collaborator selected at launch.
    pub transport: TransportKind,
    /// Tracing filter expression.
    pub log_filter: String,
    /// Structured log output format.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: defaults::default_socket_endpoint(),
            transport: TransportKind::default(),
            log_filter: defaults::default_log_filter().to_owned(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Returns the configured listen endpoint.
    #[must_use]
    pub fn listen(&self) -> &SocketEndpoint {
        &self.listen
    }

    /// Returns the configured tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
