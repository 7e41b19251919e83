//! Error types for transport binding and listen cycles.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding an endpoint or running a listen cycle.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A TCP host name could not be resolved.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        /// Configured host name.
        host: String,
        /// Configured port.
        port: u16,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },

    /// A TCP host name resolved to no usable address.
    #[error("{host}:{port} resolved to no addresses")]
    ResolveEmpty {
        /// Configured host name.
        host: String,
        /// Configured port.
        port: u16,
    },

    /// Binding the TCP listener failed.
    #[error("failed to bind {addr}: {source}")]
    BindTcp {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// Binding the Unix listener failed.
    #[error("failed to bind unix socket {path}: {source}")]
    BindUnix {
        /// Socket path that could not be bound.
        path: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// The configured Unix socket path exists but is not a socket.
    #[error("path {path} exists and is not a socket")]
    UnixNotSocket {
        /// Offending path.
        path: String,
    },

    /// Another listener is already serving the configured Unix socket.
    #[error("unix socket {path} is already in use")]
    UnixInUse {
        /// Socket path in use.
        path: String,
    },

    /// Probing or cleaning a stale Unix socket file failed.
    #[error("failed to reclaim stale unix socket {path}: {source}")]
    UnixReclaim {
        /// Socket path being reclaimed.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },

    /// Unix endpoints are not supported on this platform.
    #[error("unix socket endpoints are not supported on this platform: {endpoint}")]
    UnsupportedUnix {
        /// Configured endpoint.
        endpoint: String,
    },

    /// The listener could not be switched to non-blocking accepts.
    #[error("failed to configure non-blocking accepts: {source}")]
    NonBlocking {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// The accept loop failed while a listen cycle was in progress.
    #[error("accept failed: {source}")]
    Accept {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
}
