//! The relay dispatch daemon.
//!
//! `relayd` accepts connections over a pluggable transport, reads
//! JSON-encoded command envelopes, resolves each command's named plugin
//! through a lazily-instantiating registry, and answers every request with
//! a status-coded response envelope. The daemon services one connection at
//! a time; the `quit` command addressed to the dispatcher's own `server`
//! identity is the only sanctioned way to end a listen cycle, and the
//! connection supervisor restarts completed cycles until a transport
//! failure terminates the process.

mod cli;
mod dispatch;
mod launch;
mod supervisor;
mod telemetry;
mod transport;

pub use cli::Cli;
pub use dispatch::{CommandRouter, DispatchError, ServerPlugin};
pub use launch::{LaunchError, run};
pub use supervisor::{SupervisorError, run_listener};
pub use telemetry::{TelemetryError, initialise as initialise_telemetry};
pub use transport::{
    QuitHandle, Responder, SocketTransport, Transport, TransportError, TransportHandler,
};
