//! Daemon launch sequencing.
//!
//! Resolves configuration, initialises telemetry, builds the plugin
//! registry and the transport, and hands both to the connection
//! supervisor. Every failure is a structured [`LaunchError`] mapped to a
//! non-zero exit by `main`.

use thiserror::Error;
use tracing::info;

use relay_config::{Config, SocketPreparationError, TransportKind};
use relay_plugins::builtin::{ECHO_ID, EchoPlugin, NOTIFY_ID, NotifyPlugin};
use relay_plugins::{PluginError, PluginRegistry};

use crate::cli::Cli;
use crate::dispatch::{CommandRouter, ServerPlugin};
use crate::supervisor::{self, SupervisorError};
use crate::telemetry::{self, TelemetryError};
use crate::transport::{QuitHandle, SocketTransport, Transport, TransportError};

const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// Errors surfaced while launching or running the daemon.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Telemetry could not be initialised.
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),

    /// The socket filesystem could not be prepared.
    #[error("failed to prepare daemon socket: {0}")]
    Socket(#[from] SocketPreparationError),

    /// The configured transport kind has no linked-in collaborator.
    #[error("transport '{kind}' has no linked-in collaborator")]
    UnsupportedTransport {
        /// Kind that could not be resolved.
        kind: TransportKind,
    },

    /// The transport could not bind its endpoint.
    #[error("failed to bind transport: {0}")]
    Bind(#[from] TransportError),

    /// The plugin registry could not be assembled.
    #[error("failed to build plugin registry: {0}")]
    Registry(#[from] PluginError),

    /// The listen loop aborted abnormally.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Runs the daemon to completion.
///
/// Blocks for the daemon's lifetime; returns only when launch fails or a
/// listen cycle aborts abnormally.
///
/// # Errors
///
/// Returns a [`LaunchError`] describing the first failure.
pub fn run(cli: Cli) -> Result<(), LaunchError> {
    let config = cli.into_config();
    telemetry::initialise(&config)?;

    info!(
        target: LAUNCH_TARGET,
        transport = %config.transport,
        listen = %config.listen(),
        "starting relay daemon"
    );

    let mut transport = build_transport(&config)?;
    let registry = build_registry(transport.quit_handle())?;
    let mut router = CommandRouter::new(registry);

    supervisor::run_listener(&mut transport, &mut router)?;
    Ok(())
}

fn build_transport(config: &Config) -> Result<SocketTransport, LaunchError> {
    match config.transport {
        TransportKind::Socket => {
            config.listen().prepare_filesystem()?;
            Ok(SocketTransport::bind(config.listen())?)
        }
        TransportKind::Ssh => Err(LaunchError::UnsupportedTransport {
            kind: config.transport,
        }),
    }
}

/// Assembles the registry: built-ins dormant, the dispatcher active.
fn build_registry(quit: QuitHandle) -> Result<PluginRegistry, PluginError> {
    let mut builder = PluginRegistry::builder();
    builder.register(ECHO_ID, || Box::new(EchoPlugin::new()))?;
    builder.register(NOTIFY_ID, || Box::new(NotifyPlugin::new()))?;
    builder.register_instance(Box::new(ServerPlugin::new(quit)))?;
    Ok(builder.build())
}
