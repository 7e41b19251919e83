//! Connection supervisor driving the transport's listen cycles.
//!
//! State machine: Idle → Listening → (Completed | Failed) → Idle. A
//! completed cycle (graceful quit) re-enters listening; a failed cycle is
//! logged and surfaced to the caller, which terminates the process.
//! Terminating after the first failed cycle is a deliberate policy choice;
//! `main` owns the exit, so a bounded-retry alternative would be a change
//! confined to this module.

use thiserror::Error;
use tracing::{error, info};

use crate::transport::{Transport, TransportError, TransportHandler};

pub(crate) const SUPERVISOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::supervisor");

/// Errors surfaced when the listen loop aborts.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A listen cycle failed abnormally.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

/// Binds the handler to the transport and supervises its listen cycles.
///
/// Blocks for the lifetime of the daemon: completed cycles restart
/// immediately, so this only returns when a cycle fails.
///
/// # Errors
///
/// Returns [`SupervisorError::Transport`] for the first abnormal cycle
/// failure.
pub fn run_listener(
    transport: &mut dyn Transport,
    handler: &mut dyn TransportHandler,
) -> Result<(), SupervisorError> {
    loop {
        info!(target: SUPERVISOR_TARGET, "entering listen cycle");
        match transport.run(handler) {
            Ok(()) => {
                info!(
                    target: SUPERVISOR_TARGET,
                    "listen cycle completed, restarting"
                );
            }
            Err(failure) => {
                error!(
                    target: SUPERVISOR_TARGET,
                    error = %failure,
                    "listen cycle failed"
                );
                return Err(failure.into());
            }
        }
    }
}
