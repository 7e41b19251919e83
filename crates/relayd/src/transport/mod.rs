//! Transport seam binding the dispatch core to remote peers.
//!
//! The dispatch core is transport-agnostic: it sees two entry points, a
//! connection-formed callback and a command-received callback, plus a
//! responder for delivering serialized output back to the current peer.
//! The in-tree collaborator is [`SocketTransport`] (TCP or Unix domain
//! sockets); alternates such as an SSH listener plug in behind the same
//! [`Transport`] trait.

mod errors;
mod handler;
mod socket;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(test)]
use relay_protocol::ResponseEnvelope;

pub use self::errors::TransportError;
pub use self::handler::Responder;
pub use self::socket::SocketTransport;

pub(crate) use self::handler::ConnectionStream;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// The two entry points a transport binds the dispatch core to.
pub trait TransportHandler {
    /// Invoked once per accepted connection, before any command.
    fn connection_formed(&mut self, responder: &mut dyn Responder);

    /// Invoked with the raw bytes of each inbound request.
    ///
    /// Implementations deliver exactly one response per invocation through
    /// the responder and must not panic; every failure is reported to the
    /// peer as a status-coded response instead.
    fn command_received(&mut self, raw: &[u8], responder: &mut dyn Responder);
}

/// A listener that drives one listen cycle at a time.
pub trait Transport {
    /// Runs one listen cycle, blocking until the cycle ends.
    ///
    /// Returns `Ok(())` when the cycle wound down gracefully after a quit
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the cycle aborts abnormally.
    fn run(&mut self, handler: &mut dyn TransportHandler) -> Result<(), TransportError>;

    /// Returns a handle that can request termination of the current cycle.
    fn quit_handle(&self) -> QuitHandle;
}

/// Cloneable handle requesting graceful termination of a listen cycle.
///
/// The quit command is the only sanctioned way to unwind the listen loop:
/// the dispatcher trips this flag from the dispatch path and the accept
/// loop observes it. The flag re-arms at the start of each cycle.
#[derive(Debug, Clone, Default)]
pub struct QuitHandle {
    flag: Arc<AtomicBool>,
}

impl QuitHandle {
    /// Builds an un-tripped handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests termination of the current listen cycle.
    pub fn request_quit(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` when termination has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn rearm(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Responder that buffers envelopes in memory, for exercising handlers
/// without a live connection.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingResponder {
    pub(crate) sent: Vec<ResponseEnvelope>,
}

#[cfg(test)]
impl Responder for RecordingResponder {
    fn send(&mut self, envelope: &ResponseEnvelope) -> std::io::Result<()> {
        self.sent.push(envelope.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_handle_clones_share_state() {
        let handle = QuitHandle::new();
        let observer = handle.clone();
        assert!(!observer.is_requested());

        handle.request_quit();
        assert!(observer.is_requested());

        handle.rearm();
        assert!(!observer.is_requested());
    }
}
