//! Command dispatch: envelope validation, plugin resolution, invocation.
//!
//! The router is bound to a transport by the connection supervisor and
//! answers every inbound request with exactly one status-coded response.
//! Protocol violations, unknown plugins, and plugin failures are all
//! recovered here; nothing a peer sends can tear the connection down.

mod errors;
mod router;
mod server_plugin;

pub use self::errors::DispatchError;
pub use self::router::CommandRouter;
pub use self::server_plugin::ServerPlugin;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
