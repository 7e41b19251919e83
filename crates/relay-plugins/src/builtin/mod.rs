//! Built-in plugins shipped with the daemon.

mod echo;
mod notify;

pub use self::echo::{ECHO_ID, EchoPlugin};
pub use self::notify::{NOTIFY_ID, NotifyPlugin};
