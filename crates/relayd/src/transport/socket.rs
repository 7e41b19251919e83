//! Socket listener implementing the transport seam.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use relay_config::SocketEndpoint;

use super::handler::{JsonlResponder, read_request_line};
use super::{
    ConnectionStream, QuitHandle, TRANSPORT_TARGET, Transport, TransportError, TransportHandler,
};

#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::Path;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);

/// TCP/Unix socket listener driving sequential listen cycles.
///
/// Connections are serviced one at a time: the cycle accepts a connection,
/// replays its request lines through the handler, and only then accepts
/// the next peer. Accept polling is non-blocking so a quit request raised
/// from the dispatch path is observed within one backoff interval.
#[derive(Debug)]
pub struct SocketTransport {
    endpoint: SocketEndpoint,
    listener: ListenerKind,
    quit: QuitHandle,
}

#[derive(Debug)]
enum ListenerKind {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl SocketTransport {
    /// Binds the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when resolution or binding fails, when a
    /// Unix socket path is already served by a live listener, or when the
    /// listener cannot be configured for non-blocking accepts.
    pub fn bind(endpoint: &SocketEndpoint) -> Result<Self, TransportError> {
        let listener = match endpoint {
            SocketEndpoint::Tcp { host, port } => ListenerKind::Tcp(bind_tcp(host, *port)?),
            SocketEndpoint::Unix { path } => {
                #[cfg(unix)]
                {
                    ListenerKind::Unix(bind_unix(path.as_std_path())?)
                }

                #[cfg(not(unix))]
                {
                    let _ = path;
                    return Err(TransportError::UnsupportedUnix {
                        endpoint: endpoint.to_string(),
                    });
                }
            }
        };

        let result = match &listener {
            ListenerKind::Tcp(tcp) => tcp.set_nonblocking(true),
            #[cfg(unix)]
            ListenerKind::Unix(unix) => unix.set_nonblocking(true),
        };
        if let Err(source) = result {
            return Err(TransportError::NonBlocking { source });
        }

        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            quit: QuitHandle::new(),
        })
    }

    /// Returns the bound TCP address, when the endpoint is TCP.
    ///
    /// Binding port 0 requests an ephemeral port; this reports the port the
    /// operating system actually assigned.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.listener {
            ListenerKind::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            ListenerKind::Unix(_) => None,
        }
    }

    fn accept_ready(&self) -> io::Result<Option<ConnectionStream>> {
        match &self.listener {
            ListenerKind::Tcp(tcp) => match tcp.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(false)?;
                    Ok(Some(ConnectionStream::Tcp(stream)))
                }
                Err(error) if is_retryable(&error) => Ok(None),
                Err(error) => Err(error),
            },
            #[cfg(unix)]
            ListenerKind::Unix(unix) => match unix.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(false)?;
                    Ok(Some(ConnectionStream::Unix(stream)))
                }
                Err(error) if is_retryable(&error) => Ok(None),
                Err(error) => Err(error),
            },
        }
    }

    /// Services one connection: greeting first, then one handler call per
    /// request line until the peer disconnects or a quit is requested.
    fn service_connection(&self, mut stream: ConnectionStream, handler: &mut dyn TransportHandler) {
        {
            let mut responder = JsonlResponder::new(&mut stream);
            handler.connection_formed(&mut responder);
        }

        loop {
            if self.quit.is_requested() {
                break;
            }
            match read_request_line(&mut stream) {
                Ok(Some(line)) => {
                    let mut responder = JsonlResponder::new(&mut stream);
                    handler.command_received(&line, &mut responder);
                }
                Ok(None) => break,
                Err(error) => {
                    warn!(
                        target: TRANSPORT_TARGET,
                        error = %error,
                        "connection read failed"
                    );
                    break;
                }
            }
        }
    }
}

impl Transport for SocketTransport {
    fn run(&mut self, handler: &mut dyn TransportHandler) -> Result<(), TransportError> {
        self.quit.rearm();
        info!(
            target: TRANSPORT_TARGET,
            endpoint = %self.endpoint,
            "listen cycle started"
        );

        while !self.quit.is_requested() {
            match self.accept_ready() {
                Ok(Some(stream)) => self.service_connection(stream, handler),
                Ok(None) => thread::sleep(ACCEPT_BACKOFF),
                Err(source) => return Err(TransportError::Accept { source }),
            }
        }

        info!(target: TRANSPORT_TARGET, "listen cycle completed");
        Ok(())
    }

    fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let SocketEndpoint::Unix { path } = &self.endpoint
            && let Err(error) = fs::remove_file(path.as_std_path())
            && error.kind() != io::ErrorKind::NotFound
        {
            warn!(
                target: TRANSPORT_TARGET,
                error = %error,
                path = %path,
                "failed to remove unix socket file"
            );
        }
    }
}

fn is_retryable(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, TransportError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| TransportError::ResolveEmpty {
        host: host.to_owned(),
        port,
    })?;
    TcpListener::bind(addr).map_err(|source| TransportError::BindTcp { addr, source })
}

/// Binds a Unix socket path, reclaiming stale socket files left by a
/// previous run and refusing paths a live listener is still serving.
#[cfg(unix)]
fn bind_unix(path: &Path) -> Result<UnixListener, TransportError> {
    if path.exists() {
        let display = path.display().to_string();
        let metadata = fs::symlink_metadata(path).map_err(|source| TransportError::UnixReclaim {
            path: display.clone(),
            source,
        })?;
        if !metadata.file_type().is_socket() {
            return Err(TransportError::UnixNotSocket { path: display });
        }
        match UnixStream::connect(path) {
            Ok(_live) => return Err(TransportError::UnixInUse { path: display }),
            Err(error)
                if error.kind() == io::ErrorKind::ConnectionRefused
                    || error.kind() == io::ErrorKind::NotFound =>
            {
                fs::remove_file(path).map_err(|source| TransportError::UnixReclaim {
                    path: display,
                    source,
                })?;
            }
            Err(source) => {
                return Err(TransportError::UnixReclaim {
                    path: display,
                    source,
                });
            }
        }
    }

    UnixListener::bind(path).map_err(|source| TransportError::BindUnix {
        path: path.display().to_string(),
        source,
    })
}
