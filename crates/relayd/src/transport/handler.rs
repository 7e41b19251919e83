//! Connection streams and response delivery for the socket transport.

use std::io::{self, Read, Write};
use std::net::TcpStream;

use relay_protocol::ResponseEnvelope;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Delivers serialized responses to the connected peer.
pub trait Responder {
    /// Sends one response envelope.
    ///
    /// # Errors
    ///
    /// Returns an error when the envelope cannot be written to the peer.
    fn send(&mut self, envelope: &ResponseEnvelope) -> io::Result<()>;
}

/// Stream types accepted by the socket transport.
pub(crate) enum ConnectionStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

/// Responder framing envelopes as JSON lines on the live connection.
pub(crate) struct JsonlResponder<'a> {
    stream: &'a mut ConnectionStream,
}

impl<'a> JsonlResponder<'a> {
    pub(crate) fn new(stream: &'a mut ConnectionStream) -> Self {
        Self { stream }
    }
}

impl Responder for JsonlResponder<'_> {
    fn send(&mut self, envelope: &ResponseEnvelope) -> io::Result<()> {
        let mut line = serde_json::to_vec(envelope).map_err(io::Error::other)?;
        line.push(b'\n');
        self.stream.write_all(&line)?;
        self.stream.flush()
    }
}

/// Reads one bounded newline-delimited request from the stream.
///
/// Returns `Ok(None)` when the peer disconnects without sending data, and
/// `Ok(Some(bytes))` for a complete line or for partial data terminated by
/// EOF. Interrupted reads are retried.
pub(crate) fn read_request_line(stream: &mut ConnectionStream) -> io::Result<Option<Vec<u8>>> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let bytes_read = read_with_retry(stream, &mut chunk)?;

        if bytes_read == 0 {
            return Ok(if buffer.is_empty() { None } else { Some(buffer) });
        }

        if let Some(newline) = chunk[..bytes_read].iter().position(|byte| *byte == b'\n') {
            buffer.extend_from_slice(&chunk[..=newline]);
            enforce_limit(buffer.len())?;
            return Ok(Some(buffer));
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);
        enforce_limit(buffer.len())?;
    }
}

fn read_with_retry(stream: &mut ConnectionStream, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(chunk) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}

fn enforce_limit(size: usize) -> io::Result<()> {
    if size > MAX_REQUEST_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "request exceeds maximum size",
        ));
    }
    Ok(())
}
