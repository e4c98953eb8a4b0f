//! Connection handling abstractions for the listener.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

/// Accepted client connection.
pub(crate) struct ConnectionStream {
    stream: TcpStream,
}

impl ConnectionStream {
    pub(crate) const fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub(crate) fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Request loop run for every accepted connection.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves one connection on its own thread, then drops it.
    fn handle(&self, stream: ConnectionStream);
}
