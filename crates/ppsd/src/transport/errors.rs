//! Error types for listener operations.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running a listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The bind host did not resolve.
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        /// Bind host.
        host: String,
        /// Bind port.
        port: u16,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// The bind host resolved to nothing.
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty {
        /// Bind host.
        host: String,
        /// Bind port.
        port: u16,
    },
    /// Binding the socket failed.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    Bind {
        /// Address being bound.
        addr: SocketAddr,
        /// Bind error.
        #[source]
        source: io::Error,
    },
    /// The bound socket could not report its address.
    #[error("failed to read listener address: {source}")]
    LocalAddr {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Switching the socket to non-blocking mode failed.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked.
    #[error("listener thread panicked")]
    ThreadPanic,
}
