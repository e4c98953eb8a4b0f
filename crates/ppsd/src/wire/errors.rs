//! Error types for framing and remote calls.

use std::io;

use thiserror::Error;

use super::Fault;

/// Errors raised while reading or parsing a request line.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The line could not be parsed as a request.
    #[error("malformed JSONL: {message}")]
    Malformed {
        /// Parser diagnostic.
        message: String,
        /// Underlying JSON error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// The request parsed but is structurally unusable.
    #[error("invalid request structure: {message}")]
    InvalidStructure {
        /// What was wrong.
        message: String,
    },
    /// The line exceeded the framing limit.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    TooLarge {
        /// Bytes buffered when the limit tripped.
        size: usize,
        /// Configured limit.
        max_size: usize,
    },
    /// Reading from the connection failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn from_json_error(source: serde_json::Error) -> Self {
        Self::Malformed {
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub(crate) fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Exit status reported to the peer.
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::Malformed { .. } | Self::InvalidStructure { .. } | Self::TooLarge { .. } => 1,
            Self::Io(_) => 2,
        }
    }
}

/// Errors raised by [`RpcClient`](super::RpcClient) calls.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The target address did not resolve.
    #[error("failed to resolve {address}: {source}")]
    Resolve {
        /// Address being dialled.
        address: String,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// The target address resolved to nothing.
    #[error("no addresses resolved for {address}")]
    ResolveEmpty {
        /// Address being dialled.
        address: String,
    },
    /// Connecting to the target failed.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// Address being dialled.
        address: String,
        /// Connection error.
        #[source]
        source: io::Error,
    },
    /// Reading or writing the connection failed.
    #[error("IO error talking to {address}: {source}")]
    Io {
        /// Peer address.
        address: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The request body could not be encoded.
    #[error("failed to encode request for {method}: {source}")]
    Encode {
        /// Method being called.
        method: String,
        /// Serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// A response line or reply body could not be decoded.
    #[error("failed to decode response from {method}: {source}")]
    Decode {
        /// Method being called.
        method: String,
        /// Deserialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The peer rejected the call.
    #[error("{method} failed with status {status}: {message}")]
    Remote {
        /// Method being called.
        method: String,
        /// Exit status reported by the peer.
        status: i32,
        /// Diagnostics streamed by the peer.
        message: String,
        /// Classification sent with the exit, if any.
        fault: Option<Fault>,
    },
    /// A response line could not be read within the framing limit.
    #[error("failed to read response from {method}: {source}")]
    Frame {
        /// Method being called.
        method: String,
        /// Framing error.
        #[source]
        source: FrameError,
    },
    /// The peer closed the connection without an exit message.
    #[error("{method}: connection closed before exit message")]
    MissingExit {
        /// Method being called.
        method: String,
    },
}
