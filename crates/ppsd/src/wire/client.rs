//! Blocking JSONL client for service-family surfaces.

use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{
    MAX_LINE_BYTES, RpcError, RpcRequest, ServiceMessage, WIRE_TARGET, read_buffered_line,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client bound to one `host:port` address.
///
/// Construction performs no I/O. Every call dials a fresh connection, sends
/// one request line and reads messages until the terminal exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcClient {
    address: String,
    connect_timeout: Duration,
}

impl RpcClient {
    /// Binds a client to `address`.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    /// Overrides the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Address the client dials.
    #[must_use]
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Calls `service`/`method` with a raw JSON body.
    ///
    /// Returns the reply body, or `Value::Null` when the peer exits
    /// successfully without one.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the peer is unreachable, the exchange breaks
    /// off, or the peer exits with a non-zero status.
    pub fn call(&self, service: &str, method: &str, body: Value) -> Result<Value, RpcError> {
        let label = format!("{service}/{method}");
        let request = RpcRequest::new(service, method, body);
        let mut stream = self.connect()?;

        let mut line = serde_json::to_vec(&request).map_err(|source| RpcError::Encode {
            method: label.clone(),
            source,
        })?;
        line.push(b'\n');
        stream
            .write_all(&line)
            .and_then(|()| stream.flush())
            .map_err(|source| self.io_error(source))?;

        debug!(target: WIRE_TARGET, address = %self.address, method = %label, "request sent");
        self.read_response(stream, label)
    }

    /// Calls `service`/`method`, encoding `body` and decoding the reply.
    ///
    /// # Errors
    ///
    /// As [`RpcClient::call`], plus encode and decode failures.
    pub fn call_typed<B, T>(&self, service: &str, method: &str, body: &B) -> Result<T, RpcError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let encoded = serde_json::to_value(body).map_err(|source| RpcError::Encode {
            method: format!("{service}/{method}"),
            source,
        })?;
        let reply = self.call(service, method, encoded)?;
        serde_json::from_value(reply).map_err(|source| RpcError::Decode {
            method: format!("{service}/{method}"),
            source,
        })
    }

    fn connect(&self) -> Result<TcpStream, RpcError> {
        let addr = self.socket_addr()?;
        TcpStream::connect_timeout(&addr, self.connect_timeout).map_err(|source| {
            RpcError::Connect {
                address: self.address.clone(),
                source,
            }
        })
    }

    fn socket_addr(&self) -> Result<SocketAddr, RpcError> {
        let mut addrs =
            self.address
                .to_socket_addrs()
                .map_err(|source| RpcError::Resolve {
                    address: self.address.clone(),
                    source,
                })?;
        addrs.next().ok_or_else(|| RpcError::ResolveEmpty {
            address: self.address.clone(),
        })
    }

    fn read_response(&self, stream: TcpStream, method: String) -> Result<Value, RpcError> {
        let mut reader = BufReader::new(stream);
        let mut diagnostics = String::new();
        let mut reply = Value::Null;

        loop {
            let line = read_buffered_line(&mut reader, MAX_LINE_BYTES).map_err(|source| {
                RpcError::Frame {
                    method: method.clone(),
                    source,
                }
            })?;
            let Some(line) = line else {
                return Err(RpcError::MissingExit { method });
            };

            let message: ServiceMessage =
                serde_json::from_slice(&line).map_err(|source| RpcError::Decode {
                    method: method.clone(),
                    source,
                })?;
            match message {
                ServiceMessage::Stream { data, .. } => diagnostics.push_str(&data),
                ServiceMessage::Reply { body } => reply = body,
                ServiceMessage::Exit { status: 0, .. } => return Ok(reply),
                ServiceMessage::Exit { status, error } => {
                    return Err(RpcError::Remote {
                        method,
                        status,
                        message: diagnostics.trim().to_owned(),
                        fault: error,
                    });
                }
            }
        }
    }

    fn io_error(&self, source: std::io::Error) -> RpcError {
        RpcError::Io {
            address: self.address.clone(),
            source,
        }
    }
}
