//! JSONL wire protocol shared by the daemon and the service family.
//!
//! A client opens one connection per call and writes a single request line:
//!
//! ```json
//! {"command":{"service":"job","method":"inspect-job"},"body":{"id":"..."}}
//! ```
//!
//! The server answers with zero or more `stream` messages, at most one
//! `reply` carrying the result body, and a terminal `exit`:
//!
//! ```json
//! {"kind":"reply","body":{"id":"...","state":"pending"}}
//! {"kind":"exit","status":0}
//! ```
//!
//! Status `1` marks a rejected request and status `2` an infrastructure
//! failure on the serving side. A rejected request's exit may carry an
//! `error` object whose `code` names the error class:
//!
//! ```json
//! {"kind":"exit","status":1,"error":{"code":"not-found","fields":{"kind":"job","name":"j1"}}}
//! ```

mod client;
mod errors;
mod framing;
mod request;
mod response;

pub use self::client::RpcClient;
pub use self::errors::{FrameError, RpcError};
pub(crate) use self::framing::{MAX_LINE_BYTES, read_buffered_line, read_line};
pub use self::request::{MethodDescriptor, RpcRequest};
pub use self::response::{Fault, ResponseWriter, ServiceMessage, StreamTarget};

const WIRE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::wire");
