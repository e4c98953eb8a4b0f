//! TCP listener for the daemon's API surfaces.
//!
//! The listener binds during bootstrap and accepts connections on a
//! background thread once started, handing each one to a
//! [`ConnectionHandler`] on its own thread.

mod errors;
mod handler;
mod listener;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub use self::listener::ListenerHandle;
pub(crate) use self::listener::ServiceListener;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
