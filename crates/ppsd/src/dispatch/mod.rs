//! Request dispatch for the daemon's API surfaces.
//!
//! Each connection carries one [`RpcRequest`](crate::wire::RpcRequest). The
//! [`SurfaceRouter`] finds the registered [`ServiceSurface`] by name, the
//! surface decodes the body for the named method and calls the service, and
//! the handler streams the reply and exit status back:
//!
//! ```json
//! {"command":{"service":"pipeline","method":"inspect-pipeline"},"body":{"name":"edges"}}
//! ```
//!
//! ```json
//! {"kind":"reply","body":{"name":"edges","image":"ubuntu","output_repo":"edges"}}
//! {"kind":"exit","status":0}
//! ```
//!
//! Unknown services or methods are rejected with status `1`.

mod debug;
mod errors;
mod handler;
mod router;
mod surfaces;

pub(crate) use self::debug::DebugSnapshotHandler;
pub use self::errors::DispatchError;
pub(crate) use self::handler::DispatchConnectionHandler;
pub use self::router::{SurfaceDescription, SurfaceRouter};
pub use self::surfaces::{
    InternalJobSurface, JobSurface, PipelineSurface, ServiceSurface, VersionSurface,
};

/// Tracing target for dispatch operations.
const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
