//! Debug snapshot served on the trace port.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::transport::{ConnectionHandler, ConnectionStream};
use crate::wire::{MAX_LINE_BYTES, ResponseWriter, read_line};

use super::{DISPATCH_TARGET, SurfaceRouter};

/// Answers every connection with the daemon version and its surfaces.
///
/// The request line, if any, is read and ignored.
pub(crate) struct DebugSnapshotHandler {
    version: &'static str,
    router: Arc<SurfaceRouter>,
}

impl DebugSnapshotHandler {
    pub(crate) const fn new(version: &'static str, router: Arc<SurfaceRouter>) -> Self {
        Self { version, router }
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "version": self.version,
            "pid": std::process::id(),
            "surfaces": self.router.describe(),
        })
    }
}

impl ConnectionHandler for DebugSnapshotHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        if let Err(error) = read_line(&mut stream, MAX_LINE_BYTES) {
            warn!(target: DISPATCH_TARGET, %error, "failed to read debug request");
        }
        let mut writer = ResponseWriter::new(&mut stream);
        if let Err(error) = writer
            .write_reply(self.snapshot())
            .and_then(|()| writer.write_exit(0))
        {
            warn!(target: DISPATCH_TARGET, %error, "failed to write debug snapshot");
        }
    }
}
