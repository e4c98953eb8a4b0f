//! Connection handler that dispatches JSONL requests.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};
use crate::wire::{MAX_LINE_BYTES, ResponseWriter, RpcRequest, read_line};

use super::{DISPATCH_TARGET, DispatchError, SurfaceRouter};

/// Reads one request per connection, routes it and streams the response.
pub(crate) struct DispatchConnectionHandler {
    router: Arc<SurfaceRouter>,
}

impl DispatchConnectionHandler {
    pub(crate) const fn new(router: Arc<SurfaceRouter>) -> Self {
        Self { router }
    }

    fn dispatch(&self, mut stream: ConnectionStream) {
        let peer = stream.peer_addr();
        let outcome = match read_line(&mut stream, MAX_LINE_BYTES) {
            Ok(Some(line)) => self.serve(&line),
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, ?peer, "client disconnected without request");
                return;
            }
            Err(error) => Err(DispatchError::from(error)),
        };

        let mut writer = ResponseWriter::new(&mut stream);
        let written = match outcome {
            Ok(body) => writer.write_reply(body).and_then(|()| writer.write_exit(0)),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, ?peer, %error, "request failed");
                writer.write_failure(&error.to_string(), error.exit_status(), error.fault())
            }
        };
        if let Err(error) = written {
            warn!(target: DISPATCH_TARGET, ?peer, %error, "failed to write response");
        }
    }

    fn serve(&self, line: &[u8]) -> Result<serde_json::Value, DispatchError> {
        let request = RpcRequest::parse(line)?;
        request.validate()?;
        self.router.route(request)
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        self.dispatch(stream);
    }
}
