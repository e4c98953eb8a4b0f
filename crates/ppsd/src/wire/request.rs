//! Request envelope for service calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FrameError;

/// One call addressed to a named service surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Service and method being called.
    pub command: MethodDescriptor,
    /// Method-specific payload.
    #[serde(default)]
    pub body: Value,
}

/// Identifies the method being called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Surface name, for example `job` or `pipeline`.
    pub service: String,
    /// Method within the surface, for example `create-job`.
    pub method: String,
}

impl RpcRequest {
    /// Builds a request for `service`/`method` with the given body.
    #[must_use]
    pub fn new(service: impl Into<String>, method: impl Into<String>, body: Value) -> Self {
        Self {
            command: MethodDescriptor {
                service: service.into(),
                method: method.into(),
            },
            body,
        }
    }

    /// Parses a JSONL line, ignoring trailing whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Malformed`] when the line is empty or is not a
    /// request envelope.
    pub fn parse(line: &[u8]) -> Result<Self, FrameError> {
        let trimmed = line.trim_ascii_end();
        if trimmed.is_empty() {
            return Err(FrameError::malformed("empty request line"));
        }
        serde_json::from_slice(trimmed).map_err(FrameError::from_json_error)
    }

    /// Checks that the service and method are present.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidStructure`] naming the blank field.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.service().is_empty() {
            return Err(FrameError::invalid_structure("service field is empty"));
        }
        if self.method().is_empty() {
            return Err(FrameError::invalid_structure("method field is empty"));
        }
        Ok(())
    }

    /// Normalised (trimmed) service name.
    #[must_use]
    pub fn service(&self) -> &str {
        self.command.service.trim()
    }

    /// Normalised (trimmed) method name.
    #[must_use]
    pub fn method(&self) -> &str {
        self.command.method.trim()
    }
}
