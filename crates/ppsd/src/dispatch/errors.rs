//! Error types for request dispatch failures.

use thiserror::Error;

use crate::api::ApiError;
use crate::wire::{Fault, FrameError};

/// Errors surfaced while parsing, routing or serving a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request line could not be read or parsed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// No surface with this name is registered.
    #[error("unknown service: {service}")]
    UnknownService { service: String },

    /// The surface does not offer this method.
    #[error("unknown method '{method}' for service '{service}'")]
    UnknownMethod { service: String, method: String },

    /// The body does not match the method's payload.
    #[error("invalid arguments for {method}: {source}")]
    InvalidArguments {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service rejected or failed the call.
    #[error(transparent)]
    Service(#[from] ApiError),

    /// The reply could not be serialised.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[source] serde_json::Error),
}

impl DispatchError {
    /// Returns the exit status code for this error.
    ///
    /// Protocol violations and rejected requests return status 1.
    /// Infrastructure failures return status 2.
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::Frame(error) => error.exit_status(),
            Self::Service(error) => error.exit_status(),
            Self::UnknownService { .. }
            | Self::UnknownMethod { .. }
            | Self::InvalidArguments { .. } => 1,
            Self::SerializeResponse(_) => 2,
        }
    }

    /// Wire classification sent with the exit.
    ///
    /// Service errors keep their own class; other rejected requests are
    /// reported as invalid arguments.
    pub fn fault(&self) -> Option<Fault> {
        match self {
            Self::Service(error) => error.fault(),
            _ if self.exit_status() == 1 => {
                Some(Fault::new("invalid-argument").with("message", self.to_string()))
            }
            _ => None,
        }
    }

    pub(crate) fn unknown_service(service: impl Into<String>) -> Self {
        Self::UnknownService {
            service: service.into(),
        }
    }

    pub(crate) fn unknown_method(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            service: service.into(),
            method: method.into(),
        }
    }
}
