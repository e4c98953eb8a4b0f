//! Errors shared by the Job and Pipeline services and their clients.

use thiserror::Error;

use crate::jobs::JobState;
use crate::persist::PersistError;
use crate::pfs::FilesystemError;
use crate::wire::{Fault, RpcError};

const NOT_FOUND: &str = "not-found";
const ALREADY_EXISTS: &str = "already-exists";
const INVALID_ARGUMENT: &str = "invalid-argument";
const INVALID_TRANSITION: &str = "invalid-transition";

/// Failures reported by service APIs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The named record does not exist.
    #[error("{kind} {name} not found")]
    NotFound {
        /// Record kind, `job` or `pipeline`.
        kind: &'static str,
        /// Record identifier.
        name: String,
    },
    /// A record with the same identifier already exists.
    #[error("{kind} {name} already exists")]
    AlreadyExists {
        /// Record kind.
        kind: &'static str,
        /// Record identifier.
        name: String,
    },
    /// The request is missing or misusing a field.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong.
        message: String,
    },
    /// The job is not in a state that permits the requested change.
    #[error("job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Job identifier.
        id: String,
        /// Current state.
        from: JobState,
        /// Requested state.
        to: JobState,
    },
    /// The record store failed.
    #[error(transparent)]
    Persistence(#[from] PersistError),
    /// The filesystem service failed.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    /// A network client call failed.
    #[error(transparent)]
    Transport(RpcError),
}

impl ApiError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Exit status reported on the wire.
    ///
    /// Rejected requests return `1`; failures of a dependency return `2`.
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::NotFound { .. }
            | Self::AlreadyExists { .. }
            | Self::InvalidArgument { .. }
            | Self::InvalidTransition { .. } => 1,
            Self::Persistence(_) | Self::Filesystem(_) | Self::Transport(_) => 2,
        }
    }

    /// Wire classification of a rejected request.
    ///
    /// Returns `None` for failures that are not the caller's fault.
    #[must_use]
    pub fn fault(&self) -> Option<Fault> {
        let fault = match self {
            Self::NotFound { kind, name } => {
                Fault::new(NOT_FOUND).with("kind", *kind).with("name", name)
            }
            Self::AlreadyExists { kind, name } => Fault::new(ALREADY_EXISTS)
                .with("kind", *kind)
                .with("name", name),
            Self::InvalidArgument { message } => {
                Fault::new(INVALID_ARGUMENT).with("message", message)
            }
            Self::InvalidTransition { id, from, to } => Fault::new(INVALID_TRANSITION)
                .with("id", id)
                .with("from", from.to_string())
                .with("to", to.to_string()),
            Self::Persistence(_) | Self::Filesystem(_) | Self::Transport(_) => return None,
        };
        Some(fault)
    }

    /// Rebuilds the error a peer classified with `fault`.
    ///
    /// Unknown codes and malformed fields yield `None`.
    fn from_fault(fault: &Fault) -> Option<Self> {
        let error = match fault.code.as_str() {
            NOT_FOUND => Self::NotFound {
                kind: record_kind(fault.field("kind")?)?,
                name: fault.field("name")?.to_owned(),
            },
            ALREADY_EXISTS => Self::AlreadyExists {
                kind: record_kind(fault.field("kind")?)?,
                name: fault.field("name")?.to_owned(),
            },
            INVALID_ARGUMENT => Self::invalid_argument(fault.field("message")?),
            INVALID_TRANSITION => Self::InvalidTransition {
                id: fault.field("id")?.to_owned(),
                from: fault.field("from")?.parse().ok()?,
                to: fault.field("to")?.parse().ok()?,
            },
            _ => return None,
        };
        Some(error)
    }
}

impl From<RpcError> for ApiError {
    fn from(error: RpcError) -> Self {
        let rebuilt = match &error {
            RpcError::Remote {
                status: 1,
                fault: Some(fault),
                ..
            } => Self::from_fault(fault),
            _ => None,
        };
        rebuilt.unwrap_or(Self::Transport(error))
    }
}

fn record_kind(kind: &str) -> Option<&'static str> {
    match kind {
        "job" => Some("job"),
        "pipeline" => Some("pipeline"),
        _ => None,
    }
}
