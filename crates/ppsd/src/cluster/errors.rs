//! Errors raised while acquiring a cluster client.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::resolve::ResolveError;

/// Failures of a cluster acquisition strategy.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// An in-cluster environment variable is absent.
    #[error("in-cluster configuration unavailable: {variable} not set")]
    MissingServiceEnv {
        /// Name of the missing variable.
        variable: &'static str,
    },
    /// A service-account file could not be read.
    #[error("failed to read service-account file {path}: {source}")]
    ServiceAccount {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The service-account token file is empty.
    #[error("service-account token at {path} is empty")]
    EmptyToken {
        /// Token file.
        path: PathBuf,
    },
    /// The orchestrator address could not be resolved.
    #[error("failed to resolve orchestrator address: {0}")]
    Resolve(#[from] ResolveError),
    /// The orchestrator address has no usable `host:port` form.
    #[error("invalid orchestrator address {address}")]
    InvalidAddress {
        /// Offending address.
        address: String,
    },
}
