//! Errors raised by the persistence layer.

use thiserror::Error;

use crate::wire::RpcError;

/// Failures while preparing or using the record store.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Creating the database or its tables failed.
    #[error("failed to initialise database {database} at {address}: {source}")]
    Initialize {
        /// Persistence service address.
        address: String,
        /// Database being prepared.
        database: String,
        /// Transport or remote failure.
        #[source]
        source: RpcError,
    },
    /// Opening a connection failed.
    #[error("failed to connect to database {database} at {address}: {source}")]
    Connect {
        /// Persistence service address.
        address: String,
        /// Database being opened.
        database: String,
        /// Transport or remote failure.
        #[source]
        source: RpcError,
    },
    /// A record operation failed.
    #[error("persistence operation {operation} failed: {source}")]
    Operation {
        /// Operation name, for example `get-job-info`.
        operation: &'static str,
        /// Transport, remote or decoding failure.
        #[source]
        source: RpcError,
    },
}
