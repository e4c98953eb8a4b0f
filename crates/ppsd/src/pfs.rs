//! Client for the distributed filesystem service.
//!
//! [`FilesystemConnector::open`] only validates the address; the first
//! connection is made when a service calls through the returned handle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::resolve::ResolvedAddress;
use crate::wire::{RpcClient, RpcError};

const SERVICE: &str = "pfs";

/// Summary of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Repository name.
    pub name: String,
    /// Bytes stored across all commits.
    #[serde(default)]
    pub size_bytes: u64,
}

/// Filesystem operations consumed by the services.
pub trait FilesystemApi: Send + Sync {
    /// Creates a repository; succeeds when it already exists.
    fn create_repo(&self, name: &str) -> Result<(), FilesystemError>;

    /// Describes an existing repository.
    fn inspect_repo(&self, name: &str) -> Result<RepoInfo, FilesystemError>;
}

/// Capability used by bootstrap to open a filesystem handle.
pub trait FilesystemConnector: Send + Sync {
    /// Opens a handle bound to `address` without dialling it.
    fn open(&self, address: &ResolvedAddress) -> Result<Arc<dyn FilesystemApi>, FilesystemError>;
}

/// Errors raised by filesystem handles.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// The address has no usable `host:port` form.
    #[error("invalid filesystem address {address}")]
    InvalidAddress {
        /// Offending address.
        address: String,
    },
    /// A filesystem call failed.
    #[error("filesystem operation {operation} failed: {source}")]
    Operation {
        /// Operation name, for example `create-repo`.
        operation: &'static str,
        /// Transport, remote or decoding failure.
        #[source]
        source: RpcError,
    },
}

/// Production connector producing [`PfsClient`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct PfsConnector;

impl FilesystemConnector for PfsConnector {
    fn open(&self, address: &ResolvedAddress) -> Result<Arc<dyn FilesystemApi>, FilesystemError> {
        Ok(Arc::new(PfsClient::new(address)?))
    }
}

/// Lazily-dialled client for the filesystem service.
#[derive(Debug, Clone)]
pub struct PfsClient {
    client: RpcClient,
}

impl PfsClient {
    /// Binds a client to `address`.
    ///
    /// # Errors
    ///
    /// Returns [`FilesystemError::InvalidAddress`] when the address lacks a
    /// host or numeric port.
    pub fn new(address: &ResolvedAddress) -> Result<Self, FilesystemError> {
        if address.host_port().is_none() {
            return Err(FilesystemError::InvalidAddress {
                address: address.to_string(),
            });
        }
        Ok(Self {
            client: RpcClient::new(address.as_str()),
        })
    }

    /// Address the client dials.
    #[must_use]
    pub fn address(&self) -> &str {
        self.client.address()
    }
}

impl FilesystemApi for PfsClient {
    fn create_repo(&self, name: &str) -> Result<(), FilesystemError> {
        self.client
            .call(SERVICE, "create-repo", json!({ "name": name }))
            .map(drop)
            .map_err(|source| FilesystemError::Operation {
                operation: "create-repo",
                source,
            })
    }

    fn inspect_repo(&self, name: &str) -> Result<RepoInfo, FilesystemError> {
        self.client
            .call_typed(SERVICE, "inspect-repo", &json!({ "name": name }))
            .map_err(|source| FilesystemError::Operation {
                operation: "inspect-repo",
                source,
            })
    }
}
