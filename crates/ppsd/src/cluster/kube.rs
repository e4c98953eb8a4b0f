//! Production connector reading in-cluster service-account credentials.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::resolve::{DiscoveryEnv, ResolvedAddress};

use super::{ClusterClient, ClusterConnector, ClusterError};

/// Directory where the orchestrator mounts service-account credentials.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

const SERVICE_HOST: &str = "KUBERNETES_SERVICE_HOST";
const SERVICE_PORT: &str = "KUBERNETES_SERVICE_PORT";
const TOKEN_FILE: &str = "token";
const CA_FILE: &str = "ca.crt";
const NAMESPACE_FILE: &str = "namespace";
const DEFAULT_NAMESPACE: &str = "default";

/// Connector backed by the orchestrator's service-account mount.
#[derive(Debug, Clone)]
pub struct KubeConnector {
    service_account_dir: PathBuf,
}

impl Default for KubeConnector {
    fn default() -> Self {
        Self::new(SERVICE_ACCOUNT_DIR)
    }
}

impl KubeConnector {
    /// Reads credentials from `service_account_dir`.
    #[must_use]
    pub fn new(service_account_dir: impl Into<PathBuf>) -> Self {
        Self {
            service_account_dir: service_account_dir.into(),
        }
    }

    fn read(&self, name: &str) -> Result<String, ClusterError> {
        let path = self.service_account_dir.join(name);
        fs::read_to_string(&path).map_err(|source| ClusterError::ServiceAccount { path, source })
    }

    fn namespace(&self) -> Result<String, ClusterError> {
        match self.read(NAMESPACE_FILE) {
            Ok(namespace) if !namespace.trim().is_empty() => Ok(namespace.trim().to_owned()),
            Ok(_) => Ok(DEFAULT_NAMESPACE.to_owned()),
            Err(ClusterError::ServiceAccount { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(DEFAULT_NAMESPACE.to_owned())
            }
            Err(error) => Err(error),
        }
    }
}

impl ClusterConnector for KubeConnector {
    fn acquire_in_cluster(&self, env: &DiscoveryEnv) -> Result<ClusterClient, ClusterError> {
        let host = env.get(SERVICE_HOST).ok_or(ClusterError::MissingServiceEnv {
            variable: SERVICE_HOST,
        })?;
        let port = env.get(SERVICE_PORT).ok_or(ClusterError::MissingServiceEnv {
            variable: SERVICE_PORT,
        })?;

        let token = self.read(TOKEN_FILE)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ClusterError::EmptyToken {
                path: self.service_account_dir.join(TOKEN_FILE),
            });
        }
        let ca_bundle = self.read(CA_FILE)?;
        let namespace = self.namespace()?;

        Ok(ClusterClient::in_cluster(
            join_host_port(host, port),
            token,
            ca_bundle,
            namespace,
        ))
    }

    fn acquire_insecure(&self, address: &ResolvedAddress) -> Result<ClusterClient, ClusterError> {
        if address.host_port().is_none() {
            return Err(ClusterError::InvalidAddress {
                address: address.to_string(),
            });
        }
        Ok(ClusterClient::insecure(address.as_str()))
    }
}

fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
