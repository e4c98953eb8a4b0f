//! Cluster orchestrator client acquisition.
//!
//! The daemon holds exactly one [`ClusterClient`]. [`acquire`] walks an
//! ordered list of strategies: in-cluster service-account credentials first,
//! then an insecure client bound to the legacy-discovered orchestrator
//! address. Only the last strategy's failure is fatal; earlier failures are
//! reported through [`HealthReporter::cluster_fallback`](crate::HealthReporter::cluster_fallback).

mod acquire;
mod client;
mod errors;
mod kube;

pub use self::acquire::{AcquisitionStrategy, acquire};
pub use self::client::{ClusterClient, Credentials, TrustPolicy};
pub use self::errors::ClusterError;
pub use self::kube::{KubeConnector, SERVICE_ACCOUNT_DIR};

use crate::resolve::{DiscoveryEnv, ResolvedAddress};

/// Capability producing cluster clients under either trust model.
pub trait ClusterConnector: Send + Sync {
    /// Builds a client from ambient in-cluster credentials.
    fn acquire_in_cluster(&self, env: &DiscoveryEnv) -> Result<ClusterClient, ClusterError>;

    /// Builds a client for `address` that skips certificate validation.
    fn acquire_insecure(&self, address: &ResolvedAddress) -> Result<ClusterClient, ClusterError>;
}
