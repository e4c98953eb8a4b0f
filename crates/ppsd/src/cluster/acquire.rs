//! Ordered acquisition strategies for the cluster client.

use strum::Display;

use crate::health::HealthReporter;
use crate::resolve::{Collaborator, DiscoveryEnv, resolve};

use super::{ClusterClient, ClusterConnector, ClusterError};

/// One way of obtaining a [`ClusterClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum AcquisitionStrategy {
    /// Ambient service-account credentials.
    InCluster,
    /// Insecure client bound to the discovered orchestrator address.
    Fallback,
}

impl AcquisitionStrategy {
    /// Strategies tried before the terminal one; their failures are
    /// reported and superseded.
    pub const RECOVERABLE: [Self; 1] = [Self::InCluster];

    /// Strategy whose failure ends acquisition.
    pub const TERMINAL: Self = Self::Fallback;

    fn attempt(
        self,
        connector: &dyn ClusterConnector,
        env: &DiscoveryEnv,
    ) -> Result<ClusterClient, ClusterError> {
        match self {
            Self::InCluster => connector.acquire_in_cluster(env),
            Self::Fallback => {
                let address = resolve(Collaborator::Orchestrator, None, env)?;
                connector.acquire_insecure(&address)
            }
        }
    }
}

/// Acquires the cluster client; the first successful strategy wins.
///
/// # Errors
///
/// Returns the terminal strategy's [`ClusterError`] when every strategy
/// fails.
pub fn acquire(
    connector: &dyn ClusterConnector,
    env: &DiscoveryEnv,
    reporter: &dyn HealthReporter,
) -> Result<ClusterClient, ClusterError> {
    for strategy in AcquisitionStrategy::RECOVERABLE {
        match strategy.attempt(connector, env) {
            Ok(client) => return Ok(client),
            Err(error) => reporter.cluster_fallback(strategy, &error),
        }
    }
    AcquisitionStrategy::TERMINAL.attempt(connector, env)
}
