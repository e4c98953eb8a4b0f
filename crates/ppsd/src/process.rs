//! Production composition of the daemon process.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::bootstrap::{BootstrapError, Collaborators, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::resolve::DiscoveryEnv;
use crate::transport::ListenerError;

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Errors surfaced while launching or serving the daemon.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// A bootstrap step failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The listeners stopped abnormally.
    #[error("failed to serve requests: {source}")]
    Serve {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

/// Bootstraps the daemon from the process environment and serves until the
/// listener stops.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails or serving stops
/// abnormally.
pub fn run_daemon() -> Result<(), LaunchError> {
    let env = DiscoveryEnv::from_process();
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    let daemon = bootstrap_with(
        &SystemConfigLoader,
        &env,
        &Collaborators::production(),
        reporter,
    )?;

    info!(
        target: PROCESS_TARGET,
        api = %daemon.api_addr(),
        debug = ?daemon.debug_addr(),
        "serving"
    );
    daemon
        .serve()
        .map_err(|source| LaunchError::Serve { source })
}
