//! Bootstrap and service composition for the pipeline-service daemon.
//!
//! The daemon depends on three collaborators: a distributed filesystem, a
//! persistence store for job and pipeline records, and a cluster
//! orchestrator that runs workloads. [`bootstrap_with`] resolves each
//! collaborator from configuration or link-style discovery variables,
//! prepares the persistence database, acquires a cluster client, builds the
//! Job and Pipeline services, and finally registers their APIs on a single
//! TCP listener.
//!
//! The steps run in the fixed order of [`BootstrapStep::ORDER`]. Each one is
//! reported through a [`HealthReporter`] so operators (and tests) can see
//! exactly how far startup progressed. The first failure aborts bootstrap
//! with a [`BootstrapError`] naming the step; no listener is bound unless
//! every earlier step succeeded.
//!
//! ## Cluster acquisition
//!
//! In-cluster credentials are tried first. When they are unavailable the
//! daemon logs one warning and falls back to an insecure client addressed
//! through `KUBERNETES_PORT_443_TCP_ADDR`. See the [`cluster`] module.

pub mod api;
mod bootstrap;
pub mod cluster;
pub mod dispatch;
mod health;
pub mod jobs;
pub mod persist;
pub mod pfs;
pub mod pipelines;
mod process;
pub mod resolve;
mod telemetry;
mod transport;
pub mod wire;

pub use api::ApiError;
pub use bootstrap::{
    BootstrapError, BootstrapStep, Collaborators, ConfigLoader, Daemon, RunningDaemon,
    ServiceSet, StaticConfigLoader, SystemConfigLoader, VERSION, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, run_daemon};
pub use resolve::{Collaborator, DiscoveryEnv, ResolveError, ResolvedAddress};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ListenerError, ListenerHandle};

#[cfg(test)]
mod tests;
