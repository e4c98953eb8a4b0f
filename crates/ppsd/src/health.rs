//! Lifecycle events emitted while the daemon bootstraps.
//!
//! Operators read these to tell how far startup progressed; tests swap in a
//! recording implementation to assert on step order.

use std::sync::Arc;

use ppsd_config::Config;

use crate::bootstrap::{BootstrapError, BootstrapStep};
use crate::cluster::{AcquisitionStrategy, ClusterError};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Receives bootstrap progress.
pub trait HealthReporter: Send + Sync {
    /// Bootstrap is about to load configuration.
    fn bootstrap_starting(&self);

    /// `step` finished; called once per step in [`BootstrapStep::ORDER`].
    fn step_completed(&self, step: BootstrapStep);

    /// Every step finished and the listeners are bound.
    fn bootstrap_succeeded(&self, config: &Config);

    /// A step failed and bootstrap stopped.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// `strategy` failed and the next cluster strategy will be tried.
    fn cluster_fallback(&self, strategy: AcquisitionStrategy, error: &ClusterError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn step_completed(&self, step: BootstrapStep) {
        (**self).step_completed(step);
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn cluster_fallback(&self, strategy: AcquisitionStrategy, error: &ClusterError) {
        (**self).cluster_fallback(strategy, error);
    }
}

/// Reporter writing each event to the `ppsd::health` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Creates the reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "starting",
            "bootstrap starting"
        );
    }

    fn step_completed(&self, step: BootstrapStep) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "step",
            step = %step,
            "bootstrap step completed"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "ready",
            listener = %config.listener_endpoint(),
            database = %config.database_name(),
            log_format = %config.log_format(),
            "bootstrap complete, accepting requests"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "aborted",
            step = %error.step(),
            error = %error,
            "bootstrap aborted"
        );
    }

    fn cluster_fallback(&self, strategy: AcquisitionStrategy, error: &ClusterError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "fallback",
            strategy = %strategy,
            error = %error,
            "falling back to insecure cluster client"
        );
    }
}
