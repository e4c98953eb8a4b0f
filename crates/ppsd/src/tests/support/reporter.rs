//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use ppsd_config::Config;

use crate::bootstrap::{BootstrapError, BootstrapStep};
use crate::cluster::{AcquisitionStrategy, ClusterError};
use crate::health::HealthReporter;

/// Structured health events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// A bootstrap step completed.
    StepCompleted(BootstrapStep),
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// A cluster acquisition strategy failed and the next was tried.
    ClusterFallback {
        strategy: AcquisitionStrategy,
        message: String,
    },
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Steps reported as completed, in order.
    pub(crate) fn completed_steps(&self) -> Vec<BootstrapStep> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::StepCompleted(step) => Some(step),
                _ => None,
            })
            .collect()
    }

    /// Number of cluster fallback warnings.
    pub(crate) fn fallback_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, HealthEvent::ClusterFallback { .. }))
            .count()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn step_completed(&self, step: BootstrapStep) {
        self.record(HealthEvent::StepCompleted(step));
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn cluster_fallback(&self, strategy: AcquisitionStrategy, error: &ClusterError) {
        self.record(HealthEvent::ClusterFallback {
            strategy,
            message: error.to_string(),
        });
    }
}
