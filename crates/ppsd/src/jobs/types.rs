//! Job records and request payloads.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobState {
    /// Recorded but not yet started.
    Pending,
    /// Executing on the cluster.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished unsuccessfully.
    Failed,
}

impl JobState {
    /// Whether the job still occupies its pipeline.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Whether `self -> next` is a permitted transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running) | (Self::Running, Self::Succeeded | Self::Failed)
        )
    }
}

/// Persisted job record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Unique identifier.
    pub id: String,
    /// Container image.
    pub image: String,
    /// Entrypoint override.
    #[serde(default)]
    pub command: Vec<String>,
    /// Repositories the job reads.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Repository the job writes.
    pub output_repo: String,
    /// Owning pipeline, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
    /// Current state.
    pub state: JobState,
    /// Location of the backing workload on the cluster.
    pub workload: String,
    /// Whether the workload's containers are removed on completion.
    #[serde(default)]
    pub remove_containers: bool,
}

/// Payload of `create-job`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    /// Container image; required.
    pub image: String,
    /// Entrypoint override.
    #[serde(default)]
    pub command: Vec<String>,
    /// Repositories the job reads.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Output repository; defaults to `job-<id>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_repo: Option<String>,
    /// Owning pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
}

/// Payload naming one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobIdRequest {
    /// Job identifier.
    pub id: String,
}

/// Payload of `list-jobs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListJobsRequest {
    /// Restrict to jobs owned by this pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
}

/// Payload of `finish-job`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishJobRequest {
    /// Job identifier.
    pub id: String,
    /// Whether the job succeeded.
    pub success: bool,
}
