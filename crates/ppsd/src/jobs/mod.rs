//! Job service: submits and tracks units of work.
//!
//! [`JobApi`] is the public contract; [`InternalJobApi`] extends it with the
//! privileged state transitions used by workers. Three implementations of
//! [`JobApi`] exist: [`JobService`] itself, the in-process
//! [`LocalJobClient`] used by the Pipeline service, and the network
//! [`RemoteJobClient`].

mod clients;
mod service;
mod types;

pub use self::clients::{LocalJobClient, RemoteJobClient};
pub use self::service::JobService;
pub use self::types::{
    CreateJobRequest, FinishJobRequest, JobIdRequest, JobInfo, JobState, ListJobsRequest,
};

use crate::api::ApiError;

/// Public Job API.
pub trait JobApi: Send + Sync {
    /// Submits a new job in the `pending` state.
    fn create_job(&self, request: &CreateJobRequest) -> Result<JobInfo, ApiError>;

    /// Returns the job with `id`.
    fn inspect_job(&self, id: &str) -> Result<JobInfo, ApiError>;

    /// Lists jobs, optionally restricted to one pipeline.
    fn list_jobs(&self, pipeline: Option<&str>) -> Result<Vec<JobInfo>, ApiError>;
}

/// Privileged Job API for trusted callers.
pub trait InternalJobApi: JobApi {
    /// Moves a pending job to `running`.
    fn start_job(&self, id: &str) -> Result<JobInfo, ApiError>;

    /// Moves a running job to `succeeded` or `failed`.
    fn finish_job(&self, id: &str, success: bool) -> Result<JobInfo, ApiError>;
}
