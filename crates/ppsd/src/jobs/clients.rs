//! Clients implementing the Job API.

use std::sync::Arc;

use crate::api::ApiError;
use crate::wire::RpcClient;

use super::{
    CreateJobRequest, FinishJobRequest, InternalJobApi, JobApi, JobIdRequest, JobInfo,
    JobService, ListJobsRequest,
};

/// In-process client calling a [`JobService`] directly.
///
/// Requests never leave the process and are not serialised.
#[derive(Clone)]
pub struct LocalJobClient {
    service: Arc<JobService>,
}

impl LocalJobClient {
    /// Binds the client to `service`.
    #[must_use]
    pub const fn new(service: Arc<JobService>) -> Self {
        Self { service }
    }
}

impl JobApi for LocalJobClient {
    fn create_job(&self, request: &CreateJobRequest) -> Result<JobInfo, ApiError> {
        self.service.create_job(request)
    }

    fn inspect_job(&self, id: &str) -> Result<JobInfo, ApiError> {
        self.service.inspect_job(id)
    }

    fn list_jobs(&self, pipeline: Option<&str>) -> Result<Vec<JobInfo>, ApiError> {
        self.service.list_jobs(pipeline)
    }
}

/// Network client for the `job` and `internal-job` surfaces.
///
/// Public operations go to `job`; privileged transitions go to
/// `internal-job`.
#[derive(Debug, Clone)]
pub struct RemoteJobClient {
    client: RpcClient,
}

impl RemoteJobClient {
    /// Public surface name.
    pub const SERVICE: &'static str = "job";
    /// Privileged surface name.
    pub const INTERNAL_SERVICE: &'static str = "internal-job";

    /// Binds the client to the listener at `address`; no connection is made.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new(address),
        }
    }

    /// Address the client dials.
    #[must_use]
    pub fn address(&self) -> &str {
        self.client.address()
    }
}

impl JobApi for RemoteJobClient {
    fn create_job(&self, request: &CreateJobRequest) -> Result<JobInfo, ApiError> {
        Ok(self.client.call_typed(Self::SERVICE, "create-job", request)?)
    }

    fn inspect_job(&self, id: &str) -> Result<JobInfo, ApiError> {
        let body = JobIdRequest { id: id.to_owned() };
        Ok(self.client.call_typed(Self::SERVICE, "inspect-job", &body)?)
    }

    fn list_jobs(&self, pipeline: Option<&str>) -> Result<Vec<JobInfo>, ApiError> {
        let body = ListJobsRequest {
            pipeline: pipeline.map(str::to_owned),
        };
        Ok(self.client.call_typed(Self::SERVICE, "list-jobs", &body)?)
    }
}

impl InternalJobApi for RemoteJobClient {
    fn start_job(&self, id: &str) -> Result<JobInfo, ApiError> {
        let body = JobIdRequest { id: id.to_owned() };
        Ok(self
            .client
            .call_typed(Self::INTERNAL_SERVICE, "start-job", &body)?)
    }

    fn finish_job(&self, id: &str, success: bool) -> Result<JobInfo, ApiError> {
        let body = FinishJobRequest {
            id: id.to_owned(),
            success,
        };
        Ok(self
            .client
            .call_typed(Self::INTERNAL_SERVICE, "finish-job", &body)?)
    }
}
