//! Job service implementation.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::api::ApiError;
use crate::cluster::ClusterClient;
use crate::persist::PersistApi;
use crate::pfs::FilesystemApi;

use super::{CreateJobRequest, InternalJobApi, JobApi, JobInfo, JobState};

const JOBS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::jobs");

/// Job service backed by the filesystem, the record store and the cluster.
pub struct JobService {
    filesystem: Arc<dyn FilesystemApi>,
    persist: Arc<dyn PersistApi>,
    cluster: Arc<ClusterClient>,
    remove_containers: bool,
}

impl JobService {
    /// Builds the service from its collaborators.
    #[must_use]
    pub fn new(
        filesystem: Arc<dyn FilesystemApi>,
        persist: Arc<dyn PersistApi>,
        cluster: Arc<ClusterClient>,
    ) -> Self {
        Self {
            filesystem,
            persist,
            cluster,
            remove_containers: false,
        }
    }

    /// Sets whether job containers are removed once they finish.
    #[must_use]
    pub const fn with_remove_containers(mut self, remove_containers: bool) -> Self {
        self.remove_containers = remove_containers;
        self
    }

    /// Cluster client workloads are submitted through.
    #[must_use]
    pub fn cluster(&self) -> &ClusterClient {
        &self.cluster
    }

    fn transition(&self, id: &str, to: JobState) -> Result<JobInfo, ApiError> {
        let mut info = self.inspect_job(id)?;
        if !info.state.can_transition_to(to) {
            return Err(ApiError::InvalidTransition {
                id: id.to_owned(),
                from: info.state,
                to,
            });
        }
        info.state = to;
        self.persist.update_job_info(&info)?;
        info!(target: JOBS_TARGET, job = %id, state = %to, "job state changed");
        Ok(info)
    }
}

impl JobApi for JobService {
    fn create_job(&self, request: &CreateJobRequest) -> Result<JobInfo, ApiError> {
        if request.image.trim().is_empty() {
            return Err(ApiError::invalid_argument("image is required"));
        }

        let id = Uuid::new_v4().simple().to_string();
        let output_repo = request
            .output_repo
            .clone()
            .filter(|repo| !repo.trim().is_empty())
            .unwrap_or_else(|| format!("job-{id}"));
        self.filesystem.create_repo(&output_repo)?;

        let info = JobInfo {
            workload: self.cluster.workload_url(&id),
            id,
            image: request.image.clone(),
            command: request.command.clone(),
            inputs: request.inputs.clone(),
            output_repo,
            pipeline: request.pipeline.clone(),
            state: JobState::Pending,
            remove_containers: self.remove_containers,
        };
        self.persist.create_job_info(&info)?;
        info!(
            target: JOBS_TARGET,
            job = %info.id,
            pipeline = info.pipeline.as_deref().unwrap_or(""),
            output_repo = %info.output_repo,
            "job created"
        );
        Ok(info)
    }

    fn inspect_job(&self, id: &str) -> Result<JobInfo, ApiError> {
        self.persist
            .get_job_info(id)?
            .ok_or_else(|| ApiError::NotFound {
                kind: "job",
                name: id.to_owned(),
            })
    }

    fn list_jobs(&self, pipeline: Option<&str>) -> Result<Vec<JobInfo>, ApiError> {
        let jobs = self.persist.list_job_infos(pipeline)?;
        debug!(target: JOBS_TARGET, count = jobs.len(), "listed jobs");
        Ok(jobs)
    }
}

impl InternalJobApi for JobService {
    fn start_job(&self, id: &str) -> Result<JobInfo, ApiError> {
        self.transition(id, JobState::Running)
    }

    fn finish_job(&self, id: &str, success: bool) -> Result<JobInfo, ApiError> {
        let to = if success {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        self.transition(id, to)
    }
}
