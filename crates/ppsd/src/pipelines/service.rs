//! Pipeline service implementation.

use std::sync::Arc;

use tracing::info;

use crate::api::ApiError;
use crate::jobs::{CreateJobRequest, JobApi, JobInfo};
use crate::persist::PersistApi;
use crate::pfs::FilesystemApi;

use super::{CreatePipelineRequest, PipelineApi, PipelineInfo};

const PIPELINES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pipelines");

/// Pipeline service reaching the Job service only through a [`JobApi`].
pub struct PipelineService {
    filesystem: Arc<dyn FilesystemApi>,
    jobs: Arc<dyn JobApi>,
    persist: Arc<dyn PersistApi>,
}

impl PipelineService {
    /// Builds the service from its collaborators.
    #[must_use]
    pub fn new(
        filesystem: Arc<dyn FilesystemApi>,
        jobs: Arc<dyn JobApi>,
        persist: Arc<dyn PersistApi>,
    ) -> Self {
        Self {
            filesystem,
            jobs,
            persist,
        }
    }

    /// Resumes persisted pipelines.
    ///
    /// Every pipeline without a pending or running job gets a new job.
    /// Returns the number of jobs launched.
    ///
    /// # Errors
    ///
    /// Returns the first [`ApiError`] raised while listing or launching.
    pub fn start(&self) -> Result<usize, ApiError> {
        let mut launched = 0;
        for pipeline in self.persist.list_pipeline_infos()? {
            let active = self
                .jobs
                .list_jobs(Some(&pipeline.name))?
                .iter()
                .any(|job| job.state.is_active());
            if active {
                continue;
            }
            let job = self.launch_job(&pipeline)?;
            info!(
                target: PIPELINES_TARGET,
                pipeline = %pipeline.name,
                job = %job.id,
                "resumed pipeline"
            );
            launched += 1;
        }
        Ok(launched)
    }

    fn launch_job(&self, pipeline: &PipelineInfo) -> Result<JobInfo, ApiError> {
        self.jobs.create_job(&CreateJobRequest {
            image: pipeline.image.clone(),
            command: pipeline.command.clone(),
            inputs: pipeline.inputs.clone(),
            output_repo: Some(pipeline.output_repo.clone()),
            pipeline: Some(pipeline.name.clone()),
        })
    }
}

impl PipelineApi for PipelineService {
    fn create_pipeline(&self, request: &CreatePipelineRequest) -> Result<PipelineInfo, ApiError> {
        if request.name.trim().is_empty() {
            return Err(ApiError::invalid_argument("name is required"));
        }
        if request.image.trim().is_empty() {
            return Err(ApiError::invalid_argument("image is required"));
        }
        if self.persist.get_pipeline_info(&request.name)?.is_some() {
            return Err(ApiError::AlreadyExists {
                kind: "pipeline",
                name: request.name.clone(),
            });
        }

        let info = PipelineInfo {
            name: request.name.clone(),
            image: request.image.clone(),
            command: request.command.clone(),
            inputs: request.inputs.clone(),
            output_repo: request
                .output_repo
                .clone()
                .filter(|repo| !repo.trim().is_empty())
                .unwrap_or_else(|| request.name.clone()),
        };
        self.filesystem.create_repo(&info.output_repo)?;
        self.persist.create_pipeline_info(&info)?;
        let job = self.launch_job(&info)?;
        info!(
            target: PIPELINES_TARGET,
            pipeline = %info.name,
            job = %job.id,
            "pipeline created"
        );
        Ok(info)
    }

    fn inspect_pipeline(&self, name: &str) -> Result<PipelineInfo, ApiError> {
        self.persist
            .get_pipeline_info(name)?
            .ok_or_else(|| ApiError::NotFound {
                kind: "pipeline",
                name: name.to_owned(),
            })
    }

    fn list_pipelines(&self) -> Result<Vec<PipelineInfo>, ApiError> {
        Ok(self.persist.list_pipeline_infos()?)
    }

    fn delete_pipeline(&self, name: &str) -> Result<(), ApiError> {
        if !self.persist.delete_pipeline_info(name)? {
            return Err(ApiError::NotFound {
                kind: "pipeline",
                name: name.to_owned(),
            });
        }
        info!(target: PIPELINES_TARGET, pipeline = %name, "pipeline deleted");
        Ok(())
    }
}
