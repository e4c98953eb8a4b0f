//! Pipeline service: standing pipeline definitions that drive job creation.

mod service;
mod types;

pub use self::service::PipelineService;
pub use self::types::{CreatePipelineRequest, PipelineInfo, PipelineNameRequest};

use crate::api::ApiError;

/// Pipeline API.
pub trait PipelineApi: Send + Sync {
    /// Records a pipeline and launches its first job.
    fn create_pipeline(&self, request: &CreatePipelineRequest) -> Result<PipelineInfo, ApiError>;

    /// Returns the pipeline called `name`.
    fn inspect_pipeline(&self, name: &str) -> Result<PipelineInfo, ApiError>;

    /// Lists every pipeline.
    fn list_pipelines(&self) -> Result<Vec<PipelineInfo>, ApiError>;

    /// Removes the pipeline called `name`.
    fn delete_pipeline(&self, name: &str) -> Result<(), ApiError>;
}
