//! Pipeline records and request payloads.

use serde::{Deserialize, Serialize};

/// Persisted pipeline definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInfo {
    /// Unique name.
    pub name: String,
    /// Container image each job runs.
    pub image: String,
    /// Entrypoint override.
    #[serde(default)]
    pub command: Vec<String>,
    /// Repositories the pipeline reads.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Repository the pipeline's jobs write.
    pub output_repo: String,
}

/// Payload of `create-pipeline`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePipelineRequest {
    /// Unique name; required.
    pub name: String,
    /// Container image; required.
    pub image: String,
    /// Entrypoint override.
    #[serde(default)]
    pub command: Vec<String>,
    /// Repositories the pipeline reads.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Output repository; defaults to the pipeline name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_repo: Option<String>,
}

/// Payload naming one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineNameRequest {
    /// Pipeline name.
    pub name: String,
}
