//! Service surfaces exposed on the listener.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::jobs::{
    CreateJobRequest, FinishJobRequest, InternalJobApi, JobApi, JobIdRequest, ListJobsRequest,
};
use crate::pipelines::{CreatePipelineRequest, PipelineApi, PipelineNameRequest};

use super::DispatchError;

/// One named API registered on the listener.
pub trait ServiceSurface: Send + Sync {
    /// Name clients address in `command.service`.
    fn name(&self) -> &'static str;

    /// Methods the surface answers.
    fn methods(&self) -> &'static [&'static str];

    /// Invokes `method` with a JSON body and returns the JSON reply.
    fn invoke(&self, method: &str, body: Value) -> Result<Value, DispatchError>;
}

fn decode<T: DeserializeOwned>(method: &str, body: Value) -> Result<T, DispatchError> {
    // Methods with only optional fields accept an absent body.
    let body = if body.is_null() { json!({}) } else { body };
    serde_json::from_value(body).map_err(|source| DispatchError::InvalidArguments {
        method: method.to_owned(),
        source,
    })
}

fn encode<T: Serialize>(reply: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(reply).map_err(DispatchError::SerializeResponse)
}

const JOB_METHODS: &[&str] = &["create-job", "inspect-job", "list-jobs"];
const INTERNAL_JOB_METHODS: &[&str] = &[
    "create-job",
    "inspect-job",
    "list-jobs",
    "start-job",
    "finish-job",
];
const PIPELINE_METHODS: &[&str] = &[
    "create-pipeline",
    "inspect-pipeline",
    "list-pipelines",
    "delete-pipeline",
];

fn invoke_job_method(
    api: &dyn JobApi,
    service: &'static str,
    method: &str,
    body: Value,
) -> Result<Value, DispatchError> {
    match method {
        "create-job" => {
            let request: CreateJobRequest = decode(method, body)?;
            encode(&api.create_job(&request)?)
        }
        "inspect-job" => {
            let request: JobIdRequest = decode(method, body)?;
            encode(&api.inspect_job(&request.id)?)
        }
        "list-jobs" => {
            let request: ListJobsRequest = decode(method, body)?;
            encode(&api.list_jobs(request.pipeline.as_deref())?)
        }
        other => Err(DispatchError::unknown_method(service, other)),
    }
}

/// Public Job API surface.
pub struct JobSurface {
    api: Arc<dyn JobApi>,
}

impl JobSurface {
    /// Exposes `api` as the `job` surface.
    #[must_use]
    pub fn new(api: Arc<dyn JobApi>) -> Self {
        Self { api }
    }
}

impl ServiceSurface for JobSurface {
    fn name(&self) -> &'static str {
        "job"
    }

    fn methods(&self) -> &'static [&'static str] {
        JOB_METHODS
    }

    fn invoke(&self, method: &str, body: Value) -> Result<Value, DispatchError> {
        invoke_job_method(self.api.as_ref(), self.name(), method, body)
    }
}

/// Privileged Job API surface.
pub struct InternalJobSurface {
    api: Arc<dyn InternalJobApi>,
}

impl InternalJobSurface {
    /// Exposes `api` as the `internal-job` surface.
    #[must_use]
    pub fn new(api: Arc<dyn InternalJobApi>) -> Self {
        Self { api }
    }
}

impl ServiceSurface for InternalJobSurface {
    fn name(&self) -> &'static str {
        "internal-job"
    }

    fn methods(&self) -> &'static [&'static str] {
        INTERNAL_JOB_METHODS
    }

    fn invoke(&self, method: &str, body: Value) -> Result<Value, DispatchError> {
        match method {
            "start-job" => {
                let request: JobIdRequest = decode(method, body)?;
                encode(&self.api.start_job(&request.id)?)
            }
            "finish-job" => {
                let request: FinishJobRequest = decode(method, body)?;
                encode(&self.api.finish_job(&request.id, request.success)?)
            }
            _ => invoke_job_method(self.api.as_ref(), self.name(), method, body),
        }
    }
}

/// Pipeline API surface.
pub struct PipelineSurface {
    api: Arc<dyn PipelineApi>,
}

impl PipelineSurface {
    /// Exposes `api` as the `pipeline` surface.
    #[must_use]
    pub fn new(api: Arc<dyn PipelineApi>) -> Self {
        Self { api }
    }
}

impl ServiceSurface for PipelineSurface {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn methods(&self) -> &'static [&'static str] {
        PIPELINE_METHODS
    }

    fn invoke(&self, method: &str, body: Value) -> Result<Value, DispatchError> {
        match method {
            "create-pipeline" => {
                let request: CreatePipelineRequest = decode(method, body)?;
                encode(&self.api.create_pipeline(&request)?)
            }
            "inspect-pipeline" => {
                let request: PipelineNameRequest = decode(method, body)?;
                encode(&self.api.inspect_pipeline(&request.name)?)
            }
            "list-pipelines" => encode(&self.api.list_pipelines()?),
            "delete-pipeline" => {
                let request: PipelineNameRequest = decode(method, body)?;
                self.api.delete_pipeline(&request.name)?;
                Ok(json!({ "deleted": request.name }))
            }
            other => Err(DispatchError::unknown_method(self.name(), other)),
        }
    }
}

/// Built-in surface advertising the daemon version.
pub struct VersionSurface {
    version: &'static str,
}

impl VersionSurface {
    /// Advertises `version`.
    #[must_use]
    pub const fn new(version: &'static str) -> Self {
        Self { version }
    }
}

impl ServiceSurface for VersionSurface {
    fn name(&self) -> &'static str {
        "version"
    }

    fn methods(&self) -> &'static [&'static str] {
        &["get"]
    }

    fn invoke(&self, method: &str, _body: Value) -> Result<Value, DispatchError> {
        match method {
            "get" => Ok(json!({ "version": self.version })),
            other => Err(DispatchError::unknown_method(self.name(), other)),
        }
    }
}
