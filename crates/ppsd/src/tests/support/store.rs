//! In-memory record store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::jobs::JobInfo;
use crate::persist::{PersistApi, PersistError};
use crate::pipelines::PipelineInfo;

#[derive(Debug, Default)]
struct Tables {
    jobs: BTreeMap<String, JobInfo>,
    pipelines: BTreeMap<String, PipelineInfo>,
}

/// [`PersistApi`] backed by ordered maps.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn with_tables<T>(&self, action: impl FnOnce(&mut Tables) -> T) -> T {
        action(&mut self.tables.lock().expect("store mutex poisoned"))
    }

    /// Stored job record, if any.
    pub(crate) fn job(&self, id: &str) -> Option<JobInfo> {
        self.with_tables(|tables| tables.jobs.get(id).cloned())
    }

    /// Jobs owned by `pipeline`.
    pub(crate) fn jobs_for(&self, pipeline: &str) -> Vec<JobInfo> {
        self.with_tables(|tables| {
            tables
                .jobs
                .values()
                .filter(|job| job.pipeline.as_deref() == Some(pipeline))
                .cloned()
                .collect()
        })
    }

    /// Seeds a pipeline record directly.
    pub(crate) fn insert_pipeline(&self, info: PipelineInfo) {
        self.with_tables(|tables| tables.pipelines.insert(info.name.clone(), info));
    }
}

impl PersistApi for MemoryStore {
    fn create_job_info(&self, info: &JobInfo) -> Result<(), PersistError> {
        self.with_tables(|tables| tables.jobs.insert(info.id.clone(), info.clone()));
        Ok(())
    }

    fn update_job_info(&self, info: &JobInfo) -> Result<(), PersistError> {
        self.create_job_info(info)
    }

    fn get_job_info(&self, id: &str) -> Result<Option<JobInfo>, PersistError> {
        Ok(self.job(id))
    }

    fn list_job_infos(&self, pipeline: Option<&str>) -> Result<Vec<JobInfo>, PersistError> {
        Ok(match pipeline {
            Some(pipeline) => self.jobs_for(pipeline),
            None => self.with_tables(|tables| tables.jobs.values().cloned().collect()),
        })
    }

    fn create_pipeline_info(&self, info: &PipelineInfo) -> Result<(), PersistError> {
        self.insert_pipeline(info.clone());
        Ok(())
    }

    fn get_pipeline_info(&self, name: &str) -> Result<Option<PipelineInfo>, PersistError> {
        Ok(self.with_tables(|tables| tables.pipelines.get(name).cloned()))
    }

    fn list_pipeline_infos(&self) -> Result<Vec<PipelineInfo>, PersistError> {
        Ok(self.with_tables(|tables| tables.pipelines.values().cloned().collect()))
    }

    fn delete_pipeline_info(&self, name: &str) -> Result<bool, PersistError> {
        Ok(self.with_tables(|tables| tables.pipelines.remove(name).is_some()))
    }
}
