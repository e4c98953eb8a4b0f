//! Persistence initialisation and the record store seen by the services.
//!
//! Bootstrap calls [`initialize`] once: the backend first ensures the
//! database and its tables exist, then hands back a connected
//! [`PersistApi`] handle. Both steps must succeed before any service that
//! depends on durable state is constructed.

mod errors;
mod remote;

use std::sync::Arc;

use crate::jobs::JobInfo;
use crate::pipelines::PipelineInfo;
use crate::resolve::ResolvedAddress;

pub use self::errors::PersistError;
pub use self::remote::{RemotePersistenceBackend, RemoteStore};

/// Tables every database must carry before services start.
pub const REQUIRED_TABLES: [&str; 2] = ["jobs", "pipelines"];

/// Typed record operations used by the Job and Pipeline services.
pub trait PersistApi: Send + Sync {
    /// Stores a new job record.
    fn create_job_info(&self, info: &JobInfo) -> Result<(), PersistError>;

    /// Replaces an existing job record.
    fn update_job_info(&self, info: &JobInfo) -> Result<(), PersistError>;

    /// Fetches a job record by id.
    fn get_job_info(&self, id: &str) -> Result<Option<JobInfo>, PersistError>;

    /// Lists job records, optionally restricted to one pipeline.
    fn list_job_infos(&self, pipeline: Option<&str>) -> Result<Vec<JobInfo>, PersistError>;

    /// Stores a new pipeline record.
    fn create_pipeline_info(&self, info: &PipelineInfo) -> Result<(), PersistError>;

    /// Fetches a pipeline record by name.
    fn get_pipeline_info(&self, name: &str) -> Result<Option<PipelineInfo>, PersistError>;

    /// Lists every pipeline record.
    fn list_pipeline_infos(&self) -> Result<Vec<PipelineInfo>, PersistError>;

    /// Removes a pipeline record, reporting whether it existed.
    fn delete_pipeline_info(&self, name: &str) -> Result<bool, PersistError>;
}

/// Capability used by bootstrap to prepare and open the store.
pub trait PersistenceBackend: Send + Sync {
    /// Creates the database and [`REQUIRED_TABLES`] when absent.
    ///
    /// Existing structures are left untouched, so repeated or concurrent
    /// calls are safe.
    fn initialize_if_absent(
        &self,
        address: &ResolvedAddress,
        database: &str,
    ) -> Result<(), PersistError>;

    /// Opens a ready handle to `database`.
    fn connect(
        &self,
        address: &ResolvedAddress,
        database: &str,
    ) -> Result<Arc<dyn PersistApi>, PersistError>;
}

/// Initialises `database` at `address` and returns a connected handle.
///
/// # Errors
///
/// Returns the first [`PersistError`] raised by either step; no handle is
/// produced in that case.
pub fn initialize(
    backend: &dyn PersistenceBackend,
    address: &ResolvedAddress,
    database: &str,
) -> Result<Arc<dyn PersistApi>, PersistError> {
    backend.initialize_if_absent(address, database)?;
    backend.connect(address, database)
}
