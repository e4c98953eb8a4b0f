//! Shared doubles for the daemon's unit and behavioural suites.

mod collaborators;
mod config_loader;
mod filesystem;
mod reporter;
mod store;
mod world;

pub(crate) use collaborators::{CollaboratorCall, RecordingCollaborators};
pub(crate) use config_loader::{FailingConfigLoader, test_config};
pub(crate) use filesystem::RecordingFilesystem;
pub(crate) use reporter::{HealthEvent, RecordingHealthReporter};
pub(crate) use store::MemoryStore;
pub(crate) use world::{TestWorld, world};
