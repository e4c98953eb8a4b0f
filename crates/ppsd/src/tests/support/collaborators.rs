//! Recording doubles for the persistence, filesystem and cluster
//! collaborators.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::bootstrap::Collaborators;
use crate::cluster::KubeConnector;
use crate::persist::{PersistApi, PersistError, PersistenceBackend};
use crate::pfs::{FilesystemApi, FilesystemConnector, FilesystemError};
use crate::resolve::ResolvedAddress;
use crate::wire::RpcError;

use super::filesystem::RecordingFilesystem;
use super::store::MemoryStore;

/// Collaborator interaction, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CollaboratorCall {
    InitializePersistence { address: String, database: String },
    ConnectPersistence { address: String, database: String },
    OpenFilesystem { address: String },
}

type CallLog = Arc<Mutex<Vec<CollaboratorCall>>>;

fn push(log: &CallLog, call: CollaboratorCall) {
    log.lock().expect("call log mutex poisoned").push(call);
}

/// Persistence backend that creates databases in memory.
#[derive(Debug)]
pub(crate) struct RecordingPersistenceBackend {
    log: CallLog,
    store: Arc<MemoryStore>,
    databases: Mutex<BTreeSet<String>>,
    created: Mutex<usize>,
    refuse: Mutex<bool>,
}

impl RecordingPersistenceBackend {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            store: Arc::new(MemoryStore::default()),
            databases: Mutex::new(BTreeSet::new()),
            created: Mutex::new(0),
            refuse: Mutex::new(false),
        }
    }

    /// Store handed out by `connect`.
    pub(crate) fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Number of databases actually created.
    pub(crate) fn databases_created(&self) -> usize {
        *self.created.lock().expect("counter mutex poisoned")
    }

    /// Makes every later initialisation fail as if the service were down.
    pub(crate) fn refuse_connections(&self) {
        *self.refuse.lock().expect("flag mutex poisoned") = true;
    }
}

impl PersistenceBackend for RecordingPersistenceBackend {
    fn initialize_if_absent(
        &self,
        address: &ResolvedAddress,
        database: &str,
    ) -> Result<(), PersistError> {
        push(
            &self.log,
            CollaboratorCall::InitializePersistence {
                address: address.to_string(),
                database: database.to_owned(),
            },
        );
        if *self.refuse.lock().expect("flag mutex poisoned") {
            return Err(PersistError::Initialize {
                address: address.to_string(),
                database: database.to_owned(),
                source: RpcError::Connect {
                    address: address.to_string(),
                    source: io::Error::from(io::ErrorKind::ConnectionRefused),
                },
            });
        }
        let key = format!("{address}/{database}");
        if self
            .databases
            .lock()
            .expect("database set mutex poisoned")
            .insert(key)
        {
            *self.created.lock().expect("counter mutex poisoned") += 1;
        }
        Ok(())
    }

    fn connect(
        &self,
        address: &ResolvedAddress,
        database: &str,
    ) -> Result<Arc<dyn PersistApi>, PersistError> {
        push(
            &self.log,
            CollaboratorCall::ConnectPersistence {
                address: address.to_string(),
                database: database.to_owned(),
            },
        );
        let store: Arc<dyn PersistApi> = self.store();
        Ok(store)
    }
}

/// Filesystem connector sharing one [`RecordingFilesystem`].
#[derive(Debug)]
pub(crate) struct RecordingFilesystemConnector {
    log: CallLog,
    filesystem: Arc<RecordingFilesystem>,
}

impl RecordingFilesystemConnector {
    /// Filesystem handed out by `open`.
    pub(crate) fn filesystem(&self) -> Arc<RecordingFilesystem> {
        Arc::clone(&self.filesystem)
    }
}

impl FilesystemConnector for RecordingFilesystemConnector {
    fn open(&self, address: &ResolvedAddress) -> Result<Arc<dyn FilesystemApi>, FilesystemError> {
        push(
            &self.log,
            CollaboratorCall::OpenFilesystem {
                address: address.to_string(),
            },
        );
        let filesystem: Arc<dyn FilesystemApi> = self.filesystem();
        Ok(filesystem)
    }
}

/// Doubles for every collaborator plus a scratch service-account directory
/// read by a real [`KubeConnector`].
#[derive(Debug)]
pub(crate) struct RecordingCollaborators {
    log: CallLog,
    pub(crate) persistence: Arc<RecordingPersistenceBackend>,
    pub(crate) filesystem: Arc<RecordingFilesystemConnector>,
    service_account: TempDir,
}

impl RecordingCollaborators {
    pub(crate) fn new() -> Self {
        let log = CallLog::default();
        Self {
            persistence: Arc::new(RecordingPersistenceBackend::new(Arc::clone(&log))),
            filesystem: Arc::new(RecordingFilesystemConnector {
                log: Arc::clone(&log),
                filesystem: Arc::new(RecordingFilesystem::default()),
            }),
            log,
            service_account: TempDir::new().expect("create service-account directory"),
        }
    }

    /// Writes a mounted service account with `token`.
    pub(crate) fn mount_service_account(&self, token: &str) {
        let dir = self.service_account.path();
        fs::write(dir.join("token"), token).expect("write token");
        fs::write(dir.join("ca.crt"), "-----BEGIN CERTIFICATE-----\n").expect("write ca");
        fs::write(dir.join("namespace"), "pachyderm").expect("write namespace");
    }

    /// Capability set handed to bootstrap.
    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            persistence: self.persistence.clone(),
            filesystem: self.filesystem.clone(),
            cluster: Arc::new(KubeConnector::new(self.service_account.path())),
        }
    }

    /// Calls made so far.
    pub(crate) fn calls(&self) -> Vec<CollaboratorCall> {
        self.log.lock().expect("call log mutex poisoned").clone()
    }
}

impl Default for RecordingCollaborators {
    fn default() -> Self {
        Self::new()
    }
}
