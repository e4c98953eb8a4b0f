//! In-memory filesystem double.

use std::sync::Mutex;

use crate::pfs::{FilesystemApi, FilesystemError, RepoInfo};
use crate::wire::RpcError;

/// Filesystem that remembers every repository it was asked to create.
#[derive(Debug, Default)]
pub(crate) struct RecordingFilesystem {
    repos: Mutex<Vec<String>>,
}

impl RecordingFilesystem {
    /// Repository names in creation order, without duplicates.
    pub(crate) fn created(&self) -> Vec<String> {
        self.repos.lock().expect("filesystem mutex poisoned").clone()
    }
}

impl FilesystemApi for RecordingFilesystem {
    fn create_repo(&self, name: &str) -> Result<(), FilesystemError> {
        let mut repos = self.repos.lock().expect("filesystem mutex poisoned");
        if !repos.iter().any(|existing| existing == name) {
            repos.push(name.to_owned());
        }
        Ok(())
    }

    fn inspect_repo(&self, name: &str) -> Result<RepoInfo, FilesystemError> {
        if self.created().iter().any(|existing| existing == name) {
            Ok(RepoInfo {
                name: name.to_owned(),
                size_bytes: 0,
            })
        } else {
            Err(FilesystemError::Operation {
                operation: "inspect-repo",
                source: RpcError::Remote {
                    method: "pfs.inspect-repo".to_owned(),
                    status: 1,
                    message: format!("repo {name} not found"),
                    fault: None,
                },
            })
        }
    }
}
