//! BDD test world: loader, discovery environment, collaborators and the
//! bootstrap outcome shared by step functions.

use std::cell::RefCell;
use std::sync::Arc;

use ppsd_config::Config;

use crate::bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, bootstrap_with,
};
use crate::resolve::DiscoveryEnv;

use super::collaborators::RecordingCollaborators;
use super::config_loader::{FailingConfigLoader, test_config};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub(crate) struct TestWorld {
    config: Config,
    failing_loader: bool,
    env: Vec<(String, String)>,
    pub(crate) collaborators: RecordingCollaborators,
    pub(crate) reporter: Arc<RecordingHealthReporter>,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    pub(crate) fn new() -> Self {
        Self {
            config: test_config(),
            failing_loader: false,
            env: Vec::new(),
            collaborators: RecordingCollaborators::new(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            daemon: None,
            bootstrap_error: None,
        }
    }

    /// Mutable access to the configuration the loader returns.
    pub(crate) fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Makes the loader reject its arguments.
    pub(crate) fn use_failing_loader(&mut self) {
        self.failing_loader = true;
    }

    /// Adds a variable to the discovery snapshot.
    pub(crate) fn set_env(&mut self, key: &str, value: &str) {
        self.env.push((key.to_owned(), value.to_owned()));
    }

    /// Runs the bootstrap sequence once.
    pub(crate) fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        let loader: Box<dyn ConfigLoader> = if self.failing_loader {
            Box::new(FailingConfigLoader)
        } else {
            Box::new(StaticConfigLoader::new(self.config.clone()))
        };
        let env = DiscoveryEnv::from_pairs(self.env.clone());
        match bootstrap_with(
            loader.as_ref(),
            &env,
            &self.collaborators.collaborators(),
            self.reporter.clone(),
        ) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    pub(crate) fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    pub(crate) fn daemon(&self) -> Option<&Daemon> {
        self.daemon.as_ref()
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
pub(crate) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
