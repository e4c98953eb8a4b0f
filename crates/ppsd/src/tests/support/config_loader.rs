//! Configuration fixtures for bootstrap scenarios.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use ppsd_config::Config;

use crate::bootstrap::ConfigLoader;

/// Configuration binding loopback on an ephemeral port with the debug
/// listener disabled.
pub(crate) fn test_config() -> Config {
    Config {
        address: "127.0.0.1".to_owned(),
        port: 0,
        trace_port: 0,
        ..Config::default()
    }
}

/// Loader that fails by passing a non-numeric port on the command line.
pub(crate) struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter([
            OsString::from("ppsd"),
            OsString::from("--port"),
            OsString::from("not-a-port"),
        ])
    }
}
