//! Configuration record for the pipeline-service daemon.
//!
//! Every option is layered by [`ortho_config`]: command-line flags take
//! precedence over `PPS_*` environment variables, which take precedence over
//! a `.pps.toml` file, which takes precedence over the defaults declared in
//! [`defaults`]. The resulting [`Config`] is loaded once at process start and
//! then passed by reference to every component that needs it.

mod defaults;
mod listener;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_ADDRESS, DEFAULT_DATABASE_NAME, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_TRACE_PORT,
    default_address, default_database_name, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use listener::ListenerEndpoint;
pub use logging::{LogFormat, LogFormatParseError};

/// Immutable snapshot of the daemon's recognised options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PPS_")]
pub struct Config {
    /// Host the API listener binds to.
    #[ortho_config(default = defaults::default_address())]
    pub address: String,
    /// Port the API listener binds to.
    #[ortho_config(default = 651)]
    pub port: u16,
    /// Explicit filesystem service address, bypassing link discovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pfs_address: Option<String>,
    /// Explicit persistence service address, bypassing link discovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_address: Option<String>,
    /// Database holding job and pipeline records.
    #[ortho_config(default = defaults::default_database_name())]
    pub database_name: String,
    /// Port for the debug snapshot listener; `0` disables it.
    #[ortho_config(default = 1051)]
    pub trace_port: u16,
    /// Whether job containers are removed once they finish.
    #[serde(default)]
    #[ortho_config(default = false)]
    pub remove_containers: bool,
    /// `tracing` filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: DEFAULT_PORT,
            pfs_address: None,
            database_address: None,
            database_name: default_database_name(),
            trace_port: DEFAULT_TRACE_PORT,
            remove_containers: false,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint the API listener binds to.
    #[must_use]
    pub fn listener_endpoint(&self) -> ListenerEndpoint {
        ListenerEndpoint::new(self.address.clone(), self.port)
    }

    /// Endpoint for the debug snapshot listener, if enabled.
    #[must_use]
    pub fn debug_endpoint(&self) -> Option<ListenerEndpoint> {
        (self.trace_port != 0).then(|| ListenerEndpoint::new(self.address.clone(), self.trace_port))
    }

    /// Explicit filesystem address, treating an empty value as unset.
    #[must_use]
    pub fn pfs_override(&self) -> Option<&str> {
        non_empty(self.pfs_address.as_deref())
    }

    /// Explicit persistence address, treating an empty value as unset.
    #[must_use]
    pub fn database_override(&self) -> Option<&str> {
        non_empty(self.database_address.as_deref())
    }

    /// Name of the persistence database.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.database_name.as_str()
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|candidate| !candidate.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_count_as_unset() {
        let config = Config {
            pfs_address: Some(String::new()),
            database_address: Some("  ".to_owned()),
            ..Config::default()
        };
        assert_eq!(config.pfs_override(), None);
        assert_eq!(config.database_override(), None);
    }

    #[test]
    fn overrides_are_returned_verbatim() {
        let config = Config {
            pfs_address: Some("pfsd:650".to_owned()),
            database_address: Some("rethink.internal:28016".to_owned()),
            ..Config::default()
        };
        assert_eq!(config.pfs_override(), Some("pfsd:650"));
        assert_eq!(config.database_override(), Some("rethink.internal:28016"));
    }

    #[test]
    fn zero_trace_port_disables_debug_endpoint() {
        let config = Config {
            trace_port: 0,
            ..Config::default()
        };
        assert!(config.debug_endpoint().is_none());
        assert_eq!(
            Config::default().debug_endpoint().map(|endpoint| endpoint.port()),
            Some(DEFAULT_TRACE_PORT)
        );
    }
}
