//! Process-wide `tracing` subscriber.
//!
//! Events go to stderr so stdout stays free for supervisors that scrape it.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt};

use ppsd_config::{Config, LogFormat};

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the subscriber is installed, carrying the active format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format chosen by the first successful installation.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Failures while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid filter directive.
    #[error("log filter {filter:?} is invalid: {message}")]
    InvalidFilter {
        /// Rejected directive.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// A foreign subscriber already owns the global slot.
    #[error("global tracing subscriber already set: {0}")]
    Install(#[source] SetGlobalDefaultError),
}

/// Installs the subscriber described by `config` the first time it is
/// called. Later calls, including from further bootstraps in the same test
/// binary, return the handle of the original installation.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED_FORMAT
        .get_or_try_init(|| install(config).map(|()| config.log_format()))
        .map(|format| TelemetryHandle { format: *format })
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let directive = config.log_filter();
    let filter = EnvFilter::try_new(directive).map_err(|error| TelemetryError::InvalidFilter {
        filter: directive.to_owned(),
        message: error.to_string(),
    })?;

    let stderr_is_tty = io::stderr().is_terminal();
    let result = match config.log_format() {
        LogFormat::Json => tracing::subscriber::set_global_default(
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_timer(UtcTime::rfc_3339())
                .json()
                .flatten_event(true)
                .finish(),
        ),
        LogFormat::Compact => tracing::subscriber::set_global_default(
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_ansi(stderr_is_tty)
                .with_timer(UtcTime::rfc_3339())
                .compact()
                .finish(),
        ),
    };
    result.map_err(TelemetryError::Install)
}
