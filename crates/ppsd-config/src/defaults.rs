/// Default bind address for the API listener.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default TCP port for the API listener.
pub const DEFAULT_PORT: u16 = 651;

/// Default persistence database name.
pub const DEFAULT_DATABASE_NAME: &str = "pachyderm";

/// Default port for the debug snapshot listener.
pub const DEFAULT_TRACE_PORT: u16 = 1051;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned bind address used where allocation is required (e.g. serde).
pub fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

/// Owned database name used where allocation is required.
pub fn default_database_name() -> String {
    DEFAULT_DATABASE_NAME.to_string()
}

/// Default log filter expression used by the daemon.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required.
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the daemon.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
