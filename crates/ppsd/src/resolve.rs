//! Address resolution for the daemon's collaborators.
//!
//! Each collaborator is reached either through an explicitly configured
//! address or through a legacy link-style environment variable carrying a
//! bare host. Resolution reads a [`DiscoveryEnv`] snapshot captured once at
//! startup, so it is deterministic and never touches the live environment.

use std::collections::HashMap;
use std::fmt;

use strum::Display;
use thiserror::Error;

/// Services the daemon depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Collaborator {
    /// Distributed filesystem service.
    Filesystem,
    /// Durable store for job and pipeline records.
    Persistence,
    /// Cluster orchestrator scheduling workloads.
    Orchestrator,
}

impl Collaborator {
    /// Every collaborator, in bootstrap order.
    pub const ALL: [Self; 3] = [Self::Persistence, Self::Filesystem, Self::Orchestrator];

    /// Link-style variable holding the collaborator's bare host.
    #[must_use]
    pub const fn discovery_variable(self) -> &'static str {
        match self {
            Self::Filesystem => "PFSD_PORT_650_TCP_ADDR",
            Self::Persistence => "RETHINK_PORT_28015_TCP_ADDR",
            Self::Orchestrator => "KUBERNETES_PORT_443_TCP_ADDR",
        }
    }

    /// Port appended to a discovered host.
    #[must_use]
    pub const fn well_known_port(self) -> u16 {
        match self {
            Self::Filesystem => 650,
            Self::Persistence => 28015,
            Self::Orchestrator => 443,
        }
    }
}

/// Immutable snapshot of the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryEnv {
    vars: HashMap<String, String>,
}

impl DiscoveryEnv {
    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Builds a snapshot from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Returns a variable's value, treating an empty value as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// `host:port` address of one collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedAddress(String);

impl ResolvedAddress {
    /// Wraps an explicitly configured address unchanged.
    #[must_use]
    pub fn verbatim(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Synthesises an address from a discovered host and fixed port.
    #[must_use]
    pub fn discovered(host: &str, port: u16) -> Self {
        Self(format!("{host}:{port}"))
    }

    /// Address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Splits the address into host and port when it carries one.
    #[must_use]
    pub fn host_port(&self) -> Option<(&str, u16)> {
        let (host, port) = self.0.rsplit_once(':')?;
        let port = port.parse().ok()?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        (!host.is_empty()).then_some((host, port))
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Errors raised while resolving a collaborator address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No explicit address was configured and the discovery variable is
    /// absent or empty.
    #[error("{variable} not set")]
    MissingVariable {
        /// Collaborator being resolved.
        collaborator: Collaborator,
        /// Name of the missing variable.
        variable: &'static str,
    },
}

/// Resolves a collaborator's address.
///
/// A non-empty `explicit` value wins and is returned verbatim; the discovery
/// variable is only read when no explicit value is supplied.
///
/// # Errors
///
/// Returns [`ResolveError::MissingVariable`] naming the discovery variable
/// when it is needed but absent.
pub fn resolve(
    collaborator: Collaborator,
    explicit: Option<&str>,
    env: &DiscoveryEnv,
) -> Result<ResolvedAddress, ResolveError> {
    if let Some(address) = explicit.filter(|address| !address.is_empty()) {
        return Ok(ResolvedAddress::verbatim(address));
    }

    let variable = collaborator.discovery_variable();
    env.get(variable)
        .map(|host| ResolvedAddress::discovered(host, collaborator.well_known_port()))
        .ok_or(ResolveError::MissingVariable {
            collaborator,
            variable,
        })
}
