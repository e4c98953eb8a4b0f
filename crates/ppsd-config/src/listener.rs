//! Listener endpoints derived from the configuration record.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// TCP endpoint a daemon listener binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerEndpoint {
    host: String,
    port: u16,
}

impl ListenerEndpoint {
    /// Builds an endpoint from a bind host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host the listener binds to.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Port the listener binds to.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Host local clients should dial to reach this listener.
    ///
    /// Wildcard bind addresses are not dialable, so they map onto the
    /// loopback address of the same family.
    #[must_use]
    pub fn dial_host(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V4(addr)) if addr.is_unspecified() => Ipv4Addr::LOCALHOST.to_string(),
            Ok(IpAddr::V6(addr)) if addr.is_unspecified() => Ipv6Addr::LOCALHOST.to_string(),
            _ => self.host.clone(),
        }
    }
}

impl fmt::Display for ListenerEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "tcp://{}:{}", self.host, self.port)
    }
}
