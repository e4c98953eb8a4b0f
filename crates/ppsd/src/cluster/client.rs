//! Cluster client handle shared by the Job service.

use std::fmt;

const DEFAULT_NAMESPACE: &str = "default";

/// How the client authenticates to the orchestrator.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service-account bearer token.
    BearerToken(String),
    /// No credentials.
    Anonymous,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BearerToken(_) => formatter.write_str("BearerToken(<redacted>)"),
            Self::Anonymous => formatter.write_str("Anonymous"),
        }
    }
}

/// How the client validates the orchestrator's certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustPolicy {
    /// Validate against the supplied PEM bundle.
    CaBundle(String),
    /// Skip certificate validation.
    InsecureSkipVerify,
}

/// Handle to the cluster orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterClient {
    address: String,
    credentials: Credentials,
    trust: TrustPolicy,
    namespace: String,
}

impl ClusterClient {
    /// Client authenticated with in-cluster credentials.
    #[must_use]
    pub fn in_cluster(
        address: impl Into<String>,
        token: impl Into<String>,
        ca_bundle: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            credentials: Credentials::BearerToken(token.into()),
            trust: TrustPolicy::CaBundle(ca_bundle.into()),
            namespace: namespace.into(),
        }
    }

    /// Anonymous client that skips certificate validation.
    #[must_use]
    pub fn insecure(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            credentials: Credentials::Anonymous,
            trust: TrustPolicy::InsecureSkipVerify,
            namespace: DEFAULT_NAMESPACE.to_owned(),
        }
    }

    /// `host:port` of the orchestrator API.
    #[must_use]
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Base URL of the orchestrator API.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("https://{}", self.address)
    }

    /// Credentials presented on each request.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Certificate validation policy.
    #[must_use]
    pub const fn trust(&self) -> &TrustPolicy {
        &self.trust
    }

    /// Whether certificate validation is skipped.
    #[must_use]
    pub const fn is_insecure(&self) -> bool {
        matches!(self.trust, TrustPolicy::InsecureSkipVerify)
    }

    /// Namespace workloads are submitted to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// Location of the batch workload backing job `job_id`.
    #[must_use]
    pub fn workload_url(&self, job_id: &str) -> String {
        format!(
            "{}/apis/batch/v1/namespaces/{}/jobs/{job_id}",
            self.endpoint(),
            self.namespace
        )
    }
}
