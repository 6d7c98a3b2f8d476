//! Request descriptors and partition key derivation.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// The request metadata an admission decision is allowed to depend on.
///
/// Everything here is known before any side effect of the request takes
/// place; nothing depends on the eventual response.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Client network address, if the transport resolved one
    pub remote_addr: Option<IpAddr>,
    /// HTTP method
    pub method: String,
    /// Raw request path as received
    pub path: String,
    /// Matched route template (e.g. `/sessions/{id}`), when routing has one
    pub route_template: Option<String>,
}

impl RequestDescriptor {
    /// Create a new request descriptor.
    pub fn new(
        remote_addr: Option<IpAddr>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            remote_addr,
            method: method.into(),
            path: path.into(),
            route_template: None,
        }
    }

    /// Attach the route template the router matched this request to.
    pub fn with_route_template(mut self, template: impl Into<String>) -> Self {
        self.route_template = Some(template.into());
        self
    }

    /// The endpoint this request resolves to: the route template when the
    /// router supplied one, the literal path otherwise.
    fn endpoint(&self) -> &str {
        self.route_template.as_deref().unwrap_or(&self.path)
    }
}

/// A key that identifies one rate limit partition.
///
/// Two requests share a budget iff they resolve to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Create a partition key from its string form.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key's string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strategy for deriving a partition key from a request.
///
/// Scoping by client address is the simplest choice but couples unrelated
/// endpoints into one budget; scoping by endpoint isolates a hot route
/// without distinguishing clients. The composite scopes each client's use
/// of each endpoint separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    /// One budget per client address
    #[default]
    ClientAddress,
    /// One budget per method + route pair, shared across clients
    Endpoint,
    /// One budget per client address and endpoint combination
    ClientEndpoint,
}

impl KeyPolicy {
    /// Derive the partition key for a request.
    ///
    /// Total and infallible: a request with no resolvable client address
    /// falls back to its raw path, so unattributable traffic still lands in
    /// one deterministic partition.
    pub fn resolve(&self, request: &RequestDescriptor) -> PartitionKey {
        match self {
            KeyPolicy::ClientAddress => PartitionKey::new(Self::client_part(request)),
            KeyPolicy::Endpoint => PartitionKey::new(Self::endpoint_part(request)),
            KeyPolicy::ClientEndpoint => PartitionKey::new(format!(
                "{}|{}",
                Self::client_part(request),
                Self::endpoint_part(request)
            )),
        }
    }

    fn client_part(request: &RequestDescriptor) -> String {
        match request.remote_addr {
            Some(addr) => addr.to_string(),
            None => request.path.clone(),
        }
    }

    fn endpoint_part(request: &RequestDescriptor) -> String {
        format!("{}:{}", request.method, request.endpoint())
    }
}
