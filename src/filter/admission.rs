//! The admission filter: glue between the transport and the rate limiter.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::config::{AdmissionConfig, EvictionConfig};
use crate::error::Result;
use crate::ratelimit::{
    self, sweeper, Decision, KeyPolicy, RateLimiterBackend, RequestDescriptor,
};

use super::response::Rejection;

/// The pipeline stage behind the filter.
///
/// Implemented by the transport layer. Invoked exactly once per admitted
/// request and never for a rejected one.
#[async_trait]
pub trait Downstream: Send + Sync {
    /// The transport's response type.
    type Response: Send;

    /// Handle an admitted request.
    async fn handle(&self, request: RequestDescriptor) -> Self::Response;
}

/// An allow/deny admission outcome.
#[derive(Debug)]
pub enum Admission {
    /// Proceed; decision metadata attached
    Allowed(Decision),
    /// Reject with the attached body and status 429
    Denied(Rejection),
}

impl Admission {
    /// Whether the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed(_))
    }
}

/// Outcome of running one request through the filter.
#[derive(Debug)]
pub enum FilterOutcome<R> {
    /// The downstream pipeline ran; its response is untouched
    Completed(R),
    /// The request was rejected before reaching downstream
    Rejected(Rejection),
}

/// Admission filter guarding a downstream pipeline.
///
/// Intercepts every request before business logic: resolves the partition
/// key, consults the backend, and either passes control onward or
/// short-circuits with a structured 429. Denial is normal control flow,
/// never an error, and the whole decision is synchronous.
pub struct AdmissionFilter {
    key_policy: KeyPolicy,
    backend: Arc<dyn RateLimiterBackend>,
}

impl AdmissionFilter {
    /// Create a filter over an existing backend.
    pub fn new(key_policy: KeyPolicy, backend: Arc<dyn RateLimiterBackend>) -> Self {
        info!(key_policy = ?key_policy, "admission filter installed");
        Self {
            key_policy,
            backend,
        }
    }

    /// Build the filter and its backend from configuration.
    ///
    /// Fails fast on invalid configuration so a misconfigured filter is
    /// never installed.
    pub fn from_config(config: &AdmissionConfig) -> Result<Self> {
        Ok(Self::new(config.key_policy, ratelimit::from_config(config)?))
    }

    /// The backend this filter consults.
    pub fn backend(&self) -> Arc<dyn RateLimiterBackend> {
        Arc::clone(&self.backend)
    }

    /// Number of partition keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.backend.tracked_keys()
    }

    /// Start the idle-key sweeper for this filter's backend.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_eviction(&self, config: &EvictionConfig) -> JoinHandle<()> {
        sweeper::spawn(self.backend(), config.idle_after(), config.sweep_interval())
    }

    /// Decide whether `request` may proceed, against the monotonic clock.
    pub fn admit(&self, request: &RequestDescriptor) -> Admission {
        self.admit_at(request, Instant::now())
    }

    /// Decide whether `request` may proceed, at the given instant.
    pub fn admit_at(&self, request: &RequestDescriptor, now: Instant) -> Admission {
        let key = self.key_policy.resolve(request);
        let decision = self.backend.check_at(&key, now);

        trace!(
            key = %key,
            method = %request.method,
            path = %request.path,
            allowed = decision.allowed,
            "admission decision"
        );

        if decision.allowed {
            Admission::Allowed(decision)
        } else {
            debug!(
                key = %key,
                retry_after = ?decision.retry_after,
                "rejecting request"
            );
            Admission::Denied(Rejection::too_many_requests())
        }
    }

    /// Run `request` through the filter and, if admitted, the downstream
    /// pipeline. A rejected request never reaches downstream; an admitted
    /// one reaches it exactly once and its response is returned unmodified.
    pub async fn serve<D: Downstream>(
        &self,
        request: RequestDescriptor,
        downstream: &D,
    ) -> FilterOutcome<D::Response> {
        match self.admit(&request) {
            Admission::Allowed(_) => FilterOutcome::Completed(downstream.handle(request).await),
            Admission::Denied(rejection) => FilterOutcome::Rejected(rejection),
        }
    }
}
