//! Per-owner analytics dashboard: cache in front of an RPC fallback.
//!
//! The invalidation flag is consumed here and only here. A flag set by the
//! redirect side between our existence check and the payload write can
//! leave stale data cached for up to the flag's TTL; that bounded staleness
//! is accepted.

use crate::domain::entities::{DashboardRequest, DashboardResponse};
use crate::error::{AppError, ErrorKind};
use crate::infrastructure::broker::RpcClient;
use crate::infrastructure::cache::{Cache, CacheKeys};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct DashboardService {
    rpc: Arc<dyn RpcClient>,
    cache: Cache,
    keys: CacheKeys,
    cache_ttl: Duration,
    queue: String,
    rpc_timeout: Duration,
    /// Cancelled at shutdown so in-flight RPC waits abort promptly.
    shutdown: CancellationToken,
}

impl DashboardService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rpc: Arc<dyn RpcClient>,
        cache: Cache,
        keys: CacheKeys,
        cache_ttl: Duration,
        queue: String,
        rpc_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            rpc,
            cache,
            keys,
            cache_ttl,
            queue,
            rpc_timeout,
            shutdown,
        }
    }

    /// Returns the owner's dashboard, from cache when possible.
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` for a non-positive owner id
    /// - `EXTERNAL_SERVICE_ERROR` when the analytics service is
    ///   unreachable, times out, or reports an error status
    pub async fn get_dashboard(&self, owner_id: i64) -> Result<DashboardResponse, AppError> {
        let payload_key = self.keys.dashboard(owner_id);
        let flag_key = self.keys.dashboard_invalidation_flag(owner_id);

        let forced = match self.cache.exists(&flag_key).await {
            Ok(true) => {
                if let Err(e) = self.cache.delete(&flag_key).await {
                    warn!(error = %e, %flag_key, "failed to clear invalidation flag");
                }
                info!(owner_id, "dashboard refresh forced by invalidation flag");
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(error = %e, %flag_key, "invalidation flag check failed");
                false
            }
        };

        if !forced {
            match self.cache.get::<DashboardResponse>(&payload_key).await {
                Ok(Some(cached)) => {
                    debug!(owner_id, "dashboard cache hit");
                    if let Err(e) = self.cache.refresh_ttl(&payload_key, self.cache_ttl).await {
                        warn!(error = %e, %payload_key, "failed to refresh dashboard ttl");
                    }
                    return Ok(cached);
                }
                Ok(None) => debug!(owner_id, "dashboard cache miss"),
                Err(e) => warn!(error = %e, %payload_key, "dashboard cache read failed"),
            }
        }

        let request = DashboardRequest { user_id: owner_id };
        request
            .validate()
            .map_err(|m| AppError::invalid_input(m).with_context("userId", owner_id))?;

        let body = serde_json::to_vec(&request)
            .map_err(|e| AppError::internal("failed to encode dashboard request").wrap(e))?;

        let reply = self
            .rpc
            .call(
                &self.queue,
                body,
                self.rpc_timeout,
                self.shutdown.child_token(),
            )
            .await
            .map_err(|e| {
                AppError::new(ErrorKind::ExternalServiceError)
                    .with_detail("dashboard rpc failed")
                    .with_context("queue", self.queue.clone())
                    .wrap(e)
            })?;

        let response: DashboardResponse = serde_json::from_slice(&reply)
            .map_err(|e| AppError::external_service("failed to parse dashboard reply").wrap(e))?;

        if let Err(reason) = response.validate() {
            return Err(AppError::external_service(reason).with_context("userId", owner_id));
        }

        if response.is_error() {
            return Err(AppError::new(ErrorKind::ExternalServiceError)
                .with_message(format!("Dashboard service error: {}", response.message()))
                .with_detail("analytics service returned error status"));
        }

        if response.is_limited() {
            info!(owner_id, "analytics reply is limited");
        }

        // Cached even when limited; a limited answer is still an answer.
        if let Err(e) = self.cache.set(&payload_key, &response, self.cache_ttl).await {
            warn!(error = %e, %payload_key, "failed to cache dashboard");
        }

        Ok(response)
    }
}
