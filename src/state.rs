//! Application state shared across HTTP handlers.
//!
//! The composition root: components expose small traits and receive their
//! dependencies positionally, wired exactly once here. Cheap to clone due
//! to `Arc` wrapping.

use std::sync::Arc;

use crate::application::services::{
    AuthoringService, ClickService, CodeAllocator, DashboardService, GeoIpService,
    RedirectService, TokenVerifier,
};
use crate::config::Config;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::broker::{EventPublisher, RpcClient};
use crate::infrastructure::cache::{Cache, CacheKeys};
use tokio_util::sync::CancellationToken;

/// Shared application state injected into HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Cache,

    pub redirect_service: Arc<RedirectService>,
    pub click_service: Arc<ClickService>,
    pub dashboard_service: Arc<DashboardService>,
    pub authoring_service: Arc<AuthoringService>,
    pub allocator: Arc<CodeAllocator>,
    pub token_verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// Wires all services from their infrastructure dependencies.
    ///
    /// `shutdown` is cancelled by the server when a shutdown signal
    /// arrives; services use it to abort in-flight broker waits.
    pub fn new(
        config: Arc<Config>,
        link_repo: Arc<dyn LinkRepository>,
        click_repo: Arc<dyn ClickRepository>,
        cache: Cache,
        rpc: Arc<dyn RpcClient>,
        publisher: Arc<dyn EventPublisher>,
        shutdown: CancellationToken,
    ) -> Self {
        let keys = CacheKeys::new(&config.app_name);

        let allocator = Arc::new(CodeAllocator::new(
            link_repo.clone(),
            config.url_short_code_length,
            config.url_max_retries,
        ));

        let authoring_service = Arc::new(AuthoringService::new(
            link_repo.clone(),
            allocator.clone(),
            config.url_default_ttl_days,
        ));

        let redirect_service = Arc::new(RedirectService::new(
            link_repo,
            cache.clone(),
            keys.clone(),
            config.redis_cache_ttl,
            config.redis_invalidation_flag_ttl,
        ));

        let geoip_service = Arc::new(GeoIpService::new(
            cache.clone(),
            keys.clone(),
            config.redis_cache_ttl,
            config.geoip_timeout,
        ));

        let click_service = Arc::new(ClickService::new(
            click_repo,
            redirect_service.clone(),
            geoip_service,
            publisher,
            config.queue_click_events.clone(),
        ));

        let dashboard_service = Arc::new(DashboardService::new(
            rpc,
            cache.clone(),
            keys,
            config.redis_cache_ttl,
            config.queue_dashboard_request.clone(),
            config.rabbitmq_rpc_timeout,
            shutdown,
        ));

        let token_verifier = Arc::new(TokenVerifier::new(&config.jwt_secret));

        Self {
            config,
            cache,
            redirect_service,
            click_service,
            dashboard_service,
            authoring_service,
            allocator,
            token_verifier,
        }
    }
}
