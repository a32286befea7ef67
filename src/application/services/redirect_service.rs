//! Redirect resolution: the read hot path.
//!
//! Read-through cache over the link projection. Every successful resolve
//! also drops the owner's dashboard invalidation flag into the cache; the
//! dashboard service is the only consumer of that flag, which keeps
//! invalidation unidirectional (the redirect side never needs to know the
//! shape of dashboard keys beyond the flag).

use crate::domain::entities::LinkProjection;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{Cache, CacheKeys};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct RedirectService {
    repo: Arc<dyn LinkRepository>,
    cache: Cache,
    keys: CacheKeys,
    cache_ttl: Duration,
    flag_ttl: Duration,
}

impl RedirectService {
    pub fn new(
        repo: Arc<dyn LinkRepository>,
        cache: Cache,
        keys: CacheKeys,
        cache_ttl: Duration,
        flag_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            keys,
            cache_ttl,
            flag_ttl,
        }
    }

    /// Resolves a short code to its hot-path projection.
    ///
    /// Cache faults degrade to a store read; dead links are never
    /// negatively cached, so `URL_NOT_FOUND` / `URL_INACTIVE` /
    /// `URL_EXPIRED` always come from the store.
    pub async fn get_url(&self, short_code: &str) -> Result<LinkProjection, AppError> {
        let key = self.keys.url(short_code);

        match self.cache.get::<LinkProjection>(&key).await {
            Ok(Some(projection)) => {
                debug!(short_code, "cache hit");
                metrics::counter!("redirect_cache_hits_total").increment(1);

                if let Err(e) = self.cache.refresh_ttl(&key, self.cache_ttl).await {
                    warn!(error = %e, %key, "failed to refresh url cache ttl");
                }
                self.flag_dashboard_stale(projection.owner_id).await;
                return Ok(projection);
            }
            Ok(None) => {
                debug!(short_code, "cache miss");
                metrics::counter!("redirect_cache_misses_total").increment(1);
            }
            Err(e) => {
                warn!(error = %e, short_code, "cache read failed, falling back to store");
            }
        }

        let projection = self.repo.find_projection(short_code).await?;

        if let Err(e) = self.cache.set(&key, &projection, self.cache_ttl).await {
            warn!(error = %e, %key, "failed to cache url projection");
        }
        self.flag_dashboard_stale(projection.owner_id).await;

        Ok(projection)
    }

    /// Pass-through to the store's atomic counter, used by click ingestion.
    pub async fn increment_click_count(&self, short_code: &str) -> Result<(), AppError> {
        self.repo.increment_click_count(short_code).await
    }

    /// Marks the owner's dashboard as stale. The flag does not block the
    /// redirect; failures are logged and absorbed.
    async fn flag_dashboard_stale(&self, owner_id: i64) {
        let flag = self.keys.dashboard_invalidation_flag(owner_id);
        if let Err(e) = self.cache.set_invalidation_flag(&flag, self.flag_ttl).await {
            warn!(error = %e, owner_id, "failed to set dashboard invalidation flag");
        }
    }
}
