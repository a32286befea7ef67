//! Redis-backed cache driver.

use super::service::CacheBackend;
use crate::error::AppError;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Redis implementation of [`CacheBackend`].
///
/// Uses `ConnectionManager` for multiplexed connection reuse. Faults are
/// surfaced as `CACHE_ERROR`; callers on the hot path degrade to a store
/// read instead of failing the request.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::cache("invalid redis url").wrap(e))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::cache("failed to connect to redis").wrap(e))?;

        let mut probe = manager.clone();
        redis::cmd("PING")
            .query_async::<()>(&mut probe)
            .await
            .map_err(|e| AppError::cache("redis ping failed").wrap(e))?;

        info!("Connected to Redis");

        Ok(Self { conn: manager })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            AppError::cache("redis get failed")
                .with_context("key", key)
                .wrap(e)
        })?;

        match &value {
            Some(_) => debug!(key, "cache hit"),
            None => debug!(key, "cache miss"),
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(|e| {
                AppError::cache("redis set failed")
                    .with_context("key", key)
                    .wrap(e)
            })?;
        debug!(key, ttl_secs = ttl.as_secs(), "cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(|e| {
            AppError::cache("redis del failed")
                .with_context("key", key)
                .wrap(e)
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        conn.exists(key).await.map_err(|e| {
            AppError::cache("redis exists failed")
                .with_context("key", key)
                .wrap(e)
        })
    }

    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        conn.expire::<_, ()>(key, ttl.as_secs() as i64)
            .await
            .map_err(|e| {
                AppError::cache("redis expire failed")
                    .with_context("key", key)
                    .wrap(e)
            })
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .is_ok()
    }
}
