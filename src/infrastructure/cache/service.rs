//! Cache driver trait and the typed JSON wrapper over it.

use crate::error::AppError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Literal value stored for invalidation flags.
const FLAG_VALUE: &str = "1";

/// Raw string-valued cache driver.
///
/// `get` distinguishes a bona fide miss (`Ok(None)`) from an infrastructure
/// fault (`Err` with kind `CACHE_ERROR` wrapping the underlying cause).
/// Operations never retry internally; callers decide how to degrade.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Resets the TTL of an existing key. A missing key is not an error.
    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<(), AppError>;

    /// Liveness probe for health reporting.
    async fn ping(&self) -> bool;
}

/// Typed cache over a [`CacheBackend`], encoding values as JSON.
///
/// Cheap to clone; shares the backend through an `Arc`.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Fetches and decodes a value. `Ok(None)` is a miss; a backend fault
    /// or an undecodable payload is a `CACHE_ERROR`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.backend.get(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).map_err(|e| {
                    AppError::cache("failed to decode cached value")
                        .with_context("key", key)
                        .wrap(e)
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), AppError> {
        let raw = serde_json::to_string(value).map_err(|e| {
            AppError::cache("failed to encode value")
                .with_context("key", key)
                .wrap(e)
        })?;
        self.backend.set(key, raw, ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.backend.delete(key).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, AppError> {
        self.backend.exists(key).await
    }

    pub async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<(), AppError> {
        self.backend.refresh_ttl(key, ttl).await
    }

    /// Stores the literal `"1"` marker under `key`.
    ///
    /// The flag's only consumer interprets presence, not content.
    pub async fn set_invalidation_flag(&self, key: &str, ttl: Duration) -> Result<(), AppError> {
        self.backend.set(key, FLAG_VALUE.to_string(), ttl).await
    }

    pub async fn ping(&self) -> bool {
        self.backend.ping().await
    }
}
