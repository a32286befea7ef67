//! Caching layer for the redirect hot path, geo lookups, and dashboards.
//!
//! [`CacheBackend`] is the raw string-valued driver (Redis in production,
//! [`MemoryCache`] as fallback and for tests); [`Cache`] adds JSON
//! marshalling on top. [`CacheKeys`] is the single source of truth for key
//! derivation.

mod keys;
mod memory_cache;
mod redis_cache;
mod service;

pub use keys::CacheKeys;
pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
pub use service::{Cache, CacheBackend};
