//! Repository trait for link persistence.

use crate::domain::entities::{Link, LinkProjection, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Authoritative store for [`Link`] records.
///
/// Uniqueness of `short_code` among live links is enforced by the store
/// itself; the allocator relies on `insert` surfacing duplicate keys as a
/// typed collision (`CUSTOM_ALIAS_TAKEN`) rather than probing first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link and returns the persisted record with
    /// store-assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// - [`crate::error::ErrorKind::CustomAliasTaken`] when the short code
    ///   already exists among non-deleted links
    /// - [`crate::error::ErrorKind::DatabaseError`] on other store failures
    async fn insert(&self, link: NewLink) -> Result<Link, AppError>;

    /// Resolves a short code to its hot-path projection.
    ///
    /// The query filters on `(short_code, is_deleted = false)` and projects
    /// only the four projection fields. Liveness is checked in memory after
    /// the fetch so callers can distinguish "no such code" from "exists but
    /// dead":
    ///
    /// - missing row → [`crate::error::ErrorKind::UrlNotFound`]
    /// - `!is_active` → [`crate::error::ErrorKind::UrlInactive`]
    /// - expired → [`crate::error::ErrorKind::UrlExpired`]
    async fn find_projection(&self, short_code: &str) -> Result<LinkProjection, AppError>;

    /// Atomically increments the click counter and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// [`crate::error::ErrorKind::UrlNotFound`] when no live link matches.
    async fn increment_click_count(&self, short_code: &str) -> Result<(), AppError>;

    /// Uniqueness probe: does a live link with this code exist?
    async fn exists(&self, short_code: &str) -> Result<bool, AppError>;
}
