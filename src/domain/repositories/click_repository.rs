//! Repository trait for click event persistence.

use crate::domain::entities::ClickEvent;
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only store for enriched click events.
///
/// Click tracking is best-effort: callers log insertion failures and never
/// propagate them back to the request path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    async fn insert(&self, event: &ClickEvent) -> Result<(), AppError>;
}
