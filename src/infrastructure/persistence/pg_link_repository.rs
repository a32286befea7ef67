//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Link, LinkProjection, NewLink, UrlMetadata};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link storage over a shared connection pool.
///
/// Uniqueness among live links comes from the partial unique index
/// `links_short_code_key` (`WHERE NOT is_deleted`); duplicate-key failures
/// are mapped to the collision kind by the `sqlx::Error` conversion.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    original_url: String,
    custom_alias: Option<String>,
    owner_id: i64,
    click_count: i64,
    is_active: bool,
    is_deleted: bool,
    expires_at: Option<DateTime<Utc>>,
    title: Option<String>,
    description: Option<String>,
    metadata_domain: Option<String>,
    metadata_protocol: Option<String>,
    metadata_path: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            short_code: row.short_code,
            original_url: row.original_url,
            custom_alias: row.custom_alias,
            owner_id: row.owner_id,
            click_count: row.click_count,
            is_active: row.is_active,
            is_deleted: row.is_deleted,
            expires_at: row.expires_at,
            title: row.title,
            description: row.description,
            metadata: UrlMetadata {
                domain: row.metadata_domain.unwrap_or_default(),
                protocol: row.metadata_protocol.unwrap_or_default(),
                path: row.metadata_path.unwrap_or_default(),
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ProjectionRow {
    original_url: String,
    is_active: bool,
    owner_id: i64,
    expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (
                short_code, original_url, custom_alias, owner_id,
                is_active, expires_at, title, description,
                metadata_domain, metadata_protocol, metadata_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING
                id, short_code, original_url, custom_alias, owner_id,
                click_count, is_active, is_deleted, expires_at,
                title, description,
                metadata_domain, metadata_protocol, metadata_path,
                created_at, updated_at
            "#,
        )
        .bind(&link.short_code)
        .bind(&link.original_url)
        .bind(&link.custom_alias)
        .bind(link.owner_id)
        .bind(link.is_active)
        .bind(link.expires_at)
        .bind(&link.title)
        .bind(&link.description)
        .bind(&link.metadata.domain)
        .bind(&link.metadata.protocol)
        .bind(&link.metadata.path)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from(e).with_context("shortCode", link.short_code.clone()))?;

        Ok(row.into())
    }

    async fn find_projection(&self, short_code: &str) -> Result<LinkProjection, AppError> {
        let row = sqlx::query_as::<_, ProjectionRow>(
            r#"
            SELECT original_url, is_active, owner_id, expires_at
            FROM links
            WHERE short_code = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from(e).with_context("shortCode", short_code))?;

        let row = row.ok_or_else(|| {
            AppError::url_not_found().with_context("shortCode", short_code)
        })?;

        // Liveness is checked here rather than in the query so that a dead
        // link is distinguishable from a missing one.
        if !row.is_active {
            return Err(AppError::url_inactive().with_context("shortCode", short_code));
        }

        if let Some(expires_at) = row.expires_at {
            if expires_at < Utc::now() {
                return Err(AppError::url_expired().with_context("shortCode", short_code));
            }
        }

        Ok(LinkProjection {
            original_url: row.original_url,
            is_active: row.is_active,
            owner_id: row.owner_id,
            expires_at: row.expires_at,
        })
    }

    async fn increment_click_count(&self, short_code: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET click_count = click_count + 1, updated_at = now()
            WHERE short_code = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(short_code)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from(e).with_context("shortCode", short_code))?;

        if result.rows_affected() == 0 {
            return Err(AppError::url_not_found().with_context("shortCode", short_code));
        }

        Ok(())
    }

    async fn exists(&self, short_code: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM links WHERE short_code = $1 AND is_deleted = FALSE)",
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from(e).with_context("shortCode", short_code))?;

        Ok(exists)
    }
}
