//! PostgreSQL implementation of the click event repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Append-only click event storage. No unique constraints, no updates.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert(&self, event: &ClickEvent) -> Result<(), AppError> {
        let geo = event.geo.as_ref();

        sqlx::query(
            r#"
            INSERT INTO click_events (
                clicked_at, short_code, ip_address_hash,
                user_agent, referrer_url, referrer_domain,
                device_type, browser_name, browser_version,
                os_name, os_version, is_bot,
                country_code, city, region, lat, lon
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(event.clicked_at)
        .bind(&event.short_code)
        .bind(&event.ip_address_hash)
        .bind(&event.user_agent)
        .bind(&event.referrer_url)
        .bind(&event.referrer_domain)
        .bind(event.device_type.as_str())
        .bind(&event.browser_name)
        .bind(&event.browser_version)
        .bind(&event.os_name)
        .bind(&event.os_version)
        .bind(event.is_bot)
        .bind(geo.map(|g| g.country_code.clone()))
        .bind(geo.map(|g| g.city.clone()))
        .bind(geo.map(|g| g.region.clone()))
        .bind(geo.map(|g| g.lat))
        .bind(geo.map(|g| g.lon))
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from(e).with_context("shortCode", event.short_code.clone()))?;

        Ok(())
    }
}
