//! Link authoring: validation, code reservation, composition, persistence.

use crate::domain::entities::{Link, NewLink, UrlMetadata};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;
use chrono::{Duration as ChronoDuration, Utc};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use url::Url;

use super::code_allocator::CodeAllocator;

static CUSTOM_ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,20}$").expect("valid alias regex"));

/// Fields accepted when minting a new link.
#[derive(Debug, Clone, Default)]
pub struct CreateLinkInput {
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Creates and owns [`Link`] records.
///
/// Custom aliases bypass the allocator entirely; their uniqueness is
/// enforced by the insert itself.
pub struct AuthoringService {
    repo: Arc<dyn LinkRepository>,
    allocator: Arc<CodeAllocator>,
    default_ttl_days: i64,
}

impl AuthoringService {
    pub fn new(
        repo: Arc<dyn LinkRepository>,
        allocator: Arc<CodeAllocator>,
        default_ttl_days: i64,
    ) -> Self {
        Self {
            repo,
            allocator,
            default_ttl_days,
        }
    }

    /// Creates a link for `owner_id` and returns the persisted record.
    ///
    /// # Errors
    ///
    /// - `INVALID_FORMAT` for an unparseable URL or a malformed alias
    /// - `CUSTOM_ALIAS_TAKEN` when the requested alias is already live
    /// - `INVALID_INPUT` when the allocator exhausts its retries
    pub async fn create(&self, input: CreateLinkInput, owner_id: i64) -> Result<Link, AppError> {
        let normalized = normalize_url(&input.original_url).map_err(|e| {
            AppError::invalid_format("Invalid URL format")
                .with_detail(e.to_string())
                .with_context("originalUrl", input.original_url.clone())
        })?;

        let template = NewLink {
            short_code: String::new(),
            original_url: normalized.clone(),
            custom_alias: input.custom_alias.clone(),
            owner_id,
            is_active: true,
            expires_at: Some(Utc::now() + ChronoDuration::hours(24 * self.default_ttl_days)),
            title: input.title,
            description: input.description,
            metadata: derive_metadata(&normalized),
        };

        match input.custom_alias {
            Some(alias) => {
                if !CUSTOM_ALIAS_REGEX.is_match(&alias) {
                    return Err(AppError::invalid_format(
                        "Custom alias must be 3-20 characters of letters, digits, '_' or '-'",
                    )
                    .with_context("customAlias", alias));
                }

                let mut link = template;
                link.short_code = alias;
                self.repo.insert(link).await
            }
            None => self.allocator.allocate(template).await,
        }
    }
}

fn derive_metadata(normalized_url: &str) -> UrlMetadata {
    match Url::parse(normalized_url) {
        Ok(url) => UrlMetadata {
            domain: url.host_str().unwrap_or_default().to_string(),
            protocol: url.scheme().to_string(),
            path: url.path().to_string(),
        },
        Err(_) => UrlMetadata::default(),
    }
}
