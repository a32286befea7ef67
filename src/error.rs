//! Application error catalogue.
//!
//! Every error that crosses a component boundary is an [`AppError`] built
//! from one of the closed set of [`ErrorKind`]s. An error carries a stable
//! public code, a public message, a private detail (logged, never returned
//! to clients), an HTTP status, and a structured metadata map.
//!
//! Native driver errors are wrapped at the boundary closest to the cause:
//! the store wraps [`sqlx::Error`] as `DATABASE_ERROR`, the cache driver
//! wraps its failures as `CACHE_ERROR`, the broker as `QUEUE_ERROR`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Closed set of error kinds. Each kind fixes the public code string and
/// the HTTP status used when the error reaches the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UrlNotFound,
    UrlExpired,
    UrlInactive,
    Unauthorized,
    TokenExpired,
    InvalidToken,
    InvalidSigningKey,
    Forbidden,
    InvalidInput,
    MissingRequiredField,
    InvalidFormat,
    CustomAliasTaken,
    DatabaseError,
    CacheError,
    QueueError,
    ExternalServiceError,
    RequestTimeout,
    ServiceUnavailable,
    RateLimitExceeded,
    InternalServerError,
}

impl ErrorKind {
    /// Stable public code string, returned in response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UrlNotFound => "URL_NOT_FOUND",
            Self::UrlExpired => "URL_EXPIRED",
            Self::UrlInactive => "URL_INACTIVE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidSigningKey => "INVALID_SIGNING_KEY",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidInput => "INVALID_INPUT",
            Self::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::CustomAliasTaken => "CUSTOM_ALIAS_TAKEN",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::CacheError => "CACHE_ERROR",
            Self::QueueError => "QUEUE_ERROR",
            Self::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            Self::RequestTimeout => "REQUEST_TIMEOUT",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status declared by the kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UrlNotFound => StatusCode::NOT_FOUND,
            Self::UrlExpired => StatusCode::GONE,
            Self::UrlInactive | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unauthorized
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::InvalidSigningKey => StatusCode::UNAUTHORIZED,
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidFormat
            | Self::CustomAliasTaken => StatusCode::BAD_REQUEST,
            Self::DatabaseError | Self::CacheError | Self::QueueError
            | Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExternalServiceError | Self::ServiceUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn default_message(&self) -> &'static str {
        match self {
            Self::UrlNotFound => "The short URL you're looking for does not exist",
            Self::UrlExpired => "This short URL has expired",
            Self::UrlInactive => "This short URL is currently inactive",
            Self::Unauthorized => "Authentication required",
            Self::TokenExpired => "Your session has expired. Please log in again",
            Self::InvalidToken => "Invalid authentication token",
            Self::InvalidSigningKey => "Authentication system error",
            Self::Forbidden => "You don't have permission to access this resource",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "Required field is missing",
            Self::InvalidFormat => "The provided data format is invalid",
            Self::CustomAliasTaken => "This custom alias is already taken",
            Self::DatabaseError => "A database error occurred. Please try again later",
            Self::CacheError => "A caching error occurred",
            Self::QueueError => "A messaging queue error occurred",
            Self::ExternalServiceError => "An external service error occurred",
            Self::RequestTimeout => "Request timed out. Please try again",
            Self::ServiceUnavailable => "Service is temporarily unavailable. Please try again later",
            Self::RateLimitExceeded => "Too many requests. Please try again later",
            Self::InternalServerError => "An unexpected error occurred. Please try again later",
        }
    }

    fn default_detail(&self) -> &'static str {
        match self {
            Self::UrlNotFound => "url not found in database",
            Self::UrlExpired => "url expiration date has passed",
            Self::UrlInactive => "url is marked as inactive",
            Self::Unauthorized => "missing or invalid authentication token",
            Self::TokenExpired => "jwt token has expired",
            Self::InvalidToken => "jwt token validation failed",
            Self::InvalidSigningKey => "jwt signing key validation failed",
            Self::Forbidden => "insufficient permissions",
            Self::InvalidInput => "input validation failed",
            Self::MissingRequiredField => "required field validation failed",
            Self::InvalidFormat => "data format validation failed",
            Self::CustomAliasTaken => "short code already exists among live links",
            Self::DatabaseError => "database operation failed",
            Self::CacheError => "cache operation failed",
            Self::QueueError => "broker operation failed",
            Self::ExternalServiceError => "external API call failed",
            Self::RequestTimeout => "operation timeout",
            Self::ServiceUnavailable => "service unavailable",
            Self::RateLimitExceeded => "rate limit exceeded",
            Self::InternalServerError => "internal server error",
        }
    }
}

/// A catalogued application error.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    detail: String,
    metadata: Map<String, Value>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Creates an error of the given kind with its default message and detail.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            detail: kind.default_detail().to_string(),
            metadata: Map::new(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Public code string of the underlying kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Private detail. Reachable only through server-side logs.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Attaches an underlying cause, kept private for logging.
    pub fn wrap<E>(mut self, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(err));
        self
    }

    /// Adds a structured metadata entry.
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Replaces the public message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Replaces the private detail.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn url_not_found() -> Self {
        Self::new(ErrorKind::UrlNotFound)
    }

    pub fn url_expired() -> Self {
        Self::new(ErrorKind::UrlExpired)
    }

    pub fn url_inactive() -> Self {
        Self::new(ErrorKind::UrlInactive)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorKind::Forbidden)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput).with_message(message)
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFormat).with_message(message)
    }

    pub fn custom_alias_taken() -> Self {
        Self::new(ErrorKind::CustomAliasTaken)
    }

    pub fn database(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::DatabaseError).with_detail(detail)
    }

    pub fn cache(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::CacheError).with_detail(detail)
    }

    pub fn queue(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::QueueError).with_detail(detail)
    }

    pub fn external_service(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalServiceError).with_detail(detail)
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestTimeout).with_detail(detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalServerError).with_detail(detail)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{}: {} ({})", self.kind.code(), self.detail, src),
            None => write!(f, "{}: {}", self.kind.code(), self.detail),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or("").to_string();
                return AppError::custom_alias_taken()
                    .with_context("constraint", constraint)
                    .wrap(e);
            }
        }
        AppError::new(ErrorKind::DatabaseError).wrap(e)
    }
}

/// Error payload embedded in the response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    success: bool,
    message: String,
    error: ErrorBody,
    timestamp: chrono::DateTime<Utc>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let body = ErrorEnvelope {
            success: false,
            message: self.message.clone(),
            error: ErrorBody {
                code: self.kind.code(),
                message: self.message,
                metadata: self.metadata,
            },
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}
