//! Short code allocation under contention.
//!
//! Uniqueness comes from the store's unique index, not from probe-then-set:
//! each attempt inserts optimistically and treats a duplicate-key failure
//! as a collision. Retries cycle through generation strategies, grow the
//! code length every third collision, and back off exponentially with
//! jitter. Collisions are counted process-locally as evidence of keyspace
//! pressure and reported by an admin endpoint.

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, ErrorKind};
use crate::utils::codegen;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_RETRY_DELAY_MS: u64 = 10;
const MAX_RETRY_DELAY_MS: u64 = 500;
const LENGTH_GROW_EVERY: u32 = 3;

/// Allocates globally unique, unguessable short codes.
pub struct CodeAllocator {
    repo: Arc<dyn LinkRepository>,
    initial_length: usize,
    max_retries: u32,
    collisions: AtomicU64,
}

impl CodeAllocator {
    pub fn new(repo: Arc<dyn LinkRepository>, initial_length: usize, max_retries: u32) -> Self {
        Self {
            repo,
            initial_length,
            max_retries,
            collisions: AtomicU64::new(0),
        }
    }

    /// Total duplicate-key collisions observed since process start.
    /// Monotonically non-decreasing.
    pub fn collision_count(&self) -> u64 {
        self.collisions.load(Ordering::Relaxed)
    }

    /// Inserts `template` under a freshly generated short code, retrying on
    /// collision.
    ///
    /// # Errors
    ///
    /// `INVALID_INPUT` ("unable to allocate") after exhausting all retries;
    /// store errors other than duplicate-key propagate immediately.
    pub async fn allocate(&self, template: NewLink) -> Result<Link, AppError> {
        let mut length = self.initial_length;

        for attempt in 0..self.max_retries {
            let mut candidate = template.clone();
            candidate.short_code = codegen::generate(attempt, length);

            match self.repo.insert(candidate).await {
                Ok(link) => {
                    if attempt > 0 {
                        self.collisions.fetch_add(attempt as u64, Ordering::Relaxed);
                        metrics::counter!("short_code_collisions_total")
                            .increment(attempt as u64);
                    }
                    return Ok(link);
                }
                Err(e) if e.kind() == ErrorKind::CustomAliasTaken => {
                    let next = attempt + 1;
                    if next % LENGTH_GROW_EVERY == 0 {
                        length += 1;
                    }
                    debug!(attempt = next, length, "short code collision, retrying");
                    tokio::time::sleep(backoff(next)).await;
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = self.max_retries,
            "short code allocation exhausted all retries"
        );
        Err(AppError::invalid_input("unable to allocate")
            .with_context("attempts", self.max_retries))
    }
}

/// Capped exponential backoff with up to 50% jitter.
fn backoff(attempt: u32) -> Duration {
    let raw = BASE_RETRY_DELAY_MS as f64 * 2f64.powi(attempt as i32);
    let jitter = rand::random::<f64>() * 0.5 * raw;
    Duration::from_millis(((raw + jitter) as u64).min(MAX_RETRY_DELAY_MS))
}
