//! DTO for the health endpoint.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
}
