//! DTO for the dashboard endpoint.

use crate::domain::entities::{DashboardResponse, StatLink, TopLink};
use serde::Serialize;

/// Payload of `GET /api/dashboard`.
///
/// `limited` is the caller-visible advisory set when the analytics service
/// answered with a rate-limited reply.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub total_link: i64,
    pub total_click: i64,
    pub uniq_visitors: i64,
    pub top_links: Vec<TopLink>,
    pub stat_links: Vec<StatLink>,
    pub limited: bool,
}

impl From<DashboardResponse> for DashboardData {
    fn from(response: DashboardResponse) -> Self {
        let limited = response.is_limited();
        Self {
            total_link: response.total_links,
            total_click: response.total_clicks,
            uniq_visitors: response.uniq_visitors,
            top_links: response.top_links,
            stat_links: response.stat_links,
            limited,
        }
    }
}
