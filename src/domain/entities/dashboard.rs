//! Dashboard RPC contract shared with the external analytics service.

use serde::{Deserialize, Serialize};

/// RPC request published to the dashboard queue.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardRequest {
    pub user_id: i64,
}

impl DashboardRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.user_id <= 0 {
            return Err("user_id must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// One of the owner's most-clicked links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLink {
    pub short_url: String,
    #[serde(default)]
    pub original_url: String,
    pub clicks: i64,
    #[serde(default)]
    pub status: String,
}

/// Per-day click totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLink {
    pub date: String,
    pub clicks: i64,
}

/// A recent click, present in some analytics replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentClick {
    pub short_code: String,
    pub clicked_at: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub browser_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

/// RPC reply produced by the analytics service.
///
/// `status` is one of `success`, `error`, `limited`; the analytics service
/// is the sole producer of these transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub user_id: i64,
    #[serde(default)]
    pub total_clicks: i64,
    #[serde(default)]
    pub total_links: i64,
    #[serde(default)]
    pub uniq_visitors: i64,
    #[serde(default)]
    pub top_links: Vec<TopLink>,
    #[serde(default)]
    pub stat_links: Vec<StatLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_clicks: Option<Vec<RecentClick>>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DashboardResponse {
    /// Checks the reply against the wire contract.
    pub fn validate(&self) -> Result<(), String> {
        if self.total_clicks < 0 {
            return Err(format!("invalid total_clicks: {}", self.total_clicks));
        }
        if self.total_links < 0 {
            return Err(format!("invalid total_links: {}", self.total_links));
        }
        if self.uniq_visitors < 0 {
            return Err(format!("invalid uniq_visitors: {}", self.uniq_visitors));
        }
        if !matches!(self.status.as_str(), "success" | "error" | "limited") {
            return Err(format!("invalid status: {}", self.status));
        }
        if self.top_links.len() > 5 {
            return Err(format!("top_links exceeds limit: {}", self.top_links.len()));
        }
        if let Some(recent) = &self.recent_clicks {
            if recent.len() > 10 {
                return Err(format!("recent_clicks exceeds limit: {}", recent.len()));
            }
        }
        Ok(())
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }

    pub fn is_limited(&self) -> bool {
        self.status == "limited"
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: &str) -> DashboardResponse {
        DashboardResponse {
            user_id: 42,
            total_clicks: 10,
            total_links: 3,
            uniq_visitors: 7,
            top_links: vec![],
            stat_links: vec![],
            recent_clicks: None,
            status: status.to_string(),
            message: None,
        }
    }

    #[test]
    fn test_request_validation() {
        assert!(DashboardRequest { user_id: 1 }.validate().is_ok());
        assert!(DashboardRequest { user_id: 0 }.validate().is_err());
        assert!(DashboardRequest { user_id: -5 }.validate().is_err());
    }

    #[test]
    fn test_response_status_set() {
        assert!(sample("success").validate().is_ok());
        assert!(sample("limited").validate().is_ok());
        assert!(sample("error").validate().is_ok());
        assert!(sample("degraded").validate().is_err());
    }

    #[test]
    fn test_response_limits() {
        let mut resp = sample("success");
        resp.top_links = (0..6)
            .map(|i| TopLink {
                short_url: format!("s{i}"),
                original_url: String::new(),
                clicks: i,
                status: "active".to_string(),
            })
            .collect();
        assert!(resp.validate().is_err());
    }

    #[test]
    fn test_reply_wire_format() {
        let raw = r#"{
            "user_id": 42,
            "total_clicks": 100,
            "total_links": 5,
            "uniq_visitors": 61,
            "top_links": [{"short_url": "abc123", "original_url": "https://example.com", "clicks": 40, "status": "active"}],
            "stat_links": [{"date": "2026-07-01", "clicks": 12}],
            "status": "success"
        }"#;

        let resp: DashboardResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.validate().is_ok());
        assert_eq!(resp.top_links[0].clicks, 40);
        assert_eq!(resp.stat_links[0].date, "2026-07-01");
        assert!(!resp.is_error());
        assert!(!resp.is_limited());
    }
}
