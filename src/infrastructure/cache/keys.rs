//! Cache key derivation.
//!
//! Every cached entity family derives its key here, in the form
//! `{app_prefix}:{family}:{id}`. Nothing else in the codebase builds key
//! strings by hand.

/// Deterministic key namer for all cached entity families.
#[derive(Debug, Clone)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    /// The prefix defaults to the service name when empty.
    pub fn new(app_name: &str) -> Self {
        let prefix = if app_name.is_empty() {
            "repath".to_string()
        } else {
            app_name.to_string()
        };
        Self { prefix }
    }

    /// Hot-path URL projection: `{prefix}:url:{shortCode}`.
    pub fn url(&self, short_code: &str) -> String {
        format!("{}:url:{}", self.prefix, short_code)
    }

    /// Dashboard payload: `{prefix}:dashboard:{ownerId}`.
    pub fn dashboard(&self, owner_id: i64) -> String {
        format!("{}:dashboard:{}", self.prefix, owner_id)
    }

    /// Dashboard invalidation flag: `{prefix}:dashboard_invalid:{ownerId}`.
    pub fn dashboard_invalidation_flag(&self, owner_id: i64) -> String {
        format!("{}:dashboard_invalid:{}", self.prefix, owner_id)
    }

    /// Geo-IP lookup: `{prefix}:geoip:{ip}`.
    pub fn geoip(&self, ip: &str) -> String {
        format!("{}:geoip:{}", self.prefix, ip)
    }
}
