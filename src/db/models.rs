//! Database model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account with a plan tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub plan: String,
}

/// A monitored endpoint with a public status page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
    pub id: i64,
    pub account_id: i64,
    pub app_name: String,
    pub slug: String,
    pub health_url: String,
    /// Owner-set default theme for the status page.
    pub theme: String,
    pub alerts_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            id: 0,
            account_id: 0,
            app_name: String::new(),
            slug: String::new(),
            health_url: String::new(),
            theme: "cyberpunk".to_string(),
            alerts_enabled: true,
            created_at: Utc::now(),
        }
    }
}

/// One day of stored uptime counts for a monitor.
///
/// Written by the external health-check pipeline; only days with at least
/// one check get a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyUptimeRow {
    pub monitor_id: i64,
    pub date: chrono::NaiveDate,
    pub total_checks: i64,
    pub successful_checks: i64,
}

/// Last known live check result for a monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStatus {
    pub monitor_id: i64,
    pub status_code: u16,
    pub checked_at: DateTime<Utc>,
    /// Days until the TLS certificate expires; None for plain-HTTP
    /// endpoints or when the SSL checker has not run yet.
    pub ssl_days_remaining: Option<i64>,
}
