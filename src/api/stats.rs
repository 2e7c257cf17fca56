//! Dashboard statistics

use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsOverview {
    #[serde(default)]
    pub leads: u64,
    #[serde(default)]
    pub campaigns: u64,
    #[serde(default)]
    pub active_campaigns: u64,
    #[serde(default)]
    pub opens: u64,
    #[serde(default)]
    pub replies: u64,
    /// Fractions in 0.0..=1.0
    #[serde(default)]
    pub open_rate: f64,
    #[serde(default)]
    pub reply_rate: f64,
    #[serde(default)]
    pub delivery_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: String,
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub opens: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub replies: u64,
}

impl ApiClient {
    pub async fn stats_overview(&self) -> Result<StatsOverview, ApiError> {
        self.get("/stats/overview/").await
    }

    /// Daily series, `range` like `30d`
    pub async fn stats_daily(&self, range: &str) -> Result<Vec<DailyStat>, ApiError> {
        self.get(&format!("/stats/daily/?range={}", range)).await
    }
}
