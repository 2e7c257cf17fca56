//! Campaigns: a sequence template sent to a lead list

use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub schedule_at: Option<String>,
    /// draft, scheduled, active, ...
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_at: Option<String>,
}

impl ApiClient {
    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>, ApiError> {
        self.get("/campaigns/").await
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Campaign, ApiError> {
        self.get(&format!("/campaigns/{}", id)).await
    }

    pub async fn create_campaign(&self, campaign: &CampaignInput) -> Result<Campaign, ApiError> {
        self.post("/campaigns/", campaign).await
    }

    pub async fn update_campaign(
        &self,
        id: &str,
        campaign: &CampaignInput,
    ) -> Result<Campaign, ApiError> {
        self.patch(&format!("/campaigns/{}", id), campaign).await
    }

    pub async fn delete_campaign(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/campaigns/{}", id)).await
    }
}
