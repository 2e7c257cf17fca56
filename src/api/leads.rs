//! Leads, lead lists and CSV import

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::client::{ApiClient, SERVICE_NAME};
use super::error::ApiError;
use super::Page;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub email: String,
    /// Company name
    #[serde(default)]
    pub bedrijf: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    /// Avatar path in object storage
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Lead {
    /// Display value for a lead table column
    pub fn column_value(&self, key: &str) -> &str {
        let value = match key {
            "id" => Some(self.id.as_str()),
            "email" => Some(self.email.as_str()),
            "bedrijf" => self.bedrijf.as_deref(),
            "website" => self.website.as_deref(),
            "linkedin" => self.linkedin.as_deref(),
            "image_path" => self.image_path.as_deref(),
            "created_at" => self.created_at.as_deref(),
            _ => None,
        };
        value.unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LeadInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrijf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadList {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lead_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeadImportSummary {
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ApiClient {
    pub async fn list_leads(&self, page: u32, size: u32) -> Result<Page<Lead>, ApiError> {
        self.get(&format!("/leads/?page={}&size={}", page, size))
            .await
    }

    pub async fn get_lead(&self, id: &str) -> Result<Lead, ApiError> {
        self.get(&format!("/leads/{}", id)).await
    }

    pub async fn create_lead(&self, lead: &LeadInput) -> Result<Lead, ApiError> {
        self.post("/leads/", lead).await
    }

    pub async fn update_lead(&self, id: &str, lead: &LeadInput) -> Result<Lead, ApiError> {
        self.patch(&format!("/leads/{}", id), lead).await
    }

    pub async fn delete_lead(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/leads/{}", id)).await
    }

    pub async fn list_lead_lists(&self) -> Result<Vec<LeadList>, ApiError> {
        self.get("/leads/lists/").await
    }

    /// Upload a CSV of leads, optionally into a new named list
    pub async fn import_leads(
        &self,
        file: &Path,
        list_name: Option<&str>,
    ) -> Result<LeadImportSummary, ApiError> {
        let bytes = tokio::fs::read(file).await.map_err(|e| {
            ApiError::network(SERVICE_NAME, format!("reading {}: {}", file.display(), e))
        })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "leads.csv".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")
            .map_err(|e| ApiError::parse(SERVICE_NAME, e.to_string()))?;
        let mut form = Form::new().part("file", part);
        if let Some(name) = list_name.filter(|n| !n.trim().is_empty()) {
            form = form.text("list_name", name.trim().to_string());
        }

        let summary: LeadImportSummary = self.post_multipart("/leads/import/", form).await?;
        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Imported leads"
        );
        Ok(summary)
    }
}
