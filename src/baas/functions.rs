//! Serverless function calls

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::BaasClient;
use crate::api::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarImportReport {
    #[serde(default)]
    pub success: bool,
    /// Files uploaded
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub duplicates: u32,
    /// `"<file>: <reason>"` per failed entry
    #[serde(default)]
    pub errors: Vec<String>,
}

impl AvatarImportReport {
    /// One-line result; partial failures are reported, not raised
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Uploaded {} avatar(s), {} duplicate(s) skipped",
            self.count, self.duplicates
        );
        if !self.errors.is_empty() {
            line.push_str(&format!(", {} failed", self.errors.len()));
        }
        line
    }

    pub fn has_failures(&self) -> bool {
        !self.success || !self.errors.is_empty()
    }
}

impl BaasClient {
    /// Upload a ZIP whose `avatars/` entries become lead images
    pub async fn import_avatars(&self, zip: Vec<u8>) -> Result<AvatarImportReport, ApiError> {
        let size = zip.len();
        let report: AvatarImportReport = self
            .send(
                self.request(Method::POST, "/functions/v1/import_avatars")
                    .header(reqwest::header::CONTENT_TYPE, "application/zip")
                    .body(zip),
            )
            .await?;
        tracing::info!(
            bytes = size,
            uploaded = report.count,
            duplicates = report.duplicates,
            failed = report.errors.len(),
            "Avatar import finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_mentions_failures() {
        let report = AvatarImportReport {
            success: true,
            count: 4,
            duplicates: 1,
            errors: vec!["avatars/x.png: too large".to_string()],
        };
        assert_eq!(
            report.summary(),
            "Uploaded 4 avatar(s), 1 duplicate(s) skipped, 1 failed"
        );
        assert!(report.has_failures());
    }

    #[test]
    fn test_clean_report() {
        let report: AvatarImportReport =
            serde_json::from_str(r#"{"success":true,"count":2,"duplicates":0,"errors":[]}"#)
                .unwrap();
        assert!(!report.has_failures());
    }
}
