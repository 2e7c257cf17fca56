//! Reply inbox, read straight from the `inbox_emails` table

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::BaasClient;
use crate::api::ApiError;

const TABLE: &str = "/rest/v1/inbox_emails";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxEmail {
    pub id: String,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub recipient_email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, alias = "full_body")]
    pub body: Option<String>,
    #[serde(default)]
    pub body_preview: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub received_at: Option<String>,
}

impl InboxEmail {
    /// Short text for list rows
    pub fn preview(&self) -> &str {
        self.body_preview
            .as_deref()
            .or(self.body.as_deref())
            .unwrap_or("")
    }
}

#[derive(Deserialize)]
struct RecipientRow {
    recipient_email: String,
}

#[derive(Serialize)]
struct ReadFlag {
    is_read: bool,
}

impl BaasClient {
    /// All inbox mail, newest first
    pub async fn list_inbox(&self) -> Result<Vec<InboxEmail>, ApiError> {
        self.send(self.request(
            Method::GET,
            &format!("{}?select=*&order=received_at.desc", TABLE),
        ))
        .await
    }

    /// Distinct mailboxes that received replies, sorted
    pub async fn inbox_recipients(&self) -> Result<Vec<String>, ApiError> {
        let rows: Vec<RecipientRow> = self
            .send(self.request(
                Method::GET,
                &format!("{}?select=recipient_email&order=recipient_email", TABLE),
            ))
            .await?;
        Ok(unique_recipients(rows.into_iter().map(|r| r.recipient_email)))
    }

    pub async fn set_inbox_read(&self, email_id: &str, is_read: bool) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .send(
                self.request(Method::PATCH, &format!("{}?id=eq.{}", TABLE, email_id))
                    .json(&ReadFlag { is_read }),
            )
            .await?;
        Ok(())
    }
}

fn unique_recipients(rows: impl Iterator<Item = String>) -> Vec<String> {
    let mut recipients: Vec<String> = rows.collect();
    recipients.sort();
    recipients.dedup();
    recipients
}
