//! Sender identities (the "from" mailboxes)

use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    #[serde(default, alias = "display_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Max sends per day
    #[serde(default)]
    pub daily_quota: Option<u32>,
}

impl Sender {
    /// `Name <email>`, or whichever half is known
    pub fn label(&self) -> String {
        match (self.name.as_deref(), self.email.as_deref()) {
            (Some(name), Some(email)) if !name.is_empty() => format!("{} <{}>", name, email),
            (_, Some(email)) => email.to_string(),
            (Some(name), None) => name.to_string(),
            (None, None) => self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SenderInput {
    #[serde(rename = "display_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_quota: Option<u32>,
}

impl ApiClient {
    pub async fn list_senders(&self) -> Result<Vec<Sender>, ApiError> {
        self.get("/senders/").await
    }

    pub async fn create_sender(&self, sender: &SenderInput) -> Result<Sender, ApiError> {
        self.post("/senders/", sender).await
    }

    pub async fn update_sender(&self, id: &str, sender: &SenderInput) -> Result<Sender, ApiError> {
        self.patch(&format!("/senders/{}", id), sender).await
    }

    pub async fn delete_sender(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/senders/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_reads_display_name() {
        let sender: Sender = serde_json::from_str(
            r#"{"id":"s1","display_name":"Ann","email":"ann@x.io","daily_quota":40}"#,
        )
        .unwrap();
        assert_eq!(sender.label(), "Ann <ann@x.io>");
        assert_eq!(sender.daily_quota, Some(40));
    }

    #[test]
    fn test_label_fallbacks() {
        let sender = Sender {
            id: "s2".to_string(),
            name: None,
            email: None,
            daily_quota: None,
        };
        assert_eq!(sender.label(), "s2");
    }
}
