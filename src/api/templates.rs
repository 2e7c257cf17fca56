//! Email templates and the sequences attached to them

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;
use super::Page;
use crate::sequence::{SequenceBackend, SequenceStep};

/// Template type used for sequence containers
pub const SEQUENCE_TEMPLATE_TYPE: &str = "sequence";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    /// HTML body
    #[serde(default, alias = "html")]
    pub content: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for creating a template
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "html", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
}

impl NewTemplate {
    pub fn sequence(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template_type: Some(SEQUENCE_TEMPLATE_TYPE.to_string()),
            ..Self::default()
        }
    }
}

/// Partial update; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "html", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplatePreview {
    pub id: String,
    #[serde(default)]
    pub html: String,
}

/// Wire shape of a template's sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequencePayload {
    #[serde(default)]
    pub steps: Vec<SequenceStep>,
}

#[derive(Serialize)]
struct SequencePayloadRef<'a> {
    steps: &'a [SequenceStep],
}

impl ApiClient {
    pub async fn list_templates(&self, page: u32, size: u32) -> Result<Page<Template>, ApiError> {
        self.get(&format!("/templates/?page={}&size={}", page, size))
            .await
    }

    pub async fn get_template(&self, id: &str) -> Result<Template, ApiError> {
        self.get(&format!("/templates/{}/", id)).await
    }

    pub async fn create_template(&self, template: &NewTemplate) -> Result<Template, ApiError> {
        self.post("/templates/", template).await
    }

    pub async fn update_template(
        &self,
        id: &str,
        update: &TemplateUpdate,
    ) -> Result<Template, ApiError> {
        self.put(&format!("/templates/{}/", id), update).await
    }

    pub async fn delete_template(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/templates/{}/", id)).await
    }

    pub async fn preview_template(&self, id: &str) -> Result<TemplatePreview, ApiError> {
        self.get(&format!("/templates/{}/preview/", id)).await
    }

    /// Steps of a template's sequence; a template without one has no steps
    pub async fn get_sequence(&self, template_id: &str) -> Result<Vec<SequenceStep>, ApiError> {
        match self
            .get::<SequencePayload>(&format!("/templates/{}/sequence/", template_id))
            .await
        {
            Ok(payload) => Ok(payload.steps),
            Err(ApiError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Replace a template's sequence with `steps`
    pub async fn put_sequence(
        &self,
        template_id: &str,
        steps: &[SequenceStep],
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post(
                &format!("/templates/{}/sequence/", template_id),
                &SequencePayloadRef { steps },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SequenceBackend for ApiClient {
    async fn create_sequence_template(&self, name: &str) -> Result<String, ApiError> {
        let template = self.create_template(&NewTemplate::sequence(name)).await?;
        if template.id.is_empty() {
            return Err(ApiError::parse(
                super::client::SERVICE_NAME,
                "created template has no id",
            ));
        }
        Ok(template.id)
    }

    async fn load_sequence(&self, template_id: &str) -> Result<Vec<SequenceStep>, ApiError> {
        self.get_sequence(template_id).await
    }

    async fn save_sequence(
        &self,
        template_id: &str,
        steps: &[SequenceStep],
    ) -> Result<(), ApiError> {
        self.put_sequence(template_id, steps).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_accepts_html_field() {
        let template: Template = serde_json::from_str(
            r#"{"id":"t1","name":"Intro","subject":"Hi","html":"<p>x</p>","created_at":"2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(template.content, "<p>x</p>");
        assert_eq!(template.template_type, None);
    }

    #[test]
    fn test_new_sequence_template_body() {
        let body = serde_json::to_value(NewTemplate::sequence("Follow-up")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"name": "Follow-up", "type": "sequence"})
        );
    }

    #[test]
    fn test_sequence_payload_defaults_to_empty() {
        let payload: SequencePayload = serde_json::from_str("{}").unwrap();
        assert!(payload.steps.is_empty());
    }
}
