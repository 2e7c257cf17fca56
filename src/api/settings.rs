//! Account settings

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::ApiClient;
use super::error::ApiError;

/// Account settings. Fields the client knows about are typed; anything
/// else the server sends is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_send_limit: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    /// Set a key from `key=value` CLI input; typed keys are parsed
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "company_name" => self.company_name = Some(value.to_string()),
            "timezone" => self.timezone = Some(value.to_string()),
            "signature" => self.signature = Some(value.to_string()),
            "daily_send_limit" => {
                let limit = value
                    .parse()
                    .map_err(|_| format!("daily_send_limit must be a number, got '{}'", value))?;
                self.daily_send_limit = Some(limit);
            }
            other => {
                let parsed = serde_json::from_str(value)
                    .unwrap_or_else(|_| Value::String(value.to_string()));
                self.extra.insert(other.to_string(), parsed);
            }
        }
        Ok(())
    }
}

impl ApiClient {
    pub async fn get_settings(&self) -> Result<Settings, ApiError> {
        self.get("/settings/").await
    }

    pub async fn update_settings(&self, settings: &Settings) -> Result<Settings, ApiError> {
        self.put("/settings/", settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let settings: Settings =
            serde_json::from_str(r#"{"timezone":"Europe/Amsterdam","tracking":true}"#).unwrap();
        assert_eq!(settings.timezone.as_deref(), Some("Europe/Amsterdam"));
        assert_eq!(settings.extra.get("tracking"), Some(&Value::Bool(true)));

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["tracking"], Value::Bool(true));
    }

    #[test]
    fn test_set_parses_typed_and_free_keys() {
        let mut settings = Settings::default();
        settings.set("daily_send_limit", "200").unwrap();
        settings.set("tracking", "false").unwrap();
        settings.set("footer", "Bye").unwrap();

        assert_eq!(settings.daily_send_limit, Some(200));
        assert_eq!(settings.extra["tracking"], Value::Bool(false));
        assert_eq!(settings.extra["footer"], Value::String("Bye".to_string()));
        assert!(settings.set("daily_send_limit", "lots").is_err());
    }
}
