//! Hosted backend-as-a-service: auth, table REST and serverless functions.
//!
//! Every request carries the project's anon key as `apikey`. Requests are
//! authorized with the user's access token when signed in, otherwise with
//! the anon key itself.

pub mod auth;
pub mod functions;
pub mod inbox;

pub use auth::{Session, SessionStore};
pub use functions::AvatarImportReport;
pub use inbox::InboxEmail;

use reqwest::{Method, RequestBuilder};
use std::time::Duration;

use crate::api::ApiError;
use crate::config::BaasConfig;

pub(crate) const SERVICE_NAME: &str = "baas";

#[derive(Debug, Clone)]
pub struct BaasClient {
    http: reqwest::Client,
    url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl BaasClient {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ApiError::network(SERVICE_NAME, e.to_string()))?;
        Ok(Self {
            http,
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
        })
    }

    /// Client for the configured project, or `NotConfigured`
    pub fn from_config(config: &BaasConfig) -> Result<Self, ApiError> {
        match (config.url.as_deref(), config.anon_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Self::new(url, key),
            _ => Err(ApiError::not_configured(SERVICE_NAME)),
        }
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token.filter(|t| !t.is_empty());
    }

    pub fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, format!("{}{}", self.url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    pub(crate) async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(SERVICE_NAME, e.to_string()))?;
        crate::api::client::decode_response(SERVICE_NAME, response).await
    }
}
