//! HTTP client for the outreach REST API.
//!
//! Every request carries `Authorization: Bearer <token>` when a session
//! token is known, and `X-API-Key` when running against a dev backend.
//! Responses are normalized:
//! - non-2xx: an [`ApiError`] carrying the response body text
//! - 204 or an empty body: the empty value of the target type
//! - anything else: parsed JSON

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::error::ApiError;
use crate::config::ApiConfig;

pub(crate) const SERVICE_NAME: &str = "api";
const USER_AGENT: &str = concat!("outreach/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    dev_api_key: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, token: Option<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::network(SERVICE_NAME, e.to_string()))?;

        let dev_api_key = if config.dev_mode {
            config.dev_api_key.clone().filter(|k| !k.is_empty())
        } else {
            None
        };

        Ok(Self {
            http,
            base_url: config.effective_base_url().to_string(),
            token: token.filter(|t| !t.is_empty()),
            dev_api_key,
        })
    }

    /// Client pointed at an arbitrary base URL
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ApiError> {
        let config = ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        };
        Self::new(&config, token)
    }

    pub fn with_dev_api_key(mut self, key: impl Into<String>) -> Self {
        self.dev_api_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(key) = &self.dev_api_key {
            builder = builder.header("X-API-Key", key);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path), path).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body), path)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body), path)
            .await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PATCH, path).json(body), path)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self.send(self.request(Method::DELETE, path), path).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path).multipart(form), path)
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        tracing::debug!(path, "API request");
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(SERVICE_NAME, e.to_string()))?;
        decode_response(SERVICE_NAME, response).await
    }
}

/// Turn a response into `T` or an [`ApiError`]
pub(crate) async fn decode_response<T: DeserializeOwned>(
    service: &str,
    response: Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok());

    let body = response
        .text()
        .await
        .map_err(|e| ApiError::network(service, e.to_string()))?;

    if !status.is_success() {
        tracing::warn!(service, status = status.as_u16(), "API request failed");
        return Err(error_for_status(service, status, body, retry_after));
    }

    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return empty_value(service);
    }

    serde_json::from_str(&body).map_err(|e| ApiError::parse(service, e.to_string()))
}

fn error_for_status(
    service: &str,
    status: StatusCode,
    body: String,
    retry_after: Option<u64>,
) -> ApiError {
    match status.as_u16() {
        401 => ApiError::unauthorized(service),
        403 => ApiError::forbidden(service),
        404 => ApiError::not_found(service, body),
        429 => ApiError::rate_limited(service, retry_after),
        code => ApiError::http(service, code, body),
    }
}

/// `()`/`Value` become null; structs with defaults become `{}`
fn empty_value<T: DeserializeOwned>(service: &str) -> Result<T, ApiError> {
    serde_json::from_value(serde_json::Value::Null)
        .or_else(|_| serde_json::from_value(serde_json::json!({})))
        .map_err(|e| ApiError::parse(service, format!("empty response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let client = ApiClient::with_base_url("http://localhost:5000/api/", None).unwrap();
        assert_eq!(client.url("/templates/"), "http://localhost:5000/api/templates/");
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let client = ApiClient::with_base_url("http://x", Some(String::new())).unwrap();
        assert!(!client.has_token());
    }

    #[test]
    fn test_dev_key_only_in_dev_mode() {
        let mut config = ApiConfig {
            dev_api_key: Some("dev-secret".to_string()),
            ..ApiConfig::default()
        };
        assert!(ApiClient::new(&config, None).unwrap().dev_api_key.is_none());

        config.dev_mode = true;
        let client = ApiClient::new(&config, None).unwrap();
        assert_eq!(client.dev_api_key.as_deref(), Some("dev-secret"));
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(
            error_for_status("api", StatusCode::UNAUTHORIZED, String::new(), None),
            ApiError::Unauthorized { .. }
        ));
        assert_eq!(
            error_for_status("api", StatusCode::NOT_FOUND, "gone".into(), None),
            ApiError::not_found("api", "gone")
        );
        assert_eq!(
            error_for_status("api", StatusCode::TOO_MANY_REQUESTS, String::new(), Some(7)),
            ApiError::rate_limited("api", Some(7))
        );
        assert_eq!(
            error_for_status("api", StatusCode::BAD_REQUEST, "bad".into(), None),
            ApiError::http("api", 400, "bad")
        );
    }

    #[test]
    fn test_empty_value_shapes() {
        let _: () = empty_value("api").unwrap();
        let value: serde_json::Value = empty_value("api").unwrap();
        assert!(value.is_null());

        #[derive(serde::Deserialize, Default, Debug, PartialEq)]
        struct Message {
            #[serde(default)]
            message: String,
        }
        let message: Message = empty_value("api").unwrap();
        assert_eq!(message, Message::default());
    }
}
