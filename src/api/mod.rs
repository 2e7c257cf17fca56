//! Outreach REST API client and typed service wrappers
//!
//! This module provides:
//! - [`ApiClient`] with auth header injection and error normalization
//! - One file per backend resource (templates, leads, senders, ...)
//! - [`Services`], the bundle the front-ends use, with 401 tracking

pub mod campaigns;
pub mod client;
pub mod error;
pub mod leads;
pub mod senders;
pub mod settings;
pub mod stats;
pub mod templates;

pub use client::ApiClient;
pub use error::ApiError;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::baas::{auth, BaasClient, SessionStore};
use crate::config::Config;

/// One page of a paginated list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new", alias = "data")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default, alias = "limit")]
    pub size: u32,
    #[serde(default)]
    pub total: u64,
}

impl<T> Page<T> {
    /// Number of pages at this page size
    pub fn page_count(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }
}

/// API clients plus auth failure tracking
pub struct Services {
    pub api: ApiClient,
    /// Present when the hosted backend is configured
    pub baas: Option<BaasClient>,
    auth_failures: HashMap<String, u32>,
    auth_failure_threshold: u32,
}

impl Services {
    const DEFAULT_AUTH_FAILURE_THRESHOLD: u32 = 3;

    pub fn new(api: ApiClient, baas: Option<BaasClient>) -> Self {
        Self {
            api,
            baas,
            auth_failures: HashMap::new(),
            auth_failure_threshold: Self::DEFAULT_AUTH_FAILURE_THRESHOLD,
        }
    }

    /// Build from config and the stored session
    pub async fn connect(config: &Config) -> Result<Self, ApiError> {
        let baas = match BaasClient::from_config(&config.baas) {
            Ok(client) => Some(client),
            Err(ApiError::NotConfigured { .. }) => None,
            Err(e) => return Err(e),
        };

        let store = SessionStore::for_config(config);
        let token = auth::resolve_access_token(&store, baas.as_ref()).await;
        if token.is_none() {
            tracing::debug!("No access token; API calls will be anonymous");
        }

        let api = ApiClient::new(&config.api, token.clone())?;
        let baas = baas.map(|b| b.with_access_token(token));
        Ok(Self::new(api, baas))
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.has_token()
    }

    pub fn baas(&self) -> Result<&BaasClient, ApiError> {
        self.baas
            .as_ref()
            .ok_or_else(|| ApiError::not_configured(crate::baas::SERVICE_NAME))
    }

    /// Feed a call result through the failure tracker
    pub fn track<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                self.auth_failures.clear();
                Ok(value)
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    /// Count consecutive 401s per service; returns the error with the
    /// running count filled in
    pub fn record_error(&mut self, err: ApiError) -> ApiError {
        if let ApiError::Unauthorized { service, .. } = &err {
            let count = self.auth_failures.entry(service.clone()).or_insert(0);
            *count += 1;
            let count = *count;
            return err.with_consecutive_count(count);
        }
        err
    }

    pub fn clear_auth_failures(&mut self, service: &str) {
        self.auth_failures.remove(service);
    }

    pub fn needs_login(&self, service: &str) -> bool {
        self.auth_failure_count(service) >= self.auth_failure_threshold
    }

    pub fn auth_failure_count(&self, service: &str) -> u32 {
        self.auth_failures.get(service).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> Services {
        Services::new(ApiClient::with_base_url("http://localhost", None).unwrap(), None)
    }

    #[test]
    fn test_page_accepts_both_shapes() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"items":[1,2],"page":1,"size":2,"total":5}"#).unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.page_count(), 3);

        let page: Page<u32> =
            serde_json::from_str(r#"{"data":[7],"page":2,"limit":20,"total":21}"#).unwrap();
        assert_eq!(page.items, vec![7]);
        assert_eq!(page.size, 20);
        assert_eq!(page.page_count(), 2);
    }

    #[test]
    fn test_consecutive_unauthorized_counts() {
        let mut services = services();
        for _ in 0..2 {
            let _ = services.track::<()>(Err(ApiError::unauthorized("api")));
        }
        assert!(!services.needs_login("api"));

        let err = services
            .track::<()>(Err(ApiError::unauthorized("api")))
            .unwrap_err();
        assert!(err.needs_login());
        assert!(services.needs_login("api"));

        services.track(Ok(())).unwrap();
        assert_eq!(services.auth_failure_count("api"), 0);
    }

    #[test]
    fn test_other_errors_do_not_count() {
        let mut services = services();
        let _ = services.track::<()>(Err(ApiError::http("api", 500, "boom")));
        assert_eq!(services.auth_failure_count("api"), 0);
        assert!(services.baas().is_err());
    }
}
