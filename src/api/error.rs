//! API error types with authentication failure tracking

use std::fmt;

/// Errors from the outreach API or the hosted backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 Unauthorized - session missing or expired
    Unauthorized {
        service: String,
        consecutive_count: u32,
    },
    /// 403 Forbidden
    Forbidden { service: String },
    /// 429 Rate Limited
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },
    /// 404, with whatever the server said
    NotFound { service: String, body: String },
    /// Request never got a response (connect, timeout, TLS)
    Network { service: String, message: String },
    /// Any other non-2xx; `body` is the raw response text
    Http {
        service: String,
        status: u16,
        body: String,
    },
    /// 2xx response whose body did not match the expected shape
    Parse { service: String, message: String },
    /// Base URL or credentials missing from the configuration
    NotConfigured { service: String },
}

impl ApiError {
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. }
        )
    }

    /// 3+ consecutive 401s means the stored session is dead
    pub fn needs_login(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized {
                consecutive_count,
                ..
            } if *consecutive_count >= 3
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub fn service_name(&self) -> &str {
        match self {
            ApiError::Unauthorized { service, .. }
            | ApiError::Forbidden { service }
            | ApiError::RateLimited { service, .. }
            | ApiError::NotFound { service, .. }
            | ApiError::Network { service, .. }
            | ApiError::Http { service, .. }
            | ApiError::Parse { service, .. }
            | ApiError::NotConfigured { service } => service,
        }
    }

    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn unauthorized(service: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            service: service.into(),
            consecutive_count: 1,
        }
    }

    pub fn forbidden(service: impl Into<String>) -> Self {
        ApiError::Forbidden {
            service: service.into(),
        }
    }

    pub fn rate_limited(service: impl Into<String>, retry_after: Option<u64>) -> Self {
        ApiError::RateLimited {
            service: service.into(),
            retry_after_secs: retry_after,
        }
    }

    pub fn not_found(service: impl Into<String>, body: impl Into<String>) -> Self {
        ApiError::NotFound {
            service: service.into(),
            body: body.into(),
        }
    }

    pub fn network(service: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Network {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn http(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        ApiError::Http {
            service: service.into(),
            status,
            body: body.into(),
        }
    }

    pub fn parse(service: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Parse {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn not_configured(service: impl Into<String>) -> Self {
        ApiError::NotConfigured {
            service: service.into(),
        }
    }

    pub fn with_consecutive_count(self, count: u32) -> Self {
        match self {
            ApiError::Unauthorized { service, .. } => ApiError::Unauthorized {
                service,
                consecutive_count: count,
            },
            other => other,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized {
                service,
                consecutive_count,
            } => {
                write!(
                    f,
                    "{}: Unauthorized (401) - {} consecutive failures",
                    service, consecutive_count
                )
            }
            ApiError::Forbidden { service } => {
                write!(f, "{}: Forbidden (403) - insufficient permissions", service)
            }
            ApiError::RateLimited {
                service,
                retry_after_secs,
            } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "{}: Rate limited - retry after {}s", service, secs)
                } else {
                    write!(f, "{}: Rate limited", service)
                }
            }
            ApiError::NotFound { service, body } => {
                if body.is_empty() {
                    write!(f, "{}: Not found", service)
                } else {
                    write!(f, "{}: Not found - {}", service, body)
                }
            }
            ApiError::Network { service, message } => {
                write!(f, "{}: Network error - {}", service, message)
            }
            ApiError::Http {
                service,
                status,
                body,
            } => {
                write!(f, "{}: HTTP {} - {}", service, status, body)
            }
            ApiError::Parse { service, message } => {
                write!(f, "{}: Unexpected response - {}", service, message)
            }
            ApiError::NotConfigured { service } => {
                write!(f, "{}: Not configured", service)
            }
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_error() {
        assert!(ApiError::unauthorized("api").is_auth_error());
        assert!(ApiError::forbidden("api").is_auth_error());
        assert!(!ApiError::not_found("api", "").is_auth_error());
        assert!(!ApiError::network("api", "timeout").is_auth_error());
    }

    #[test]
    fn test_needs_login_after_three_failures() {
        assert!(!ApiError::unauthorized("api")
            .with_consecutive_count(2)
            .needs_login());
        assert!(ApiError::unauthorized("api")
            .with_consecutive_count(3)
            .needs_login());
    }

    #[test]
    fn test_status() {
        assert_eq!(ApiError::http("api", 500, "boom").status(), Some(500));
        assert_eq!(ApiError::not_found("api", "").status(), Some(404));
        assert_eq!(ApiError::network("api", "refused").status(), None);
    }

    #[test]
    fn test_display_carries_body() {
        let err = ApiError::http("api", 400, "No steps provided");
        assert_eq!(err.to_string(), "api: HTTP 400 - No steps provided");

        let err = ApiError::rate_limited("baas", Some(30));
        assert_eq!(err.to_string(), "baas: Rate limited - retry after 30s");

        let err = ApiError::not_configured("baas");
        assert_eq!(err.to_string(), "baas: Not configured");
    }
}
