//! Password sign-in and the persisted session

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::BaasClient;
use crate::api::ApiError;
use crate::config::Config;

/// Fallback token when no session is stored
pub const ACCESS_TOKEN_ENV: &str = "OUTREACH_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl Session {
    /// Expired, or expiring within the next minute
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at - 60 <= now)
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.email.as_deref())
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

impl BaasClient {
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let session: Session = self
            .send(
                self.request(Method::POST, "/auth/v1/token?grant_type=password")
                    .json(&PasswordGrant { email, password }),
            )
            .await?;
        tracing::info!(email, "Signed in");
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError> {
        self.send(
            self.request(Method::POST, "/auth/v1/token?grant_type=refresh_token")
                .json(&RefreshGrant { refresh_token }),
        )
        .await
    }
}

/// Session persisted as JSON under the state directory
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_config(config: &Config) -> Self {
        Self::new(config.session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored session; a missing or unreadable file counts as signed out
    pub fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        std::fs::write(&self.path, json).context("Failed to write session file")?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// Access token for API calls.
///
/// Prefers the stored session, refreshing it when expired and a backend is
/// available, then falls back to `OUTREACH_ACCESS_TOKEN`.
pub async fn resolve_access_token(store: &SessionStore, baas: Option<&BaasClient>) -> Option<String> {
    if let Some(session) = store.load() {
        if !session.is_expired() {
            return Some(session.access_token);
        }
        if let (Some(client), Some(refresh)) = (baas, session.refresh_token.as_deref()) {
            match client.refresh_session(refresh).await {
                Ok(fresh) => {
                    if let Err(e) = store.save(&fresh) {
                        tracing::warn!(error = %e, "Could not persist refreshed session");
                    }
                    return Some(fresh.access_token);
                }
                Err(e) => tracing::warn!(error = %e, "Session refresh failed"),
            }
        }
    }

    std::env::var(ACCESS_TOKEN_ENV)
        .ok()
        .filter(|t| !t.is_empty())
}
