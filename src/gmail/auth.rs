//! OAuth access tokens for the Gmail API
//!
//! The server is configured with a long-lived refresh token. Access tokens are
//! obtained with the refresh-token grant and reused until shortly before they
//! expire.

use std::time::{SystemTime, UNIX_EPOCH};

use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AuthError, GmailMcpError, Result};

/// Refresh this many seconds before the reported expiry
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Token response from OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// An access token and its expiry (Unix seconds)
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expiry_date: Option<i64>,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry.saturating_sub(now) >= EXPIRY_MARGIN_SECS,
            None => true,
        }
    }
}

/// Supplies bearer tokens for Gmail API requests
pub struct TokenProvider {
    /// Configuration
    config: Config,

    /// HTTP client
    http_client: reqwest::Client,

    /// Current access token
    token: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a new token provider; no request is made until a token is needed
    pub fn new(config: Config, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
            token: RwLock::new(None),
        }
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh(now_secs()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut slot = self.token.write().await;

        // Another request may have refreshed while we waited for the lock
        if let Some(token) = slot.as_ref() {
            if token.is_fresh(now_secs()) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.refresh().await?;
        let access_token = token.access_token.clone();
        *slot = Some(token);
        Ok(access_token)
    }

    /// Exchange the refresh token for a new access token
    async fn refresh(&self) -> Result<CachedToken> {
        tracing::debug!("Refreshing Gmail access token");

        let credentials = &self.config.credentials;
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.expose_secret()),
            ("refresh_token", credentials.refresh_token.expose_secret()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.config.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GmailMcpError::Auth(AuthError::TokenRefreshFailed {
                message: format!("({}) {}", status, text),
            }));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(CachedToken {
            access_token: token_response.access_token,
            expiry_date: token_response.expires_in.map(|e| expiry_after(now_secs(), e)),
        })
    }
}

/// Unix time `expires_in` seconds after `now`, clamped at the i64 range
fn expiry_after(now: i64, expires_in: i64) -> i64 {
    now.saturating_add(expires_in)
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
