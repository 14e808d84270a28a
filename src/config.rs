//! Configuration management for the Gmail batch MCP server
//!
//! Everything is read from the environment once at startup and then handed
//! to the token provider, the Gmail client and the tool dispatcher.

use std::env::{self, VarError};

use secrecy::SecretString;

use crate::error::{ConfigError, GmailMcpError, Result};

/// OAuth client credentials used for the refresh-token grant
#[derive(Debug, Clone)]
pub struct Credentials {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: SecretString,

    /// Long-lived refresh token
    pub refresh_token: SecretString,
}

/// Whether archive operations re-fetch the message to confirm INBOX is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchivePolicy {
    /// Verify `archive_email`
    pub verify_single: bool,

    /// Verify each item of `archive_emails_batch`
    pub verify_batch: bool,
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        Self {
            verify_single: true,
            verify_batch: true,
        }
    }
}

/// Configuration for the Gmail batch MCP server
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth credentials
    pub credentials: Credentials,

    /// OAuth token endpoint
    pub token_uri: String,

    /// Gmail REST base URL
    pub api_base_url: String,

    /// Archive verification policy
    pub archive_policy: ArchivePolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let credentials = Credentials {
            client_id: required_env(env_vars::CLIENT_ID)?,
            client_secret: SecretString::new(required_env(env_vars::CLIENT_SECRET)?.into()),
            refresh_token: SecretString::new(required_env(env_vars::REFRESH_TOKEN)?.into()),
        };

        let token_uri = optional_env(env_vars::TOKEN_URI)?
            .unwrap_or_else(|| gmail::TOKEN_URI.to_string());

        let api_base_url = optional_env(env_vars::API_BASE_URL)?
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| gmail::API_BASE_URL.to_string());

        let archive_policy = ArchivePolicy {
            verify_single: parse_bool_env(env_vars::VERIFY_ARCHIVE, true)?,
            verify_batch: parse_bool_env(env_vars::VERIFY_BATCH_ARCHIVE, true)?,
        };

        Ok(Self {
            credentials,
            token_uri,
            api_base_url,
            archive_policy,
        })
    }
}

/// Environment variable names
pub mod env_vars {
    pub const CLIENT_ID: &str = "GMAIL_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "GMAIL_CLIENT_SECRET";
    pub const REFRESH_TOKEN: &str = "GMAIL_REFRESH_TOKEN";
    pub const TOKEN_URI: &str = "GMAIL_TOKEN_URI";
    pub const API_BASE_URL: &str = "GMAIL_API_BASE_URL";
    pub const VERIFY_ARCHIVE: &str = "GMAIL_VERIFY_ARCHIVE";
    pub const VERIFY_BATCH_ARCHIVE: &str = "GMAIL_VERIFY_BATCH_ARCHIVE";
}

fn required_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GmailMcpError::Config(ConfigError::MissingEnvVar {
            var: key.to_string(),
        })),
    }
}

fn optional_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(GmailMcpError::Config(ConfigError::InvalidConfig {
            message: format!("environment variable {key} contains non-unicode data"),
        })),
    }
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match optional_env(key)? {
        Some(v) => parse_bool_value(&v).ok_or_else(|| {
            GmailMcpError::Config(ConfigError::InvalidConfig {
                message: format!("invalid boolean environment variable {key}: '{v}'"),
            })
        }),
        None => Ok(default),
    }
}

fn parse_bool_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Gmail API constants
pub mod gmail {
    /// Base URL for Gmail API
    pub const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

    /// Google OAuth token endpoint
    pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

    /// User ID for the authenticated user
    pub const USER_ID: &str = "me";

    /// System label IDs used by the mailbox operations
    pub mod labels {
        pub const INBOX: &str = "INBOX";
        pub const UNREAD: &str = "UNREAD";
    }
}
