//! Gmail API client
//!
//! reqwest-backed implementation of [`MailApi`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};

use crate::config::gmail::USER_ID;
use crate::error::{GmailApiError, GmailMcpError, Result, ValidationError};
use crate::gmail::api::MailApi;
use crate::gmail::auth::TokenProvider;
use crate::gmail::labels::LabelManager;
use crate::gmail::types::*;

/// Headers requested when fetching message metadata
const METADATA_HEADERS: [&str; 3] = ["Subject", "From", "Date"];

/// Gmail API client
pub struct GmailClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Gmail REST base URL
    base_url: String,

    /// OAuth token source
    tokens: Arc<TokenProvider>,
}

impl GmailClient {
    /// Create a new Gmail client
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<TokenProvider>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            tokens,
        }
    }

    /// Get a valid access token
    async fn access_token(&self) -> Result<String> {
        self.tokens.access_token().await
    }

    /// Base URL for messages
    fn messages_url(&self) -> String {
        format!("{}/users/{}/messages", self.base_url, USER_ID)
    }

    /// URL for one message; the id is escaped as a single path segment
    fn message_url(&self, message_id: &str, suffix: &str) -> Result<String> {
        if matches!(message_id, "" | "." | "..") {
            return Err(GmailMcpError::Validation(ValidationError::InvalidParameter {
                name: "id".to_string(),
                message: format!("'{}' is not a message ID", message_id),
            }));
        }

        Ok(format!(
            "{}/{}{}",
            self.messages_url(),
            urlencoding::encode(message_id),
            suffix
        ))
    }
}

#[async_trait]
impl MailApi for GmailClient {
    async fn list_messages(&self, query: &str, max_results: u32) -> Result<Vec<MessageRef>> {
        let token = self.access_token().await?;

        let mut url = format!("{}?maxResults={}", self.messages_url(), max_results);
        if !query.is_empty() {
            url.push_str(&format!("&q={}", urlencoding::encode(query)));
        }

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        let response = error_for_status(response, "list messages", None).await?;
        let message_list: MessageList = response.json().await?;
        Ok(message_list.messages)
    }

    async fn get_message(&self, message_id: &str) -> Result<Message> {
        let mut url = format!("{}?format=metadata", self.message_url(message_id, "")?);
        for header in METADATA_HEADERS {
            url.push_str(&format!("&metadataHeaders={}", header));
        }

        let token = self.access_token().await?;
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        let response = error_for_status(response, "get message", Some(message_id)).await?;
        Ok(response.json().await?)
    }

    async fn modify_message(
        &self,
        message_id: &str,
        add_label_ids: Option<Vec<String>>,
        remove_label_ids: Option<Vec<String>>,
    ) -> Result<Message> {
        let url = self.message_url(message_id, "/modify")?;
        let token = self.access_token().await?;

        let request = ModifyMessageRequest {
            add_label_ids,
            remove_label_ids,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        let response = error_for_status(response, "modify message", Some(message_id)).await?;
        Ok(response.json().await?)
    }

    /// Moves the message to trash; the gmail.modify scope cannot delete permanently
    async fn trash_message(&self, message_id: &str) -> Result<()> {
        let url = self.message_url(message_id, "/trash")?;
        let token = self.access_token().await?;

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .header("Content-Length", "0")
            .send()
            .await?;

        error_for_status(response, "trash message", Some(message_id)).await?;
        Ok(())
    }

    async fn send_message(&self, raw: String) -> Result<Message> {
        let token = self.access_token().await?;
        let url = format!("{}/send", self.messages_url());

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&SendMessageRequest { raw })
            .send()
            .await?;

        let response = error_for_status(response, "send email", None).await?;
        Ok(response.json().await?)
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        let token = self.access_token().await?;
        let manager = LabelManager::new(&self.http_client, &self.base_url, &token);
        manager.list().await
    }
}

/// Translate a non-success Gmail response into a [`GmailApiError`]
///
/// A 404 is reported as `MessageNotFound` when the request targeted a message.
pub(crate) async fn error_for_status(
    response: Response,
    action: &str,
    message_id: Option<&str>,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    tracing::debug!("Gmail request '{}' failed with {}", action, status);

    let error = match (status, message_id) {
        (StatusCode::NOT_FOUND, Some(id)) => GmailApiError::MessageNotFound {
            message_id: id.to_string(),
        },
        (StatusCode::TOO_MANY_REQUESTS, _) => GmailApiError::RateLimited {
            retry_after_secs: response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        },
        _ => {
            let text = response.text().await.unwrap_or_default();
            GmailApiError::RequestFailed {
                message: format!("Failed to {} ({}): {}", action, status, text),
            }
        }
    };

    Err(GmailMcpError::Gmail(error))
}
