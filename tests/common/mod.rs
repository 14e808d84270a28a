//! In-memory mailbox used by the integration tests

#![allow(dead_code)]

pub mod http;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use gmail_batch_mcp::config::{ArchivePolicy, Config, Credentials};
use gmail_batch_mcp::error::{GmailApiError, GmailMcpError, Result};
use gmail_batch_mcp::gmail::api::MailApi;
use gmail_batch_mcp::gmail::auth::TokenProvider;
use gmail_batch_mcp::gmail::client::GmailClient;
use gmail_batch_mcp::gmail::types::{Header, Label, Message, MessagePart, MessageRef};
use gmail_batch_mcp::mcp::tools::ToolHandler;

#[derive(Debug, Clone, Default)]
struct StoredMessage {
    labels: Vec<String>,
    headers: Vec<Header>,
    snippet: Option<String>,
}

/// Fake mailbox with injectable latency and failures
#[derive(Default)]
pub struct FakeMailbox {
    order: Vec<String>,
    messages: Mutex<HashMap<String, StoredMessage>>,
    labels: Vec<Label>,
    failing: HashSet<String>,
    fail_once: Mutex<HashSet<String>>,
    sticky_inbox: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    completions: Mutex<Vec<String>>,
    sent: Mutex<Vec<String>>,
}

impl FakeMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message carrying INBOX and UNREAD
    pub fn with_message(self, id: &str) -> Self {
        self.with_labeled_message(id, &["INBOX", "UNREAD"])
    }

    pub fn with_labeled_message(mut self, id: &str, labels: &[&str]) -> Self {
        self.order.push(id.to_string());
        self.messages.get_mut().unwrap().insert(
            id.to_string(),
            StoredMessage {
                labels: labels.iter().map(|l| l.to_string()).collect(),
                ..Default::default()
            },
        );
        self
    }

    pub fn with_headers(
        mut self,
        id: &str,
        headers: &[(&str, &str)],
        snippet: Option<&str>,
    ) -> Self {
        let stored = self
            .messages
            .get_mut()
            .unwrap()
            .get_mut(id)
            .expect("add the message before its headers");
        stored.headers = headers
            .iter()
            .map(|(name, value)| Header {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect();
        stored.snippet = snippet.map(str::to_string);
        self
    }

    pub fn with_label(mut self, id: &str, name: &str, label_type: &str) -> Self {
        self.labels.push(Label {
            id: id.to_string(),
            name: name.to_string(),
            label_type: Some(label_type.to_string()),
            message_list_visibility: Some("show".to_string()),
            label_list_visibility: Some("labelShow".to_string()),
            messages_total: Some(3),
            messages_unread: Some(1),
        });
        self
    }

    /// Every call touching this id fails
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Only the first call touching this id fails
    pub fn failing_once(self, id: &str) -> Self {
        self.fail_once.lock().unwrap().insert(id.to_string());
        self
    }

    /// Removing INBOX from this message silently does nothing
    pub fn sticky_inbox(mut self, id: &str) -> Self {
        self.sticky_inbox.insert(id.to_string());
        self
    }

    pub fn delayed(mut self, id: &str, millis: u64) -> Self {
        self.delays.insert(id.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// IDs in the order their state-changing calls finished
    pub fn completions(&self) -> Vec<String> {
        self.completions.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn labels_of(&self, id: &str) -> Vec<String> {
        self.messages.lock().unwrap()[id].labels.clone()
    }

    async fn enter(&self, id: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(id) {
            tokio::time::sleep(*delay).await;
        }

        let first_failure = self.fail_once.lock().unwrap().remove(id);
        if first_failure || self.failing.contains(id) {
            return Err(GmailMcpError::Gmail(GmailApiError::RequestFailed {
                message: format!("injected failure for {}", id),
            }));
        }
        Ok(())
    }

    fn not_found(id: &str) -> GmailMcpError {
        GmailMcpError::Gmail(GmailApiError::MessageNotFound {
            message_id: id.to_string(),
        })
    }

    fn snapshot(&self, id: &str) -> Result<Message> {
        let messages = self.messages.lock().unwrap();
        let stored = messages.get(id).ok_or_else(|| Self::not_found(id))?;
        Ok(Message {
            id: id.to_string(),
            thread_id: Some(format!("thread-{}", id)),
            label_ids: stored.labels.clone(),
            snippet: stored.snippet.clone(),
            payload: Some(MessagePart {
                mime_type: Some("text/plain".to_string()),
                headers: stored.headers.clone(),
            }),
        })
    }
}

#[async_trait]
impl MailApi for FakeMailbox {
    async fn list_messages(&self, query: &str, max_results: u32) -> Result<Vec<MessageRef>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let messages = self.messages.lock().unwrap();

        Ok(self
            .order
            .iter()
            .filter(|id| {
                query.is_empty()
                    || messages[*id]
                        .headers
                        .iter()
                        .any(|h| h.name == "Subject" && h.value.contains(query))
            })
            .take(max_results as usize)
            .map(|id| MessageRef {
                id: id.clone(),
                thread_id: format!("thread-{}", id),
            })
            .collect())
    }

    async fn get_message(&self, message_id: &str) -> Result<Message> {
        self.enter(message_id).await?;
        self.snapshot(message_id)
    }

    async fn modify_message(
        &self,
        message_id: &str,
        add_label_ids: Option<Vec<String>>,
        remove_label_ids: Option<Vec<String>>,
    ) -> Result<Message> {
        self.enter(message_id).await?;
        {
            let mut messages = self.messages.lock().unwrap();
            let stored = messages
                .get_mut(message_id)
                .ok_or_else(|| Self::not_found(message_id))?;

            for label in remove_label_ids.unwrap_or_default() {
                if label == "INBOX" && self.sticky_inbox.contains(message_id) {
                    continue;
                }
                stored.labels.retain(|l| *l != label);
            }
            for label in add_label_ids.unwrap_or_default() {
                if !stored.labels.contains(&label) {
                    stored.labels.push(label);
                }
            }
        }
        self.completions.lock().unwrap().push(message_id.to_string());
        self.snapshot(message_id)
    }

    async fn trash_message(&self, message_id: &str) -> Result<()> {
        self.enter(message_id).await?;
        {
            let mut messages = self.messages.lock().unwrap();
            let stored = messages
                .get_mut(message_id)
                .ok_or_else(|| Self::not_found(message_id))?;
            stored.labels.retain(|l| l != "INBOX");
            stored.labels.push("TRASH".to_string());
        }
        self.completions.lock().unwrap().push(message_id.to_string());
        Ok(())
    }

    async fn send_message(&self, raw: String) -> Result<Message> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut sent = self.sent.lock().unwrap();
        sent.push(raw);
        Ok(Message {
            id: format!("sent-{}", sent.len()),
            ..Default::default()
        })
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.labels.clone())
    }
}

/// Handler over a shared fake so tests can inspect it afterwards
pub fn handler(mailbox: FakeMailbox, policy: ArchivePolicy) -> (ToolHandler, Arc<FakeMailbox>) {
    let mailbox = Arc::new(mailbox);
    (ToolHandler::new(mailbox.clone(), policy), mailbox)
}

/// Real Gmail client pointed at a stub server for both OAuth and the REST API
pub fn gmail_client(server: &http::StubServer) -> Arc<GmailClient> {
    let config = Config {
        credentials: Credentials {
            client_id: "test-client".to_string(),
            client_secret: SecretString::new("test-secret".into()),
            refresh_token: SecretString::new("test-refresh".into()),
        },
        token_uri: format!("{}/token", server.base_url()),
        api_base_url: server.base_url().to_string(),
        archive_policy: ArchivePolicy::default(),
    };

    let http_client = reqwest::Client::builder().no_proxy().build().unwrap();
    let tokens = Arc::new(TokenProvider::new(config.clone(), http_client.clone()));
    Arc::new(GmailClient::new(http_client, config.api_base_url, tokens))
}
