//! Remote mailbox seam
//!
//! Every tool reaches the mailbox through [`MailApi`]. [`GmailClient`] is the
//! production implementation; tests substitute an in-memory mailbox.
//!
//! [`GmailClient`]: crate::gmail::client::GmailClient

use async_trait::async_trait;

use crate::error::Result;
use crate::gmail::types::{Label, Message, MessageRef};

/// Operations the server needs from a remote mailbox
#[async_trait]
pub trait MailApi: Send + Sync {
    /// List message references matching a provider search query
    async fn list_messages(&self, query: &str, max_results: u32) -> Result<Vec<MessageRef>>;

    /// Fetch a message with its labels and Subject/From/Date headers
    async fn get_message(&self, message_id: &str) -> Result<Message>;

    /// Add and remove labels on one message
    async fn modify_message(
        &self,
        message_id: &str,
        add_label_ids: Option<Vec<String>>,
        remove_label_ids: Option<Vec<String>>,
    ) -> Result<Message>;

    /// Move one message to the trash
    async fn trash_message(&self, message_id: &str) -> Result<()>;

    /// Send a base64url-encoded raw RFC 5322 message
    async fn send_message(&self, raw: String) -> Result<Message>;

    /// List every label in the mailbox
    async fn list_labels(&self) -> Result<Vec<Label>>;
}
