//! Single-message mailbox operations
//!
//! Each [`MessageOperation`] performs the state change for exactly one message
//! and reports failure through [`Result`], never by panicking. The same value
//! drives both the single-message tools and the batch executor.

use crate::config::gmail::labels::{INBOX, UNREAD};
use crate::error::{GmailApiError, GmailMcpError, Result};
use crate::gmail::api::MailApi;

/// A state-changing operation applied to one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOperation {
    /// Move the message to the trash
    Trash,

    /// Remove the UNREAD label
    MarkRead,

    /// Remove the INBOX label, optionally confirming with a re-fetch
    Archive { verify: bool },

    /// Add a label and remove INBOX
    MoveToLabel { label_id: String },
}

impl MessageOperation {
    /// Apply the operation to one message
    pub async fn apply(&self, api: &dyn MailApi, message_id: &str) -> Result<()> {
        match self {
            MessageOperation::Trash => api.trash_message(message_id).await,
            MessageOperation::MarkRead => {
                api.modify_message(message_id, None, Some(vec![UNREAD.to_string()]))
                    .await?;
                Ok(())
            }
            MessageOperation::Archive { verify } => {
                api.modify_message(message_id, None, Some(vec![INBOX.to_string()]))
                    .await?;
                if *verify {
                    verify_archived(api, message_id).await?;
                }
                Ok(())
            }
            MessageOperation::MoveToLabel { label_id } => {
                api.modify_message(
                    message_id,
                    Some(vec![label_id.clone()]),
                    Some(vec![INBOX.to_string()]),
                )
                .await?;
                Ok(())
            }
        }
    }

    /// Past-tense phrase used in result messages
    pub fn past_tense(&self) -> &'static str {
        match self {
            MessageOperation::Trash => "deleted successfully",
            MessageOperation::MarkRead => "marked as read",
            MessageOperation::Archive { verify: true } => "archived successfully and verified",
            MessageOperation::Archive { verify: false } => "archived successfully",
            MessageOperation::MoveToLabel { .. } => "moved to label",
        }
    }
}

/// Re-fetch the message and fail if it is still in the inbox
async fn verify_archived(api: &dyn MailApi, message_id: &str) -> Result<()> {
    let message = api.get_message(message_id).await?;
    if message.has_label(INBOX) {
        return Err(GmailMcpError::Gmail(GmailApiError::ArchiveVerificationFailed {
            message_id: message_id.to_string(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_past_tense_reflects_verification() {
        assert_eq!(
            MessageOperation::Archive { verify: true }.past_tense(),
            "archived successfully and verified"
        );
        assert_eq!(
            MessageOperation::Archive { verify: false }.past_tense(),
            "archived successfully"
        );
        assert_eq!(MessageOperation::Trash.past_tense(), "deleted successfully");
    }
}
