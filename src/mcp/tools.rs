//! MCP Tool definitions and handlers
//!
//! Tool names resolve through [`TOOLS`] to a [`ToolKind`]; arguments are then
//! parsed into a typed [`ToolCall`] before anything reaches the mailbox.

use std::sync::Arc;

use futures::future::try_join_all;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::config::ArchivePolicy;
use crate::error::{McpError, Result};
use crate::gmail::api::MailApi;
use crate::gmail::labels::LabelSummary;
use crate::gmail::utils::{create_email_message, encode_raw_message, summarize_message, EmailParams};
use crate::mcp::types::{CallToolResult, Tool};
use crate::operations::{BatchExecutor, BatchSummary, MessageOperation};

// ==================== Tool Arguments ====================

fn default_max_results() -> u32 {
    10
}

/// Arguments for `list_emails`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListEmailsArgs {
    /// Maximum number of emails to return
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 500))]
    pub max_results: u32,

    /// Gmail search query (optional)
    #[serde(default)]
    pub query: String,
}

/// Arguments for `send_email`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct SendEmailArgs {
    /// Recipient email address
    #[validate(length(min = 1))]
    pub to: String,

    /// Email subject
    pub subject: String,

    /// Plain-text email body
    pub body: String,
}

/// Arguments for tools acting on one email
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct EmailIdArgs {
    /// ID of the email
    #[validate(length(min = 1))]
    pub id: String,
}

/// Arguments for batch tools
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct EmailIdsArgs {
    /// List of email IDs
    pub ids: Vec<String>,
}

/// Arguments for `move_to_label`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveToLabelArgs {
    /// ID of the email to move
    #[validate(length(min = 1))]
    pub id: String,

    /// ID of the destination label
    #[validate(length(min = 1))]
    pub label_id: String,
}

/// Arguments for `move_to_label_batch`
#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveToLabelBatchArgs {
    /// List of email IDs to move
    pub ids: Vec<String>,

    /// ID of the destination label
    #[validate(length(min = 1))]
    pub label_id: String,
}

/// `list_labels` takes no arguments
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoArgs {}

// ==================== Tool Table ====================

/// Every tool the server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ListEmails,
    SendEmail,
    DeleteEmail,
    MarkAsRead,
    ArchiveEmail,
    DeleteEmailsBatch,
    ArchiveEmailsBatch,
    MarkAsReadBatch,
    ListLabels,
    MoveToLabel,
    MoveToLabelBatch,
}

/// Catalog entry for one tool
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ToolKind,
    schema: fn() -> Value,
}

/// The tool catalog, in listing order
pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "list_emails",
        description: "List emails from inbox",
        kind: ToolKind::ListEmails,
        schema: schema::<ListEmailsArgs>,
    },
    ToolSpec {
        name: "send_email",
        description: "Send an email",
        kind: ToolKind::SendEmail,
        schema: schema::<SendEmailArgs>,
    },
    ToolSpec {
        name: "delete_email",
        description: "Delete an email",
        kind: ToolKind::DeleteEmail,
        schema: schema::<EmailIdArgs>,
    },
    ToolSpec {
        name: "mark_as_read",
        description: "Mark an email as read",
        kind: ToolKind::MarkAsRead,
        schema: schema::<EmailIdArgs>,
    },
    ToolSpec {
        name: "delete_emails_batch",
        description: "Delete multiple emails at once",
        kind: ToolKind::DeleteEmailsBatch,
        schema: schema::<EmailIdsArgs>,
    },
    ToolSpec {
        name: "archive_email",
        description: "Archive an email (remove from inbox)",
        kind: ToolKind::ArchiveEmail,
        schema: schema::<EmailIdArgs>,
    },
    ToolSpec {
        name: "archive_emails_batch",
        description: "Archive multiple emails at once",
        kind: ToolKind::ArchiveEmailsBatch,
        schema: schema::<EmailIdsArgs>,
    },
    ToolSpec {
        name: "mark_as_read_batch",
        description: "Mark multiple emails as read at once",
        kind: ToolKind::MarkAsReadBatch,
        schema: schema::<EmailIdsArgs>,
    },
    ToolSpec {
        name: "list_labels",
        description: "List all available Gmail labels",
        kind: ToolKind::ListLabels,
        schema: schema::<NoArgs>,
    },
    ToolSpec {
        name: "move_to_label",
        description: "Move an email to a specific label",
        kind: ToolKind::MoveToLabel,
        schema: schema::<MoveToLabelArgs>,
    },
    ToolSpec {
        name: "move_to_label_batch",
        description: "Move multiple emails to a specific label",
        kind: ToolKind::MoveToLabelBatch,
        schema: schema::<MoveToLabelBatchArgs>,
    },
];

impl ToolKind {
    /// Look up a tool by its protocol name
    pub fn from_name(name: &str) -> Option<Self> {
        TOOLS.iter().find(|t| t.name == name).map(|t| t.kind)
    }
}

/// JSON schema for a tool's argument struct
fn schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({"type": "object"}))
}

/// The tool catalog as reported by `tools/list`
pub fn tool_catalog() -> Vec<Tool> {
    TOOLS
        .iter()
        .map(|entry| Tool {
            name: entry.name.to_string(),
            description: Some(entry.description.to_string()),
            input_schema: (entry.schema)(),
        })
        .collect()
}

// ==================== Validated Calls ====================

/// A tool invocation whose arguments have been validated
#[derive(Debug, Clone)]
pub enum ToolCall {
    ListEmails(ListEmailsArgs),
    SendEmail(SendEmailArgs),
    DeleteEmail(EmailIdArgs),
    MarkAsRead(EmailIdArgs),
    ArchiveEmail(EmailIdArgs),
    DeleteEmailsBatch(EmailIdsArgs),
    ArchiveEmailsBatch(EmailIdsArgs),
    MarkAsReadBatch(EmailIdsArgs),
    ListLabels,
    MoveToLabel(MoveToLabelArgs),
    MoveToLabelBatch(MoveToLabelBatchArgs),
}

impl ToolCall {
    /// Resolve a tool name and validate its arguments
    pub fn parse(name: &str, arguments: Value) -> std::result::Result<Self, McpError> {
        let kind = ToolKind::from_name(name).ok_or_else(|| McpError::UnknownTool {
            name: name.to_string(),
        })?;

        // Clients may omit `arguments` entirely
        let arguments = if arguments.is_null() { json!({}) } else { arguments };

        Ok(match kind {
            ToolKind::ListEmails => ToolCall::ListEmails(parse_args(arguments)?),
            ToolKind::SendEmail => ToolCall::SendEmail(parse_args(arguments)?),
            ToolKind::DeleteEmail => ToolCall::DeleteEmail(parse_args(arguments)?),
            ToolKind::MarkAsRead => ToolCall::MarkAsRead(parse_args(arguments)?),
            ToolKind::ArchiveEmail => ToolCall::ArchiveEmail(parse_args(arguments)?),
            ToolKind::DeleteEmailsBatch => ToolCall::DeleteEmailsBatch(parse_args(arguments)?),
            ToolKind::ArchiveEmailsBatch => ToolCall::ArchiveEmailsBatch(parse_args(arguments)?),
            ToolKind::MarkAsReadBatch => ToolCall::MarkAsReadBatch(parse_args(arguments)?),
            ToolKind::ListLabels => ToolCall::ListLabels,
            ToolKind::MoveToLabel => ToolCall::MoveToLabel(parse_args(arguments)?),
            ToolKind::MoveToLabelBatch => ToolCall::MoveToLabelBatch(parse_args(arguments)?),
        })
    }
}

fn parse_args<T: DeserializeOwned + Validate>(
    arguments: Value,
) -> std::result::Result<T, McpError> {
    let args: T = serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
        message: e.to_string(),
    })?;
    args.validate()?;
    Ok(args)
}

// ==================== Tool Handler ====================

/// Tool handler
pub struct ToolHandler {
    api: Arc<dyn MailApi>,
    archive_policy: ArchivePolicy,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(api: Arc<dyn MailApi>, archive_policy: ArchivePolicy) -> Self {
        Self { api, archive_policy }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        tool_catalog()
    }

    /// Call a tool by name
    ///
    /// Never fails: validation and mailbox errors come back as error results.
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        tracing::debug!("Calling tool {}", name);

        let call = match ToolCall::parse(name, args) {
            Ok(call) => call,
            Err(e) => {
                tracing::warn!("Rejected call to {}: {}", name, e);
                return CallToolResult::error(e.to_string());
            }
        };

        match self.execute(call).await {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                CallToolResult::error(e.to_string())
            }
        }
    }

    /// Run a validated call and render its response text
    pub async fn execute(&self, call: ToolCall) -> Result<String> {
        match call {
            ToolCall::ListEmails(args) => self.list_emails(args).await,
            ToolCall::SendEmail(args) => self.send_email(args).await,
            ToolCall::DeleteEmail(args) => {
                self.apply(&MessageOperation::Trash, &args.id).await?;
                Ok(format!("Email {} deleted successfully", args.id))
            }
            ToolCall::MarkAsRead(args) => {
                self.apply(&MessageOperation::MarkRead, &args.id).await?;
                Ok(format!("Email {} marked as read", args.id))
            }
            ToolCall::ArchiveEmail(args) => {
                let operation = MessageOperation::Archive {
                    verify: self.archive_policy.verify_single,
                };
                self.apply(&operation, &args.id).await?;
                Ok(format!("Email {} {}", args.id, operation.past_tense()))
            }
            ToolCall::MoveToLabel(args) => {
                let operation = MessageOperation::MoveToLabel {
                    label_id: args.label_id.clone(),
                };
                self.apply(&operation, &args.id).await?;
                Ok(format!("Email {} moved to label {}", args.id, args.label_id))
            }
            ToolCall::DeleteEmailsBatch(args) => {
                self.run_batch(MessageOperation::Trash, &args.ids).await
            }
            ToolCall::MarkAsReadBatch(args) => {
                self.run_batch(MessageOperation::MarkRead, &args.ids).await
            }
            ToolCall::ArchiveEmailsBatch(args) => {
                let operation = MessageOperation::Archive {
                    verify: self.archive_policy.verify_batch,
                };
                self.run_batch(operation, &args.ids).await
            }
            ToolCall::MoveToLabelBatch(args) => {
                let operation = MessageOperation::MoveToLabel {
                    label_id: args.label_id,
                };
                self.run_batch(operation, &args.ids).await
            }
            ToolCall::ListLabels => self.list_labels().await,
        }
    }

    // ==================== Tool Implementations ====================

    async fn apply(&self, operation: &MessageOperation, message_id: &str) -> Result<()> {
        operation.apply(self.api.as_ref(), message_id).await
    }

    async fn run_batch(&self, operation: MessageOperation, ids: &[String]) -> Result<String> {
        let result = BatchExecutor::new(self.api.as_ref())
            .execute(&operation, ids)
            .await;
        Ok(BatchSummary::new(result, operation.past_tense()).to_json()?)
    }

    async fn list_emails(&self, args: ListEmailsArgs) -> Result<String> {
        let refs = self.api.list_messages(&args.query, args.max_results).await?;

        let api = self.api.as_ref();
        let summaries = try_join_all(refs.iter().map(|r| async move {
            api.get_message(&r.id).await.map(|m| summarize_message(&m))
        }))
        .await?;

        Ok(serde_json::to_string_pretty(&summaries)?)
    }

    async fn send_email(&self, args: SendEmailArgs) -> Result<String> {
        let params = EmailParams {
            to: args.to,
            subject: args.subject,
            body: args.body,
        };

        let raw = create_email_message(&params)?;
        let message = self.api.send_message(encode_raw_message(&raw)).await?;

        Ok(format!("Email sent successfully with ID: {}", message.id))
    }

    async fn list_labels(&self) -> Result<String> {
        let labels: Vec<LabelSummary> = self
            .api
            .list_labels()
            .await?
            .into_iter()
            .map(LabelSummary::from)
            .collect();

        Ok(serde_json::to_string_pretty(&labels)?)
    }
}
