//! Batch execution with per-message failure isolation
//!
//! All items of a batch run concurrently on the current task and are joined
//! before the result is built. A failing item becomes a failed
//! [`OperationOutcome`]; it never cancels or hides its siblings.

use futures::future::join_all;
use serde::Serialize;

use crate::error::Result;
use crate::gmail::api::MailApi;
use crate::operations::single::MessageOperation;

/// Outcome of one item in a batch
///
/// `error` is present exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    id: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl OperationOutcome {
    pub fn succeeded(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            error: Some(error.into()),
        }
    }

    /// Build an outcome from the result of a single-message operation
    pub fn from_result(id: &str, result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::succeeded(id),
            Err(e) => Self::failed(id, e.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Aggregate result of a batch, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub results: Vec<OperationOutcome>,
}

impl BatchResult {
    /// Count successes and failures over ordered outcomes
    pub fn from_outcomes(results: Vec<OperationOutcome>) -> Self {
        let success_count = results.iter().filter(|r| r.success()).count();
        Self {
            success_count,
            failed_count: results.len() - success_count,
            results,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// Runs a [`MessageOperation`] over many message IDs
pub struct BatchExecutor<'a> {
    api: &'a dyn MailApi,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(api: &'a dyn MailApi) -> Self {
        Self { api }
    }

    /// Apply `operation` to every ID and wait for all of them
    ///
    /// Duplicate IDs are processed once per occurrence. An empty slice yields
    /// an empty result.
    pub async fn execute(
        &self,
        operation: &MessageOperation,
        message_ids: &[String],
    ) -> BatchResult {
        let api = self.api;

        let tasks = message_ids.iter().enumerate().map(|(index, id)| async move {
            let result = operation.apply(api, id).await;
            if let Err(ref e) = result {
                tracing::warn!("Batch item {} ({}) failed: {}", index, id, e);
            }
            (index, OperationOutcome::from_result(id, result))
        });

        // join_all yields in input order; the index tag keeps that explicit
        let mut tagged = join_all(tasks).await;
        tagged.sort_by_key(|(index, _)| *index);

        let result =
            BatchResult::from_outcomes(tagged.into_iter().map(|(_, outcome)| outcome).collect());

        tracing::info!(
            "Batch complete: {} succeeded, {} failed",
            result.success_count,
            result.failed_count
        );

        result
    }
}
