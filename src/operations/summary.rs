//! Batch result reporting

use serde::Serialize;

use crate::operations::batch::{BatchResult, OperationOutcome};

/// Noun used for the items of every batch tool
const ITEM_NOUN: &str = "emails";

/// Response payload for batch tools
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// e.g. "3 emails deleted successfully, 1 failed"
    pub message: String,
    pub success_count: usize,
    pub failed_count: usize,
    pub results: Vec<OperationOutcome>,
}

impl BatchSummary {
    pub fn new(result: BatchResult, past_tense: &str) -> Self {
        Self {
            message: summary_line(result.success_count, result.failed_count, past_tense),
            success_count: result.success_count,
            failed_count: result.failed_count,
            results: result.results,
        }
    }

    /// Pretty-printed JSON for the tool response
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `"<successCount> emails <pastTense>, <failedCount> failed"`
pub fn summary_line(success_count: usize, failed_count: usize, past_tense: &str) -> String {
    format!(
        "{} {} {}, {} failed",
        success_count, ITEM_NOUN, past_tense, failed_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(3, 1, "deleted successfully"),
            "3 emails deleted successfully, 1 failed"
        );
        assert_eq!(summary_line(0, 0, "marked as read"), "0 emails marked as read, 0 failed");
    }

    #[test]
    fn test_summary_payload_shape() {
        let result = BatchResult::from_outcomes(vec![
            OperationOutcome::succeeded("a"),
            OperationOutcome::failed("b", "Gmail API error: Message not found: b"),
        ]);
        let summary = BatchSummary::new(result, "moved to label");
        let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();

        assert_eq!(value["message"], "1 emails moved to label, 1 failed");
        assert_eq!(value["successCount"], 1);
        assert_eq!(value["failedCount"], 1);
        assert_eq!(value["results"][0]["id"], "a");
        assert_eq!(value["results"][1]["success"], false);
    }
}
