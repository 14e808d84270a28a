//! Label listing for Gmail

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gmail::client::error_for_status;
use crate::gmail::types::{Label, LabelList};

/// Label manager for Gmail operations
pub struct LabelManager<'a> {
    client: &'a reqwest::Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> LabelManager<'a> {
    /// Create a new label manager
    pub fn new(client: &'a reqwest::Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            client,
            base_url,
            access_token,
        }
    }

    /// Base URL for labels API
    fn labels_url(&self) -> String {
        format!(
            "{}/users/{}/labels",
            self.base_url,
            crate::config::gmail::USER_ID
        )
    }

    /// List all Gmail labels
    pub async fn list(&self) -> Result<Vec<Label>> {
        let response = self
            .client
            .get(self.labels_url())
            .bearer_auth(self.access_token)
            .send()
            .await?;

        let response = error_for_status(response, "list labels", None).await?;
        let label_list: LabelList = response.json().await?;
        Ok(label_list.labels)
    }
}

/// Label fields reported by `list_labels`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_list_visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_list_visibility: Option<String>,
}

impl From<Label> for LabelSummary {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
            label_type: label.label_type,
            message_list_visibility: label.message_list_visibility,
            label_list_visibility: label.label_list_visibility,
        }
    }
}
