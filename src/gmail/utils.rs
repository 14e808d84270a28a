//! Gmail utility functions
//!
//! Raw message creation, header encoding, and header lookup utilities.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::{GmailMcpError, Result, ValidationError};
use crate::gmail::types::{EmailSummary, Message, MessagePart};

/// Encode text for MIME header (RFC 2047)
pub fn encode_mime_header(text: &str) -> String {
    // Check if encoding is needed (non-ASCII characters)
    if text.chars().all(|c| c.is_ascii() && c != '\r' && c != '\n') {
        return text.to_string();
    }

    // Use MIME Words encoding (RFC 2047) - Base64 variant
    format!(
        "=?UTF-8?B?{}?=",
        base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
    )
}

/// Encode a raw email message for Gmail API (base64url, no padding)
pub fn encode_raw_message(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

/// Find header value by name (case-insensitive)
pub fn find_header<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Project a fetched message onto the summary shape, filling placeholders
pub fn summarize_message(message: &Message) -> EmailSummary {
    let payload = message.payload.as_ref();
    let header = |name: &str| payload.and_then(|p| find_header(p, name));

    EmailSummary {
        id: message.id.clone(),
        subject: header("subject").unwrap_or("(no subject)").to_string(),
        from: header("from").unwrap_or("(unknown sender)").to_string(),
        date: header("date").unwrap_or("").to_string(),
        snippet: message.snippet.clone().unwrap_or_default(),
    }
}

/// Parameters for creating a plain-text email message
#[derive(Debug, Clone)]
pub struct EmailParams {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Create a plain-text RFC 5322 message
pub fn create_email_message(params: &EmailParams) -> Result<String> {
    reject_line_breaks("to", &params.to)?;
    reject_line_breaks("subject", &params.subject)?;

    let lines = [
        "From: me".to_string(),
        format!("To: {}", params.to),
        format!("Subject: {}", encode_mime_header(&params.subject)),
        "MIME-Version: 1.0".to_string(),
        "Content-Type: text/plain; charset=UTF-8".to_string(),
        "Content-Transfer-Encoding: 7bit".to_string(),
        String::new(),
        params.body.clone(),
    ];

    Ok(lines.join("\r\n"))
}

fn reject_line_breaks(name: &str, value: &str) -> Result<()> {
    if value.contains(['\r', '\n']) {
        return Err(GmailMcpError::Validation(ValidationError::InvalidParameter {
            name: name.to_string(),
            message: "must not contain line breaks".to_string(),
        }));
    }
    Ok(())
}
