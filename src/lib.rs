//! Gmail Batch MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing Gmail mailbox operations,
//! including batch variants that report per-message success and failure.

pub mod config;
pub mod error;
pub mod gmail;
pub mod mcp;
pub mod operations;

pub use config::Config;
pub use error::{GmailMcpError, Result};
