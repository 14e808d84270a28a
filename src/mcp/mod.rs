//! MCP (Model Context Protocol) module
//!
//! Implements the MCP server protocol and the tool dispatcher.

pub mod server;
pub mod tools;
pub mod types;
