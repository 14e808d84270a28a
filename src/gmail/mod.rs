//! Gmail API module
//!
//! Contains the mailbox trait, types, authentication, and client for the Gmail API.

pub mod api;
pub mod auth;
pub mod client;
pub mod labels;
pub mod types;
pub mod utils;
