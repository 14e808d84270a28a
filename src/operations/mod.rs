//! Mailbox operations
//!
//! Single-message operations, the batch executor that fans them out, and the
//! summary reported back to the caller.

pub mod batch;
pub mod single;
pub mod summary;

pub use batch::{BatchExecutor, BatchResult, OperationOutcome};
pub use single::MessageOperation;
pub use summary::BatchSummary;
