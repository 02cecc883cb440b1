//! Notion to Google Calendar synchronization layer.
//!
//! One-way: records flow from the source into calendar events and the source
//! keeps the processed flag.

pub mod orchestrator;
pub mod types;


pub use orchestrator::SyncOrchestrator;
pub use types::{FailureStage, RecordFailure, SyncSummary, SyncTarget};
