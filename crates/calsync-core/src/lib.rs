//! # calsync Core Library
//!
//! One-way synchronization of Notion database records into Google Calendar
//! events. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Period**: Sunday-start weekly windows and other date ranges
//! - **Records**: Raw Notion pages normalized into typed records with defaults
//! - **Format**: Pure record -> calendar event payload rules
//! - **Sync**: Mark-and-sweep orchestrator with per-record failure tracking
//! - **Integrations**: Notion and Google Calendar clients behind async traits
//!
//! ## Key Components
//!
//! - [`SyncOrchestrator`]: Preflight, fetch, insert, mark
//! - [`Window`]: Inclusive date range a run covers
//! - [`Config`]: Application configuration management

pub mod config;
pub mod error;
pub mod format;
pub mod integrations;
pub mod period;
pub mod records;
pub mod sync;

pub use config::Config;
pub use error::{
    ConfigError, FormatError, IntegrationError, RecordSyncError, SyncError, ValidationError,
};
pub use format::{format_event, CalendarSelector, EventPayload, EventSpan};
pub use integrations::{CalendarService, GoogleCalendarClient, NotionClient, RecordSource};
pub use period::{compute_window, describe_window, last_seven_days, Window, PERIODS_PER_YEAR};
pub use records::{Domain, NormalizedRecord, RawRecord, TimeZoneSetting};
pub use sync::{FailureStage, RecordFailure, SyncOrchestrator, SyncSummary, SyncTarget};
