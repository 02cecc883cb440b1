//! Core error types for calsync-core.
//!
//! Fatal errors (`SyncError`, `ValidationError`, `ConfigError`) abort a run.
//! `RecordSyncError` is scoped to a single record and is recovered by the
//! orchestrator, which turns it into a reported failure and moves on.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::records::Domain;

/// Fatal errors raised by a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A collaborator failed its reachability check. Nothing was touched.
    #[error("{service} is unreachable: {source}")]
    Connectivity {
        service: String,
        #[source]
        source: IntegrationError,
    },

    /// The requested window or period was rejected before any fetch.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Listing unprocessed records failed after preflight succeeded.
    #[error("Failed to fetch {domain} records: {source}")]
    Fetch {
        domain: Domain,
        #[source]
        source: IntegrationError,
    },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Period index outside 1..=52
    #[error("Period index {index} is out of range (expected 1-52)")]
    PeriodOutOfRange { index: u32 },

    /// Window whose start is after its end
    #[error("Invalid window: start ({start}) is after end ({end})")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// OS keyring failure
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Errors from the records-source and calendar-service clients.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Transport-level failure
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{service} API error (HTTP {status}): {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    /// Credentials were rejected or could not be refreshed
    #[error("Authentication with {service} failed: {message}")]
    Auth { service: String, message: String },

    /// A required setting for this call is absent
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// A response was missing a field the client relies on
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Formatting failures for a single record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("record has no date")]
    MissingDate,

    #[error("record has no usable {field}")]
    MissingTimestamp { field: &'static str },

    #[error("local time {0} does not exist in the configured time zone")]
    AmbiguousLocalTime(chrono::NaiveDateTime),

    #[error("duration is too long to schedule")]
    DurationOutOfRange,
}

/// Why a single record could not be synchronized.
#[derive(Error, Debug)]
pub enum RecordSyncError {
    #[error("formatting failed: {0}")]
    Format(#[from] FormatError),

    #[error("calendar insert failed: {0}")]
    Insert(#[source] IntegrationError),
}
