use async_trait::async_trait;

use crate::error::IntegrationError;
use crate::format::{CalendarSelector, EventPayload};
use crate::period::Window;
use crate::records::{Domain, RawRecord};

/// The tabular store records are read from and flagged in.
///
/// Implementations are constructed once per process and shared by
/// reference; they hold their own credentials.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable service name used in reports.
    fn name(&self) -> &str;

    /// Cheap reachability and credential check.
    async fn ping(&self) -> Result<(), IntegrationError>;

    /// Records of `domain` dated inside `window` whose processed flag is
    /// false, ascending by the domain's date property.
    async fn query_unprocessed(
        &self,
        domain: Domain,
        window: &Window,
    ) -> Result<Vec<RawRecord>, IntegrationError>;

    /// Set the processed flag. Setting an already-set flag is a no-op.
    async fn set_processed(&self, domain: Domain, id: &str) -> Result<(), IntegrationError>;
}

/// The calendar service events are created on.
#[async_trait]
pub trait CalendarService: Send + Sync {
    fn name(&self) -> &str;

    async fn ping(&self) -> Result<(), IntegrationError>;

    /// Create an event and return its id.
    async fn insert_event(
        &self,
        calendar: CalendarSelector,
        event: &EventPayload,
    ) -> Result<String, IntegrationError>;
}
