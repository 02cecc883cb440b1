//! Mark-and-sweep synchronization of one or more targets.
//!
//! The processed flag in the records source is the only ledger. Each record
//! is normalized, formatted, inserted and then flagged, strictly in source
//! order. A failing record is reported and skipped; its flag stays false so
//! the next run picks it up again.

use tracing::{info, warn};

use crate::error::{RecordSyncError, SyncError};
use crate::format::format_event;
use crate::integrations::{CalendarService, RecordSource};
use crate::period::{describe_window, Window};
use crate::records::{normalize, NormalizedRecord, TimeZoneSetting};
use crate::sync::types::{RecordFailure, SyncSummary, SyncTarget};

pub struct SyncOrchestrator<'a> {
    source: &'a dyn RecordSource,
    calendar: &'a dyn CalendarService,
    zone: TimeZoneSetting,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(
        source: &'a dyn RecordSource,
        calendar: &'a dyn CalendarService,
        zone: TimeZoneSetting,
    ) -> Self {
        Self {
            source,
            calendar,
            zone,
        }
    }

    /// Verify both collaborators answer before anything is read or written.
    pub async fn preflight(&self) -> Result<(), SyncError> {
        self.source
            .ping()
            .await
            .map_err(|source| SyncError::Connectivity {
                service: self.source.name().to_string(),
                source,
            })?;
        self.calendar
            .ping()
            .await
            .map_err(|source| SyncError::Connectivity {
                service: self.calendar.name().to_string(),
                source,
            })?;
        info!("all connections verified");
        Ok(())
    }

    pub async fn run_sync(
        &self,
        target: SyncTarget,
        window: &Window,
    ) -> Result<SyncSummary, SyncError> {
        self.preflight().await?;
        self.sync_target(target, window).await
    }

    /// One preflight, then each target in the given order.
    pub async fn run_all(
        &self,
        targets: &[SyncTarget],
        window: &Window,
    ) -> Result<Vec<SyncSummary>, SyncError> {
        self.preflight().await?;
        let mut summaries = Vec::with_capacity(targets.len());
        for target in targets {
            summaries.push(self.sync_target(*target, window).await?);
        }
        Ok(summaries)
    }

    /// Sync one target without a preflight.
    pub async fn sync_target(
        &self,
        target: SyncTarget,
        window: &Window,
    ) -> Result<SyncSummary, SyncError> {
        let domain = target.domain();
        info!(%target, window = %describe_window(window), "starting sync");

        let raw = self
            .source
            .query_unprocessed(domain, window)
            .await
            .map_err(|source| SyncError::Fetch { domain, source })?;

        let mut summary = SyncSummary::empty(target);
        summary.fetched = raw.len();
        if raw.is_empty() {
            info!(%target, "no new records to sync");
            return Ok(summary);
        }

        let records: Vec<NormalizedRecord> = raw
            .iter()
            .map(|r| normalize(domain, r))
            .filter(|record| matches_category(target, record))
            .collect();
        info!(%target, fetched = summary.fetched, selected = records.len(), "records selected");

        for record in &records {
            summary.attempted += 1;
            match self.sync_record(record).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    if let Err(e) = self.source.set_processed(domain, record.id()).await {
                        warn!(
                            id = record.id(),
                            label = record.label(),
                            error = %e,
                            "event created but record could not be marked processed"
                        );
                        summary.unmarked.push(record.id().to_string());
                    }
                }
                Err(e) => {
                    warn!(id = record.id(), label = record.label(), error = %e, "record failed");
                    summary.failed.push(RecordFailure::new(record.id(), record.label(), &e));
                }
            }
        }

        info!(
            %target,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed.len(),
            "sync finished"
        );
        Ok(summary)
    }

    async fn sync_record(&self, record: &NormalizedRecord) -> Result<(), RecordSyncError> {
        let event = format_event(record, &self.zone)?;
        self.calendar
            .insert_event(event.calendar, &event)
            .await
            .map_err(RecordSyncError::Insert)?;
        info!(id = record.id(), title = %event.title, "synced record");
        Ok(())
    }
}

fn matches_category(target: SyncTarget, record: &NormalizedRecord) -> bool {
    match (target.category(), record) {
        (Some(category), NormalizedRecord::Activity(activity)) => activity.category == category,
        _ => true,
    }
}
