//! In-memory collaborators for orchestrator tests.
//!
//! `MemorySource` honors the processed flag and the window like the real
//! records source does, so repeated runs behave as they would against Notion.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use calsync_core::integrations::{CalendarService, RecordSource};
use calsync_core::period::Window;
use calsync_core::records::{Domain, RawRecord};
use calsync_core::{CalendarSelector, EventPayload, IntegrationError};

struct StoredRecord {
    domain: Domain,
    date: NaiveDate,
    raw: RawRecord,
    processed: bool,
}

pub struct MemorySource {
    records: Mutex<Vec<StoredRecord>>,
    pub reachable: bool,
    pub queries: Mutex<usize>,
    refuse_marks: HashSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            reachable: true,
            queries: Mutex::new(0),
            refuse_marks: HashSet::new(),
        }
    }

    pub fn with(mut self, domain: Domain, date: NaiveDate, raw: RawRecord) -> Self {
        self.records.get_mut().unwrap().push(StoredRecord {
            domain,
            date,
            raw,
            processed: false,
        });
        self
    }

    /// Make `set_processed` fail for this page id.
    pub fn refuse_mark(mut self, id: &str) -> Self {
        self.refuse_marks.insert(id.to_string());
        self
    }

    pub fn processed_ids(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.processed)
            .map(|r| r.raw.id.clone())
            .collect()
    }

    pub fn query_count(&self) -> usize {
        *self.queries.lock().unwrap()
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        "Memory Notion"
    }

    async fn ping(&self) -> Result<(), IntegrationError> {
        if !self.reachable {
            return Err(IntegrationError::Api {
                service: "Memory Notion".to_string(),
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn query_unprocessed(
        &self,
        domain: Domain,
        window: &Window,
    ) -> Result<Vec<RawRecord>, IntegrationError> {
        *self.queries.lock().unwrap() += 1;
        let records = self.records.lock().unwrap();
        let mut matching: Vec<&StoredRecord> = records
            .iter()
            .filter(|r| r.domain == domain && !r.processed && window.contains(r.date))
            .collect();
        matching.sort_by_key(|r| r.date);
        Ok(matching.into_iter().map(|r| r.raw.clone()).collect())
    }

    async fn set_processed(&self, _domain: Domain, id: &str) -> Result<(), IntegrationError> {
        if self.refuse_marks.contains(id) {
            return Err(IntegrationError::Api {
                service: "Memory Notion".to_string(),
                status: 409,
                message: "conflict".to_string(),
            });
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.raw.id == id)
            .ok_or_else(|| IntegrationError::InvalidResponse(format!("no page {id}")))?;
        record.processed = true;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CreatedEvent {
    pub calendar: CalendarSelector,
    pub payload: EventPayload,
}

pub struct MemoryCalendar {
    events: Mutex<Vec<CreatedEvent>>,
    calls: Mutex<usize>,
    pub reachable: bool,
    /// 1-based insert call numbers that fail.
    fail_calls: HashSet<usize>,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
            reachable: true,
            fail_calls: HashSet::new(),
        }
    }

    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_calls.insert(call);
        self
    }

    pub fn events(&self) -> Vec<CreatedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarService for MemoryCalendar {
    fn name(&self) -> &str {
        "Memory Calendar"
    }

    async fn ping(&self) -> Result<(), IntegrationError> {
        if !self.reachable {
            return Err(IntegrationError::Auth {
                service: "Memory Calendar".to_string(),
                message: "invalid_grant".to_string(),
            });
        }
        Ok(())
    }

    async fn insert_event(
        &self,
        calendar: CalendarSelector,
        event: &EventPayload,
    ) -> Result<String, IntegrationError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.fail_calls.contains(&call) {
            return Err(IntegrationError::Api {
                service: "Memory Calendar".to_string(),
                status: 500,
                message: "backend error".to_string(),
            });
        }
        let mut events = self.events.lock().unwrap();
        events.push(CreatedEvent {
            calendar,
            payload: event.clone(),
        });
        Ok(format!("event-{}", events.len()))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn title(text: &str) -> serde_json::Value {
    json!({ "title": [{ "plain_text": text }] })
}

pub fn rich_text(text: &str) -> serde_json::Value {
    json!({ "rich_text": [{ "plain_text": text }] })
}

pub fn workout(id: &str, name: &str, on: NaiveDate) -> RawRecord {
    RawRecord::new(
        id,
        json!({
            "Activity Name": title(name),
            "Date": { "date": { "start": on.format("%Y-%m-%d").to_string() } },
            "Activity Type": { "select": { "name": "Run" } },
            "Duration": { "number": 45 },
        }),
    )
}

pub fn commit_day(id: &str, repo: &str, on: NaiveDate, project_type: &str) -> RawRecord {
    RawRecord::new(
        id,
        json!({
            "Repository": title(repo),
            "Date": { "date": { "start": on.format("%Y-%m-%d").to_string() } },
            "Commits Count": { "number": 3 },
            "Project Type": { "select": { "name": project_type } },
            "Lines Added": { "number": 40 },
            "Lines Deleted": { "number": 10 },
        }),
    )
}

pub fn night(
    id: &str,
    label: &str,
    on: NaiveDate,
    bedtime: &str,
    wake: &str,
    calendar: &str,
) -> RawRecord {
    RawRecord::new(
        id,
        json!({
            "Night of": title(label),
            "Night of Date": { "date": { "start": on.format("%Y-%m-%d").to_string() } },
            "Bedtime": rich_text(bedtime),
            "Wake Time": rich_text(wake),
            "Sleep Duration": { "number": 7.5 },
            "Efficiency": { "number": 91 },
            "Google Calendar": { "select": { "name": calendar } },
        }),
    )
}
