//! In-memory connector.
//!
//! Holds calendars as plain event lists, records what gets written, and can
//! be told to fail specific operations. Clones share state, so a test can
//! keep one handle for inspection while the engine uses another.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CalendarHandle, Connector};
use crate::error::{MirrorError, MirrorResult};
use crate::event::{BusyBlock, RemoteEvent};
use crate::interval::TimeInterval;
use crate::overlap::ExistingInterval;
use crate::query;
use crate::window::SyncWindow;

#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    /// Keyed by calendar id (`account/name`)
    calendars: HashMap<String, Vec<RemoteEvent>>,
    created: Vec<BusyBlock>,
    list_calls: usize,
    query_calls: usize,
    failing_resolves: HashSet<String>,
    fail_next_list: Option<String>,
    failing_queries: HashMap<DateTime<Utc>, String>,
    failing_creates: HashMap<DateTime<Utc>, String>,
}

fn calendar_id(account: &str, name: &str) -> String {
    format!("{}/{}", account, name)
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create an empty calendar.
    pub fn add_calendar(&self, account: &str, name: &str) {
        self.lock()
            .calendars
            .entry(calendar_id(account, name))
            .or_default();
    }

    /// Add an event, creating the calendar if needed.
    pub fn add_event(&self, account: &str, name: &str, event: RemoteEvent) {
        self.lock()
            .calendars
            .entry(calendar_id(account, name))
            .or_default()
            .push(event);
    }

    /// Every event currently on a calendar.
    pub fn events(&self, account: &str, name: &str) -> Vec<RemoteEvent> {
        self.lock()
            .calendars
            .get(&calendar_id(account, name))
            .cloned()
            .unwrap_or_default()
    }

    /// Busy blocks written through this connector, in write order.
    pub fn created(&self) -> Vec<BusyBlock> {
        self.lock().created.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn query_calls(&self) -> usize {
        self.lock().query_calls
    }

    /// Make resolving any calendar of `account` fail with a backend error.
    pub fn fail_resolve(&self, account: &str) {
        self.lock().failing_resolves.insert(account.to_string());
    }

    /// Make the next `list_events` fail.
    pub fn fail_next_list(&self, error: &str) {
        self.lock().fail_next_list = Some(error.to_string());
    }

    /// Make overlap queries for intervals starting at `start` fail.
    pub fn fail_query_at(&self, start: DateTime<Utc>, error: &str) {
        self.lock().failing_queries.insert(start, error.to_string());
    }

    /// Make writes of blocks starting at `start` fail.
    pub fn fail_create_at(&self, start: DateTime<Utc>, error: &str) {
        self.lock().failing_creates.insert(start, error.to_string());
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn resolve_calendar(
        &self,
        account: &str,
        calendar_name: &str,
    ) -> MirrorResult<Option<CalendarHandle>> {
        let inner = self.lock();

        if inner.failing_resolves.contains(account) {
            return Err(MirrorError::Provider(format!(
                "account '{}' is unreachable",
                account
            )));
        }

        let id = calendar_id(account, calendar_name);
        Ok(inner.calendars.contains_key(&id).then(|| CalendarHandle {
            id,
            account: account.to_string(),
            name: calendar_name.to_string(),
        }))
    }

    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        window: &SyncWindow,
    ) -> MirrorResult<Vec<RemoteEvent>> {
        let mut inner = self.lock();
        inner.list_calls += 1;

        if let Some(error) = inner.fail_next_list.take() {
            return Err(MirrorError::Provider(error));
        }

        let events = inner
            .calendars
            .get(&calendar.id)
            .ok_or_else(|| MirrorError::CalendarNotFound(calendar.id.clone()))?;
        Ok(query::events_in_window(events, window))
    }

    async fn query_overlap(
        &self,
        calendar: &CalendarHandle,
        interval: &TimeInterval,
    ) -> MirrorResult<Vec<ExistingInterval>> {
        let mut inner = self.lock();
        inner.query_calls += 1;

        if let Some(error) = inner.failing_queries.get(&interval.start()) {
            return Err(MirrorError::Provider(error.clone()));
        }

        let events = inner
            .calendars
            .get(&calendar.id)
            .ok_or_else(|| MirrorError::CalendarNotFound(calendar.id.clone()))?;
        Ok(query::existing_intervals(query::events_intersecting(
            events, interval,
        )))
    }

    async fn create_busy_block(
        &self,
        calendar: &CalendarHandle,
        block: &BusyBlock,
    ) -> MirrorResult<()> {
        let mut inner = self.lock();

        if let Some(error) = inner.failing_creates.get(&block.interval.start()) {
            return Err(MirrorError::Provider(error.clone()));
        }

        let mut event = block.to_remote();
        event.id = Some(format!("mem-{}", inner.created.len() + 1));

        inner
            .calendars
            .get_mut(&calendar.id)
            .ok_or_else(|| MirrorError::CalendarNotFound(calendar.id.clone()))?
            .push(event);
        inner.created.push(block.clone());
        Ok(())
    }
}
