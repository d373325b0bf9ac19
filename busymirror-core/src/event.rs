//! Provider-neutral event types.
//!
//! Providers hand events over as [`RemoteEvent`]s whose bounds are still
//! unparsed strings. The engine normalizes them into [`SourceEvent`]s before
//! making any decision, and describes what it wants written back as a
//! [`BusyBlock`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{BUSY_BODY_PREFIX, BUSY_LOCATION, BUSY_SUBJECT};
use crate::error::{MirrorError, MirrorResult};
use crate::interval::TimeInterval;

/// A calendar event as exchanged with providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// Provider-assigned id, absent on events not yet created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub subject: String,
    /// RFC 3339 instant, floating `YYYY-MM-DDTHH:MM[:SS]`, or `YYYY-MM-DD`
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub busy_status: BusyStatus,
    /// Set on the master of a series; `start`/`end` are then its first occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

/// How a series repeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    /// iCalendar RRULE value, e.g. `FREQ=WEEKLY;BYDAY=MO`
    pub rrule: String,
    /// Starts of cancelled occurrences, in any form [`parse_instant`] reads
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exdates: Vec<String>,
}

/// Free/busy state of an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyStatus {
    Free,
    Tentative,
    #[default]
    Busy,
    OutOfOffice,
}

impl RemoteEvent {
    /// Parse the event's bounds into an interval.
    ///
    /// A series master has no single interval and is rejected; expand it with
    /// [`crate::recurrence`] first.
    pub fn interval(&self) -> MirrorResult<TimeInterval> {
        if let Some(recurrence) = &self.recurrence {
            return Err(MirrorError::Interval(format!(
                "unexpanded recurrence '{}'",
                recurrence.rrule
            )));
        }
        self.first_interval()
    }

    /// Bounds as written, ignoring any recurrence.
    pub fn first_interval(&self) -> MirrorResult<TimeInterval> {
        let start = parse_instant(&self.start)
            .ok_or_else(|| MirrorError::Interval(format!("unreadable start '{}'", self.start)))?;
        let end = parse_instant(&self.end)
            .ok_or_else(|| MirrorError::Interval(format!("unreadable end '{}'", self.end)))?;
        TimeInterval::new(start, end)
    }
}

/// Parse a provider timestamp onto the UTC timeline.
///
/// Offsets are applied and then dropped. Floating times and all-day dates
/// carry no offset and are read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A normalized event read from the source calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub subject: String,
    pub interval: TimeInterval,
}

impl SourceEvent {
    pub fn from_remote(event: &RemoteEvent) -> MirrorResult<Self> {
        Ok(SourceEvent {
            subject: event.subject.clone(),
            interval: event.interval()?,
        })
    }
}

/// A busy block to be written to the target calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct BusyBlock {
    pub interval: TimeInterval,
    pub subject: String,
    pub body: String,
    pub location: String,
}

impl BusyBlock {
    /// The block mirroring `event`: same bounds, sentinel subject and
    /// location, and a body pointing back at the source subject.
    pub fn for_event(event: &SourceEvent) -> Self {
        BusyBlock {
            interval: event.interval,
            subject: BUSY_SUBJECT.to_string(),
            body: format!("{}{}", BUSY_BODY_PREFIX, event.subject),
            location: BUSY_LOCATION.to_string(),
        }
    }

    pub fn to_remote(&self) -> RemoteEvent {
        RemoteEvent {
            id: None,
            subject: self.subject.clone(),
            start: self.interval.start().to_rfc3339(),
            end: self.interval.end().to_rfc3339(),
            location: Some(self.location.clone()),
            body: Some(self.body.clone()),
            busy_status: BusyStatus::Busy,
            recurrence: None,
        }
    }
}
