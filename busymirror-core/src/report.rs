//! Outcomes of a sync run.

use std::fmt;

use thiserror::Error;

use crate::error::MirrorError;
use crate::event::RemoteEvent;
use crate::interval::TimeInterval;
use crate::overlap::ExistingInterval;

/// Whether a run writes busy blocks or only plans them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Apply,
    Plan,
}

/// Which side of the sync a calendar belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Failures that abort a run before any event is processed.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{side} calendar '{calendar}' not found for account '{account}'")]
    CalendarNotFound {
        side: Side,
        account: String,
        calendar: String,
    },

    #[error("could not resolve {side} calendar '{calendar}' for account '{account}': {source}")]
    Resolve {
        side: Side,
        account: String,
        calendar: String,
        source: MirrorError,
    },

    #[error("could not fetch source events: {0}")]
    Fetch(#[source] MirrorError),
}

/// Failures confined to a single source event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    #[error("malformed event: {0}")]
    Malformed(String),

    #[error("overlap query failed: {0}")]
    Query(String),

    #[error("could not create busy block: {0}")]
    Create(String),
}

/// Final state of one source event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Booked,
    /// Would have been booked; the run was a plan
    WouldBook,
    Skipped { conflict: ExistingInterval },
    Errored(EventError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventOutcome {
    pub subject: String,
    /// Raw bounds as the source provider reported them
    pub start: String,
    pub end: String,
    /// Normalized bounds, when they could be read
    pub interval: Option<TimeInterval>,
    pub outcome: Outcome,
}

impl EventOutcome {
    pub fn new(event: &RemoteEvent, outcome: Outcome) -> Self {
        EventOutcome {
            subject: event.subject.clone(),
            start: event.start.clone(),
            end: event.end.clone(),
            interval: event.interval().ok(),
            outcome,
        }
    }
}

/// Counts and per-event outcomes of one run, in processing order.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub mode: RunMode,
    pub booked: usize,
    pub skipped: usize,
    pub errored: usize,
    pub outcomes: Vec<EventOutcome>,
}

impl SyncReport {
    pub fn new(mode: RunMode) -> Self {
        SyncReport {
            mode,
            booked: 0,
            skipped: 0,
            errored: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: EventOutcome) {
        match outcome.outcome {
            Outcome::Booked | Outcome::WouldBook => self.booked += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Errored(_) => self.errored += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == RunMode::Plan
    }
}
