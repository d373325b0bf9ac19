//! Closed time intervals.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::error::{MirrorError, MirrorResult};

/// A time span `[start, end]` on the UTC timeline.
///
/// `start == end` is allowed; `end < start` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> MirrorResult<Self> {
        if end < start {
            return Err(MirrorError::Interval(format!(
                "end {} is before start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(TimeInterval { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True for zero-length intervals.
    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely inside this interval (bounds inclusive).
    pub fn covers(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Backend-style intersection used when querying a calendar for events
    /// in a range.
    ///
    /// Half-open for ordinary intervals, so back-to-back meetings do not
    /// intersect. When either side is zero-length the test is closed, so an
    /// instant touching an interval still intersects it.
    pub fn intersects(&self, other: &TimeInterval) -> bool {
        if self.is_instant() || other.is_instant() {
            self.start <= other.end && other.start <= self.end
        } else {
            self.start < other.end && other.start < self.end
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
