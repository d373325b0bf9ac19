//! Matching candidate intervals against busy time already on a calendar.
//!
//! An existing interval matches a candidate when either
//!
//! 1. the candidate starts within `[existing.start - tol, existing.end + tol]`, or
//! 2. the existing interval covers the candidate entirely.
//!
//! This is not plain intersection. A candidate starting up to `tol` after an
//! existing block ends still matches, while a candidate that starts earlier
//! and swallows a shorter block does not.

use std::fmt;

use chrono::Duration;

use crate::constants::OVERLAP_TOLERANCE_SECS;
use crate::interval::TimeInterval;

/// Grace applied to the start-boundary comparison. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance(Duration);

impl Tolerance {
    /// Negative durations are clamped to zero.
    pub fn new(duration: Duration) -> Self {
        Tolerance(duration.max(Duration::zero()))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance(Duration::seconds(OVERLAP_TOLERANCE_SECS))
    }
}

/// An interval already present on the target calendar, with its label kept
/// for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingInterval {
    pub label: String,
    pub interval: TimeInterval,
}

impl fmt::Display for ExistingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ({})", self.label, self.interval)
    }
}

/// Whether `existing` matches `candidate` under either rule.
pub fn matches(candidate: &TimeInterval, existing: &TimeInterval, tolerance: Tolerance) -> bool {
    let tol = tolerance.duration();

    let start_within = existing.start() - tol <= candidate.start()
        && candidate.start() <= existing.end() + tol;
    let covered = existing.start() <= candidate.start() && existing.end() >= candidate.end();

    start_within || covered
}

/// First existing interval matching `candidate`, in the order given.
pub fn find_overlap<'a>(
    candidate: &TimeInterval,
    existing: &'a [ExistingInterval],
    tolerance: Tolerance,
) -> Option<&'a ExistingInterval> {
    existing
        .iter()
        .find(|e| matches(candidate, &e.interval, tolerance))
}

pub fn overlaps(
    candidate: &TimeInterval,
    existing: &[ExistingInterval],
    tolerance: Tolerance,
) -> bool {
    find_overlap(candidate, existing, tolerance).is_some()
}
