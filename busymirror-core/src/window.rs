//! The forward-looking range a run synchronizes.

use chrono::{DateTime, Duration, Utc};

use crate::error::{MirrorError, MirrorResult};

/// `[start, end)` anchored at the start of a run.
///
/// Computed once per run and shared by the fetch and every overlap query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl SyncWindow {
    /// Window of `length` starting at `start`. Negative lengths are rejected.
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> MirrorResult<Self> {
        if length < Duration::zero() {
            return Err(MirrorError::Config(format!(
                "Sync window length must not be negative (got {}s)",
                length.num_seconds()
            )));
        }
        let end = start.checked_add_signed(length).ok_or_else(|| {
            MirrorError::Config(format!(
                "Sync window of {} days runs past the last representable date",
                length.num_days()
            ))
        })?;
        Ok(SyncWindow { start, end })
    }

    /// Window of `length` starting now.
    pub fn from_now(length: Duration) -> MirrorResult<Self> {
        Self::starting_at(Utc::now(), length)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339()
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339()
    }
}
