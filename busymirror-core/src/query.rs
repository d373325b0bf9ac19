//! Event selection shared by connectors that filter events themselves.

use tracing::warn;

use crate::event::{RemoteEvent, parse_instant};
use crate::interval::TimeInterval;
use crate::overlap::ExistingInterval;
use crate::recurrence::expand_in_range;
use crate::window::SyncWindow;

/// Events with `start >= window.start` and `end <= window.end`, sorted by start.
/// Series are expanded into their occurrences first.
///
/// Events whose bounds cannot be read are kept, sorted first, so the engine
/// can report them instead of silently losing them.
pub fn events_in_window(events: &[RemoteEvent], window: &SyncWindow) -> Vec<RemoteEvent> {
    let mut selected: Vec<RemoteEvent> = expand_in_range(events, window.start(), window.end())
        .into_iter()
        .filter(|event| match event.interval() {
            Ok(interval) => interval.start() >= window.start() && interval.end() <= window.end(),
            Err(_) => true,
        })
        .collect();
    sort_by_start(&mut selected);
    selected
}

/// Stable sort by parsed start; unreadable starts sort first.
pub fn sort_by_start(events: &mut [RemoteEvent]) {
    events.sort_by_key(|event| parse_instant(&event.start));
}

/// Events, or occurrences of series, whose interval intersects `query`.
/// Unreadable events never match.
pub fn events_intersecting(events: &[RemoteEvent], query: &TimeInterval) -> Vec<RemoteEvent> {
    expand_in_range(events, query.start(), query.end())
        .into_iter()
        .filter(|event| {
            event
                .interval()
                .map(|interval| interval.intersects(query))
                .unwrap_or(false)
        })
        .collect()
}

/// Convert backend events into labeled intervals, dropping any whose bounds
/// cannot be read.
pub fn existing_intervals(events: Vec<RemoteEvent>) -> Vec<ExistingInterval> {
    events
        .into_iter()
        .filter_map(|event| match event.interval() {
            Ok(interval) => Some(ExistingInterval {
                label: event.subject,
                interval,
            }),
            Err(e) => {
                warn!(subject = %event.subject, error = %e, "Ignoring unreadable target event");
                None
            }
        })
        .collect()
}
