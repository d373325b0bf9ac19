//! Per-event booking decisions.

use tracing::debug;

use crate::connector::{CalendarHandle, Connector};
use crate::error::MirrorError;
use crate::event::{RemoteEvent, SourceEvent};
use crate::overlap::{ExistingInterval, Tolerance, find_overlap};
use crate::report::EventError;

/// What to do with one source event.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Book(SourceEvent),
    Skip {
        event: SourceEvent,
        conflict: ExistingInterval,
    },
    Error(EventError),
}

/// Decide against intervals already fetched from the target.
pub fn decide_against(
    event: SourceEvent,
    existing: &[ExistingInterval],
    tolerance: Tolerance,
) -> Decision {
    match find_overlap(&event.interval, existing, tolerance) {
        Some(conflict) => Decision::Skip {
            conflict: conflict.clone(),
            event,
        },
        None => Decision::Book(event),
    }
}

/// Decides events against one target calendar, querying it afresh for each
/// event.
pub struct DecisionEngine<'a> {
    target: &'a dyn Connector,
    calendar: &'a CalendarHandle,
    tolerance: Tolerance,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(target: &'a dyn Connector, calendar: &'a CalendarHandle, tolerance: Tolerance) -> Self {
        DecisionEngine {
            target,
            calendar,
            tolerance,
        }
    }

    pub async fn decide(&self, remote: &RemoteEvent) -> Decision {
        self.decide_with_pending(remote, &[]).await
    }

    /// Like [`decide`](Self::decide), but also treats `pending` blocks as if
    /// they were already on the target. Only pending blocks intersecting the
    /// event are considered, after everything the target returned.
    pub async fn decide_with_pending(
        &self,
        remote: &RemoteEvent,
        pending: &[ExistingInterval],
    ) -> Decision {
        let event = match SourceEvent::from_remote(remote) {
            Ok(event) => event,
            Err(MirrorError::Interval(detail)) => {
                return Decision::Error(EventError::Malformed(detail));
            }
            Err(e) => return Decision::Error(EventError::Malformed(e.to_string())),
        };

        // Only what intersects this event; never a window-wide snapshot.
        let mut existing = match self.target.query_overlap(self.calendar, &event.interval).await {
            Ok(existing) => existing,
            Err(e) => return Decision::Error(EventError::Query(e.to_string())),
        };
        existing.extend(
            pending
                .iter()
                .filter(|block| block.interval.intersects(&event.interval))
                .cloned(),
        );
        debug!(
            subject = %event.subject,
            candidates = existing.len(),
            "Queried target for overlaps"
        );

        decide_against(event, &existing, self.tolerance)
    }
}
