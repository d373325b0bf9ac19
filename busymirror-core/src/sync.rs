//! End-to-end busy-time mirroring.
//!
//! A run resolves both calendars, fetches the source events inside the
//! window and walks them in order. Each event is decided on its own and its
//! outcome recorded; nothing an individual event does can stop the run.
//! Only calendar resolution and the source fetch are fatal, and both happen
//! before the first event is touched.
//!
//! Events are processed one at a time, so the overlap query and the write
//! that may follow it never interleave with another event's pair.

use tracing::{info, warn};

use crate::connector::{CalendarHandle, Connector};
use crate::decision::{Decision, DecisionEngine};
use crate::constants::BUSY_SUBJECT;
use crate::event::{BusyBlock, SourceEvent};
use crate::overlap::{ExistingInterval, Tolerance};
use crate::report::{EventError, EventOutcome, Outcome, RunMode, Side, SyncError, SyncReport};
use crate::window::SyncWindow;

/// Static inputs of one run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub source_account: String,
    pub target_account: String,
    /// Calendar name shared by both accounts
    pub calendar_name: String,
    pub window: SyncWindow,
}

pub struct SyncEngine<'a> {
    source: &'a dyn Connector,
    target: &'a dyn Connector,
    tolerance: Tolerance,
}

impl<'a> SyncEngine<'a> {
    pub fn new(source: &'a dyn Connector, target: &'a dyn Connector) -> Self {
        SyncEngine {
            source,
            target,
            tolerance: Tolerance::default(),
        }
    }

    pub async fn run(&self, request: &SyncRequest, mode: RunMode) -> Result<SyncReport, SyncError> {
        let source_calendar = resolve(
            self.source,
            Side::Source,
            &request.source_account,
            &request.calendar_name,
        )
        .await?;
        let target_calendar = resolve(
            self.target,
            Side::Target,
            &request.target_account,
            &request.calendar_name,
        )
        .await?;

        let events = self
            .source
            .list_events(&source_calendar, &request.window)
            .await
            .map_err(SyncError::Fetch)?;
        info!(
            count = events.len(),
            from = %request.window.start_rfc3339(),
            to = %request.window.end_rfc3339(),
            "Fetched source events"
        );

        let engine = DecisionEngine::new(self.target, &target_calendar, self.tolerance);
        let mut report = SyncReport::new(mode);

        // Blocks a plan would have written, so later events see them as sync would
        let mut planned: Vec<ExistingInterval> = Vec::new();

        for remote in &events {
            let outcome = match engine.decide_with_pending(remote, &planned).await {
                Decision::Book(event) => {
                    let outcome = self.book(&target_calendar, &event, mode).await;
                    if outcome == Outcome::WouldBook {
                        planned.push(ExistingInterval {
                            label: BUSY_SUBJECT.to_string(),
                            interval: event.interval,
                        });
                    }
                    outcome
                }
                Decision::Skip { event, conflict } => {
                    info!(
                        subject = %event.subject,
                        interval = %event.interval,
                        conflict = %conflict,
                        "Overlap found, skipping"
                    );
                    Outcome::Skipped { conflict }
                }
                Decision::Error(err) => {
                    warn!(
                        subject = %remote.subject,
                        start = %remote.start,
                        end = %remote.end,
                        error = %err,
                        "Could not process event"
                    );
                    Outcome::Errored(err)
                }
            };
            report.record(EventOutcome::new(remote, outcome));
        }

        info!(
            booked = report.booked,
            skipped = report.skipped,
            errored = report.errored,
            "Sync finished"
        );
        Ok(report)
    }

    async fn book(&self, calendar: &CalendarHandle, event: &SourceEvent, mode: RunMode) -> Outcome {
        if mode == RunMode::Plan {
            info!(subject = %event.subject, interval = %event.interval, "Would book busy time");
            return Outcome::WouldBook;
        }

        let block = BusyBlock::for_event(event);
        match self.target.create_busy_block(calendar, &block).await {
            Ok(()) => {
                info!(subject = %event.subject, interval = %event.interval, "Booked busy time");
                Outcome::Booked
            }
            Err(e) => {
                let err = EventError::Create(e.to_string());
                warn!(
                    subject = %event.subject,
                    interval = %event.interval,
                    error = %err,
                    "Booking failed"
                );
                Outcome::Errored(err)
            }
        }
    }
}

async fn resolve(
    connector: &dyn Connector,
    side: Side,
    account: &str,
    calendar: &str,
) -> Result<CalendarHandle, SyncError> {
    match connector.resolve_calendar(account, calendar).await {
        Ok(Some(handle)) => Ok(handle),
        Ok(None) => Err(SyncError::CalendarNotFound {
            side,
            account: account.to_string(),
            calendar: calendar.to_string(),
        }),
        Err(source) => Err(SyncError::Resolve {
            side,
            account: account.to_string(),
            calendar: calendar.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MemoryConnector;
    use crate::event::{BusyStatus, Recurrence, RemoteEvent};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const WORK: &str = "user@workemail.com";
    const HOME: &str = "user@personalemail.com";
    const CAL: &str = "Calendar";

    fn at(d: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, m, s).unwrap()
    }

    fn remote(subject: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> RemoteEvent {
        RemoteEvent {
            id: None,
            subject: subject.to_string(),
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
            location: None,
            body: None,
            busy_status: BusyStatus::Busy,
            recurrence: None,
        }
    }

    fn request() -> SyncRequest {
        SyncRequest {
            source_account: WORK.to_string(),
            target_account: HOME.to_string(),
            calendar_name: CAL.to_string(),
            window: SyncWindow::starting_at(at(1, 0, 0, 0), Duration::days(30)).unwrap(),
        }
    }

    /// One backend holding both accounts, like a single mail client with two
    /// mailboxes.
    fn backend() -> MemoryConnector {
        let backend = MemoryConnector::new();
        backend.add_calendar(WORK, CAL);
        backend.add_calendar(HOME, CAL);
        backend
    }

    #[tokio::test]
    async fn books_event_onto_empty_target() {
        let backend = backend();
        backend.add_event(WORK, CAL, remote("1:1 with Sam", at(1, 9, 0, 0), at(1, 10, 0, 0)));

        let report = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();

        assert_eq!((report.booked, report.skipped, report.errored), (1, 0, 0));
        let created = backend.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].subject, "Busy");
        assert_eq!(created[0].body, "Blocked due to event: 1:1 with Sam");
        assert_eq!(created[0].interval.start(), at(1, 9, 0, 0));
        assert_eq!(created[0].interval.end(), at(1, 10, 0, 0));
        assert_eq!(backend.events(HOME, CAL).len(), 1);
    }

    #[tokio::test]
    async fn second_run_books_nothing() {
        let backend = backend();
        backend.add_event(WORK, CAL, remote("Standup", at(3, 9, 0, 0), at(3, 9, 15, 0)));
        backend.add_event(WORK, CAL, remote("Review", at(4, 14, 0, 0), at(4, 15, 0, 0)));
        backend.add_event(WORK, CAL, remote("Reminder", at(5, 8, 0, 0), at(5, 8, 0, 0)));
        let engine = SyncEngine::new(&backend, &backend);

        let first = engine.run(&request(), RunMode::Apply).await.unwrap();
        assert_eq!(first.booked, 3);

        let second = engine.run(&request(), RunMode::Apply).await.unwrap();
        assert_eq!(second.booked, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(backend.created().len(), 3);
    }

    #[tokio::test]
    async fn existing_blocks_are_respected() {
        let backend = backend();
        backend.add_event(WORK, CAL, remote("Near", at(1, 9, 0, 0), at(1, 10, 0, 0)));
        backend.add_event(WORK, CAL, remote("Covered", at(2, 9, 0, 0), at(2, 10, 0, 0)));
        backend.add_event(WORK, CAL, remote("Free", at(3, 9, 0, 0), at(3, 10, 0, 0)));
        backend.add_event(HOME, CAL, remote("Dentist", at(1, 9, 0, 30), at(1, 10, 0, 0)));
        backend.add_event(HOME, CAL, remote("Trip", at(2, 8, 30, 0), at(2, 10, 30, 0)));
        backend.add_event(HOME, CAL, remote("Coffee", at(3, 9, 5, 0), at(3, 9, 15, 0)));

        let report = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();

        assert_eq!((report.booked, report.skipped, report.errored), (1, 2, 0));
        match &report.outcomes[0].outcome {
            Outcome::Skipped { conflict } => assert_eq!(conflict.label, "Dentist"),
            other => panic!("expected skip, got {:?}", other),
        }
        match &report.outcomes[1].outcome {
            Outcome::Skipped { conflict } => assert_eq!(conflict.label, "Trip"),
            other => panic!("expected skip, got {:?}", other),
        }
        assert_eq!(report.outcomes[2].outcome, Outcome::Booked);
    }

    #[tokio::test]
    async fn failures_stay_with_their_event() {
        let backend = backend();
        let mut broken = remote("Broken", at(1, 8, 0, 0), at(1, 9, 0, 0));
        broken.start = "??".to_string();
        backend.add_event(WORK, CAL, broken);
        backend.add_event(WORK, CAL, remote("Query fails", at(2, 9, 0, 0), at(2, 10, 0, 0)));
        backend.add_event(WORK, CAL, remote("Write fails", at(3, 9, 0, 0), at(3, 10, 0, 0)));
        backend.add_event(WORK, CAL, remote("Fine", at(4, 9, 0, 0), at(4, 10, 0, 0)));
        backend.fail_query_at(at(2, 9, 0, 0), "timeout");
        backend.fail_create_at(at(3, 9, 0, 0), "quota exceeded");

        let report = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();

        assert_eq!(report.processed(), 4);
        assert_eq!((report.booked, report.skipped, report.errored), (1, 0, 3));
        assert!(matches!(
            report.outcomes[0].outcome,
            Outcome::Errored(EventError::Malformed(_))
        ));
        assert!(matches!(
            report.outcomes[1].outcome,
            Outcome::Errored(EventError::Query(_))
        ));
        assert!(matches!(
            report.outcomes[2].outcome,
            Outcome::Errored(EventError::Create(_))
        ));
        assert_eq!(report.outcomes[3].subject, "Fine");
        assert_eq!(report.outcomes[3].outcome, Outcome::Booked);
    }

    #[tokio::test]
    async fn missing_target_aborts_before_fetching() {
        let backend = MemoryConnector::new();
        backend.add_calendar(WORK, CAL);
        backend.add_event(WORK, CAL, remote("Standup", at(1, 9, 0, 0), at(1, 9, 15, 0)));

        let err = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::CalendarNotFound {
                side: Side::Target,
                ..
            }
        ));
        assert_eq!(backend.list_calls(), 0);
        assert_eq!(backend.query_calls(), 0);
        assert!(backend.created().is_empty());
    }

    #[tokio::test]
    async fn unreachable_source_is_fatal() {
        let backend = backend();
        backend.fail_resolve(WORK);

        let err = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Resolve {
                side: Side::Source,
                ..
            }
        ));
        assert_eq!(backend.list_calls(), 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_fatal() {
        let backend = backend();
        backend.fail_next_list("mailbox offline");

        let err = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Fetch(_)));
        assert_eq!(backend.query_calls(), 0);
    }

    #[tokio::test]
    async fn plan_mode_writes_nothing() {
        let backend = backend();
        backend.add_event(WORK, CAL, remote("Standup", at(1, 9, 0, 0), at(1, 9, 15, 0)));

        let report = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Plan)
            .await
            .unwrap();

        assert!(report.is_dry_run());
        assert_eq!(report.booked, 1);
        assert_eq!(report.outcomes[0].outcome, Outcome::WouldBook);
        assert!(backend.created().is_empty());
        assert!(backend.events(HOME, CAL).is_empty());
    }

    #[tokio::test]
    async fn plan_matches_sync_for_overlapping_source_events() {
        let planned = backend();
        let applied = backend();
        for backend in [&planned, &applied] {
            backend.add_event(WORK, CAL, remote("Review", at(3, 9, 0, 0), at(3, 10, 0, 0)));
            backend.add_event(WORK, CAL, remote("Review (copy)", at(3, 9, 0, 30), at(3, 9, 45, 0)));
        }

        let plan = SyncEngine::new(&planned, &planned)
            .run(&request(), RunMode::Plan)
            .await
            .unwrap();
        let apply = SyncEngine::new(&applied, &applied)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();

        assert_eq!((plan.booked, plan.skipped), (1, 1));
        assert_eq!((apply.booked, apply.skipped), (1, 1));
        assert!(matches!(plan.outcomes[1].outcome, Outcome::Skipped { .. }));
        assert!(planned.created().is_empty());
    }

    fn weekly(subject: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> RemoteEvent {
        RemoteEvent {
            recurrence: Some(Recurrence {
                rrule: "FREQ=WEEKLY;COUNT=3".to_string(),
                exdates: Vec::new(),
            }),
            ..remote(subject, start, end)
        }
    }

    #[tokio::test]
    async fn recurring_source_event_is_mirrored_per_occurrence() {
        let backend = backend();
        backend.add_event(WORK, CAL, weekly("1:1", at(3, 14, 0, 0), at(3, 14, 30, 0)));

        let report = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();

        assert_eq!(report.booked, 3);
        let starts: Vec<_> = backend
            .created()
            .iter()
            .map(|block| block.interval.start())
            .collect();
        assert_eq!(starts, vec![at(3, 14, 0, 0), at(10, 14, 0, 0), at(17, 14, 0, 0)]);

        let again = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();
        assert_eq!((again.booked, again.skipped), (0, 3));
    }

    #[tokio::test]
    async fn recurring_target_event_blocks_booking() {
        let backend = backend();
        backend.add_event(HOME, CAL, weekly("Gym", at(3, 18, 0, 0), at(3, 19, 0, 0)));
        backend.add_event(WORK, CAL, remote("Late call", at(10, 18, 0, 30), at(10, 18, 30, 0)));
        backend.add_event(WORK, CAL, remote("Off week", at(24, 18, 0, 0), at(24, 18, 30, 0)));

        let report = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();

        match &report.outcomes[0].outcome {
            Outcome::Skipped { conflict } => {
                assert_eq!(conflict.label, "Gym");
                assert_eq!(conflict.interval.start(), at(10, 18, 0, 0));
            }
            other => panic!("expected skip, got {other:?}"),
        }
        // COUNT=3 ends the series on the 17th
        assert_eq!(report.outcomes[1].outcome, Outcome::Booked);
    }

    #[tokio::test]
    async fn source_and_target_can_be_separate_backends() {
        let work = MemoryConnector::new();
        work.add_calendar(WORK, CAL);
        work.add_event(WORK, CAL, remote("Standup", at(1, 9, 0, 0), at(1, 9, 15, 0)));
        let home = MemoryConnector::new();
        home.add_calendar(HOME, CAL);

        let report = SyncEngine::new(&work, &home)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();

        assert_eq!(report.booked, 1);
        assert!(work.created().is_empty());
        assert_eq!(home.created().len(), 1);
    }

    #[tokio::test]
    async fn events_outside_window_are_ignored() {
        let backend = backend();
        let last_month = at(1, 9, 0, 0) - Duration::days(10);
        backend.add_event(
            WORK,
            CAL,
            remote("Last month", last_month, last_month + Duration::hours(1)),
        );
        backend.add_event(WORK, CAL, remote("In window", at(2, 9, 0, 0), at(2, 10, 0, 0)));

        let report = SyncEngine::new(&backend, &backend)
            .run(&request(), RunMode::Apply)
            .await
            .unwrap();

        assert_eq!(report.processed(), 1);
        assert_eq!(report.outcomes[0].subject, "In window");
    }
}
