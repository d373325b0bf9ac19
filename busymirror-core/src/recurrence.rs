//! RRULE expansion for recurring events.
//!
//! Expands a series master into plain occurrences around a time range, so the
//! range filters and the overlap rule only ever see single events.

use chrono::{DateTime, Duration, Utc};
use rrule::RRuleSet;
use tracing::warn;

use crate::error::{MirrorError, MirrorResult};
use crate::event::{Recurrence, RemoteEvent, parse_instant};

/// Cap on occurrences generated for one series and range.
const MAX_OCCURRENCES: u16 = 1000;

fn ics_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Build an iCalendar-format rule set for the rrule crate parser.
fn build_rrule_string(start: DateTime<Utc>, recurrence: &Recurrence) -> MirrorResult<String> {
    let rule = recurrence.rrule.trim();
    let rule = rule.strip_prefix("RRULE:").unwrap_or(rule);

    let mut lines = vec![
        format!("DTSTART:{}", ics_utc(start)),
        format!("RRULE:{}", rule),
    ];

    for exdate in &recurrence.exdates {
        let dt = parse_instant(exdate)
            .ok_or_else(|| MirrorError::Interval(format!("unreadable exdate '{}'", exdate)))?;
        lines.push(format!("EXDATE:{}", ics_utc(dt)));
    }

    Ok(lines.join("\n"))
}

/// Occurrences of `master` that may touch `[range_start, range_end]`.
///
/// Occurrences starting up to one event length before the range are
/// included, since they can still reach into it. Callers filter the result
/// with the same rules they apply to plain events. A master without a
/// recurrence yields nothing.
pub fn expand_recurring_event(
    master: &RemoteEvent,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> MirrorResult<Vec<RemoteEvent>> {
    let Some(recurrence) = &master.recurrence else {
        return Ok(Vec::new());
    };

    let first = master.first_interval()?;
    let duration = first.duration();

    let rrule_set: RRuleSet = build_rrule_string(first.start(), recurrence)?
        .parse()
        .map_err(|e| {
            MirrorError::Interval(format!("invalid recurrence '{}': {}", recurrence.rrule, e))
        })?;

    // after/before are exclusive
    let tz: rrule::Tz = Utc.into();
    let after = range_start
        .checked_sub_signed(duration + Duration::seconds(1))
        .unwrap_or(range_start)
        .with_timezone(&tz);
    let before = range_end
        .checked_add_signed(Duration::seconds(1))
        .unwrap_or(range_end)
        .with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(MAX_OCCURRENCES);

    Ok(result
        .dates
        .iter()
        .map(|occurrence| {
            let start = occurrence.with_timezone(&Utc);
            RemoteEvent {
                id: master
                    .id
                    .as_ref()
                    .map(|id| format!("{}@{}", id, ics_utc(start))),
                subject: master.subject.clone(),
                start: start.to_rfc3339(),
                end: (start + duration).to_rfc3339(),
                location: master.location.clone(),
                body: master.body.clone(),
                busy_status: master.busy_status,
                recurrence: None,
            }
        })
        .collect())
}

/// Replace every series master with its occurrences around the range.
///
/// A series that cannot be expanded is kept as is; its master has no
/// interval, so it reads as unreadable downstream.
pub fn expand_in_range(
    events: &[RemoteEvent],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> Vec<RemoteEvent> {
    let mut expanded = Vec::with_capacity(events.len());

    for event in events {
        if event.recurrence.is_none() {
            expanded.push(event.clone());
            continue;
        }

        match expand_recurring_event(event, range_start, range_end) {
            Ok(occurrences) => expanded.extend(occurrences),
            Err(e) => {
                warn!(subject = %event.subject, error = %e, "Could not expand recurring event");
                expanded.push(event.clone());
            }
        }
    }

    expanded
}
