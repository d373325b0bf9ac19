//! TUI rendering traits for busymirror types.
//!
//! Extension traits that add colored terminal rendering to busymirror-core
//! types using owo_colors.

use busymirror_core::interval::TimeInterval;
use busymirror_core::report::{EventOutcome, Outcome, SyncReport};
use busymirror_core::sync::SyncRequest;
use chrono::Local;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Interval in the viewer's local time, e.g. "Mon Mar 3 09:00 - 10:00".
fn render_interval(interval: &TimeInterval) -> String {
    let start = interval.start().with_timezone(&Local);
    let end = interval.end().with_timezone(&Local);

    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%a %b %-d %H:%M"), end.format("%H:%M"))
    } else {
        format!(
            "{} - {}",
            start.format("%a %b %-d %H:%M"),
            end.format("%a %b %-d %H:%M")
        )
    }
}

impl Render for SyncRequest {
    fn render(&self) -> String {
        format!(
            "📅 {} {} {} {}",
            self.calendar_name.bold(),
            self.source_account,
            "→".dimmed(),
            self.target_account
        )
    }
}

impl Render for EventOutcome {
    fn render(&self) -> String {
        let time = match &self.interval {
            Some(interval) => render_interval(interval),
            None => format!("{} - {}", self.start, self.end),
        };

        match &self.outcome {
            Outcome::Booked => format!("{} {} {}", "+".green(), self.subject.green(), time.dimmed()),
            Outcome::WouldBook => format!(
                "{} {} {} {}",
                "+".green(),
                self.subject.green(),
                time.dimmed(),
                "(would book)".dimmed()
            ),
            Outcome::Skipped { conflict } => format!(
                "{} {} {} {}",
                "=".yellow(),
                self.subject,
                time.dimmed(),
                format!("overlaps {} ({})", conflict.label, render_interval(&conflict.interval))
                    .dimmed()
            ),
            Outcome::Errored(error) => format!(
                "{} {} {} {}",
                "!".red(),
                self.subject.red(),
                time.dimmed(),
                error.to_string().red()
            ),
        }
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        if self.processed() == 0 {
            return "   No events in window".dimmed().to_string();
        }

        let booked_label = if self.is_dry_run() { "to book" } else { "booked" };
        let summary = format!(
            "   {} {}, {} skipped, {} errored",
            self.booked, booked_label, self.skipped, self.errored
        );

        match (self.errored > 0, self.is_dry_run()) {
            (true, _) => summary.red().to_string(),
            (false, true) => format!("{} {}", summary, "(nothing written)".dimmed()),
            (false, false) => summary.green().to_string(),
        }
    }
}
