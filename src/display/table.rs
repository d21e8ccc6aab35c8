//! Status table rows and formatting

use chrono::{DateTime, Local};
use crossterm::style::Color;

use crate::state::TimerStatus;

/// Column headers, in display order
pub const HEADERS: [&str; 4] = ["Seq", "Label", "Time Left", "ETA"];

/// Shown in the time column once a timer is finished
pub const DONE_MARKER: &str = "✓";

/// Shown in the ETA column when there is no ETA
pub const NO_ETA: &str = "-";

/// Colour class for the time-left cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Done,
    Normal,
    Warning,
    Urgent,
}

impl Urgency {
    pub fn for_remaining(remaining_seconds: u64) -> Self {
        match remaining_seconds {
            0..=2 => Urgency::Urgent,
            3..=9 => Urgency::Warning,
            _ => Urgency::Normal,
        }
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Urgency::Done => None,
            Urgency::Normal => Some(Color::Green),
            Urgency::Warning => Some(Color::Yellow),
            Urgency::Urgent => Some(Color::Red),
        }
    }
}

/// One formatted table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub seq: String,
    pub label: String,
    pub time_left: String,
    pub eta: String,
    pub urgency: Urgency,
}

impl TableRow {
    pub fn cells(&self) -> [&str; 4] {
        [&self.seq, &self.label, &self.time_left, &self.eta]
    }
}

/// `MM:SS`, with minutes allowed past 99
pub fn format_remaining(remaining_seconds: u64) -> String {
    format!("{:02}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}

pub fn format_eta(eta: &DateTime<Local>) -> String {
    eta.format("%H:%M:%S").to_string()
}

/// Build display rows for every timer, finished or not
pub fn build_rows(statuses: &[TimerStatus]) -> Vec<TableRow> {
    statuses
        .iter()
        .enumerate()
        .map(|(idx, status)| {
            let (time_left, urgency) = if status.done {
                (DONE_MARKER.to_string(), Urgency::Done)
            } else {
                (
                    format_remaining(status.remaining_seconds),
                    Urgency::for_remaining(status.remaining_seconds),
                )
            };

            let eta = match (&status.eta, status.done) {
                (Some(eta), false) => format_eta(eta),
                _ => NO_ETA.to_string(),
            };

            TableRow {
                seq: (idx + 1).to_string(),
                label: status.label.clone(),
                time_left,
                eta,
                urgency,
            }
        })
        .collect()
}

/// Width of each column: the widest of header and cells
pub fn column_widths(rows: &[TableRow]) -> [usize; 4] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

/// Left-align `cell` in `width` characters
pub fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn status(label: &str, remaining: u64, done: bool) -> TimerStatus {
        TimerStatus {
            label: label.to_string(),
            remaining_seconds: remaining,
            eta: None,
            done,
        }
    }

    #[test]
    fn remaining_is_minutes_and_seconds() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(75), "01:15");
        assert_eq!(format_remaining(5400), "90:00");
        assert_eq!(format_remaining(6000), "100:00");
    }

    #[test]
    fn urgency_thresholds() {
        assert_eq!(Urgency::for_remaining(0), Urgency::Urgent);
        assert_eq!(Urgency::for_remaining(2), Urgency::Urgent);
        assert_eq!(Urgency::for_remaining(3), Urgency::Warning);
        assert_eq!(Urgency::for_remaining(9), Urgency::Warning);
        assert_eq!(Urgency::for_remaining(10), Urgency::Normal);
        assert_eq!(Urgency::Done.color(), None);
        assert_eq!(Urgency::Urgent.color(), Some(Color::Red));
    }

    #[test]
    fn rows_show_done_and_running_timers() {
        let eta = Local.with_ymd_and_hms(2026, 1, 2, 14, 5, 9).unwrap();
        let mut running = status("Focus", 65, false);
        running.eta = Some(eta);

        let rows = build_rows(&[status("Tea", 0, true), running, status("Break", 300, false)]);

        assert_eq!(rows[0].cells(), ["1", "Tea", DONE_MARKER, NO_ETA]);
        assert_eq!(rows[0].urgency, Urgency::Done);
        assert_eq!(rows[1].cells(), ["2", "Focus", "01:05", "14:05:09"]);
        assert_eq!(rows[1].urgency, Urgency::Normal);
        assert_eq!(rows[2].eta, NO_ETA);
    }

    #[test]
    fn done_rows_hide_stale_eta() {
        let mut done = status("Tea", 0, true);
        done.eta = Some(Local::now());
        assert_eq!(build_rows(&[done])[0].eta, NO_ETA);
    }

    #[test]
    fn widths_cover_headers_and_cells() {
        let rows = build_rows(&[status("A much longer label", 5, false)]);
        assert_eq!(column_widths(&rows), [3, 19, 9, 3]);
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdef", 4), "abcdef");
    }
}
