//! In-place terminal redraw of the status table

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{self, Attribute, Color, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use tracing::warn;

use super::table::{build_rows, column_widths, pad, TableRow, HEADERS};
use crate::state::{ControlState, TimerStatus};

/// Plain line breaks scroll at the bottom of the screen, unlike cursor moves
const NEWLINE: &str = "\r\n";

/// Gap between columns
const COLUMN_GAP: &str = "  ";

/// A surface the countdown redraws after every change
pub trait Frame {
    fn draw(&mut self, statuses: &[TimerStatus], control: &ControlState);
}

/// Status line under the table describing the control state
pub fn status_line(control: &ControlState) -> Option<(&'static str, Color)> {
    if control.is_force_quit() {
        Some(("Quitting...", Color::Red))
    } else if control.is_paused() {
        Some(("Paused. Press W to resume.", Color::Yellow))
    } else if control.is_final_alarm() && control.is_alarm_stopped() {
        Some(("Looping alarm stopped", Color::Red))
    } else if control.is_final_alarm() {
        Some((
            "Final alarm is looping. Press ESC to stop. Press W to pause/resume. Q to quit.",
            Color::Green,
        ))
    } else {
        None
    }
}

/// Lines drawn under the table: the status line, then the latest notice
pub fn footer(control: &ControlState) -> Vec<(String, Color)> {
    let mut lines: Vec<(String, Color)> = status_line(control)
        .map(|(text, color)| (text.to_string(), color))
        .into_iter()
        .collect();
    if let Some(notice) = control.latest_notice() {
        lines.push((notice, Color::DarkYellow));
    }
    lines
}

/// Table redrawn over its previous frame
pub struct LiveTable<W: Write> {
    out: W,
    drawn_lines: u16,
}

impl LiveTable<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LiveTable<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            drawn_lines: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, statuses: &[TimerStatus], control: &ControlState) -> io::Result<()> {
        if self.drawn_lines > 0 {
            self.out.queue(cursor::MoveToPreviousLine(self.drawn_lines))?;
        }
        self.out.queue(Clear(ClearType::FromCursorDown))?;

        let rows = build_rows(statuses);
        let widths = column_widths(&rows);
        let mut lines = 0u16;

        self.out.queue(SetAttribute(Attribute::Bold))?;
        self.print_line(&HEADERS, &widths)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        lines += 1;

        for row in &rows {
            self.draw_row(row, &widths)?;
            lines += 1;
        }

        let footer = footer(control);
        if !footer.is_empty() {
            self.out.queue(style::Print(NEWLINE))?;
            lines += 1;
        }
        for (text, color) in footer {
            self.out.queue(SetForegroundColor(color))?;
            self.out.queue(style::Print(text))?;
            self.out.queue(ResetColor)?;
            self.out.queue(style::Print(NEWLINE))?;
            lines += 1;
        }

        self.out.flush()?;
        self.drawn_lines = lines;
        Ok(())
    }

    fn print_line(&mut self, cells: &[&str; 4], widths: &[usize; 4]) -> io::Result<()> {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        self.out.queue(style::Print(line.trim_end()))?;
        self.out.queue(style::Print(NEWLINE))?;
        Ok(())
    }

    fn draw_row(&mut self, row: &TableRow, widths: &[usize; 4]) -> io::Result<()> {
        let [seq, label, time_left, eta] = row.cells();
        self.out.queue(SetAttribute(Attribute::Bold))?;
        self.out.queue(style::Print(pad(seq, widths[0])))?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        self.out.queue(style::Print(COLUMN_GAP))?;
        self.out.queue(style::Print(pad(label, widths[1])))?;
        self.out.queue(style::Print(COLUMN_GAP))?;

        if let Some(color) = row.urgency.color() {
            self.out.queue(SetForegroundColor(color))?;
        }
        self.out.queue(style::Print(pad(time_left, widths[2])))?;
        self.out.queue(ResetColor)?;

        self.out.queue(style::Print(COLUMN_GAP))?;
        self.out.queue(style::Print(eta))?;
        self.out.queue(style::Print(NEWLINE))?;
        Ok(())
    }
}

impl<W: Write> Frame for LiveTable<W> {
    fn draw(&mut self, statuses: &[TimerStatus], control: &ControlState) {
        if let Err(e) = self.render(statuses, control) {
            warn!("Failed to draw status table: {}", e);
        }
    }
}
