//! Per-timer status records read by the live table

use chrono::{DateTime, Local};

use crate::parser::TimerSpec;

/// Live status of one timer in the sequence
#[derive(Debug, Clone, PartialEq)]
pub struct TimerStatus {
    pub label: String,
    pub remaining_seconds: u64,
    pub eta: Option<DateTime<Local>>,
    pub done: bool,
}

impl TimerStatus {
    /// Create a pending status for a parsed timer
    pub fn pending(spec: &TimerSpec) -> Self {
        Self {
            label: spec.label.clone(),
            remaining_seconds: spec.duration_seconds,
            eta: None,
            done: false,
        }
    }

    /// Record one countdown tick
    pub fn update(&mut self, remaining_seconds: u64, eta: Option<DateTime<Local>>) {
        self.remaining_seconds = remaining_seconds;
        self.eta = eta;
    }

    /// Mark the timer finished, whether it ran out or was quit
    pub fn finish(&mut self) {
        self.remaining_seconds = 0;
        self.eta = None;
        self.done = true;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Ordered list of statuses, one slot per timer.
///
/// The countdown engine only ever writes the slot of the timer it is running.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    slots: Vec<TimerStatus>,
}

impl StatusBoard {
    pub fn new(specs: &[TimerSpec]) -> Self {
        Self {
            slots: specs.iter().map(TimerStatus::pending).collect(),
        }
    }

    pub fn statuses(&self) -> &[TimerStatus] {
        &self.slots
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut TimerStatus> {
        self.slots.get_mut(index)
    }
}
