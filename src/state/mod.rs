//! State management module
//! 
//! This module contains the shared control flags and the per-timer status records.

pub mod control_state;
pub mod timer_state;

// Re-export main types
pub use control_state::ControlState;
pub use timer_state::{StatusBoard, TimerStatus};
