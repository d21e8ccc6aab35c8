//! Background tasks module
//! 
//! This module contains the countdown engine driven by the main task and the
//! keyboard listener that runs beside it.

pub mod countdown;
pub mod keyboard;

// Re-export main functions
pub use countdown::{await_acknowledgement, run_countdown, run_sequence, CountdownOutcome};
pub use keyboard::KeyboardListener;
