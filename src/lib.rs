//! Seqtimer - count down a sequence of terminal timers
//! 
//! This library parses compact timer specs, expands saved templates, runs the
//! countdowns one after another with a live table, and rings alarms.

pub mod config;
pub mod display;
pub mod parser;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, Mode};
pub use parser::{parse_sequence, ParseError, TimerSpec};
pub use state::{ControlState, StatusBoard, TimerStatus};
pub use utils::signals::shutdown_signal;
