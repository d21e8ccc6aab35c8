//! Console output module
//! 
//! This module turns the timer statuses into the live countdown table.

pub mod live;
pub mod table;

// Re-export main types
pub use live::{Frame, LiveTable};
pub use table::{build_rows, TableRow, Urgency};
