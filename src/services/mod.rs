//! External resource module
//! 
//! This module wraps the things outside the process: the template file on
//! disk and the ringtone folder played through the audio device.

pub mod alarm;
pub mod templates;

// Re-export main types
pub use alarm::{AlarmError, AlarmPlayer, AlarmRequest, AlarmTrigger};
pub use templates::{substitute, TemplateError, TemplateStore, Templates};
