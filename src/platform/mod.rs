//! Platform abstraction layer
//!
//! Side-effect services the simulation calls out to. Engines receive them at
//! construction instead of reaching for globals, so tests can substitute
//! recording doubles.

pub mod feedback;

pub use feedback::{Feedback, Haptic, LogFeedback, RecordingFeedback, SharedFeedback, SilentFeedback};
