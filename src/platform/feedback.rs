//! Haptic/sound feedback dispatch
//!
//! Engines fire cues and never wait on or inspect the result. A failing or
//! disabled sink cannot influence simulation state.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Feedback vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Haptic {
    /// Small confirmation (tile moved, card flipped, item caught)
    Light,
    /// Gameplay started
    Medium,
    /// Board cell revealed
    Selection,
    Success,
    Error,
}

impl Haptic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Haptic::Light => "light",
            Haptic::Medium => "medium",
            Haptic::Selection => "selection",
            Haptic::Success => "success",
            Haptic::Error => "error",
        }
    }

    /// Outcome cue for a finished game
    pub fn for_outcome(success: bool) -> Self {
        if success { Haptic::Success } else { Haptic::Error }
    }
}

/// Fire-and-forget feedback sink
pub trait Feedback: fmt::Debug {
    fn play(&self, haptic: Haptic);
}

/// Feedback handle shared by every engine in a session
pub type SharedFeedback = Rc<dyn Feedback>;

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn play(&self, _haptic: Haptic) {}
}

/// Host sink without a haptic engine: logs cues, honours the haptics setting
#[derive(Debug)]
pub struct LogFeedback {
    enabled: Cell<bool>,
}

impl Default for LogFeedback {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LogFeedback {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Cell::new(enabled),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.haptics_on)
    }

    /// Toggle at runtime (settings screen)
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

impl Feedback for LogFeedback {
    fn play(&self, haptic: Haptic) {
        if !self.enabled.get() {
            return;
        }
        log::debug!("feedback: {}", haptic.as_str());
    }
}

/// Records every cue, for assertions in tests and replays
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    played: RefCell<Vec<Haptic>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Haptic> {
        self.played.borrow().clone()
    }

    pub fn last(&self) -> Option<Haptic> {
        self.played.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl Feedback for RecordingFeedback {
    fn play(&self, haptic: Haptic) {
        // A re-entrant borrow would only drop the cue
        if let Ok(mut played) = self.played.try_borrow_mut() {
            played.push(haptic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_feedback() {
        let feedback = RecordingFeedback::new();
        feedback.play(Haptic::Light);
        feedback.play(Haptic::for_outcome(false));
        assert_eq!(feedback.played(), vec![Haptic::Light, Haptic::Error]);
        assert_eq!(feedback.last(), Some(Haptic::Error));
        feedback.clear();
        assert!(feedback.played().is_empty());
    }

    #[test]
    fn test_log_feedback_toggle() {
        let feedback = LogFeedback::from_settings(&Settings::default());
        assert!(feedback.is_enabled());
        feedback.set_enabled(false);
        feedback.play(Haptic::Medium);
        assert!(!feedback.is_enabled());
    }
}
