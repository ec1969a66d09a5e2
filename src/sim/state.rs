//! Shared game-state types
//!
//! Every mini-game walks the same lifecycle:
//! `Initial → Countdown(n) → Playing ⇄ Paused → Finished { success }`.

use serde::{Deserialize, Serialize};

use super::tick::Millis;

/// Current phase of a mini-game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created but not started (e.g. waiting for layout)
    #[default]
    Initial,
    /// Pre-game countdown, seconds left
    Countdown(u32),
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    Finished { success: bool },
}

impl GamePhase {
    #[inline]
    pub fn is_playing(self) -> bool {
        self == GamePhase::Playing
    }

    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, GamePhase::Finished { .. })
    }

    /// Outcome of a finished game
    pub fn outcome(self) -> Option<bool> {
        match self {
            GamePhase::Finished { success } => Some(success),
            _ => None,
        }
    }

    /// Advance a countdown by one second.
    /// Returns true when the countdown has run out and play should begin.
    pub fn tick_countdown(&mut self) -> bool {
        match *self {
            GamePhase::Countdown(n) if n > 1 => {
                *self = GamePhase::Countdown(n - 1);
                false
            }
            GamePhase::Countdown(_) => true,
            _ => false,
        }
    }
}

/// Completion callback handed to a mini-game by its parent
pub type CompletionCallback = Box<dyn FnMut(bool)>;

/// Delivers a game's outcome to its parent exactly once
#[derive(Default)]
pub struct Completion {
    callback: Option<CompletionCallback>,
    reported: bool,
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("has_callback", &self.callback.is_some())
            .field("reported", &self.reported)
            .finish()
    }
}

impl Completion {
    pub fn new(callback: Option<CompletionCallback>) -> Self {
        Self {
            callback,
            reported: false,
        }
    }

    /// Report the outcome for `phase`.
    /// Does nothing unless the phase is terminal and nothing was reported yet.
    pub fn report(&mut self, phase: GamePhase) -> bool {
        let Some(success) = phase.outcome() else {
            return false;
        };
        if self.reported {
            return false;
        }
        self.reported = true;
        if let Some(callback) = self.callback.as_mut() {
            callback(success);
        }
        true
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    /// Allow a fresh report after the game is reset
    pub fn rearm(&mut self) {
        self.reported = false;
    }
}

/// Operations every mini-game engine supports, used by the session to drive
/// whichever resource game is in flight.
pub trait MiniGame {
    fn phase(&self) -> GamePhase;

    /// Advance simulation time, firing every timer that falls due
    fn advance(&mut self, elapsed: Millis);

    /// Suspend the game-logic timer (only while playing)
    fn pause(&mut self);

    fn resume(&mut self);

    /// Report the terminal outcome to the parent. Explicitly triggered by the
    /// host; never fires on its own.
    fn complete_game(&mut self);

    /// Cancel all timers. Every later call on the engine is a no-op.
    fn cleanup(&mut self);

    fn is_torn_down(&self) -> bool;
}
