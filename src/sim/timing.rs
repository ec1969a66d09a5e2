//! Timing game for chopping wood
//!
//! An indicator sweeps back and forth across a scale. Tapping while it is in
//! the target zone around the centre is a hit; enough hits in a row win,
//! too many misses lose.

use serde::{Deserialize, Serialize};

use super::state::{Completion, CompletionCallback, GamePhase, MiniGame};
use super::tick::{Clock, Millis, TimerHandle};
use crate::platform::{Haptic, SharedFeedback};
use crate::tuning::TimingTuning;

/// Sweeping indicator, position in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub position: f32,
    pub rising: bool,
}

impl Default for Indicator {
    fn default() -> Self {
        Self {
            position: 0.0,
            rising: true,
        }
    }
}

impl Indicator {
    /// Move by `delta`, bouncing off both ends
    pub fn step(&mut self, delta: f32) {
        if self.rising {
            self.position += delta;
            if self.position >= 1.0 {
                self.position = 1.0;
                self.rising = false;
            }
        } else {
            self.position -= delta;
            if self.position <= 0.0 {
                self.position = 0.0;
                self.rising = true;
            }
        }
    }

    /// Whether the indicator sits inside a zone of `width` centred on 0.5
    pub fn in_zone(&self, width: f32) -> bool {
        (self.position - 0.5).abs() <= width / 2.0
    }
}

/// Brief visual cue after a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitFlash {
    Hit,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimingTimer {
    Countdown,
    Step,
    ClearFlash,
}

/// Timing game engine
#[derive(Debug)]
pub struct TimingGame {
    tuning: TimingTuning,
    phase: GamePhase,
    clock: Clock<TimingTimer>,
    countdown_timer: Option<TimerHandle>,
    step_timer: Option<TimerHandle>,
    flash_timer: Option<TimerHandle>,
    indicator: Indicator,
    streak: u32,
    best_streak: u32,
    misses: u32,
    flash: Option<HitFlash>,
    feedback: SharedFeedback,
    completion: Completion,
    torn_down: bool,
}

impl TimingGame {
    /// Create the engine and start the countdown
    pub fn new(
        tuning: TimingTuning,
        feedback: SharedFeedback,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        let mut game = Self {
            tuning,
            phase: GamePhase::Initial,
            clock: Clock::new(),
            countdown_timer: None,
            step_timer: None,
            flash_timer: None,
            indicator: Indicator::default(),
            streak: 0,
            best_streak: 0,
            misses: 0,
            flash: None,
            feedback,
            completion: Completion::new(on_complete),
            torn_down: false,
        };
        if game.tuning.countdown == 0 {
            game.start_playing();
        } else {
            game.phase = GamePhase::Countdown(game.tuning.countdown);
            game.countdown_timer = Some(game.clock.every(1_000, TimingTimer::Countdown));
        }
        game
    }

    fn start_playing(&mut self) {
        self.clock.cancel_slot(&mut self.countdown_timer);
        self.phase = GamePhase::Playing;
        self.feedback.play(Haptic::Medium);
        self.step_timer = Some(self.clock.every(self.tuning.step_ms, TimingTimer::Step));
        log::info!("Timing game started");
    }

    fn on_timer(&mut self, timer: TimingTimer) {
        match timer {
            TimingTimer::Countdown => {
                if self.phase.tick_countdown() {
                    self.start_playing();
                }
            }
            TimingTimer::Step => {
                if self.phase.is_playing() {
                    self.indicator.step(self.tuning.indicator_step);
                }
            }
            TimingTimer::ClearFlash => {
                self.flash = None;
                self.flash_timer = None;
            }
        }
    }

    /// Chop. Returns `Some(hit)` while playing, `None` otherwise.
    pub fn handle_tap(&mut self) -> Option<bool> {
        if self.torn_down || !self.phase.is_playing() {
            return None;
        }
        let hit = self.indicator.in_zone(self.tuning.zone_width);
        let (flash, flash_ms) = if hit {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
            self.feedback.play(Haptic::Success);
            (HitFlash::Hit, self.tuning.hit_flash_ms)
        } else {
            self.streak = 0;
            self.misses += 1;
            self.feedback.play(Haptic::Error);
            (HitFlash::Miss, self.tuning.miss_flash_ms)
        };

        self.clock.cancel_slot(&mut self.flash_timer);
        self.flash = Some(flash);
        self.flash_timer = Some(self.clock.after(flash_ms, TimingTimer::ClearFlash));

        if self.streak >= self.tuning.required_streak {
            self.finish(true);
        } else if self.misses >= self.tuning.max_misses {
            self.finish(false);
        }
        Some(hit)
    }

    fn finish(&mut self, success: bool) {
        self.clock.cancel_slot(&mut self.countdown_timer);
        self.clock.cancel_slot(&mut self.step_timer);
        self.phase = GamePhase::Finished { success };
        self.feedback.play(Haptic::for_outcome(success));
        log::info!(
            "Timing game finished, success: {success}, best streak: {}",
            self.best_streak
        );
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    pub fn is_in_zone(&self) -> bool {
        self.indicator.in_zone(self.tuning.zone_width)
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn flash(&self) -> Option<HitFlash> {
        self.flash
    }
}

impl MiniGame for TimingGame {
    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn advance(&mut self, elapsed: Millis) {
        if self.torn_down {
            return;
        }
        let until = self.clock.now() + elapsed;
        while let Some(timer) = self.clock.pop_due(until) {
            self.on_timer(timer);
        }
        self.clock.settle(until);
    }

    fn pause(&mut self) {
        if self.torn_down || !self.phase.is_playing() {
            return;
        }
        self.phase = GamePhase::Paused;
        self.clock.cancel_slot(&mut self.step_timer);
    }

    fn resume(&mut self) {
        if self.torn_down || self.phase != GamePhase::Paused {
            return;
        }
        self.phase = GamePhase::Playing;
        self.step_timer = Some(self.clock.every(self.tuning.step_ms, TimingTimer::Step));
    }

    fn complete_game(&mut self) {
        if !self.torn_down {
            self.completion.report(self.phase);
        }
    }

    fn cleanup(&mut self) {
        self.clock.cancel_all();
        self.countdown_timer = None;
        self.step_timer = None;
        self.flash_timer = None;
        self.torn_down = true;
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{RecordingFeedback, SilentFeedback};
    use std::cell::RefCell;
    use std::rc::Rc;

    const STEP: Millis = 16;

    fn playing() -> TimingGame {
        let mut game = TimingGame::new(TimingTuning::default(), Rc::new(SilentFeedback), None);
        game.advance(2_000);
        assert_eq!(game.phase(), GamePhase::Playing);
        game
    }

    fn park(game: &mut TimingGame, position: f32) {
        game.indicator.position = position;
    }

    #[test]
    fn test_countdown() {
        let mut game = TimingGame::new(TimingTuning::default(), Rc::new(SilentFeedback), None);
        assert_eq!(game.phase(), GamePhase::Countdown(2));
        assert_eq!(game.handle_tap(), None);
        game.advance(1_000);
        assert_eq!(game.phase(), GamePhase::Countdown(1));
        game.advance(1_000);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_indicator_bounces() {
        let mut game = playing();
        game.advance(STEP * 66);
        assert!(game.indicator().rising);
        assert!(game.indicator().position < 1.0);

        game.advance(STEP);
        assert_eq!(game.indicator().position, 1.0);
        assert!(!game.indicator().rising);

        game.advance(STEP);
        assert!((game.indicator().position - 0.985).abs() < 1e-4);
    }

    #[test]
    fn test_zone_edges() {
        let mut indicator = Indicator {
            position: 0.59,
            rising: true,
        };
        assert!(indicator.in_zone(0.2));
        indicator.position = 0.39;
        assert!(!indicator.in_zone(0.2));
        indicator.position = 0.5;
        assert!(indicator.in_zone(0.2));
    }

    #[test]
    fn test_hit_and_miss_bookkeeping() {
        let mut game = playing();
        park(&mut game, 0.5);
        assert_eq!(game.handle_tap(), Some(true));
        assert_eq!(game.handle_tap(), Some(true));
        assert_eq!(game.streak(), 2);

        park(&mut game, 0.1);
        assert_eq!(game.handle_tap(), Some(false));
        assert_eq!(game.streak(), 0);
        assert_eq!(game.best_streak(), 2);
        assert_eq!(game.misses(), 1);
    }

    #[test]
    fn test_hit_and_miss_cues() {
        let feedback = Rc::new(RecordingFeedback::new());
        let mut game = TimingGame::new(TimingTuning::default(), feedback.clone(), None);
        game.advance(2_000);
        feedback.clear();

        park(&mut game, 0.5);
        assert_eq!(game.handle_tap(), Some(true));
        assert_eq!(feedback.played(), vec![Haptic::Success]);

        park(&mut game, 0.0);
        assert_eq!(game.handle_tap(), Some(false));
        assert_eq!(feedback.played(), vec![Haptic::Success, Haptic::Error]);
    }

    #[test]
    fn test_streak_wins() {
        let feedback = Rc::new(RecordingFeedback::new());
        let mut game = TimingGame::new(TimingTuning::default(), feedback.clone(), None);
        game.advance(2_000);
        for _ in 0..5 {
            park(&mut game, 0.45);
            assert_eq!(game.handle_tap(), Some(true));
        }
        assert_eq!(game.phase(), GamePhase::Finished { success: true });
        assert_eq!(feedback.last(), Some(Haptic::Success));
        assert_eq!(game.handle_tap(), None);
    }

    #[test]
    fn test_misses_lose() {
        let mut game = playing();
        park(&mut game, 0.5);
        game.handle_tap();
        for _ in 0..3 {
            park(&mut game, 0.95);
            game.handle_tap();
        }
        assert_eq!(game.phase(), GamePhase::Finished { success: false });
        assert_eq!(game.best_streak(), 1);

        let frozen = game.indicator();
        game.advance(1_000);
        assert_eq!(game.indicator(), frozen);
    }

    #[test]
    fn test_flash_clears_after_delay() {
        let mut game = playing();
        park(&mut game, 0.5);
        game.handle_tap();
        assert_eq!(game.flash(), Some(HitFlash::Hit));
        game.advance(149);
        assert_eq!(game.flash(), Some(HitFlash::Hit));
        game.advance(1);
        assert_eq!(game.flash(), None);

        park(&mut game, 0.0);
        game.handle_tap();
        assert_eq!(game.flash(), Some(HitFlash::Miss));
        game.advance(100);
        assert_eq!(game.flash(), None);
    }

    #[test]
    fn test_pause_stops_indicator() {
        let mut game = playing();
        game.pause();
        let before = game.indicator();
        game.advance(1_000);
        assert_eq!(game.indicator(), before);
        assert_eq!(game.handle_tap(), None);
        game.resume();
        game.advance(STEP);
        assert!(game.indicator().position > before.position);
    }

    #[test]
    fn test_reports_once_after_finish() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let tuning = TimingTuning {
            required_streak: 1,
            ..TimingTuning::default()
        };
        let mut game = TimingGame::new(
            tuning,
            Rc::new(SilentFeedback),
            Some(Box::new(move |ok| sink.borrow_mut().push(ok))),
        );
        game.complete_game();
        game.advance(2_000);
        park(&mut game, 0.5);
        game.handle_tap();
        game.complete_game();
        game.complete_game();
        assert_eq!(*seen.borrow(), vec![true]);

        game.cleanup();
        assert_eq!(game.handle_tap(), None);
    }
}
