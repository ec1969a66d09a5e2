//! Falling-items catch game
//!
//! Food and germs rain down the screen; the player taps edible items to
//! collect them. Tapping something inedible costs a point and locks out taps
//! for a penalty window.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Insets};
use super::rng::RandomSource;
use super::state::{Completion, CompletionCallback, GamePhase, MiniGame};
use super::tick::{Clock, Millis, TimerHandle};
use crate::platform::{Haptic, SharedFeedback};
use crate::tuning::CatchTuning;

/// Falling item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    Mushroom,
    Berries,
    PoisonMushroom,
    Bacteria,
    Bacteria2,
}

impl FoodKind {
    pub const ALL: [FoodKind; 5] = [
        FoodKind::Mushroom,
        FoodKind::Berries,
        FoodKind::PoisonMushroom,
        FoodKind::Bacteria,
        FoodKind::Bacteria2,
    ];

    pub fn is_edible(self) -> bool {
        matches!(self, FoodKind::Mushroom | FoodKind::Berries)
    }
}

/// An item on screen. Items stay in the list after they land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    pub kind: FoodKind,
    /// Horizontal centre
    pub x: f32,
    pub spawned_at: Millis,
    /// Cleared once tapped
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatchTimer {
    Countdown,
    GameClock,
    Spawn,
    PenaltyEnd,
}

/// Catch game engine
#[derive(Debug)]
pub struct CatchGame {
    tuning: CatchTuning,
    phase: GamePhase,
    clock: Clock<CatchTimer>,
    countdown_timer: Option<TimerHandle>,
    game_timer: Option<TimerHandle>,
    spawn_timer: Option<TimerHandle>,
    penalty_timer: Option<TimerHandle>,
    items: Vec<FallingItem>,
    next_id: u32,
    collected: u32,
    time_remaining: Millis,
    bounds: Bounds,
    insets: Insets,
    rng: Box<dyn RandomSource>,
    feedback: SharedFeedback,
    completion: Completion,
    torn_down: bool,
}

impl CatchGame {
    /// Create the engine and start the countdown
    pub fn new(
        tuning: CatchTuning,
        feedback: SharedFeedback,
        rng: Box<dyn RandomSource>,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        let time_remaining = tuning.game_duration_ms;
        let mut game = Self {
            tuning,
            phase: GamePhase::Initial,
            clock: Clock::new(),
            countdown_timer: None,
            game_timer: None,
            spawn_timer: None,
            penalty_timer: None,
            items: Vec::new(),
            next_id: 1,
            collected: 0,
            time_remaining,
            bounds: Bounds::default(),
            insets: Insets::default(),
            rng,
            feedback,
            completion: Completion::new(on_complete),
            torn_down: false,
        };
        game.start_countdown();
        game
    }

    fn start_countdown(&mut self) {
        if self.tuning.countdown == 0 {
            self.start_playing();
            return;
        }
        self.phase = GamePhase::Countdown(self.tuning.countdown);
        self.countdown_timer = Some(self.clock.every(1_000, CatchTimer::Countdown));
    }

    fn start_playing(&mut self) {
        self.clock.cancel_slot(&mut self.countdown_timer);
        self.phase = GamePhase::Playing;
        self.feedback.play(Haptic::Medium);
        self.start_play_timers();
        log::info!("Catch game started");
    }

    fn start_play_timers(&mut self) {
        self.game_timer = Some(
            self.clock
                .every(self.tuning.game_step_ms, CatchTimer::GameClock),
        );
        self.spawn_timer = Some(
            self.clock
                .every(self.tuning.spawn_period_ms, CatchTimer::Spawn),
        );
    }

    /// Screen area items fall through
    pub fn update_layout(&mut self, bounds: Bounds, insets: Insets) {
        if self.torn_down {
            return;
        }
        self.bounds = bounds;
        self.insets = insets;
    }

    fn on_timer(&mut self, timer: CatchTimer) {
        match timer {
            CatchTimer::Countdown => {
                if self.phase.tick_countdown() {
                    self.start_playing();
                }
            }
            CatchTimer::GameClock => self.step_game_clock(),
            CatchTimer::Spawn => self.spawn_item(),
            CatchTimer::PenaltyEnd => {
                self.penalty_timer = None;
            }
        }
    }

    fn step_game_clock(&mut self) {
        if !self.phase.is_playing() {
            return;
        }
        if self.time_remaining <= self.tuning.game_step_ms {
            self.time_remaining = 0;
            let success = self.collected >= self.tuning.required_food;
            self.finish(success);
        } else {
            self.time_remaining -= self.tuning.game_step_ms;
        }
    }

    fn spawn_item(&mut self) {
        if !self.phase.is_playing() || self.items.len() >= self.tuning.max_items {
            return;
        }
        let half = self.tuning.item_size / 2.0;
        let min_x = self.insets.left + half;
        let max_x = self.bounds.width() - self.insets.right - half;
        let x = self.rng.range(min_x, max_x);
        let kind = FoodKind::ALL[self.rng.index(FoodKind::ALL.len())];

        self.items.push(FallingItem {
            id: self.next_id,
            kind,
            x,
            spawned_at: self.clock.now(),
            is_enabled: true,
        });
        self.next_id += 1;
    }

    /// Tap an item. Returns true if the tap was accepted.
    pub fn tap_item(&mut self, id: u32) -> bool {
        if self.torn_down || !self.phase.is_playing() || self.is_penalty_active() {
            return false;
        }
        let Some(item) = self.items.iter_mut().find(|i| i.id == id && i.is_enabled) else {
            return false;
        };
        item.is_enabled = false;
        let kind = item.kind;

        if kind.is_edible() {
            self.collected += 1;
            self.feedback.play(Haptic::Light);
        } else {
            self.collected = self.collected.saturating_sub(1);
            self.penalty_timer = Some(
                self.clock
                    .after(self.tuning.penalty_ms, CatchTimer::PenaltyEnd),
            );
            self.feedback.play(Haptic::Error);
            log::debug!("Inedible {kind:?} tapped, penalty started");
        }
        true
    }

    fn finish(&mut self, success: bool) {
        self.clock.cancel_all();
        self.countdown_timer = None;
        self.game_timer = None;
        self.spawn_timer = None;
        self.penalty_timer = None;
        self.phase = GamePhase::Finished { success };
        self.feedback.play(Haptic::for_outcome(success));
        log::info!(
            "Catch game finished, success: {success}, collected: {}",
            self.collected
        );
    }

    pub fn items(&self) -> &[FallingItem] {
        &self.items
    }

    /// Enabled items that can still be tapped
    pub fn tappable_items(&self) -> impl Iterator<Item = &FallingItem> {
        self.items.iter().filter(|i| i.is_enabled)
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn time_remaining(&self) -> Millis {
        self.time_remaining
    }

    pub fn is_penalty_active(&self) -> bool {
        self.penalty_timer.is_some()
    }

    /// Fraction of the fall completed, clamped to 1
    pub fn fall_progress(&self, item: &FallingItem) -> f32 {
        let fall = self.tuning.fall_duration_ms.max(1) as f32;
        let elapsed = self.clock.now().saturating_sub(item.spawned_at) as f32;
        (elapsed / fall).min(1.0)
    }

    /// Current centre of an item: falls from one item size above the top
    /// edge to one item size below the bottom edge
    pub fn item_position(&self, item: &FallingItem) -> Vec2 {
        let size = self.tuning.item_size;
        let start = -size;
        let end = self.bounds.height() + size;
        Vec2::new(item.x, start + (end - start) * self.fall_progress(item))
    }

    pub fn has_landed(&self, item: &FallingItem) -> bool {
        self.fall_progress(item) >= 1.0
    }
}

impl MiniGame for CatchGame {
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
        self.clock.cancel_slot(&mut self.game_timer);
        self.clock.cancel_slot(&mut self.spawn_timer);
    }

    fn resume(&mut self) {
        if self.torn_down || self.phase != GamePhase::Paused {
            return;
        }
        self.phase = GamePhase::Playing;
        self.start_play_timers();
    }

    fn complete_game(&mut self) {
        if !self.torn_down {
            self.completion.report(self.phase);
        }
    }

    fn cleanup(&mut self) {
        self.clock.cancel_all();
        self.countdown_timer = None;
        self.game_timer = None;
        self.spawn_timer = None;
        self.penalty_timer = None;
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
    use crate::sim::rng::ScriptedRandom;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn game_with(tuning: CatchTuning, rng: ScriptedRandom) -> CatchGame {
        let mut game = CatchGame::new(tuning, Rc::new(SilentFeedback), Box::new(rng), None);
        game.update_layout(Bounds::new(0.0, 0.0, 400.0, 800.0), Insets::new(40.0, 10.0, 20.0, 10.0));
        game
    }

    /// Engine past its countdown
    fn playing(tuning: CatchTuning, rng: ScriptedRandom) -> CatchGame {
        let mut game = game_with(tuning, rng);
        game.advance(3_000);
        assert_eq!(game.phase(), GamePhase::Playing);
        game
    }

    #[test]
    fn test_countdown_then_play() {
        let mut game = game_with(CatchTuning::default(), ScriptedRandom::default());
        assert_eq!(game.phase(), GamePhase::Countdown(3));
        game.advance(1_000);
        assert_eq!(game.phase(), GamePhase::Countdown(2));
        game.advance(1_999);
        assert_eq!(game.phase(), GamePhase::Countdown(1));
        game.advance(1);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.items().is_empty());
    }

    #[test]
    fn test_spawned_item_stays_inside_insets() {
        let mut game = playing(CatchTuning::default(), ScriptedRandom::new([0.0, 0.0, 0.999, 0.2]));
        game.advance(650);
        game.advance(650);
        let items = game.items();
        assert_eq!(items.len(), 2);
        assert!((items[0].x - 55.0).abs() < 0.01);
        assert_eq!(items[0].kind, FoodKind::Mushroom);
        assert!((items[1].x - 345.0).abs() < 0.5);
        assert_eq!(items[1].kind, FoodKind::Berries);
        assert!(items[1].id > items[0].id);
    }

    #[test]
    fn test_item_cap() {
        let tuning = CatchTuning {
            max_items: 3,
            ..CatchTuning::default()
        };
        let mut game = playing(tuning, ScriptedRandom::default());
        game.advance(650 * 10);
        assert_eq!(game.items().len(), 3);
    }

    #[test]
    fn test_item_falls_and_remains_listed() {
        let mut game = playing(CatchTuning::default(), ScriptedRandom::default());
        game.advance(650);
        let item = game.items()[0];
        assert!((game.item_position(&item).y + 90.0).abs() < 0.01);

        game.advance(1_100);
        let mid = game.item_position(&item).y;
        assert!((mid - 400.0).abs() < 0.5);

        game.advance(1_100);
        assert!(game.has_landed(&item));
        assert!(game.items().iter().any(|i| i.id == item.id));
    }

    #[test]
    fn test_tap_edible_collects_once() {
        let mut game = playing(CatchTuning::default(), ScriptedRandom::default());
        game.advance(650);
        let id = game.items()[0].id;
        assert!(game.tap_item(id));
        assert_eq!(game.collected(), 1);
        assert!(!game.tap_item(id));
        assert_eq!(game.collected(), 1);
        assert!(!game.tap_item(999));
    }

    #[test]
    fn test_inedible_tap_penalises() {
        // mushroom, mushroom, poison mushroom
        let rng = ScriptedRandom::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.5]);
        let mut game = playing(CatchTuning::default(), rng);
        game.advance(650 * 3);
        let ids: Vec<u32> = game.items().iter().map(|i| i.id).collect();
        assert_eq!(game.items()[2].kind, FoodKind::PoisonMushroom);

        assert!(game.tap_item(ids[0]));
        assert!(game.tap_item(ids[2]));
        assert_eq!(game.collected(), 0);
        assert!(game.is_penalty_active());

        // Locked out during the penalty window
        assert!(!game.tap_item(ids[1]));
        game.advance(5_000);
        assert!(!game.is_penalty_active());
        assert!(game.tap_item(ids[1]));
        assert_eq!(game.collected(), 1);
    }

    #[test]
    fn test_collected_floors_at_zero() {
        let rng = ScriptedRandom::new([0.0, 0.9]);
        let mut game = playing(CatchTuning::default(), rng);
        game.advance(650);
        assert!(!game.items()[0].kind.is_edible());
        assert!(game.tap_item(game.items()[0].id));
        assert_eq!(game.collected(), 0);
    }

    #[test]
    fn test_pause_freezes_game_clock_but_not_penalty() {
        let rng = ScriptedRandom::new([0.0, 0.5]);
        let mut game = playing(CatchTuning::default(), rng);
        game.advance(650);
        assert!(game.tap_item(game.items()[0].id));
        let remaining = game.time_remaining();

        game.pause();
        assert_eq!(game.phase(), GamePhase::Paused);
        game.advance(6_000);
        assert_eq!(game.time_remaining(), remaining);
        assert_eq!(game.items().len(), 1);
        assert!(!game.is_penalty_active());

        game.resume();
        game.advance(650);
        assert_eq!(game.items().len(), 2);
        assert!(game.time_remaining() < remaining);
    }

    #[test]
    fn test_timeout_outcome() {
        let tuning = CatchTuning {
            required_food: 1,
            game_duration_ms: 1_000,
            ..CatchTuning::default()
        };
        let mut game = playing(tuning.clone(), ScriptedRandom::default());
        game.advance(650);
        assert!(game.tap_item(game.items()[0].id));
        game.advance(349);
        assert_eq!(game.phase(), GamePhase::Playing);
        game.advance(1);
        assert_eq!(game.phase(), GamePhase::Finished { success: true });
        assert_eq!(game.time_remaining(), 0);

        let mut idle = playing(tuning, ScriptedRandom::default());
        idle.advance(1_000);
        assert_eq!(idle.phase(), GamePhase::Finished { success: false });
    }

    #[test]
    fn test_finished_game_is_frozen_and_reports_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let feedback = Rc::new(RecordingFeedback::new());
        let tuning = CatchTuning {
            game_duration_ms: 700,
            ..CatchTuning::default()
        };
        let mut game = CatchGame::new(
            tuning,
            feedback.clone(),
            Box::new(ScriptedRandom::default()),
            Some(Box::new(move |ok| sink.borrow_mut().push(ok))),
        );
        game.complete_game();
        assert!(seen.borrow().is_empty());

        game.advance(3_700);
        assert_eq!(game.phase(), GamePhase::Finished { success: false });
        assert_eq!(feedback.last(), Some(Haptic::Error));

        let items = game.items().len();
        assert!(!game.tap_item(game.items()[0].id));
        game.advance(10_000);
        assert_eq!(game.items().len(), items);

        game.complete_game();
        game.complete_game();
        assert_eq!(*seen.borrow(), vec![false]);
    }

    #[test]
    fn test_cleanup_stops_everything() {
        let mut game = playing(CatchTuning::default(), ScriptedRandom::default());
        game.cleanup();
        game.advance(60_000);
        assert!(game.items().is_empty());
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.is_torn_down());
    }
}
