//! Snake-style water-drop collector
//!
//! The player steers a chain of segments with swipes. Each drop the head
//! touches scores a point and grows the tail. Leaving the play area ends the
//! run as a failure regardless of score.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Insets, within_reach};
use super::rng::RandomSource;
use super::state::{Completion, CompletionCallback, GamePhase, MiniGame};
use super::tick::{Clock, Millis, TimerHandle};
use crate::platform::{Haptic, SharedFeedback};
use crate::tuning::CollectorTuning;

/// Direction of travel (screen space, y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    /// Unit vector of travel
    pub fn vector(self) -> Vec2 {
        match self {
            Heading::Up => Vec2::new(0.0, -1.0),
            Heading::Down => Vec2::new(0.0, 1.0),
            Heading::Left => Vec2::new(-1.0, 0.0),
            Heading::Right => Vec2::new(1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectorTimer {
    Countdown,
    Step,
}

/// Collector engine
#[derive(Debug)]
pub struct CollectorGame {
    tuning: CollectorTuning,
    phase: GamePhase,
    clock: Clock<CollectorTimer>,
    countdown_timer: Option<TimerHandle>,
    step_timer: Option<TimerHandle>,
    /// Head first
    segments: Vec<Vec2>,
    heading: Heading,
    /// Applied at the start of the next step
    queued_heading: Option<Heading>,
    drop: Vec2,
    score: u32,
    time_remaining: Millis,
    area: Bounds,
    has_layout: bool,
    rng: Box<dyn RandomSource>,
    feedback: SharedFeedback,
    completion: Completion,
    torn_down: bool,
}

impl CollectorGame {
    /// Create the engine. It stays in `Initial` until the first layout.
    pub fn new(
        tuning: CollectorTuning,
        feedback: SharedFeedback,
        rng: Box<dyn RandomSource>,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        let time_remaining = tuning.game_duration_ms;
        Self {
            tuning,
            phase: GamePhase::Initial,
            clock: Clock::new(),
            countdown_timer: None,
            step_timer: None,
            segments: Vec::new(),
            heading: Heading::Down,
            queued_heading: None,
            drop: Vec2::ZERO,
            score: 0,
            time_remaining,
            area: Bounds::default(),
            has_layout: false,
            rng,
            feedback,
            completion: Completion::new(on_complete),
            torn_down: false,
        }
    }

    /// Layout bounds minus the status bar and the vertical safe-area insets
    pub fn play_area_for(tuning: &CollectorTuning, bounds: Bounds, insets: Insets) -> Bounds {
        let top = tuning.status_bar_height + insets.top;
        Bounds::new(
            bounds.origin.x,
            bounds.origin.y + top,
            bounds.width(),
            bounds.height() - top - insets.bottom,
        )
    }

    /// Feed the screen layout. The first call places the head and the first
    /// drop and starts the countdown.
    pub fn update_layout(&mut self, bounds: Bounds, insets: Insets) {
        if self.torn_down {
            return;
        }
        self.area = Self::play_area_for(&self.tuning, bounds, insets);
        if self.has_layout {
            return;
        }
        self.has_layout = true;
        self.segments = vec![self.area.center()];
        self.spawn_drop();
        self.start_countdown();
    }

    fn start_countdown(&mut self) {
        if self.tuning.countdown == 0 {
            self.start_playing();
            return;
        }
        self.phase = GamePhase::Countdown(self.tuning.countdown);
        self.countdown_timer = Some(self.clock.every(1_000, CollectorTimer::Countdown));
    }

    fn start_playing(&mut self) {
        self.clock.cancel_slot(&mut self.countdown_timer);
        self.phase = GamePhase::Playing;
        self.feedback.play(Haptic::Medium);
        self.step_timer = Some(self.clock.every(self.tuning.step_ms, CollectorTimer::Step));
        log::info!("Collector game started");
    }

    fn spawn_drop(&mut self) {
        let inner = self.area.inset_by(self.tuning.drop_size);
        let (min, max) = (inner.min(), inner.max());
        let x = self.rng.range(min.x, max.x);
        let y = self.rng.range(min.y, max.y);
        self.drop = Vec2::new(x, y);
    }

    /// Swipe from `start` to `end`. The dominant axis must exceed the swipe
    /// threshold; gestures with no dominant axis are ignored. A swipe during
    /// the countdown sets the opening heading.
    pub fn handle_drag(&mut self, start: Vec2, end: Vec2) -> bool {
        let accepts = matches!(self.phase, GamePhase::Countdown(_) | GamePhase::Playing);
        if self.torn_down || !accepts {
            return false;
        }
        let delta = end - start;
        let (dx, dy) = (delta.x.abs(), delta.y.abs());
        let threshold = self.tuning.swipe_threshold;
        if dx <= threshold && dy <= threshold {
            return false;
        }

        let heading = if dx > dy {
            if delta.x > 0.0 { Heading::Right } else { Heading::Left }
        } else if dy > dx {
            if delta.y > 0.0 { Heading::Down } else { Heading::Up }
        } else {
            return false;
        };
        self.queued_heading = Some(heading);
        true
    }

    fn on_timer(&mut self, timer: CollectorTimer) {
        match timer {
            CollectorTimer::Countdown => {
                if self.phase.tick_countdown() {
                    self.start_playing();
                }
            }
            CollectorTimer::Step => self.step(),
        }
    }

    fn step(&mut self) {
        if !self.phase.is_playing() {
            return;
        }
        if self.time_remaining <= self.tuning.time_out_margin_ms {
            self.time_remaining = 0;
            let success = self.score >= self.tuning.required_drops;
            self.finish(success);
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(self.tuning.step_ms);

        if let Some(heading) = self.queued_heading.take() {
            self.heading = heading;
        }
        self.move_segments();

        if within_reach(self.head(), self.drop, self.tuning.segment_size) {
            self.score += 1;
            self.feedback.play(Haptic::Light);
            self.spawn_drop();
            self.grow();
        }

        if !self.area.contains(self.head()) {
            log::debug!("Collector head left the play area at {:?}", self.head());
            self.finish(false);
        }
    }

    fn move_segments(&mut self) {
        let Some(&head) = self.segments.first() else {
            return;
        };
        let spacing = self.tuning.segment_size;
        let previous = self.segments.clone();
        self.segments[0] = head + self.heading.vector() * self.tuning.speed;

        for i in 1..self.segments.len() {
            let target = previous[i - 1];
            let offset = target - self.segments[i];
            let distance = offset.length();
            if distance > spacing {
                self.segments[i] = target - offset / distance * spacing;
            }
        }
    }

    /// Append a segment one spacing past the tail, continuing its direction
    fn grow(&mut self) {
        let spacing = self.tuning.segment_size;
        let backwards = -self.heading.vector();
        let tail = match self.segments.as_slice() {
            [] => return,
            [only] => *only + backwards * spacing,
            [.., before, last] => {
                let direction = (*last - *before).normalize_or_zero();
                if direction == Vec2::ZERO {
                    *last + backwards * spacing
                } else {
                    *last + direction * spacing
                }
            }
        };
        self.segments.push(tail);
    }

    fn finish(&mut self, success: bool) {
        self.clock.cancel_all();
        self.countdown_timer = None;
        self.step_timer = None;
        self.phase = GamePhase::Finished { success };
        self.feedback.play(Haptic::for_outcome(success));
        log::info!("Collector game finished, success: {success}, score: {}", self.score);
    }

    pub fn head(&self) -> Vec2 {
        self.segments.first().copied().unwrap_or(Vec2::ZERO)
    }

    pub fn segments(&self) -> &[Vec2] {
        &self.segments
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn drop_position(&self) -> Vec2 {
        self.drop
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> Millis {
        self.time_remaining
    }

    pub fn play_area(&self) -> Bounds {
        self.area
    }
}

impl MiniGame for CollectorGame {
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
        self.step_timer = Some(self.clock.every(self.tuning.step_ms, CollectorTimer::Step));
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
        self.torn_down = true;
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
