//! Memory card matching
//!
//! Cards are dealt face down on a square grid with the centre cell left
//! open. Two flipped cards are compared after a short delay: matching pairs
//! stay up, mismatches turn back over.

use serde::{Deserialize, Serialize};

use super::geometry::Position;
use super::rng::{RandomSource, shuffle};
use super::state::{Completion, CompletionCallback, GamePhase, MiniGame};
use super::tick::{Clock, Millis, TimerHandle};
use crate::platform::{Haptic, SharedFeedback};
use crate::tuning::MemoryTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardState {
    FaceDown,
    FaceUp,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u32,
    /// Cards sharing a key form a pair
    pub pair_key: u32,
    pub state: CardState,
    pub position: Position,
}

/// Deal `pairs` shuffled pairs onto a `size × size` grid, skipping the centre
/// cell on odd sizes. Pairs that do not fit are dropped.
pub fn deal_cards(size: usize, pairs: u32, rng: &mut dyn RandomSource) -> Vec<Card> {
    let centre = (size % 2 == 1).then(|| Position::new(size / 2, size / 2));
    let positions: Vec<Position> = (0..size * size)
        .map(|i| Position::from_index(i, size))
        .filter(|p| Some(*p) != centre)
        .collect();

    let usable_pairs = (pairs as usize).min(positions.len() / 2);
    let mut keys: Vec<u32> = (0..usable_pairs as u32).flat_map(|k| [k, k]).collect();
    shuffle(rng, &mut keys);

    keys.into_iter()
        .zip(positions)
        .enumerate()
        .map(|(i, (pair_key, position))| Card {
            id: i as u32,
            pair_key,
            state: CardState::FaceDown,
            position,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryTimer {
    Countdown,
    GameClock,
    Resolve,
}

/// Memory game engine
#[derive(Debug)]
pub struct MemoryGame {
    tuning: MemoryTuning,
    phase: GamePhase,
    clock: Clock<MemoryTimer>,
    countdown_timer: Option<TimerHandle>,
    game_timer: Option<TimerHandle>,
    resolve_timer: Option<TimerHandle>,
    cards: Vec<Card>,
    first_selected: Option<usize>,
    second_selected: Option<usize>,
    is_processing: bool,
    pairs_matched: u32,
    time_remaining: Millis,
    rng: Box<dyn RandomSource>,
    feedback: SharedFeedback,
    completion: Completion,
    torn_down: bool,
}

impl MemoryGame {
    /// Deal the cards and start the countdown
    pub fn new(
        tuning: MemoryTuning,
        feedback: SharedFeedback,
        mut rng: Box<dyn RandomSource>,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        let cards = deal_cards(tuning.board_size, tuning.pairs, rng.as_mut());
        let time_remaining = tuning.game_duration_ms;
        let mut game = Self {
            tuning,
            phase: GamePhase::Initial,
            clock: Clock::new(),
            countdown_timer: None,
            game_timer: None,
            resolve_timer: None,
            cards,
            first_selected: None,
            second_selected: None,
            is_processing: false,
            pairs_matched: 0,
            time_remaining,
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
        self.countdown_timer = Some(self.clock.every(1_000, MemoryTimer::Countdown));
    }

    fn start_playing(&mut self) {
        self.clock.cancel_slot(&mut self.countdown_timer);
        self.phase = GamePhase::Playing;
        self.feedback.play(Haptic::Medium);
        self.game_timer = Some(
            self.clock
                .every(self.tuning.game_step_ms, MemoryTimer::GameClock),
        );
        log::info!("Memory game started with {} cards", self.cards.len());
    }

    fn on_timer(&mut self, timer: MemoryTimer) {
        match timer {
            MemoryTimer::Countdown => {
                if self.phase.tick_countdown() {
                    self.start_playing();
                }
            }
            MemoryTimer::GameClock => self.step_game_clock(),
            MemoryTimer::Resolve => {
                self.resolve_timer = None;
                self.resolve_pair();
            }
        }
    }

    fn step_game_clock(&mut self) {
        if !self.phase.is_playing() {
            return;
        }
        if self.time_remaining <= self.tuning.game_step_ms {
            self.time_remaining = 0;
            self.finish(false);
        } else {
            self.time_remaining -= self.tuning.game_step_ms;
        }
    }

    /// Whether a flip would currently be accepted
    pub fn can_interact(&self) -> bool {
        !self.torn_down
            && self.phase.is_playing()
            && !self.is_processing
            && self.face_up_count() < 2
    }

    /// Flip the face-down card at `position`. Returns true if it turned over.
    pub fn flip_card(&mut self, position: Position) -> bool {
        if !self.can_interact() {
            return false;
        }
        let Some(index) = self.cards.iter().position(|c| c.position == position) else {
            return false;
        };
        if self.cards[index].state != CardState::FaceDown {
            return false;
        }
        self.cards[index].state = CardState::FaceUp;
        self.feedback.play(Haptic::Light);

        let Some(first) = self.first_selected else {
            self.first_selected = Some(index);
            return true;
        };
        self.second_selected = Some(index);
        self.is_processing = true;

        let delay = if self.cards[first].pair_key == self.cards[index].pair_key {
            self.tuning.match_delay_ms
        } else {
            self.tuning.mismatch_delay_ms
        };
        self.resolve_timer = Some(self.clock.after(delay, MemoryTimer::Resolve));
        true
    }

    fn resolve_pair(&mut self) {
        let (Some(first), Some(second)) = (self.first_selected.take(), self.second_selected.take())
        else {
            self.is_processing = false;
            return;
        };

        if self.cards[first].pair_key == self.cards[second].pair_key {
            self.cards[first].state = CardState::Matched;
            self.cards[second].state = CardState::Matched;
            self.pairs_matched += 1;
            self.feedback.play(Haptic::Success);
        } else {
            self.cards[first].state = CardState::FaceDown;
            self.cards[second].state = CardState::FaceDown;
            self.feedback.play(Haptic::Error);
        }
        self.is_processing = false;

        if self.cards.iter().all(|c| c.state == CardState::Matched) {
            self.finish(true);
        }
    }

    fn finish(&mut self, success: bool) {
        self.clock.cancel_all();
        self.countdown_timer = None;
        self.game_timer = None;
        self.resolve_timer = None;
        self.is_processing = false;
        self.phase = GamePhase::Finished { success };
        self.feedback.play(Haptic::for_outcome(success));
        log::info!(
            "Memory game finished, success: {success}, pairs: {}",
            self.pairs_matched
        );
    }

    /// Redeal and restart the countdown
    pub fn reset_game(&mut self) {
        if self.torn_down {
            return;
        }
        self.clock.cancel_all();
        self.countdown_timer = None;
        self.game_timer = None;
        self.resolve_timer = None;
        self.cards = deal_cards(self.tuning.board_size, self.tuning.pairs, self.rng.as_mut());
        self.first_selected = None;
        self.second_selected = None;
        self.is_processing = false;
        self.pairs_matched = 0;
        self.time_remaining = self.tuning.game_duration_ms;
        self.completion.rearm();
        self.start_countdown();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card_at(&self, position: Position) -> Option<&Card> {
        self.cards.iter().find(|c| c.position == position)
    }

    pub fn face_up_count(&self) -> usize {
        self.cards
            .iter()
            .filter(|c| c.state == CardState::FaceUp)
            .count()
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn pairs_matched(&self) -> u32 {
        self.pairs_matched
    }

    pub fn time_remaining(&self) -> Millis {
        self.time_remaining
    }
}

impl MiniGame for MemoryGame {
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
    }

    fn resume(&mut self) {
        if self.torn_down || self.phase != GamePhase::Paused {
            return;
        }
        self.phase = GamePhase::Playing;
        self.game_timer = Some(
            self.clock
                .every(self.tuning.game_step_ms, MemoryTimer::GameClock),
        );
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
        self.resolve_timer = None;
        self.torn_down = true;
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SilentFeedback;
    use crate::sim::rng::SeededRandom;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn small() -> MemoryTuning {
        MemoryTuning {
            board_size: 3,
            pairs: 4,
            ..MemoryTuning::default()
        }
    }

    fn playing(tuning: MemoryTuning) -> MemoryGame {
        let mut game = MemoryGame::new(
            tuning,
            Rc::new(SilentFeedback),
            Box::new(SeededRandom::new(11)),
            None,
        );
        game.advance(1_000);
        assert_eq!(game.phase(), GamePhase::Playing);
        game
    }

    /// Positions grouped by pair key
    fn pairs(game: &MemoryGame) -> Vec<(Position, Position)> {
        let mut by_key: BTreeMap<u32, Vec<Position>> = BTreeMap::new();
        for card in game.cards() {
            by_key.entry(card.pair_key).or_default().push(card.position);
        }
        by_key.values().map(|p| (p[0], p[1])).collect()
    }

    #[test]
    fn test_deal_skips_centre() {
        let mut rng = SeededRandom::new(5);
        let cards = deal_cards(5, 12, &mut rng);
        assert_eq!(cards.len(), 24);
        assert!(cards.iter().all(|c| c.position != Position::new(2, 2)));
        let mut counts = BTreeMap::new();
        for card in &cards {
            *counts.entry(card.pair_key).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn test_flips_wait_for_countdown() {
        let mut game = MemoryGame::new(
            MemoryTuning::default(),
            Rc::new(SilentFeedback),
            Box::new(SeededRandom::new(1)),
            None,
        );
        assert_eq!(game.phase(), GamePhase::Countdown(1));
        assert!(!game.flip_card(Position::new(0, 0)));
        game.advance(1_000);
        assert!(game.flip_card(Position::new(0, 0)));
        assert!(!game.flip_card(Position::new(0, 0)));
        assert!(!game.flip_card(Position::new(2, 2)));
    }

    #[test]
    fn test_match_resolves_and_stays_matched() {
        let mut game = playing(small());
        let (a, b) = pairs(&game)[0];
        assert!(game.flip_card(a));
        assert!(game.flip_card(b));
        assert!(game.is_processing());

        game.advance(299);
        assert_eq!(game.card_at(a).map(|c| c.state), Some(CardState::FaceUp));
        game.advance(1);
        assert_eq!(game.card_at(a).map(|c| c.state), Some(CardState::Matched));
        assert_eq!(game.card_at(b).map(|c| c.state), Some(CardState::Matched));
        assert_eq!(game.pairs_matched(), 1);

        game.advance(5_000);
        assert!(!game.flip_card(a));
        assert_eq!(game.card_at(a).map(|c| c.state), Some(CardState::Matched));
    }

    #[test]
    fn test_mismatch_flips_back() {
        let mut game = playing(small());
        let all = pairs(&game);
        let (a, _) = all[0];
        let (c, _) = all[1];
        assert!(game.flip_card(a));
        assert!(game.flip_card(c));

        // Third card rejected while the pair is up
        let (d, _) = all[2];
        assert!(!game.flip_card(d));

        game.advance(999);
        assert_eq!(game.face_up_count(), 2);
        game.advance(1);
        assert_eq!(game.face_up_count(), 0);
        assert_eq!(game.card_at(a).map(|c| c.state), Some(CardState::FaceDown));
        assert!(game.flip_card(d));
    }

    #[test]
    fn test_all_pairs_win() {
        let mut game = playing(small());
        for (a, b) in pairs(&game) {
            assert!(game.flip_card(a));
            assert!(game.flip_card(b));
            game.advance(300);
        }
        assert_eq!(game.pairs_matched(), 4);
        assert_eq!(game.phase(), GamePhase::Finished { success: true });
    }

    #[test]
    fn test_timer_expiry_loses() {
        let mut game = playing(MemoryTuning::default());
        game.advance(89_999);
        assert_eq!(game.phase(), GamePhase::Playing);
        game.advance(1);
        assert_eq!(game.phase(), GamePhase::Finished { success: false });
        assert!(!game.flip_card(Position::new(0, 0)));
    }

    #[test]
    fn test_resolve_still_fires_while_paused() {
        let mut game = playing(small());
        let all = pairs(&game);
        for &(a, b) in &all[..3] {
            game.flip_card(a);
            game.flip_card(b);
            game.advance(300);
        }
        let (a, b) = all[3];
        game.flip_card(a);
        game.flip_card(b);

        game.pause();
        let remaining = game.time_remaining();
        game.advance(300);
        assert_eq!(game.phase(), GamePhase::Finished { success: true });
        assert_eq!(game.time_remaining(), remaining);
    }

    #[test]
    fn test_pause_blocks_flips_and_freezes_timer() {
        let mut game = playing(MemoryTuning::default());
        game.pause();
        let remaining = game.time_remaining();
        assert!(!game.flip_card(Position::new(0, 0)));
        game.advance(120_000);
        assert_eq!(game.phase(), GamePhase::Paused);
        assert_eq!(game.time_remaining(), remaining);
        game.resume();
        assert!(game.flip_card(Position::new(0, 0)));
    }

    #[test]
    fn test_terminal_state_reports_once_and_reset_rearms() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let tuning = MemoryTuning {
            game_duration_ms: 200,
            ..small()
        };
        let mut game = MemoryGame::new(
            tuning,
            Rc::new(SilentFeedback),
            Box::new(SeededRandom::new(2)),
            Some(Box::new(move |ok| sink.borrow_mut().push(ok))),
        );
        game.advance(1_200);
        assert_eq!(game.phase(), GamePhase::Finished { success: false });
        game.complete_game();
        game.complete_game();
        assert_eq!(*seen.borrow(), vec![false]);

        game.reset_game();
        assert_eq!(game.phase(), GamePhase::Countdown(1));
        assert_eq!(game.pairs_matched(), 0);
        game.advance(1_200);
        game.complete_game();
        assert_eq!(*seen.borrow(), vec![false, false]);
    }
}
