//! Session controller
//!
//! Owns the board game and whichever resource mini-game a reveal launched.
//! Wood is chopped in the timing game, water is gathered by the collector and
//! food (mushrooms or berries) is caught in the catch game. When the host
//! collects a finished mini-game, its outcome is fed back to the board.

use std::cell::Cell;
use std::rc::Rc;

use crate::persistence::Storage;
use crate::platform::SharedFeedback;
use crate::sim::{
    BoardGame, Bounds, CatchGame, CellType, CollectorGame, CompletionCallback, GamePhase, Insets,
    Millis, MiniGame, Position, SeededRandom, TimingGame,
};
use crate::tuning::Tuning;

/// Mini-game launched for a resource cell
#[derive(Debug)]
pub enum ResourceGame {
    Timing(TimingGame),
    Collector(CollectorGame),
    Catch(CatchGame),
}

impl ResourceGame {
    pub fn as_mini_game(&self) -> &dyn MiniGame {
        match self {
            ResourceGame::Timing(game) => game,
            ResourceGame::Collector(game) => game,
            ResourceGame::Catch(game) => game,
        }
    }

    pub fn as_mini_game_mut(&mut self) -> &mut dyn MiniGame {
        match self {
            ResourceGame::Timing(game) => game,
            ResourceGame::Collector(game) => game,
            ResourceGame::Catch(game) => game,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.as_mini_game().phase()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceGame::Timing(_) => "timing",
            ResourceGame::Collector(_) => "collector",
            ResourceGame::Catch(_) => "catch",
        }
    }
}

/// One board game plus its in-flight resource mini-game
#[derive(Debug)]
pub struct Session {
    tuning: Tuning,
    board: BoardGame,
    active: Option<ResourceGame>,
    rng: SeededRandom,
    feedback: SharedFeedback,
    /// Written by the active game's completion callback
    reported: Rc<Cell<Option<bool>>>,
    layout: Option<(Bounds, Insets)>,
}

impl Session {
    pub fn new(tuning: Tuning, feedback: SharedFeedback, storage: Storage, seed: u64) -> Self {
        let board = BoardGame::new(tuning.board.clone(), feedback.clone(), storage);
        log::info!("Session started with seed {seed}");
        Self {
            tuning,
            board,
            active: None,
            rng: SeededRandom::new(seed),
            feedback,
            reported: Rc::new(Cell::new(None)),
            layout: None,
        }
    }

    pub fn board(&self) -> &BoardGame {
        &self.board
    }

    pub fn active_game(&self) -> Option<&ResourceGame> {
        self.active.as_ref()
    }

    pub fn active_game_mut(&mut self) -> Option<&mut ResourceGame> {
        self.active.as_mut()
    }

    /// `Some(won)` once the board game is decided
    pub fn outcome(&self) -> Option<bool> {
        self.board.outcome()
    }

    /// Reveal a board cell, launching the matching mini-game for resources.
    ///
    /// If the reveal spent the last move the session is already decided, so
    /// no mini-game is launched and the cell is closed out immediately.
    pub fn reveal(&mut self, position: Position) -> Option<CellType> {
        if self.active.is_some() {
            return None;
        }
        let kind = self.board.reveal_cell(position)?;
        if kind.is_resource() {
            if self.board.outcome().is_some() {
                self.board.handle_sub_game_completion(false);
            } else {
                self.launch(kind);
            }
        }
        Some(kind)
    }

    fn launch(&mut self, kind: CellType) {
        self.reported.set(None);
        let slot = self.reported.clone();
        let on_complete: Option<CompletionCallback> =
            Some(Box::new(move |success: bool| slot.set(Some(success))));
        let feedback = self.feedback.clone();

        let mut game = match kind {
            CellType::Wood => ResourceGame::Timing(TimingGame::new(
                self.tuning.timing.clone(),
                feedback,
                on_complete,
            )),
            CellType::Water => ResourceGame::Collector(CollectorGame::new(
                self.tuning.collector.clone(),
                feedback,
                Box::new(self.rng.fork()),
                on_complete,
            )),
            CellType::Mushroom | CellType::Berries => ResourceGame::Catch(CatchGame::new(
                self.tuning.catch.clone(),
                feedback,
                Box::new(self.rng.fork()),
                on_complete,
            )),
            CellType::Empty | CellType::Trap => return,
        };

        if let Some((bounds, insets)) = self.layout {
            apply_layout(&mut game, bounds, insets);
        }
        log::info!("Launching {} game for {kind:?}", game.name());
        self.active = Some(game);
    }

    /// Advance the active mini-game's clock
    pub fn advance(&mut self, elapsed: Millis) {
        if let Some(game) = self.active.as_mut() {
            game.as_mini_game_mut().advance(elapsed);
        }
    }

    /// Record the screen layout and pass it to the active game
    pub fn update_layout(&mut self, bounds: Bounds, insets: Insets) {
        self.layout = Some((bounds, insets));
        if let Some(game) = self.active.as_mut() {
            apply_layout(game, bounds, insets);
        }
    }

    /// Collect a finished mini-game: report its outcome, tear it down and
    /// credit the board. Returns `None` while no finished game is waiting.
    pub fn finish_active(&mut self) -> Option<bool> {
        if !self.active.as_ref()?.phase().is_finished() {
            return None;
        }
        let mut game = self.active.take()?;
        let engine = game.as_mini_game_mut();
        engine.complete_game();
        engine.cleanup();

        let success = self.reported.take().unwrap_or(false);
        self.board.handle_sub_game_completion(success);
        log::info!("{} game collected, success: {success}", game.name());
        Some(success)
    }

    /// Leave the active mini-game without finishing it. The cell counts as
    /// failed.
    pub fn abandon_active(&mut self) -> bool {
        let Some(mut game) = self.active.take() else {
            return false;
        };
        game.as_mini_game_mut().cleanup();
        self.reported.set(None);
        self.board.handle_sub_game_completion(false);
        log::info!("{} game abandoned", game.name());
        true
    }

    pub fn pause(&mut self) {
        self.board.pause();
        if let Some(game) = self.active.as_mut() {
            game.as_mini_game_mut().pause();
        }
    }

    pub fn resume(&mut self) {
        self.board.resume();
        if let Some(game) = self.active.as_mut() {
            game.as_mini_game_mut().resume();
        }
    }

    /// Drop any running mini-game and deal the next board
    pub fn new_game(&mut self) {
        if let Some(mut game) = self.active.take() {
            game.as_mini_game_mut().cleanup();
        }
        self.reported.set(None);
        self.board.new_game();
    }
}

fn apply_layout(game: &mut ResourceGame, bounds: Bounds, insets: Insets) {
    match game {
        ResourceGame::Collector(collector) => collector.update_layout(bounds, insets),
        ResourceGame::Catch(catch) => catch.update_layout(bounds, insets),
        ResourceGame::Timing(_) => {}
    }
}
