//! Sliding-tile (2048-style) puzzle
//!
//! `TileGrid` is the pure board: shift-and-merge, spawning, score and the
//! win/lose flags. `SlidingTilesGame` wraps it with the phase machine, best
//! score persistence and feedback.

use serde::{Deserialize, Serialize};

use super::geometry::Position;
use super::rng::RandomSource;
use super::state::{Completion, CompletionCallback, GamePhase, MiniGame};
use super::tick::Millis;
use crate::persistence::Storage;
use crate::platform::{Haptic, SharedFeedback};
use crate::tuning::TilesTuning;

/// Swipe direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Up,
        MoveDirection::Down,
        MoveDirection::Left,
        MoveDirection::Right,
    ];
}

/// A numbered tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub value: u32,
    pub position: Position,
    /// Spawned by the last move
    pub is_new: bool,
    /// Produced by a merge during the last move
    pub is_merged: bool,
}

/// The puzzle board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    size: usize,
    /// Row-major cells
    cells: Vec<Option<Tile>>,
    pub score: u32,
    pub best_score: u32,
    pub moves_count: u32,
    pub has_won: bool,
    pub is_game_over: bool,
    win_value: u32,
    four_chance: f32,
    next_id: u32,
}

impl TileGrid {
    /// Empty board (no starting tiles)
    pub fn empty(tuning: &TilesTuning) -> Self {
        let size = tuning.board_size.max(2);
        Self {
            size,
            cells: vec![None; size * size],
            score: 0,
            best_score: 0,
            moves_count: 0,
            has_won: false,
            is_game_over: false,
            win_value: tuning.win_value,
            four_chance: tuning.four_chance,
            next_id: 1,
        }
    }

    /// Board with the configured number of random starting tiles
    pub fn new(tuning: &TilesTuning, rng: &mut dyn RandomSource) -> Self {
        let mut grid = Self::empty(tuning);
        for _ in 0..tuning.initial_tiles {
            grid.spawn_random_tile(rng);
        }
        grid
    }

    /// Board from explicit values, row-major, 0 meaning empty
    pub fn from_values(tuning: &TilesTuning, values: &[u32]) -> Self {
        let mut grid = Self::empty(tuning);
        for (i, &value) in values.iter().enumerate().take(grid.cells.len()) {
            if value != 0 {
                let position = Position::from_index(i, grid.size);
                grid.place(position, value, false);
            }
        }
        grid
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.cells.get(position.index(self.size)?)?.as_ref()
    }

    /// Value at a cell, 0 when empty
    pub fn value_at(&self, row: usize, column: usize) -> u32 {
        self.tile(Position::new(row, column)).map_or(0, |t| t.value)
    }

    /// Values of one row
    pub fn row_values(&self, row: usize) -> Vec<u32> {
        (0..self.size).map(|c| self.value_at(row, c)).collect()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub fn empty_positions(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| Position::from_index(i, self.size))
            .collect()
    }

    fn place(&mut self, position: Position, value: u32, is_new: bool) {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(index) = position.index(self.size) {
            self.cells[index] = Some(Tile {
                id,
                value,
                position,
                is_new,
                is_merged: false,
            });
        }
    }

    /// Place a 2 (or, with `four_chance`, a 4) on a random empty cell
    pub fn spawn_random_tile(&mut self, rng: &mut dyn RandomSource) -> Option<Position> {
        let empty = self.empty_positions();
        if empty.is_empty() {
            return None;
        }
        let position = empty[rng.index(empty.len())];
        let value = if rng.chance(1.0 - self.four_chance) { 2 } else { 4 };
        self.place(position, value, true);
        Some(position)
    }

    /// Cells of line `i`, ordered starting from the edge tiles slide toward
    fn line(&self, direction: MoveDirection, i: usize) -> Vec<Position> {
        let n = self.size;
        match direction {
            MoveDirection::Left => (0..n).map(|c| Position::new(i, c)).collect(),
            MoveDirection::Right => (0..n).rev().map(|c| Position::new(i, c)).collect(),
            MoveDirection::Up => (0..n).map(|r| Position::new(r, i)).collect(),
            MoveDirection::Down => (0..n).rev().map(|r| Position::new(r, i)).collect(),
        }
    }

    /// Slide and merge every line toward `direction`. No spawn.
    /// Returns true if any tile moved or merged.
    pub fn shift(&mut self, direction: MoveDirection) -> bool {
        for tile in self.cells.iter_mut().flatten() {
            tile.is_new = false;
            tile.is_merged = false;
        }

        let mut moved = false;
        for i in 0..self.size {
            let line = self.line(direction, i);
            let tiles: Vec<Tile> = line
                .iter()
                .filter_map(|p| p.index(self.size).and_then(|idx| self.cells[idx].take()))
                .collect();

            let mut packed: Vec<Tile> = Vec::with_capacity(self.size);
            for tile in tiles {
                if let Some(last) = packed.last_mut() {
                    if last.value == tile.value && !last.is_merged && !tile.is_merged {
                        last.value *= 2;
                        last.is_merged = true;
                        self.score += last.value;
                        self.best_score = self.best_score.max(self.score);
                        if last.value >= self.win_value {
                            self.has_won = true;
                        }
                        moved = true;
                        continue;
                    }
                }
                packed.push(tile);
            }

            for (mut tile, &position) in packed.into_iter().zip(line.iter()) {
                if tile.position != position {
                    moved = true;
                    tile.position = position;
                }
                if let Some(index) = position.index(self.size) {
                    self.cells[index] = Some(tile);
                }
            }
        }
        moved
    }

    /// Play one move: shift, then on success spawn a tile and count the move.
    /// Game over is re-evaluated either way.
    pub fn move_tiles(&mut self, direction: MoveDirection, rng: &mut dyn RandomSource) -> bool {
        let moved = self.shift(direction);
        if moved {
            self.spawn_random_tile(rng);
            self.moves_count += 1;
        }
        self.check_game_over();
        moved
    }

    /// True if an empty cell or an adjacent equal pair exists
    pub fn has_available_move(&self) -> bool {
        let n = self.size;
        for row in 0..n {
            for column in 0..n {
                let value = self.value_at(row, column);
                if value == 0 {
                    return true;
                }
                if column + 1 < n && self.value_at(row, column + 1) == value {
                    return true;
                }
                if row + 1 < n && self.value_at(row + 1, column) == value {
                    return true;
                }
            }
        }
        false
    }

    pub fn check_game_over(&mut self) {
        if !self.has_available_move() {
            self.is_game_over = true;
        }
    }

    /// Clear the board for a new round; best score survives
    pub fn reset(&mut self, initial_tiles: usize, rng: &mut dyn RandomSource) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.score = 0;
        self.moves_count = 0;
        self.has_won = false;
        self.is_game_over = false;
        for _ in 0..initial_tiles {
            self.spawn_random_tile(rng);
        }
    }
}

/// Sliding-tile engine
#[derive(Debug)]
pub struct SlidingTilesGame {
    tuning: TilesTuning,
    grid: TileGrid,
    phase: GamePhase,
    rng: Box<dyn RandomSource>,
    feedback: SharedFeedback,
    storage: Storage,
    completion: Completion,
    torn_down: bool,
}

impl SlidingTilesGame {
    /// Store key for the best score
    pub const BEST_SCORE_KEY: &'static str = "game2048_bestScore";

    pub fn new(
        tuning: TilesTuning,
        feedback: SharedFeedback,
        storage: Storage,
        mut rng: Box<dyn RandomSource>,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        let mut grid = TileGrid::new(&tuning, rng.as_mut());
        grid.best_score = storage.load(Self::BEST_SCORE_KEY).unwrap_or(0);
        let mut game = Self {
            tuning,
            grid,
            phase: GamePhase::Initial,
            rng,
            feedback,
            storage,
            completion: Completion::new(on_complete),
            torn_down: false,
        };
        game.start_game();
        game
    }

    /// Engine around a prepared grid (best score taken from the grid)
    pub fn with_grid(
        tuning: TilesTuning,
        grid: TileGrid,
        feedback: SharedFeedback,
        storage: Storage,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let mut game = Self {
            tuning,
            grid,
            phase: GamePhase::Initial,
            rng,
            feedback,
            storage,
            completion: Completion::default(),
            torn_down: false,
        };
        game.start_game();
        game
    }

    fn start_game(&mut self) {
        self.phase = GamePhase::Playing;
        self.feedback.play(Haptic::Medium);
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.grid.score
    }

    pub fn best_score(&self) -> u32 {
        self.grid.best_score
    }

    pub fn moves_count(&self) -> u32 {
        self.grid.moves_count
    }

    /// Swipe. Only accepted while playing; returns whether tiles moved.
    ///
    /// Game over is evaluated before the win flag, and a win takes
    /// precedence: if both are set the game finishes successfully.
    pub fn move_tiles(&mut self, direction: MoveDirection) -> bool {
        if self.torn_down || !self.phase.is_playing() {
            return false;
        }
        let best_before = self.grid.best_score;
        let moved = self.grid.move_tiles(direction, self.rng.as_mut());

        if self.grid.best_score > best_before {
            self.storage.persist(Self::BEST_SCORE_KEY, &self.grid.best_score);
        }

        let outcome = if self.grid.has_won {
            Some(true)
        } else if self.grid.is_game_over {
            Some(false)
        } else {
            None
        };
        if let Some(success) = outcome {
            self.finish(success);
        }

        if moved {
            self.feedback.play(Haptic::Light);
        }
        moved
    }

    fn finish(&mut self, success: bool) {
        self.phase = GamePhase::Finished { success };
        self.feedback.play(Haptic::for_outcome(success));
        log::info!(
            "Sliding tiles finished, success: {success}, score: {}",
            self.grid.score
        );
    }

    /// New round on a fresh board
    pub fn reset_game(&mut self) {
        if self.torn_down {
            return;
        }
        self.grid.reset(self.tuning.initial_tiles, self.rng.as_mut());
        self.completion.rearm();
        self.start_game();
    }
}

impl MiniGame for SlidingTilesGame {
    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn advance(&mut self, _elapsed: Millis) {
        // Turn-based: nothing runs on a timer
    }

    fn pause(&mut self) {
        if !self.torn_down && self.phase.is_playing() {
            self.phase = GamePhase::Paused;
        }
    }

    fn resume(&mut self) {
        if !self.torn_down && self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    fn complete_game(&mut self) {
        if !self.torn_down {
            self.completion.report(self.phase);
        }
    }

    fn cleanup(&mut self) {
        self.torn_down = true;
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
