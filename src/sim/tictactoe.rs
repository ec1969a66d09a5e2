//! Tic-tac-toe
//!
//! `TicTacToeBoard` holds the rules; `TicTacToeGame` adds the shared
//! lifecycle so the host can pause it and collect the outcome like any other
//! mini-game.

use serde::{Deserialize, Serialize};

use super::geometry::Position;
use super::state::{Completion, CompletionCallback, GamePhase, MiniGame};
use super::tick::Millis;
use crate::platform::{Haptic, SharedFeedback};

pub const GRID_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// Rows, columns, then both diagonals
const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToeBoard {
    cells: [[Option<Player>; GRID_SIZE]; GRID_SIZE],
    current_player: Player,
    winner: Option<Player>,
    winning_line: Option<[Position; 3]>,
    moves: usize,
    is_game_over: bool,
}

impl Default for TicTacToeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToeBoard {
    /// Empty board, X to move
    pub fn new() -> Self {
        Self {
            cells: [[None; GRID_SIZE]; GRID_SIZE],
            current_player: Player::X,
            winner: None,
            winning_line: None,
            moves: 0,
            is_game_over: false,
        }
    }

    /// Place the current player's mark. Rejected once the game is over, off
    /// the board, or on an occupied cell.
    pub fn make_move(&mut self, position: Position) -> bool {
        if self.is_game_over || position.row >= GRID_SIZE || position.column >= GRID_SIZE {
            return false;
        }
        let cell = &mut self.cells[position.row][position.column];
        if cell.is_some() {
            return false;
        }
        let mover = self.current_player;
        *cell = Some(mover);
        self.moves += 1;

        if let Some(line) = self.find_line(mover) {
            self.winner = Some(mover);
            self.winning_line = Some(line);
            self.is_game_over = true;
        } else if self.moves == GRID_SIZE * GRID_SIZE {
            self.is_game_over = true;
        } else {
            self.current_player = mover.other();
        }
        true
    }

    fn find_line(&self, player: Player) -> Option<[Position; 3]> {
        LINES
            .iter()
            .find(|line| line.iter().all(|&(r, c)| self.cells[r][c] == Some(player)))
            .map(|line| line.map(|(r, c)| Position::new(r, c)))
    }

    pub fn get(&self, position: Position) -> Option<Player> {
        self.cells.get(position.row)?.get(position.column).copied().flatten()
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn winning_line(&self) -> Option<[Position; 3]> {
        self.winning_line
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn is_draw(&self) -> bool {
        self.is_game_over && self.winner.is_none()
    }
}

/// Tic-tac-toe engine
#[derive(Debug)]
pub struct TicTacToeGame {
    board: TicTacToeBoard,
    phase: GamePhase,
    feedback: SharedFeedback,
    completion: Completion,
    torn_down: bool,
}

impl TicTacToeGame {
    /// Create the engine, already playing
    pub fn new(feedback: SharedFeedback, on_complete: Option<CompletionCallback>) -> Self {
        feedback.play(Haptic::Medium);
        Self {
            board: TicTacToeBoard::new(),
            phase: GamePhase::Playing,
            feedback,
            completion: Completion::new(on_complete),
            torn_down: false,
        }
    }

    pub fn board(&self) -> &TicTacToeBoard {
        &self.board
    }

    pub fn make_move(&mut self, position: Position) -> bool {
        if self.torn_down || !self.phase.is_playing() {
            return false;
        }
        if !self.board.make_move(position) {
            return false;
        }
        self.feedback.play(Haptic::Light);

        if self.board.is_game_over() {
            let success = self.board.winner().is_some();
            self.phase = GamePhase::Finished { success };
            self.feedback.play(Haptic::for_outcome(success));
            log::info!("Tic-tac-toe finished, winner: {:?}", self.board.winner());
        }
        true
    }

    /// Fresh board, X to move
    pub fn reset_game(&mut self) {
        if self.torn_down {
            return;
        }
        self.board = TicTacToeBoard::new();
        self.phase = GamePhase::Playing;
        self.completion.rearm();
        self.feedback.play(Haptic::Medium);
    }
}

impl MiniGame for TicTacToeGame {
    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn advance(&mut self, _elapsed: Millis) {}

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
