//! Resource-gathering board game
//!
//! A 5×5 grid of concealed cells. Revealing a trap or resource cell costs a
//! move; revealing a resource cell also parks a pending sub-game token that
//! blocks the board until the matching mini-game reports back.

use serde::{Deserialize, Serialize};

use super::economy::{Economy, ResourceKind};
use super::geometry::Position;
use crate::achievements::{AchievementKind, Achievements};
use crate::persistence::Storage;
use crate::platform::{Haptic, SharedFeedback};
use crate::tuning::BoardTuning;

/// Board edge length
pub const BOARD_SIZE: usize = 5;

/// What hides under a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    /// Spider web: costs a move, yields nothing
    Trap,
    Wood,
    Water,
    Mushroom,
    Berries,
}

impl CellType {
    pub fn is_resource(self) -> bool {
        self.resource_kind().is_some()
    }

    /// Resource credited when this cell's mini-game is won
    pub fn resource_kind(self) -> Option<ResourceKind> {
        match self {
            CellType::Wood => Some(ResourceKind::Wood),
            CellType::Water => Some(ResourceKind::Water),
            CellType::Mushroom | CellType::Berries => Some(ResourceKind::Food),
            CellType::Empty | CellType::Trap => None,
        }
    }

    /// Whether revealing this cell spends a move
    pub fn costs_move(self) -> bool {
        self != CellType::Empty
    }
}

use CellType::{Berries as B, Empty as E, Mushroom as M, Trap as T, Water as A, Wood as W};

/// Board layouts, cycled one per new game
pub const LAYOUTS: [[CellType; BOARD_SIZE * BOARD_SIZE]; 2] = [
    [
        W, A, E, T, M, //
        T, E, W, A, E, //
        E, T, E, W, B, //
        A, E, T, E, W, //
        B, T, A, E, M, //
    ],
    [
        W, T, E, A, B, //
        A, E, T, E, T, //
        E, W, E, T, A, //
        T, A, W, E, E, //
        M, E, B, W, M, //
    ],
];

/// One board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCell {
    pub position: Position,
    pub kind: CellType,
    pub is_revealed: bool,
    /// Resource mini-game already played for this cell
    pub is_completed: bool,
}

/// Resource cell whose mini-game is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSubGame {
    pub position: Position,
    pub kind: CellType,
}

#[derive(Debug)]
pub struct BoardGame {
    tuning: BoardTuning,
    cells: Vec<BoardCell>,
    /// Layout used by the current board
    layout_index: usize,
    /// Layout the next new game will use
    next_layout: usize,
    economy: Economy,
    pending: Option<PendingSubGame>,
    is_paused: bool,
    achievements: Achievements,
    feedback: SharedFeedback,
    storage: Storage,
}

impl BoardGame {
    pub fn new(tuning: BoardTuning, feedback: SharedFeedback, storage: Storage) -> Self {
        let achievements = Achievements::load(&storage);
        let mut board = Self {
            economy: Economy::new(&tuning),
            tuning,
            cells: Vec::new(),
            layout_index: 0,
            next_layout: 0,
            pending: None,
            is_paused: false,
            achievements,
            feedback,
            storage,
        };
        board.new_game();
        board
    }

    /// Fresh board from the next layout with a full move budget
    pub fn new_game(&mut self) {
        self.layout_index = self.next_layout;
        let layout = &LAYOUTS[self.layout_index];
        self.cells = layout
            .iter()
            .enumerate()
            .map(|(i, &kind)| BoardCell {
                position: Position::from_index(i, BOARD_SIZE),
                kind,
                is_revealed: false,
                is_completed: false,
            })
            .collect();
        self.next_layout = (self.next_layout + 1) % LAYOUTS.len();
        self.economy = Economy::new(&self.tuning);
        self.pending = None;
        self.is_paused = false;
        log::info!(
            "New board game (layout {}, {} moves)",
            self.layout_index,
            self.economy.moves_left()
        );
    }

    /// Reveal a concealed cell.
    ///
    /// Returns `None` without side effects when the position is off the board,
    /// already revealed, a sub-game is pending, the board is paused, or the
    /// session is over. A resource cell returns its type and leaves a pending
    /// token; the caller launches the matching mini-game.
    pub fn reveal_cell(&mut self, position: Position) -> Option<CellType> {
        if self.is_paused || self.pending.is_some() || self.economy.is_game_over() {
            return None;
        }
        let index = position.index(BOARD_SIZE)?;
        let cell = &mut self.cells[index];
        if cell.is_revealed {
            return None;
        }
        cell.is_revealed = true;
        let kind = cell.kind;
        self.feedback.play(Haptic::Selection);

        if kind.is_resource() {
            self.pending = Some(PendingSubGame { position, kind });
        }
        if kind.costs_move() {
            if kind == CellType::Trap {
                self.feedback.play(Haptic::Error);
            }
            if let Some(won) = self.economy.spend_move() {
                self.on_session_decided(won);
            }
        }
        Some(kind)
    }

    /// Resolve the pending sub-game. No-op (false) if nothing is pending.
    pub fn handle_sub_game_completion(&mut self, success: bool) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if let Some(index) = pending.position.index(BOARD_SIZE) {
            self.cells[index].is_completed = true;
        }

        if success {
            if let Some(resource) = pending.kind.resource_kind() {
                if self.economy.add_resource(resource) {
                    self.achievements.record(resource.achievement());
                    self.achievements.save(&self.storage);
                }
            }
        }
        if let Some(won) = self.economy.check_win_condition() {
            self.on_session_decided(won);
        }
        true
    }

    fn on_session_decided(&mut self, won: bool) {
        log::info!("Board game over, won: {won}");
        if won {
            self.achievements.record(AchievementKind::Nights);
            self.achievements.save(&self.storage);
        }
        self.feedback.play(Haptic::for_outcome(won));
    }

    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.is_paused = !self.is_paused;
        self.is_paused
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn cells(&self) -> &[BoardCell] {
        &self.cells
    }

    pub fn cell(&self, position: Position) -> Option<&BoardCell> {
        self.cells.get(position.index(BOARD_SIZE)?)
    }

    pub fn pending(&self) -> Option<PendingSubGame> {
        self.pending
    }

    #[inline]
    pub fn is_resource_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn count(&self, kind: ResourceKind) -> u32 {
        self.economy.count(kind)
    }

    pub fn moves_left(&self) -> u32 {
        self.economy.moves_left()
    }

    /// `Some(won)` once the session is decided
    pub fn outcome(&self) -> Option<bool> {
        self.economy.outcome()
    }

    pub fn layout_index(&self) -> usize {
        self.layout_index
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RecordingFeedback;
    use std::rc::Rc;

    fn board() -> (BoardGame, Rc<RecordingFeedback>) {
        let feedback = Rc::new(RecordingFeedback::new());
        let board = BoardGame::new(BoardTuning::default(), feedback.clone(), Storage::in_memory());
        (board, feedback)
    }

    fn positions_of(board: &BoardGame, kind: CellType) -> Vec<Position> {
        board
            .cells()
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.position)
            .collect()
    }

    #[test]
    fn test_layouts_share_distribution() {
        for layout in &LAYOUTS {
            let count = |k: CellType| layout.iter().filter(|&&c| c == k).count();
            assert_eq!(count(CellType::Wood), 4);
            assert_eq!(count(CellType::Water), 4);
            assert_eq!(count(CellType::Mushroom), 2);
            assert_eq!(count(CellType::Berries), 2);
            assert_eq!(count(CellType::Trap), 5);
            assert_eq!(count(CellType::Empty), 8);
        }
    }

    #[test]
    fn test_empty_cell_costs_no_move() {
        let (mut board, _) = board();
        let empty = positions_of(&board, CellType::Empty)[0];
        assert_eq!(board.reveal_cell(empty), Some(CellType::Empty));
        assert_eq!(board.moves_left(), 10);
        assert!(!board.is_resource_pending());
        // Second reveal of the same cell is rejected
        assert_eq!(board.reveal_cell(empty), None);
    }

    #[test]
    fn test_trap_costs_move() {
        let (mut board, feedback) = board();
        let trap = positions_of(&board, CellType::Trap)[0];
        assert_eq!(board.reveal_cell(trap), Some(CellType::Trap));
        assert_eq!(board.moves_left(), 9);
        assert_eq!(feedback.last(), Some(Haptic::Error));
    }

    #[test]
    fn test_pending_token_blocks_board() {
        let (mut board, _) = board();
        let wood = positions_of(&board, CellType::Wood);
        assert_eq!(board.reveal_cell(wood[0]), Some(CellType::Wood));
        assert_eq!(board.moves_left(), 9);
        assert_eq!(
            board.pending(),
            Some(PendingSubGame {
                position: wood[0],
                kind: CellType::Wood
            })
        );
        assert_eq!(board.reveal_cell(wood[1]), None);
        assert!(!board.cell(wood[1]).unwrap().is_revealed);

        assert!(board.handle_sub_game_completion(true));
        assert_eq!(board.count(ResourceKind::Wood), 1);
        assert!(board.cell(wood[0]).unwrap().is_completed);
        assert!(!board.handle_sub_game_completion(true));
        assert_eq!(board.reveal_cell(wood[1]), Some(CellType::Wood));
    }

    #[test]
    fn test_failed_sub_game_completes_cell_without_resource() {
        let (mut board, _) = board();
        let berries = positions_of(&board, CellType::Berries)[0];
        board.reveal_cell(berries);
        board.handle_sub_game_completion(false);
        assert_eq!(board.count(ResourceKind::Food), 0);
        assert!(board.cell(berries).unwrap().is_completed);
        assert!(!board.is_resource_pending());
    }

    #[test]
    fn test_mushroom_and_berries_count_as_food() {
        let (mut board, _) = board();
        for kind in [CellType::Mushroom, CellType::Berries] {
            let p = positions_of(&board, kind)[0];
            board.reveal_cell(p);
            board.handle_sub_game_completion(true);
        }
        assert_eq!(board.count(ResourceKind::Food), 2);
        assert_eq!(board.achievements().progress(AchievementKind::Food), 2);
    }

    #[test]
    fn test_paused_board_rejects_reveal() {
        let (mut board, _) = board();
        board.pause();
        assert_eq!(board.reveal_cell(Position::new(0, 0)), None);
        board.resume();
        assert!(board.reveal_cell(Position::new(0, 0)).is_some());
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let (mut board, _) = board();
        assert_eq!(board.reveal_cell(Position::new(5, 0)), None);
        assert_eq!(board.reveal_cell(Position::new(0, 7)), None);
        assert_eq!(board.moves_left(), 10);
    }

    #[test]
    fn test_full_winning_game() {
        let (mut board, feedback) = board();
        // Six winning resource games, then spend the rest on traps
        let mut plan = Vec::new();
        plan.extend(positions_of(&board, CellType::Wood).into_iter().take(2));
        plan.extend(positions_of(&board, CellType::Water).into_iter().take(2));
        plan.extend(positions_of(&board, CellType::Mushroom));
        for p in plan {
            board.reveal_cell(p);
            board.handle_sub_game_completion(true);
        }
        assert_eq!(board.moves_left(), 4);
        assert_eq!(board.outcome(), None);

        for p in positions_of(&board, CellType::Trap).into_iter().take(4) {
            board.reveal_cell(p);
        }
        assert_eq!(board.moves_left(), 0);
        assert_eq!(board.outcome(), Some(true));
        assert_eq!(feedback.last(), Some(Haptic::Success));
        assert_eq!(board.achievements().progress(AchievementKind::Nights), 1);

        // Session over: the board no longer accepts reveals
        let empty = positions_of(&board, CellType::Empty)[0];
        assert_eq!(board.reveal_cell(empty), None);
    }

    #[test]
    fn test_last_move_on_resource_decides_before_sub_game() {
        let tuning = BoardTuning {
            moves: 1,
            required_per_resource: 0,
        };
        let mut board = BoardGame::new(tuning, Rc::new(RecordingFeedback::new()), Storage::in_memory());
        let wood = positions_of(&board, CellType::Wood)[0];
        assert_eq!(board.reveal_cell(wood), Some(CellType::Wood));
        assert_eq!(board.outcome(), Some(true));
        // Token still clears; counts stay frozen
        assert!(board.handle_sub_game_completion(true));
        assert_eq!(board.count(ResourceKind::Wood), 0);
        assert!(!board.is_resource_pending());
    }

    #[test]
    fn test_new_game_cycles_layouts_and_resets() {
        let (mut board, _) = board();
        assert_eq!(board.layout_index(), 0);
        board.reveal_cell(Position::new(0, 3));
        board.new_game();
        assert_eq!(board.layout_index(), 1);
        assert_eq!(board.moves_left(), 10);
        assert!(board.cells().iter().all(|c| !c.is_revealed && !c.is_completed));
        board.new_game();
        assert_eq!(board.layout_index(), 0);
    }

    #[test]
    fn test_achievements_persist_across_boards() {
        let storage = Storage::in_memory();
        let feedback: SharedFeedback = Rc::new(RecordingFeedback::new());
        {
            let mut board = BoardGame::new(BoardTuning::default(), feedback.clone(), storage.clone());
            board.reveal_cell(Position::new(0, 0));
            board.handle_sub_game_completion(true);
        }
        let board = BoardGame::new(BoardTuning::default(), feedback, storage);
        assert_eq!(board.achievements().progress(AchievementKind::Wood), 1);
    }
}
