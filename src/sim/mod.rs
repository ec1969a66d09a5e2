//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Time only advances through each engine's `Clock`
//! - Randomness only through an injected `RandomSource`
//! - No rendering or platform dependencies beyond the injected services

pub mod board;
pub mod catch;
pub mod collector;
pub mod economy;
pub mod geometry;
pub mod memory;
pub mod rng;
pub mod state;
pub mod tick;
pub mod tictactoe;
pub mod tiles;
pub mod timing;

pub use board::{BOARD_SIZE, BoardCell, BoardGame, CellType, LAYOUTS, PendingSubGame};
pub use catch::{CatchGame, FallingItem, FoodKind};
pub use collector::{CollectorGame, Heading};
pub use economy::{Economy, ResourceKind};
pub use geometry::{Bounds, Insets, Position, within_reach};
pub use memory::{Card, CardState, MemoryGame, deal_cards};
pub use rng::{RandomSource, ScriptedRandom, SeededRandom, shuffle};
pub use state::{Completion, CompletionCallback, GamePhase, MiniGame};
pub use tick::{Clock, Millis, TimerHandle};
pub use tictactoe::{Player, TicTacToeBoard, TicTacToeGame};
pub use tiles::{MoveDirection, SlidingTilesGame, Tile, TileGrid};
pub use timing::{HitFlash, Indicator, TimingGame};
