//! Foxwood headless runner
//!
//! Plays a board game with a simple bot, driving every launched mini-game
//! frame by frame, then runs the sliding-tile and tic-tac-toe engines.
//!
//! Usage: `foxwood [seed] [store.json] [tuning.json]`

use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::Parser;
use foxwood::platform::{LogFeedback, SharedFeedback};
use foxwood::sim::{
    BOARD_SIZE, Bounds, Insets, MiniGame, MoveDirection, Position, SeededRandom, SlidingTilesGame,
    TicTacToeGame,
};
use foxwood::{FileStore, ResourceGame, Session, Settings, Storage, StoreError, Tuning};

/// Seed used when none is given
const DEFAULT_SEED: u64 = 42;
/// One display frame at 60 Hz
const FRAME_MS: u64 = 16;
/// Upper bound on frames spent in one mini-game
const MAX_FRAMES: usize = 10_000;

/// Foxwood - plays a board session and the standalone games with a bot
#[derive(Parser, Debug)]
#[command(name = "foxwood")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Random seed (default: 42)
    seed: Option<u64>,

    /// JSON file holding settings, best score and achievements
    store: Option<PathBuf>,

    /// JSON file with balance overrides
    tuning: Option<PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = args.seed.unwrap_or(DEFAULT_SEED);
    let storage = match &args.store {
        Some(path) => match FileStore::open(path) {
            Ok(store) => Storage::new(store),
            Err(err) => {
                log::warn!("Could not open store {}: {err}, using memory", path.display());
                Storage::in_memory()
            }
        },
        None => Storage::in_memory(),
    };

    let settings = Settings::load(&storage);
    let feedback: SharedFeedback = Rc::new(LogFeedback::from_settings(&settings));
    let tuning = args.tuning.as_deref().map(load_tuning).unwrap_or_default();

    log::info!("Foxwood starting with seed {seed}");
    play_board(&tuning, feedback.clone(), storage.clone(), seed);
    play_tiles(&tuning, feedback.clone(), storage, seed);
    play_tictactoe(feedback);
}

#[cfg(target_arch = "wasm32")]
fn main() {}

/// Read balance overrides, falling back to defaults on any failure
fn load_tuning(path: &Path) -> Tuning {
    let parsed = std::fs::read_to_string(path)
        .map_err(StoreError::from)
        .and_then(|json| Tuning::from_json(&json).map_err(StoreError::from));
    match parsed {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path.display());
            tuning
        }
        Err(err) => {
            log::warn!("Could not load tuning {}: {err}, using defaults", path.display());
            Tuning::default()
        }
    }
}

fn play_board(tuning: &Tuning, feedback: SharedFeedback, storage: Storage, seed: u64) {
    let mut session = Session::new(tuning.clone(), feedback, storage, seed);
    session.update_layout(
        Bounds::new(0.0, 0.0, 390.0, 844.0),
        Insets::new(47.0, 0.0, 34.0, 0.0),
    );

    for index in 0..BOARD_SIZE * BOARD_SIZE {
        if session.outcome().is_some() {
            break;
        }
        let position = Position::from_index(index, BOARD_SIZE);
        let Some(kind) = session.reveal(position) else {
            continue;
        };
        log::info!("Revealed {kind:?} at ({}, {})", position.row, position.column);

        if session.active_game().is_some() {
            play_active(&mut session);
            if let Some(success) = session.finish_active() {
                log::info!(
                    "Mini-game done, success: {success}, moves left: {}",
                    session.board().moves_left()
                );
            }
        }
    }

    match session.outcome() {
        Some(true) => log::info!("Survived the night"),
        Some(false) => log::info!("Did not survive the night"),
        None => log::info!("Board exhausted with moves to spare"),
    }
    for achievement in &session.board().achievements().entries {
        log::info!("Achievement: {}", achievement.progress_text());
    }
}

/// Drive the active mini-game with a simple bot until it finishes
fn play_active(session: &mut Session) {
    for _ in 0..MAX_FRAMES {
        session.advance(FRAME_MS);
        let Some(game) = session.active_game_mut() else {
            return;
        };
        if game.phase().is_finished() {
            return;
        }
        if !game.phase().is_playing() {
            continue;
        }
        match game {
            ResourceGame::Timing(timing) => {
                if timing.is_in_zone() {
                    timing.handle_tap();
                }
            }
            ResourceGame::Collector(collector) => {
                let head = collector.head();
                let offset = collector.drop_position() - head;
                let swipe = if offset.x.abs() > 2.0 {
                    glam::Vec2::new(offset.x.signum() * 100.0, 0.0)
                } else {
                    glam::Vec2::new(0.0, offset.y.signum() * 100.0)
                };
                collector.handle_drag(head, head + swipe);
            }
            ResourceGame::Catch(catch) => {
                let target = catch
                    .tappable_items()
                    .find(|item| item.kind.is_edible())
                    .map(|item| item.id);
                if let Some(id) = target {
                    catch.tap_item(id);
                }
            }
        }
    }
    log::warn!("Mini-game did not finish within {MAX_FRAMES} frames");
}

fn play_tiles(tuning: &Tuning, feedback: SharedFeedback, storage: Storage, seed: u64) {
    let mut game = SlidingTilesGame::new(
        tuning.tiles.clone(),
        feedback,
        storage,
        Box::new(SeededRandom::new(seed)),
        None,
    );
    const PREFERENCE: [MoveDirection; 4] = [
        MoveDirection::Down,
        MoveDirection::Left,
        MoveDirection::Right,
        MoveDirection::Up,
    ];
    while game.phase().is_playing() {
        if !PREFERENCE.iter().any(|&direction| game.move_tiles(direction)) {
            break;
        }
    }
    log::info!(
        "Sliding tiles: score {}, best {}, {} moves, phase {:?}",
        game.score(),
        game.best_score(),
        game.moves_count(),
        game.phase()
    );
}

fn play_tictactoe(feedback: SharedFeedback) {
    let mut game = TicTacToeGame::new(feedback, None);
    let order = [4, 0, 2, 6, 1, 3, 5, 7, 8];
    for index in order {
        game.make_move(Position::from_index(index, 3));
    }
    let board = game.board();
    match board.winner() {
        Some(player) => log::info!("Tic-tac-toe: {player:?} wins along {:?}", board.winning_line()),
        None => log::info!("Tic-tac-toe: draw after {} moves", board.moves()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_positional() {
        let args = Args::try_parse_from(["foxwood", "7", "save.json", "tuning.json"]).unwrap();
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.store, Some(PathBuf::from("save.json")));
        assert_eq!(args.tuning, Some(PathBuf::from("tuning.json")));

        let args = Args::try_parse_from(["foxwood"]).unwrap();
        assert_eq!(args.seed.unwrap_or(DEFAULT_SEED), 42);
        assert!(args.store.is_none());
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        let err = Args::try_parse_from(["foxwood", "notanumber"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_missing_tuning_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_tuning(&dir.path().join("absent.json")), Tuning::default());

        let path = dir.path().join("tuning.json");
        std::fs::write(&path, r#"{ "board": { "moves": 4 } }"#).unwrap();
        assert_eq!(load_tuning(&path).board.moves, 4);
    }
}
