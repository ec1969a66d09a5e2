//! Foxwood - survive the night by gathering wood, water and food
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board game, economy, mini-game engines)
//! - `session`: Board game plus the resource mini-game it launched
//! - `platform`: Feedback services injected into the engines
//! - `persistence`: Key-value store for settings, achievements and best score
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use achievements::{Achievement, AchievementKind, Achievements};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, Storage, StoreError};
pub use session::{ResourceGame, Session};
pub use settings::Settings;
pub use tuning::Tuning;
