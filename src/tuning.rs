//! Data-driven game balance
//!
//! Every constant the engines use lives here with its shipped default.
//! A JSON document may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::sim::Millis;

/// Board game and resource economy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardTuning {
    /// Move budget per board game
    pub moves: u32,
    /// Units of each resource needed to survive the night
    pub required_per_resource: u32,
}

impl Default for BoardTuning {
    fn default() -> Self {
        Self {
            moves: 10,
            required_per_resource: 2,
        }
    }
}

/// Sliding-tile puzzle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesTuning {
    pub board_size: usize,
    pub win_value: u32,
    pub initial_tiles: usize,
    /// Probability a spawned tile is a 4 instead of a 2
    pub four_chance: f32,
}

impl Default for TilesTuning {
    fn default() -> Self {
        Self {
            board_size: 4,
            win_value: 2048,
            initial_tiles: 2,
            four_chance: 0.1,
        }
    }
}

/// Falling-items catch game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchTuning {
    pub countdown: u32,
    pub game_duration_ms: Millis,
    pub game_step_ms: Millis,
    /// Taps are ignored for this long after an inedible tap
    pub penalty_ms: Millis,
    pub required_food: u32,
    pub spawn_period_ms: Millis,
    pub fall_duration_ms: Millis,
    pub max_items: usize,
    pub item_size: f32,
}

impl Default for CatchTuning {
    fn default() -> Self {
        Self {
            countdown: 3,
            game_duration_ms: 30_000,
            game_step_ms: 100,
            penalty_ms: 5_000,
            required_food: 10,
            spawn_period_ms: 650,
            fall_duration_ms: 2_200,
            max_items: 45,
            item_size: 90.0,
        }
    }
}

/// Snake-style drop collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorTuning {
    pub countdown: u32,
    pub game_duration_ms: Millis,
    /// The run times out once no more than this is left on the clock
    pub time_out_margin_ms: Millis,
    /// Physics step (~60 Hz)
    pub step_ms: Millis,
    pub required_drops: u32,
    /// Head size and spacing between body segments
    pub segment_size: f32,
    pub drop_size: f32,
    /// Distance the head travels per step
    pub speed: f32,
    /// Minimum swipe length before a gesture counts
    pub swipe_threshold: f32,
    pub status_bar_height: f32,
}

impl Default for CollectorTuning {
    fn default() -> Self {
        Self {
            countdown: 3,
            game_duration_ms: 30_000,
            time_out_margin_ms: 100,
            step_ms: 16,
            required_drops: 10,
            segment_size: 27.0,
            drop_size: 27.0,
            speed: 3.5,
            swipe_threshold: 30.0,
            status_bar_height: 50.0,
        }
    }
}

/// Timing/rhythm wood-chopping game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    pub countdown: u32,
    pub step_ms: Millis,
    /// Indicator travel per step, as a fraction of the scale
    pub indicator_step: f32,
    /// Width of the target zone centred on 0.5
    pub zone_width: f32,
    pub required_streak: u32,
    pub max_misses: u32,
    pub hit_flash_ms: Millis,
    pub miss_flash_ms: Millis,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            countdown: 2,
            step_ms: 16,
            indicator_step: 0.015,
            zone_width: 0.2,
            required_streak: 5,
            max_misses: 3,
            hit_flash_ms: 150,
            miss_flash_ms: 100,
        }
    }
}

/// Memory card matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTuning {
    pub countdown: u32,
    pub game_duration_ms: Millis,
    pub game_step_ms: Millis,
    /// Grid is `board_size × board_size` with the centre cell left empty
    pub board_size: usize,
    pub pairs: u32,
    pub match_delay_ms: Millis,
    pub mismatch_delay_ms: Millis,
}

impl Default for MemoryTuning {
    fn default() -> Self {
        Self {
            countdown: 1,
            game_duration_ms: 90_000,
            game_step_ms: 100,
            board_size: 5,
            pairs: 12,
            match_delay_ms: 300,
            mismatch_delay_ms: 1_000,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub board: BoardTuning,
    pub tiles: TilesTuning,
    pub catch: CatchTuning,
    pub collector: CollectorTuning,
    pub timing: TimingTuning,
    pub memory: MemoryTuning,
}

impl Tuning {
    /// Parse overrides; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
