//! Resource economy for the board game
//!
//! Tracks gathered wood/water/food and the move budget. The session is
//! decided exactly once, at the moment the budget runs out: won if every
//! resource met its threshold, lost otherwise.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::achievements::AchievementKind;
use crate::tuning::BoardTuning;

/// Resources gathered on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Wood,
    Water,
    Food,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Wood, ResourceKind::Water, ResourceKind::Food];

    pub fn achievement(self) -> AchievementKind {
        match self {
            ResourceKind::Wood => AchievementKind::Wood,
            ResourceKind::Water => AchievementKind::Water,
            ResourceKind::Food => AchievementKind::Food,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    resources: BTreeMap<ResourceKind, u32>,
    moves_left: u32,
    required: u32,
    is_game_over: bool,
    has_won: bool,
}

impl Economy {
    pub fn new(tuning: &BoardTuning) -> Self {
        Self {
            resources: ResourceKind::ALL.iter().map(|&k| (k, 0)).collect(),
            moves_left: tuning.moves,
            required: tuning.required_per_resource,
            is_game_over: false,
            has_won: false,
        }
    }

    pub fn count(&self, kind: ResourceKind) -> u32 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    #[inline]
    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    #[inline]
    pub fn required(&self) -> u32 {
        self.required
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    #[inline]
    pub fn has_won(&self) -> bool {
        self.has_won
    }

    /// `Some(won)` once the session is decided
    pub fn outcome(&self) -> Option<bool> {
        self.is_game_over.then_some(self.has_won)
    }

    /// Whether every resource currently meets its threshold
    pub fn meets_requirements(&self) -> bool {
        ResourceKind::ALL.iter().all(|&k| self.count(k) >= self.required)
    }

    /// Spend one move. Returns `Some(won)` if this move decided the session.
    pub fn spend_move(&mut self) -> Option<bool> {
        if self.is_game_over {
            return None;
        }
        self.moves_left = self.moves_left.saturating_sub(1);
        if self.moves_left == 0 {
            self.check_win_condition()
        } else {
            None
        }
    }

    /// Credit one unit of `kind`. Counts are frozen once the session is decided.
    pub fn add_resource(&mut self, kind: ResourceKind) -> bool {
        if self.is_game_over {
            return false;
        }
        *self.resources.entry(kind).or_insert(0) += 1;
        true
    }

    /// Decide the session if the budget is exhausted and it is still open.
    /// Returns `Some(won)` only on the call that decides it.
    pub fn check_win_condition(&mut self) -> Option<bool> {
        if self.moves_left > 0 || self.is_game_over {
            return None;
        }
        let won = self.meets_requirements();
        self.is_game_over = true;
        self.has_won = won;
        Some(won)
    }
}
