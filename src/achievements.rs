//! Achievement progress
//!
//! One counter per achievement, bumped by the board game as resources are
//! gathered and nights survived. Persisted under a single store key.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Achievement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    Food,
    Water,
    Wood,
    /// Board games won
    Nights,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 4] = [
        AchievementKind::Food,
        AchievementKind::Water,
        AchievementKind::Wood,
        AchievementKind::Nights,
    ];

    /// Progress needed to unlock
    pub fn requirement(&self) -> u32 {
        match self {
            AchievementKind::Food | AchievementKind::Water | AchievementKind::Wood => 20,
            AchievementKind::Nights => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKind::Food => "food",
            AchievementKind::Water => "water",
            AchievementKind::Wood => "wood",
            AchievementKind::Nights => "nights",
        }
    }
}

/// Progress towards a single achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub kind: AchievementKind,
    pub progress: u32,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.progress >= self.kind.requirement()
    }

    pub fn progress_text(&self) -> String {
        format!(
            "Get {}/{} {}",
            self.progress,
            self.kind.requirement(),
            self.kind.as_str()
        )
    }
}

/// All achievement counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    pub entries: Vec<Achievement>,
}

impl Default for Achievements {
    fn default() -> Self {
        Self::new()
    }
}

impl Achievements {
    /// Store key
    pub const STORAGE_KEY: &'static str = "achievements";

    /// Every achievement at zero progress
    pub fn new() -> Self {
        Self {
            entries: AchievementKind::ALL
                .iter()
                .map(|&kind| Achievement { kind, progress: 0 })
                .collect(),
        }
    }

    pub fn get(&self, kind: AchievementKind) -> Achievement {
        self.entries
            .iter()
            .find(|a| a.kind == kind)
            .copied()
            .unwrap_or(Achievement { kind, progress: 0 })
    }

    pub fn progress(&self, kind: AchievementKind) -> u32 {
        self.get(kind).progress
    }

    /// Add one point of progress.
    /// Returns true if this point unlocked the achievement.
    pub fn record(&mut self, kind: AchievementKind) -> bool {
        let index = match self.entries.iter().position(|a| a.kind == kind) {
            Some(i) => i,
            None => {
                self.entries.push(Achievement { kind, progress: 0 });
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[index];
        let was_unlocked = entry.is_unlocked();
        entry.progress = entry.progress.saturating_add(1);
        !was_unlocked && entry.is_unlocked()
    }

    pub fn unlocked_count(&self) -> usize {
        self.entries.iter().filter(|a| a.is_unlocked()).count()
    }

    pub fn load(storage: &Storage) -> Self {
        match storage.load::<Achievements>(Self::STORAGE_KEY) {
            Some(mut stored) => {
                // Backfill kinds missing from older saves
                for kind in AchievementKind::ALL {
                    if !stored.entries.iter().any(|a| a.kind == kind) {
                        stored.entries.push(Achievement { kind, progress: 0 });
                    }
                }
                log::info!("Loaded achievements ({} unlocked)", stored.unlocked_count());
                stored
            }
            None => {
                log::info!("No achievements found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, storage: &Storage) {
        storage.persist(Self::STORAGE_KEY, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_unlocks_at_requirement() {
        let mut achievements = Achievements::new();
        for _ in 0..9 {
            assert!(!achievements.record(AchievementKind::Nights));
        }
        assert!(achievements.record(AchievementKind::Nights));
        assert!(!achievements.record(AchievementKind::Nights));
        assert_eq!(achievements.progress(AchievementKind::Nights), 11);
        assert_eq!(achievements.unlocked_count(), 1);
    }

    #[test]
    fn test_progress_text() {
        let a = Achievement {
            kind: AchievementKind::Wood,
            progress: 3,
        };
        assert_eq!(a.progress_text(), "Get 3/20 wood");
        assert!(!a.is_unlocked());
    }

    #[test]
    fn test_load_backfills_missing_kinds() {
        let storage = Storage::in_memory();
        let partial = Achievements {
            entries: vec![Achievement {
                kind: AchievementKind::Water,
                progress: 4,
            }],
        };
        partial.save(&storage);

        let loaded = Achievements::load(&storage);
        assert_eq!(loaded.entries.len(), AchievementKind::ALL.len());
        assert_eq!(loaded.progress(AchievementKind::Water), 4);
        assert_eq!(loaded.progress(AchievementKind::Food), 0);
    }
}
