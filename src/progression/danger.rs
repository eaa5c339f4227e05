//! Floor danger scaling
//!
//! Danger is a floor-wide multiplier on monster levels, spawn counts and
//! rewards. It grows slowly with depth on top of the configured base.

use serde::{Deserialize, Serialize};

use crate::combat::Dice;

/// Monsters never spawn more than this many per floor
pub const MAX_MONSTERS_PER_FLOOR: u32 = 30;

/// Danger level for a floor: the base, plus one every third floor
pub fn danger_for_floor(floor: u32, base: u32) -> u32 {
    base + floor.saturating_sub(1) / 3
}

/// Per-floor scaling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DangerScaling {
    /// Current floor number (1-indexed)
    pub floor: u32,
    pub danger_level: u32,
}

impl DangerScaling {
    pub fn new(floor: u32, danger_level: u32) -> Self {
        Self {
            floor: floor.max(1),
            danger_level,
        }
    }

    /// Monster level: the floor number plus up to `danger_level` extra levels
    pub fn roll_monster_level<D: Dice + ?Sized>(&self, dice: &mut D) -> u32 {
        let bonus = dice.range(0, self.danger_level as i32) as u32;
        self.floor + bonus
    }

    /// Inclusive range of pack leaders to spawn
    pub fn monster_count_range(&self) -> (u32, u32) {
        let min = (2 + self.floor).min(MAX_MONSTERS_PER_FLOOR);
        let max = (4 + self.floor + self.danger_level * 2).min(MAX_MONSTERS_PER_FLOOR);
        (min, max.max(min))
    }

    pub fn roll_monster_count<D: Dice + ?Sized>(&self, dice: &mut D) -> u32 {
        let (min, max) = self.monster_count_range();
        dice.range(min as i32, max as i32) as u32
    }

    /// XP multiplier: +10 % per danger level
    pub fn scale_xp(&self, base_xp: u32) -> u32 {
        base_xp * (10 + self.danger_level) / 10
    }
}
