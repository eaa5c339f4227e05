//! Experience and leveling
//!
//! XP calculations, leveling formulas, and progression helpers.

use serde::{Deserialize, Serialize};

/// Calculate XP needed to reach a specific level
pub fn xp_for_level(level: u32) -> u32 {
    if level <= 1 {
        0
    } else {
        // Base 100 XP for level 2, +50 per level after
        100 + (level - 2) * 50
    }
}

/// Calculate total XP needed from level 1 to reach a given level
pub fn total_xp_for_level(level: u32) -> u32 {
    (1..level).map(|l| xp_for_level(l + 1)).sum()
}

/// Experience and level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub level: u32,
    pub current_xp: u32,
    pub xp_to_next: u32,
}

impl Default for Experience {
    fn default() -> Self {
        Self::new()
    }
}

impl Experience {
    pub fn new() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            xp_to_next: xp_for_level(2),
        }
    }

    /// Add XP and return how many levels were gained
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        self.current_xp += amount;
        let mut gained = 0;
        while self.current_xp >= self.xp_to_next {
            self.current_xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = xp_for_level(self.level + 1);
            gained += 1;
        }
        gained
    }

    /// Total XP earned since level 1
    pub fn total(&self) -> u32 {
        total_xp_for_level(self.level) + self.current_xp
    }
}
