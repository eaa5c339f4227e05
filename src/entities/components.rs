//! Shared entity data
//!
//! Positions, base stats, health pools and body sizes used by both the
//! player and monsters.

use serde::{Deserialize, Serialize};

// ============================================================================
// Position & Movement
// ============================================================================

/// Position in the game world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Squared Euclidean distance
    pub fn distance_squared(&self, other: &Position) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// One of the eight surrounding cells
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.chebyshev_distance(other) == 1
    }
}

// ============================================================================
// Combat Stats
// ============================================================================

/// The five base stats. Every value is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Strength - melee damage, hit point bonus
    pub strength: i32,
    /// Dexterity - accuracy, evasion, speed, critical hits
    pub dexterity: i32,
    /// Constitution - hit points, defense, regeneration
    pub constitution: i32,
    /// Intelligence - critical hits, lighter sleep
    pub intelligence: i32,
    /// Wisdom - perception, ranged range
    pub wisdom: i32,
}

impl Stats {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32) -> Self {
        Self {
            strength: str.max(1),
            dexterity: dex.max(1),
            constitution: con.max(1),
            intelligence: int.max(1),
            wisdom: wis.max(1),
        }
    }

    /// Base player stats
    pub fn player_base() -> Self {
        Self::new(10, 10, 10, 10, 10)
    }

    /// Add the same amount to every stat, keeping the floor of 1
    pub fn boosted(&self, amount: i32) -> Self {
        Self::new(
            self.strength + amount,
            self.dexterity + amount,
            self.constitution + amount,
            self.intelligence + amount,
            self.wisdom + amount,
        )
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::player_base()
    }
}

/// Health pool, always within `0..=max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    /// Remove up to `amount` HP, returning what was actually lost
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.current);
        self.current -= actual;
        actual
    }

    /// Restore up to `amount` HP, returning what was actually gained
    pub fn heal(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.max - self.current);
        self.current += actual;
        actual
    }

    /// Change the maximum, carrying any increase over to current HP
    pub fn set_max(&mut self, max: i32) {
        let max = max.max(1);
        let gained = (max - self.max).max(0);
        self.max = max;
        self.current = (self.current + gained).clamp(0, self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

// ============================================================================
// Body size
// ============================================================================

/// How much room a creature takes up. Size drives ranged accuracy and
/// whether a body in the line of fire stops a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum MonsterSize {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
}

impl MonsterSize {
    /// Flat hit chance adjustment for shots at this size
    pub fn accuracy_modifier(&self) -> i32 {
        match self {
            MonsterSize::Tiny => -15,
            MonsterSize::Small => -5,
            MonsterSize::Medium => 0,
            MonsterSize::Large => 10,
            MonsterSize::Huge => 20,
        }
    }

    /// Large bodies stop projectiles outright
    pub fn blocks_projectiles(&self) -> bool {
        *self >= MonsterSize::Large
    }

    /// Base weight for soaking up a shot that passes through this body
    pub fn interference_weight(&self) -> u32 {
        match self {
            MonsterSize::Tiny => 5,
            MonsterSize::Small => 15,
            MonsterSize::Medium => 30,
            MonsterSize::Large | MonsterSize::Huge => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        let a = Position::new(1, 1);
        let b = Position::new(4, 3);
        assert_eq!(a.distance(&b), 5);
        assert_eq!(a.chebyshev_distance(&b), 3);
        assert_eq!(a.distance_squared(&b), 13);
        assert!(a.is_adjacent(&Position::new(2, 2)));
        assert!(!a.is_adjacent(&a));
    }

    #[test]
    fn test_stats_floor_at_one() {
        let stats = Stats::new(0, -4, 3, 1, 2);
        assert_eq!(stats.strength, 1);
        assert_eq!(stats.dexterity, 1);
        assert_eq!(stats.boosted(-10).wisdom, 1);
    }

    #[test]
    fn test_health_clamps() {
        let mut hp = Health::new(20);
        assert_eq!(hp.take_damage(25), 20);
        assert_eq!(hp.current, 0);
        assert!(hp.is_dead());
        assert_eq!(hp.take_damage(-3), 0);
        assert_eq!(hp.heal(50), 20);
        assert_eq!(hp.current, 20);
        assert_eq!(hp.heal(-5), 0);
    }

    #[test]
    fn test_health_set_max_carries_gain() {
        let mut hp = Health::new(20);
        hp.take_damage(5);
        hp.set_max(26);
        assert_eq!((hp.current, hp.max), (21, 26));
        hp.set_max(10);
        assert_eq!((hp.current, hp.max), (10, 10));
    }

    #[test]
    fn test_size_ordering() {
        assert!(MonsterSize::Huge.blocks_projectiles());
        assert!(MonsterSize::Large.blocks_projectiles());
        assert!(!MonsterSize::Medium.blocks_projectiles());
        assert!(MonsterSize::Huge.accuracy_modifier() > MonsterSize::Tiny.accuracy_modifier());
    }
}
