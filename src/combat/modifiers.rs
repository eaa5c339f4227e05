//! Attack modifiers and positional penalties
//!
//! All scaling here works in whole percents so that boundaries like
//! `90 * 70 % = 63` come out exact.

use serde::{Deserialize, Serialize};

/// Accuracy/evasion percent lost per adjacent hostile beyond the first
pub const SURROUND_PENALTY_PER_HOSTILE: i32 = 15;
/// Surround penalties never exceed this percent
pub const MAX_SURROUND_PENALTY: i32 = 60;

/// One-shot bundle queued by a skill and consumed by the next attack
/// resolution, whatever its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackModifier {
    /// Percent of the rolled attack total that is kept (150 = x1.5)
    pub damage_pct: i32,
    /// Percent added to the hit chance (20 = +20 %)
    pub accuracy_pct: i32,
    /// Speed tiers added for initiative checks
    pub speed_tier: i32,
}

impl Default for AttackModifier {
    fn default() -> Self {
        Self {
            damage_pct: 100,
            accuracy_pct: 0,
            speed_tier: 0,
        }
    }
}

impl AttackModifier {
    pub const fn new(damage_pct: i32, accuracy_pct: i32, speed_tier: i32) -> Self {
        Self {
            damage_pct,
            accuracy_pct,
            speed_tier,
        }
    }

    /// Fixed bundle for attacks of opportunity
    pub const fn opportunity() -> Self {
        Self::new(150, 20, 0)
    }

    /// Stack two modifiers: damage multiplies, accuracy and speed add
    pub fn merge(self, other: AttackModifier) -> Self {
        Self {
            damage_pct: self.damage_pct * other.damage_pct / 100,
            accuracy_pct: self.accuracy_pct + other.accuracy_pct,
            speed_tier: self.speed_tier + other.speed_tier,
        }
    }

    /// Fold a queue of pending modifiers into one
    pub fn combine(modifiers: &[AttackModifier]) -> Self {
        modifiers
            .iter()
            .fold(AttackModifier::default(), |acc, m| acc.merge(*m))
    }

    pub fn is_neutral(&self) -> bool {
        *self == AttackModifier::default()
    }

    /// Scale a rolled attack total, rounding down
    pub fn scale_damage(&self, total: i32) -> i32 {
        (total * self.damage_pct).div_euclid(100)
    }
}

/// Percent penalty from being flanked by `adjacent` hostiles: the first one
/// is free, every further one costs 15, capped at 60.
pub fn surround_penalty(adjacent: u32) -> i32 {
    let extra = adjacent.saturating_sub(1).min(MAX_SURROUND_PENALTY as u32) as i32;
    (extra * SURROUND_PENALTY_PER_HOSTILE).min(MAX_SURROUND_PENALTY)
}

/// Scale a percentage by `(100 + bonus) % * (100 - penalty) %`, rounding down
pub fn adjust_percentage(value: i32, bonus_pct: i32, penalty_pct: i32) -> i32 {
    (value * (100 + bonus_pct) * (100 - penalty_pct)).div_euclid(10_000)
}
