//! Formula table
//!
//! Pure functions from base stats to derived combat numbers. Every formula
//! rounds with floor semantics and is worked in integers, with fractional
//! factors scaled up to tenths or quarters first.

use serde::{Deserialize, Serialize};

use super::dice::Dice;
use crate::entities::Stats;

/// Hard cap on the critical range percentage
pub const MAX_CRITICAL_RANGE: i32 = 40;
/// Fastest speed tier
pub const MAX_SPEED_TIER: i32 = 4;
/// Upper bound for the percent of max HP at which a monster flees
pub const MAX_FLEE_THRESHOLD_PCT: i32 = 50;

/// A flat bonus plus a pool of dice, e.g. `3 + 2d6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiceSpec {
    pub base: i32,
    pub dice_count: i32,
    pub dice_sides: i32,
}

impl DiceSpec {
    pub const fn new(base: i32, dice_count: i32, dice_sides: i32) -> Self {
        Self {
            base,
            dice_count,
            dice_sides,
        }
    }

    /// Base plus every die rolled
    pub fn roll<D: Dice + ?Sized>(&self, dice: &mut D) -> i32 {
        self.base + dice.roll(self.dice_count, self.dice_sides)
    }

    /// Smallest possible total
    pub fn min_total(&self) -> i32 {
        if self.dice_sides > 0 {
            self.base + self.dice_count.max(0)
        } else {
            self.base
        }
    }

    /// Largest possible total
    pub fn max_total(&self) -> i32 {
        self.base + self.dice_count.max(0) * self.dice_sides.max(0)
    }
}

pub fn max_hp(stats: &Stats, level: u32) -> i32 {
    // (CON * 2 + STR / 5) * (1 + level * 0.2)
    ((stats.constitution * 10 + stats.strength) * (5 + level as i32)).div_euclid(25)
}

pub fn attack(stats: &Stats) -> DiceSpec {
    DiceSpec::new(
        (stats.strength * 2 - stats.dexterity).div_euclid(2),
        stats.dexterity.div_euclid(5),
        stats.strength.div_euclid(5) * 3,
    )
}

pub fn defense(stats: &Stats) -> DiceSpec {
    DiceSpec::new(
        (stats.constitution * 2 - stats.strength).div_euclid(2),
        stats.strength.div_euclid(5),
        stats.constitution.div_euclid(5) * 3,
    )
}

pub fn accuracy(stats: &Stats) -> i32 {
    (120 + stats.dexterity * 3).div_euclid(2)
}

pub fn evasion(stats: &Stats) -> i32 {
    (stats.dexterity * 12).div_euclid(10)
}

/// Sight radius in tiles
pub fn perception(stats: &Stats) -> i32 {
    (30 + stats.wisdom * 4).div_euclid(10)
}

/// Percent chance that a freshly spawned monster starts asleep
pub fn sleep_chance(stats: &Stats) -> i32 {
    (50 - stats.intelligence * 8).clamp(0, 50)
}

/// A hit roll at or below this value is a critical hit
pub fn critical_range(stats: &Stats) -> i32 {
    (20 + stats.dexterity * 3 + stats.intelligence * 2)
        .div_euclid(10)
        .min(MAX_CRITICAL_RANGE)
}

/// 0 (slowest) to 4 (fastest)
pub fn speed_tier(stats: &Stats) -> i32 {
    stats.dexterity.div_euclid(5).clamp(0, MAX_SPEED_TIER)
}

pub fn ranged_attack(stats: &Stats) -> DiceSpec {
    DiceSpec::new(
        (stats.dexterity * 2 + stats.strength).div_euclid(4),
        stats.dexterity.div_euclid(5).max(1),
        stats.wisdom.div_euclid(5) * 2 + 2,
    )
}

pub fn ranged_accuracy(stats: &Stats) -> i32 {
    (500 + stats.dexterity * 12 + stats.wisdom * 5).div_euclid(10)
}

pub fn ranged_range(stats: &Stats) -> i32 {
    (40 + stats.wisdom * 3).div_euclid(10)
}

pub fn max_ranged_energy(stats: &Stats) -> i32 {
    60 + stats.constitution * 3
}

pub fn ranged_energy_cost(stats: &Stats) -> i32 {
    (20 - stats.dexterity.div_euclid(3)).max(5)
}

/// Energy recovered per turn while ranged mode is off
pub fn energy_regen(stats: &Stats) -> i32 {
    (8 + stats.constitution).div_euclid(4)
}

/// Percent of max HP at or below which a monster starts fleeing.
/// Kept in whole percents so the boundary compares exactly.
pub fn flee_threshold_pct(stats: &Stats) -> i32 {
    (10 + stats.intelligence + stats.wisdom - stats.strength).clamp(0, MAX_FLEE_THRESHOLD_PCT)
}

/// Percent chance per turn that a wounded monster regenerates
pub fn heal_chance(stats: &Stats) -> i32 {
    20 + stats.constitution.div_euclid(5)
}

pub fn heal_dice(stats: &Stats) -> DiceSpec {
    DiceSpec::new(
        stats.constitution.div_euclid(5),
        1,
        stats.constitution.div_euclid(3).max(1),
    )
}

/// Squares the player can leap with the jump skill
pub fn jump_range(stats: &Stats) -> i32 {
    (10 + stats.dexterity).div_euclid(5)
}

/// Squares covered by the charge skill
pub fn charge_range(stats: &Stats) -> i32 {
    (15 + stats.strength).div_euclid(5)
}

/// HP restored per turn of meditation
pub fn meditation_heal(stats: &Stats) -> i32 {
    stats.wisdom.div_euclid(3).max(1)
}

/// Sum both dice pools and subtract defense from attack. A hit always deals
/// at least one point.
pub fn roll_damage<D: Dice + ?Sized>(attack: &DiceSpec, defense: &DiceSpec, dice: &mut D) -> i32 {
    let attack_total = attack.roll(dice);
    let defense_total = defense.roll(dice);
    (attack_total - defense_total).max(1)
}

/// Ranged combat parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangedProfile {
    pub attack: DiceSpec,
    pub accuracy: i32,
    pub range: i32,
    pub max_energy: i32,
    pub energy_cost: i32,
    pub energy_regen: i32,
}

impl RangedProfile {
    pub fn from_stats(stats: &Stats) -> Self {
        Self {
            attack: ranged_attack(stats),
            accuracy: ranged_accuracy(stats),
            range: ranged_range(stats),
            max_energy: max_ranged_energy(stats),
            energy_cost: ranged_energy_cost(stats),
            energy_regen: energy_regen(stats),
        }
    }
}

/// Every number the combat engine reads, recomputed whenever stats or level
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub max_hp: i32,
    pub attack: DiceSpec,
    pub defense: DiceSpec,
    pub accuracy: i32,
    pub evasion: i32,
    pub perception: i32,
    pub critical_range: i32,
    pub speed_tier: i32,
    pub ranged: RangedProfile,
}

impl DerivedStats {
    pub fn compute(stats: &Stats, level: u32) -> Self {
        Self {
            max_hp: max_hp(stats, level).max(1),
            attack: attack(stats),
            defense: defense(stats),
            accuracy: accuracy(stats),
            evasion: evasion(stats),
            perception: perception(stats),
            critical_range: critical_range(stats),
            speed_tier: speed_tier(stats),
            ranged: RangedProfile::from_stats(stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::dice::ScriptedDice;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stats(str: i32, dex: i32, con: i32, int: i32, wis: i32) -> Stats {
        Stats::new(str, dex, con, int, wis)
    }

    #[test]
    fn test_max_hp() {
        // (10*2 + 10/5) * (1 + 0.2) = 22 * 1.2 = 26.4
        assert_eq!(max_hp(&stats(10, 10, 10, 10, 10), 1), 26);
        // (12*2 + 7/5) * 1.6 = 25.4 * 1.6 = 40.64
        assert_eq!(max_hp(&stats(7, 10, 12, 10, 10), 3), 40);
    }

    #[test]
    fn test_attack_and_defense_dice() {
        let s = stats(12, 9, 11, 5, 5);
        assert_eq!(attack(&s), DiceSpec::new(7, 1, 6));
        assert_eq!(defense(&s), DiceSpec::new(5, 2, 6));

        // floor(3 - 5) stays negative, floor semantics on the halves
        let weak = stats(3, 11, 1, 1, 1);
        assert_eq!(attack(&weak).base, -3);
        assert_eq!(defense(&weak).base, -1);
        assert_eq!(attack(&weak).dice_sides, 0);
    }

    #[test]
    fn test_percentages() {
        let s = stats(10, 13, 10, 4, 7);
        assert_eq!(accuracy(&s), 79); // 60 + 19.5
        assert_eq!(evasion(&s), 15); // 15.6
        assert_eq!(perception(&s), 5); // 3 + 2.8
        assert_eq!(sleep_chance(&s), 18);
        assert_eq!(sleep_chance(&stats(1, 1, 1, 7, 1)), 0);
        assert_eq!(sleep_chance(&stats(1, 1, 1, 1, 1)), 42);
    }

    #[test]
    fn test_critical_range_scales_and_caps() {
        let low = critical_range(&stats(10, 5, 10, 5, 10));
        let high = critical_range(&stats(10, 20, 10, 20, 10));
        assert!(high > low);
        assert_eq!(critical_range(&stats(10, 200, 10, 200, 10)), MAX_CRITICAL_RANGE);
    }

    #[test]
    fn test_speed_tier_clamped() {
        assert_eq!(speed_tier(&stats(1, 1, 1, 1, 1)), 0);
        assert_eq!(speed_tier(&stats(1, 10, 1, 1, 1)), 2);
        assert_eq!(speed_tier(&stats(1, 60, 1, 1, 1)), MAX_SPEED_TIER);
    }

    #[test]
    fn test_flee_threshold_bounds() {
        assert_eq!(flee_threshold_pct(&stats(40, 5, 5, 1, 1)), 0);
        assert_eq!(flee_threshold_pct(&stats(1, 5, 5, 40, 40)), MAX_FLEE_THRESHOLD_PCT);
        assert_eq!(flee_threshold_pct(&stats(10, 5, 5, 15, 15)), 30);
        assert_eq!(flee_threshold_pct(&stats(10, 10, 10, 17, 17)), 34);
    }

    #[test]
    fn test_roll_damage_floor_example() {
        // 5 attack against 10 defense still scratches for 1
        let attack = DiceSpec::new(5, 0, 0);
        let defense = DiceSpec::new(10, 2, 6);
        let mut dice = ScriptedDice::new([]);
        assert_eq!(roll_damage(&attack, &defense, &mut dice), 1);
    }

    #[test]
    fn test_roll_damage_never_below_one() {
        let mut rng = StdRng::seed_from_u64(99);
        for base in -5..5 {
            for sides in 0..4 {
                let attack = DiceSpec::new(base, 2, sides * 3);
                let defense = DiceSpec::new(8, 3, 6);
                assert!(roll_damage(&attack, &defense, &mut rng) >= 1);
            }
        }
    }

    #[test]
    fn test_roll_damage_subtracts_totals() {
        let attack = DiceSpec::new(6, 2, 6);
        let defense = DiceSpec::new(1, 1, 4);
        // attack 6 + 5 + 3 = 14, defense 1 + 2 = 3
        let mut dice = ScriptedDice::new([5, 3, 2]);
        assert_eq!(roll_damage(&attack, &defense, &mut dice), 11);
    }

    #[test]
    fn test_dice_spec_bounds() {
        let spec = DiceSpec::new(2, 3, 4);
        assert_eq!(spec.min_total(), 5);
        assert_eq!(spec.max_total(), 14);
        assert_eq!(DiceSpec::new(4, 2, 0).min_total(), 4);
    }

    #[test]
    fn test_derived_stats_floor_hp_at_one() {
        let derived = DerivedStats::compute(&Stats::new(1, 1, 1, 1, 1), 0);
        assert!(derived.max_hp >= 1);
        assert_eq!(derived.ranged.energy_cost, 20);
    }
}
