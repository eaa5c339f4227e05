//! Combat system
//!
//! Dice, the formula table, attack modifiers and the resolution engine for
//! melee, opportunity and ranged attacks.

pub mod dice;
pub mod formulas;
pub mod modifiers;
pub mod damage;
pub mod ranged;

pub use dice::{weighted_choice, Dice, ScriptedDice};
pub use formulas::{roll_damage, DerivedStats, DiceSpec, RangedProfile};
pub use modifiers::{surround_penalty, AttackModifier};
pub use damage::{
    classify_hit_roll, hit_damage, resolve_combat_action, AttackContext, AttackKind,
    AttackResult, CombatContext, HitRoll,
};
pub use ranged::{defender_strikes_first, find_interference, in_range, pick_victim, Interference};
