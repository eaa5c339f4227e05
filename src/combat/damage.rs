//! Combat resolution
//!
//! One attack from one combatant against another: hit roll, evade roll,
//! damage, and application. Death handling and the ranged pre-checks
//! (energy, interference, initiative) belong to the caller.

use super::dice::Dice;
use super::formulas::DiceSpec;
use super::modifiers::{adjust_percentage, surround_penalty, AttackModifier};
use crate::entities::Combatant;

/// Which pipeline an attack goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Melee,
    /// Free strike against someone leaving melee. Fixed bonuses, no evade.
    Opportunity,
    /// Ranged shot. Size-adjusted accuracy, no evade.
    Ranged,
}

/// Situation around an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatContext {
    pub kind: AttackKind,
    /// Hostiles standing next to the attacker
    pub attacker_adjacent_hostiles: u32,
    /// Attacker's allies standing next to the defender
    pub defender_adjacent_hostiles: u32,
}

impl CombatContext {
    pub fn new(kind: AttackKind) -> Self {
        Self {
            kind,
            attacker_adjacent_hostiles: 0,
            defender_adjacent_hostiles: 0,
        }
    }

    pub fn melee() -> Self {
        Self::new(AttackKind::Melee)
    }

    pub fn opportunity() -> Self {
        Self::new(AttackKind::Opportunity)
    }

    pub fn ranged() -> Self {
        Self::new(AttackKind::Ranged)
    }

    pub fn with_surroundings(mut self, attacker_adjacent: u32, defender_adjacent: u32) -> Self {
        self.attacker_adjacent_hostiles = attacker_adjacent;
        self.defender_adjacent_hostiles = defender_adjacent;
        self
    }

    pub fn is_ranged(&self) -> bool {
        self.kind == AttackKind::Ranged
    }
}

/// The numbers an attack was resolved with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackContext {
    pub kind: AttackKind,
    pub modifier: AttackModifier,
    pub hit_chance: i32,
    pub critical_range: i32,
    /// Percent of accuracy lost to flanking
    pub accuracy_penalty: i32,
    /// Defender evasion after penalties, when an evade roll applies
    pub evasion_chance: Option<i32>,
}

/// Outcome of the 1..=100 hit roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRoll {
    Critical,
    Hit,
    Miss,
}

/// Classify a hit roll. The critical check comes first and is inclusive;
/// a roll equal to the hit chance misses.
pub fn classify_hit_roll(roll: i32, critical_range: i32, hit_chance: i32) -> HitRoll {
    if roll <= critical_range {
        HitRoll::Critical
    } else if roll >= hit_chance {
        HitRoll::Miss
    } else {
        HitRoll::Hit
    }
}

/// Result of one resolved attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackResult {
    pub hit: bool,
    pub critical: bool,
    pub evaded: bool,
    /// HP actually removed from the defender
    pub damage: i32,
    pub killed: bool,
    pub roll: i32,
    pub context: AttackContext,
}

impl AttackResult {
    fn whiff(roll: i32, evaded: bool, context: AttackContext) -> Self {
        Self {
            hit: false,
            critical: false,
            evaded,
            damage: 0,
            killed: false,
            roll,
            context,
        }
    }
}

/// Raw damage before it meets the defender's HP: the scaled attack total,
/// minus the defense total unless critical, never below 1.
pub fn hit_damage<D: Dice + ?Sized>(
    attack: &DiceSpec,
    defense: &DiceSpec,
    modifier: &AttackModifier,
    critical: bool,
    dice: &mut D,
) -> i32 {
    let attack_total = modifier.scale_damage(attack.roll(dice));
    let defense_total = if critical { 0 } else { defense.roll(dice) };
    (attack_total - defense_total).max(1)
}

/// Resolve one attack and apply its damage. Pending attacker modifiers are
/// consumed whatever the outcome.
pub fn resolve_combat_action<A, B, D>(
    attacker: &mut A,
    defender: &mut B,
    context: &CombatContext,
    dice: &mut D,
) -> AttackResult
where
    A: Combatant + ?Sized,
    B: Combatant + ?Sized,
    D: Dice + ?Sized,
{
    let pending = attacker.take_attack_modifiers();
    let modifier = match context.kind {
        AttackKind::Opportunity => AttackModifier::opportunity(),
        _ => pending,
    };

    let derived = *attacker.derived();
    let (base_accuracy, attack_dice) = match context.kind {
        AttackKind::Ranged => (derived.ranged.accuracy, derived.ranged.attack),
        _ => (derived.accuracy, derived.attack),
    };

    let accuracy_penalty = surround_penalty(context.attacker_adjacent_hostiles);
    let mut hit_chance = adjust_percentage(base_accuracy, modifier.accuracy_pct, accuracy_penalty);
    if context.is_ranged() {
        hit_chance += defender.size().accuracy_modifier();
    }

    let evasion_chance = (context.kind == AttackKind::Melee).then(|| {
        adjust_percentage(
            defender.derived().evasion,
            0,
            surround_penalty(context.defender_adjacent_hostiles),
        )
    });

    let attack_context = AttackContext {
        kind: context.kind,
        modifier,
        hit_chance,
        critical_range: derived.critical_range,
        accuracy_penalty,
        evasion_chance,
    };

    let roll = dice.percent();
    let hit_roll = classify_hit_roll(roll, derived.critical_range, hit_chance);
    log::debug!(
        "{} attacks {} ({:?}): roll {} vs hit {} / crit {} -> {:?}",
        attacker.name(),
        defender.name(),
        context.kind,
        roll,
        hit_chance,
        derived.critical_range,
        hit_roll
    );

    if hit_roll == HitRoll::Miss {
        return AttackResult::whiff(roll, false, attack_context);
    }
    let critical = hit_roll == HitRoll::Critical;

    if !critical {
        if let Some(evasion) = evasion_chance {
            if dice.percent() <= evasion {
                log::debug!("{} evades (evasion {})", defender.name(), evasion);
                return AttackResult::whiff(roll, true, attack_context);
            }
        }
    }

    let defense = defender.derived().defense;
    let damage = hit_damage(&attack_dice, &defense, &modifier, critical, dice)
        .min(defender.health().current);
    let dealt = defender.health_mut().take_damage(damage);
    defender.on_damaged(dealt);

    AttackResult {
        hit: true,
        critical,
        evaded: false,
        damage: dealt,
        killed: defender.is_dead(),
        roll,
        context: attack_context,
    }
}
