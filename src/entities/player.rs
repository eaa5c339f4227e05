//! Player entity

use serde::{Deserialize, Serialize};

use super::components::{Health, Position, Stats};
use super::monsters::MonsterId;
use super::Combatant;
use crate::combat::{AttackModifier, DerivedStats};
use crate::progression::{Experience, SkillId, SkillSlots};

/// Ranged-combat mode and its energy pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangedState {
    pub active: bool,
    pub target: Option<MonsterId>,
    pub energy: i32,
}

/// Multi-turn self-heal. Movement or damage cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meditation {
    pub turns_remaining: u32,
    pub heal_per_turn: i32,
    /// Set when damage lands; the next turn tick cancels the meditation
    pub interrupted: bool,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub glyph: char,
    pub position: Position,
    pub stats: Stats,
    pub derived: DerivedStats,
    pub health: Health,
    pub experience: Experience,
    pub codex_points: u32,
    pub learned: Vec<SkillId>,
    pub skills: SkillSlots,
    pub pending_modifiers: Vec<AttackModifier>,
    pub ranged: RangedState,
    pub meditation: Option<Meditation>,
}

impl Player {
    pub fn new(name: impl Into<String>, position: Position, stats: Stats) -> Self {
        let experience = Experience::new();
        let derived = DerivedStats::compute(&stats, experience.level);
        Self {
            name: name.into(),
            glyph: '@',
            position,
            stats,
            derived,
            health: Health::new(derived.max_hp),
            experience,
            codex_points: 0,
            learned: Vec::new(),
            skills: SkillSlots::default(),
            pending_modifiers: Vec::new(),
            ranged: RangedState {
                active: false,
                target: None,
                energy: derived.ranged.max_energy,
            },
            meditation: None,
        }
    }

    pub fn level(&self) -> u32 {
        self.experience.level
    }

    /// Recompute derived numbers after a stat or level change
    pub fn recompute_derived(&mut self) {
        self.derived = DerivedStats::compute(&self.stats, self.level());
        self.health.set_max(self.derived.max_hp);
        self.ranged.energy = self.ranged.energy.min(self.derived.ranged.max_energy);
    }

    /// Add experience, returning how many levels were gained
    pub fn gain_experience(&mut self, amount: u32) -> u32 {
        let levels = self.experience.add_xp(amount);
        if levels > 0 {
            self.recompute_derived();
        }
        levels
    }

    pub fn queue_modifier(&mut self, modifier: AttackModifier) {
        self.pending_modifiers.push(modifier);
    }

    /// Modifiers that the next attack would use, without consuming them
    pub fn peek_modifiers(&self) -> AttackModifier {
        AttackModifier::combine(&self.pending_modifiers)
    }

    pub fn has_learned(&self, skill: SkillId) -> bool {
        self.learned.contains(&skill)
    }

    pub fn is_meditating(&self) -> bool {
        self.meditation.is_some()
    }

    /// Stop meditating, returning true if a meditation was running
    pub fn cancel_meditation(&mut self) -> bool {
        self.meditation.take().is_some()
    }

    pub fn has_energy_for_shot(&self) -> bool {
        self.ranged.energy >= self.derived.ranged.energy_cost
    }

    pub fn spend_shot_energy(&mut self) {
        self.ranged.energy = (self.ranged.energy - self.derived.ranged.energy_cost).max(0);
    }

    /// Recover energy while ranged mode is off
    pub fn regenerate_energy(&mut self) -> i32 {
        if self.ranged.active {
            return 0;
        }
        let max = self.derived.ranged.max_energy;
        let before = self.ranged.energy;
        self.ranged.energy = (before + self.derived.ranged.energy_regen).min(max);
        self.ranged.energy - before
    }

    pub fn deactivate_ranged(&mut self) {
        self.ranged.active = false;
        self.ranged.target = None;
    }
}

impl Combatant for Player {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Position {
        self.position
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }

    fn derived(&self) -> &DerivedStats {
        &self.derived
    }

    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    fn take_attack_modifiers(&mut self) -> AttackModifier {
        let combined = AttackModifier::combine(&self.pending_modifiers);
        self.pending_modifiers.clear();
        combined
    }

    fn on_damaged(&mut self, amount: i32) {
        if amount > 0 {
            if let Some(meditation) = self.meditation.as_mut() {
                meditation.interrupted = true;
            }
        }
    }
}
