//! Monster entity
//!
//! Monsters live in a plain `Vec` on the session and act in array order.
//! Everything the AI needs between turns is stored on the monster itself.

use serde::{Deserialize, Serialize};

use super::components::{Health, MonsterSize, Position, Stats};
use super::Combatant;
use crate::combat::{formulas, AttackModifier, DerivedStats};
use crate::data::MonsterTemplate;

/// Stable handle for a monster within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(pub u32);

/// Behaviour state, derived from the monster's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Sleeping,
    Idle,
    Tracking,
    Fleeing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub template_id: String,
    pub name: String,
    pub glyph: char,
    pub level: u32,
    pub stats: Stats,
    pub derived: DerivedStats,
    pub health: Health,
    pub size: MonsterSize,
    pub position: Position,
    pub xp_value: u32,
    pub codex_value: u32,

    // AI state
    pub is_sleeping: bool,
    pub has_spotted_player: bool,
    pub last_known_target_pos: Option<Position>,
    pub tracking_turns_remaining: u32,
    pub has_started_fleeing: bool,
    pub has_acted_this_turn: bool,
    flee_threshold_pct: i32,

    pub pending_modifiers: Vec<AttackModifier>,
}

impl Monster {
    /// Build a monster from a template at the given level. Every two levels
    /// beyond the first add one point to each base stat.
    pub fn from_template(id: MonsterId, template: &MonsterTemplate, level: u32, position: Position) -> Self {
        let level = level.max(1);
        let stats = template.stats.boosted((level as i32 - 1) / 2);
        let derived = DerivedStats::compute(&stats, level);
        let flee_threshold_pct = if template.fearless {
            0
        } else {
            formulas::flee_threshold_pct(&stats)
        };

        Self {
            id,
            template_id: template.id.clone(),
            name: template.name.clone(),
            glyph: template.glyph,
            level,
            stats,
            derived,
            health: Health::new(derived.max_hp),
            size: template.size,
            position,
            xp_value: template.xp_value * level,
            codex_value: template.codex_value,
            is_sleeping: false,
            has_spotted_player: false,
            last_known_target_pos: None,
            tracking_turns_remaining: 0,
            has_started_fleeing: false,
            has_acted_this_turn: false,
            flee_threshold_pct,
            pending_modifiers: Vec::new(),
        }
    }

    /// Percent of max HP at or below which this monster flees. Fixed at
    /// creation.
    pub fn flee_threshold_pct(&self) -> i32 {
        self.flee_threshold_pct
    }

    /// Whether current HP is at or under the flee threshold
    pub fn should_flee(&self) -> bool {
        self.flee_threshold_pct > 0 && self.health.current * 100 <= self.flee_threshold_pct * self.health.max
    }

    pub fn ai_state(&self) -> AiState {
        if self.is_sleeping {
            AiState::Sleeping
        } else if self.has_started_fleeing {
            AiState::Fleeing
        } else if self.has_spotted_player || self.tracking_turns_remaining > 0 {
            AiState::Tracking
        } else {
            AiState::Idle
        }
    }

    /// Wake up and start tracking toward `target`
    pub fn alert(&mut self, target: Position, tracking_turns: u32) {
        self.is_sleeping = false;
        self.last_known_target_pos = Some(target);
        self.tracking_turns_remaining = self.tracking_turns_remaining.max(tracking_turns);
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }
}

impl Combatant for Monster {
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

    fn size(&self) -> MonsterSize {
        self.size
    }

    fn on_damaged(&mut self, amount: i32) {
        // Getting hit wakes anything up
        if amount > 0 {
            self.is_sleeping = false;
        }
    }
}
