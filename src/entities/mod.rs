//! Entity model
//!
//! The player, monsters, and the capability set the combat engine needs
//! from either of them.

pub mod components;
pub mod player;
pub mod monsters;
pub mod spawner;

pub use components::{Health, MonsterSize, Position, Stats};
pub use player::{Meditation, Player, RangedState};
pub use monsters::{AiState, Monster, MonsterId};
pub use spawner::{spawn_monsters_for_floor, IdAllocator};

use crate::combat::{AttackModifier, DerivedStats};

/// Anything that can attack or be attacked
pub trait Combatant {
    fn name(&self) -> &str;
    fn position(&self) -> Position;
    fn stats(&self) -> &Stats;
    fn derived(&self) -> &DerivedStats;
    fn health(&self) -> &Health;
    fn health_mut(&mut self) -> &mut Health;

    /// Drain every pending attack modifier into one bundle
    fn take_attack_modifiers(&mut self) -> AttackModifier;

    fn size(&self) -> MonsterSize {
        MonsterSize::Medium
    }

    /// Called after HP was actually lost
    fn on_damaged(&mut self, _amount: i32) {}

    fn is_dead(&self) -> bool {
        self.health().is_dead()
    }
}
