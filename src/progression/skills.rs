//! Skill system
//!
//! The skill catalog and the player's slot/cooldown table. What a skill
//! actually does lives in [`super::effects`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::AttackModifier;
use crate::error::ActionError;

/// Lowest and highest skill slot
pub const MIN_SLOT: u8 = 1;
pub const MAX_SLOT: u8 = 9;

/// Unique skill ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillId {
    PowerStrike,
    PreciseStrike,
    QuickShot,
    Focus,
    Jump,
    Meditation,
    Charge,
}

impl SkillId {
    pub const ALL: [SkillId; 7] = [
        SkillId::PowerStrike,
        SkillId::PreciseStrike,
        SkillId::QuickShot,
        SkillId::Focus,
        SkillId::Jump,
        SkillId::Meditation,
        SkillId::Charge,
    ];

    pub fn skill(&self) -> &'static Skill {
        skill(*self)
    }
}

/// A skill definition
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: SkillId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: char,
    /// Codex points needed to learn it
    pub cost: u32,
    /// Turns before it can be used again
    pub cooldown: u32,
    /// Free actions do not advance the world
    pub is_free_action: bool,
    pub requires_target: bool,
}

/// Modifier queued by the strike skills
pub const POWER_STRIKE: AttackModifier = AttackModifier::new(150, -10, 0);
pub const PRECISE_STRIKE: AttackModifier = AttackModifier::new(100, 30, 0);
pub const QUICK_SHOT: AttackModifier = AttackModifier::new(80, 0, 2);
/// Strike delivered at the end of a charge
pub const CHARGE_STRIKE: AttackModifier = AttackModifier::new(130, 10, 0);

/// Turns a meditation lasts
pub const MEDITATION_TURNS: u32 = 5;

static CATALOG: [Skill; 7] = [
    Skill {
        id: SkillId::PowerStrike,
        name: "Power Strike",
        description: "Your next attack hits 50% harder but is slightly less accurate.",
        icon: '!',
        cost: 1,
        cooldown: 3,
        is_free_action: true,
        requires_target: false,
    },
    Skill {
        id: SkillId::PreciseStrike,
        name: "Precise Strike",
        description: "Your next attack is 30% more accurate.",
        icon: '+',
        cost: 1,
        cooldown: 3,
        is_free_action: true,
        requires_target: false,
    },
    Skill {
        id: SkillId::QuickShot,
        name: "Quick Shot",
        description: "Your next attack is faster but deals less damage.",
        icon: '>',
        cost: 2,
        cooldown: 4,
        is_free_action: true,
        requires_target: false,
    },
    Skill {
        id: SkillId::Focus,
        name: "Focus",
        description: "Recover half of your ranged energy.",
        icon: '*',
        cost: 2,
        cooldown: 15,
        is_free_action: true,
        requires_target: false,
    },
    Skill {
        id: SkillId::Jump,
        name: "Jump",
        description: "Leap to a visible floor tile within reach.",
        icon: '^',
        cost: 2,
        cooldown: 6,
        is_free_action: false,
        requires_target: true,
    },
    Skill {
        id: SkillId::Meditation,
        name: "Meditation",
        description: "Heal a little every turn. Moving or taking damage breaks it.",
        icon: '~',
        cost: 3,
        cooldown: 20,
        is_free_action: false,
        requires_target: false,
    },
    Skill {
        id: SkillId::Charge,
        name: "Charge",
        description: "Rush in a straight line at an enemy and strike with force.",
        icon: '=',
        cost: 3,
        cooldown: 8,
        is_free_action: false,
        requires_target: true,
    },
];

/// Look up a skill's static record
pub fn skill(id: SkillId) -> &'static Skill {
    match id {
        SkillId::PowerStrike => &CATALOG[0],
        SkillId::PreciseStrike => &CATALOG[1],
        SkillId::QuickShot => &CATALOG[2],
        SkillId::Focus => &CATALOG[3],
        SkillId::Jump => &CATALOG[4],
        SkillId::Meditation => &CATALOG[5],
        SkillId::Charge => &CATALOG[6],
    }
}

pub fn all_skills() -> &'static [Skill] {
    &CATALOG
}

// =============================================================================
// Skill slots
// =============================================================================

/// A skill placed in a slot, with its cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlottedSkill {
    pub skill: SkillId,
    pub remaining_cooldown: u32,
}

/// Slot table, slots 1 to 9
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSlots {
    slots: BTreeMap<u8, SlottedSkill>,
}

impl SkillSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_slot(slot: u8) -> Result<(), ActionError> {
        if (MIN_SLOT..=MAX_SLOT).contains(&slot) {
            Ok(())
        } else {
            Err(ActionError::InvalidSlot(slot))
        }
    }

    /// Put a skill in a slot, returning whatever was there before. A skill
    /// already slotted elsewhere moves and keeps its cooldown.
    pub fn assign(&mut self, slot: u8, skill: SkillId) -> Result<Option<SkillId>, ActionError> {
        Self::check_slot(slot)?;
        let cooldown = match self.slot_of(skill) {
            Some(old) => self.slots.remove(&old).map_or(0, |s| s.remaining_cooldown),
            None => 0,
        };
        let previous = self.slots.insert(
            slot,
            SlottedSkill {
                skill,
                remaining_cooldown: cooldown,
            },
        );
        Ok(previous.map(|s| s.skill))
    }

    pub fn clear(&mut self, slot: u8) -> Option<SkillId> {
        self.slots.remove(&slot).map(|s| s.skill)
    }

    pub fn get(&self, slot: u8) -> Result<&SlottedSkill, ActionError> {
        Self::check_slot(slot)?;
        self.slots.get(&slot).ok_or(ActionError::EmptySlot(slot))
    }

    pub fn slot_of(&self, skill: SkillId) -> Option<u8> {
        self.slots
            .iter()
            .find(|(_, s)| s.skill == skill)
            .map(|(slot, _)| *slot)
    }

    /// Remaining cooldown for a skill, 0 if ready or not slotted
    pub fn cooldown_of(&self, skill: SkillId) -> u32 {
        self.slot_of(skill)
            .and_then(|slot| self.slots.get(&slot))
            .map_or(0, |s| s.remaining_cooldown)
    }

    /// Start the cooldown after a use. The extra turn covers the tick of the
    /// turn the skill was used in.
    pub fn start_cooldown(&mut self, slot: u8) {
        if let Some(entry) = self.slots.get_mut(&slot) {
            entry.remaining_cooldown = skill(entry.skill).cooldown + 1;
        }
    }

    /// One processed player turn
    pub fn tick(&mut self) {
        for entry in self.slots.values_mut() {
            entry.remaining_cooldown = entry.remaining_cooldown.saturating_sub(1);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &SlottedSkill)> {
        self.slots.iter().map(|(slot, s)| (*slot, s))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
