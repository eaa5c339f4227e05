//! Progression systems

pub mod xp;
pub mod skills;
pub mod effects;
pub mod danger;

pub use xp::{xp_for_level, Experience};
pub use skills::{all_skills, skill, Skill, SkillId, SkillSlots, SlottedSkill};
pub use effects::{SkillOutcome, SkillRegistry};
pub use danger::{danger_for_floor, DangerScaling};
