//! Monster templates for data-driven spawning
//!
//! These templates are loaded from RON files and used by the floor spawner.

use serde::{Deserialize, Serialize};

use crate::entities::{MonsterSize, Stats};

/// A template for creating monsters from external data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    /// Unique template ID for reference
    pub id: String,
    /// Display name
    pub name: String,
    /// Display glyph
    pub glyph: char,
    /// Base stats before level scaling
    pub stats: Stats,
    #[serde(default)]
    pub size: MonsterSize,
    /// Relative weight in the spawn table
    pub spawn_weight: u32,
    /// First floor this monster can appear on
    #[serde(default = "default_min_floor")]
    pub min_floor: u32,
    /// XP per monster level awarded on kill
    pub xp_value: u32,
    /// Codex points awarded on kill
    #[serde(default = "default_codex_value")]
    pub codex_value: u32,
    /// Extra companions spawned next to the leader, inclusive range
    #[serde(default)]
    pub pack_size: (u32, u32),
    /// Fearless monsters never flee
    #[serde(default)]
    pub fearless: bool,
    /// Optional description/lore
    #[serde(default)]
    pub description: Option<String>,
}

fn default_min_floor() -> u32 {
    1
}

fn default_codex_value() -> u32 {
    1
}

impl MonsterTemplate {
    pub fn spawns_in_packs(&self) -> bool {
        self.pack_size.1 > 0
    }
}

/// Collection of monster templates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonsterTemplates {
    pub templates: Vec<MonsterTemplate>,
}

impl MonsterTemplates {
    /// Find a template by ID
    pub fn find(&self, id: &str) -> Option<&MonsterTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Templates allowed on a floor, paired with their spawn weights
    pub fn spawn_table(&self, floor: u32) -> Vec<(&MonsterTemplate, u32)> {
        self.templates
            .iter()
            .filter(|t| t.min_floor <= floor && t.spawn_weight > 0)
            .map(|t| (t, t.spawn_weight))
            .collect()
    }
}

fn template(
    id: &str,
    name: &str,
    glyph: char,
    stats: Stats,
    size: MonsterSize,
    spawn_weight: u32,
    min_floor: u32,
    xp_value: u32,
) -> MonsterTemplate {
    MonsterTemplate {
        id: id.to_string(),
        name: name.to_string(),
        glyph,
        stats,
        size,
        spawn_weight,
        min_floor,
        xp_value,
        codex_value: 1,
        pack_size: (0, 0),
        fearless: false,
        description: None,
    }
}

/// Create default monster templates (hardcoded fallback)
pub fn default_monster_templates() -> MonsterTemplates {
    let mut rat = template("rat", "Cave Rat", 'r', Stats::new(3, 12, 3, 1, 6), MonsterSize::Tiny, 30, 1, 4);
    rat.pack_size = (1, 3);
    rat.description = Some("Never alone for long.".to_string());

    let mut skeleton = template("skeleton", "Skeleton", 's', Stats::new(8, 6, 6, 1, 4), MonsterSize::Medium, 25, 1, 8);
    skeleton.fearless = true;
    skeleton.description = Some("Bones that feel no fear.".to_string());

    let mut goblin = template("goblin", "Goblin", 'g', Stats::new(6, 11, 6, 5, 6), MonsterSize::Small, 25, 1, 7);
    goblin.pack_size = (0, 2);

    let mut cultist = template("cultist", "Hollow Cultist", 'c', Stats::new(6, 9, 7, 9, 11), MonsterSize::Medium, 15, 2, 12);
    cultist.codex_value = 2;

    let mut ogre = template("ogre", "Ogre", 'O', Stats::new(16, 5, 15, 2, 4), MonsterSize::Large, 8, 3, 25);
    ogre.codex_value = 3;
    ogre.description = Some("Big enough to stop an arrow meant for someone else.".to_string());

    let mut wraith = template("wraith", "Wraith", 'W', Stats::new(9, 14, 8, 12, 14), MonsterSize::Medium, 6, 4, 30);
    wraith.codex_value = 3;

    let mut horror = template("horror", "Deep Horror", 'H', Stats::new(20, 6, 20, 6, 10), MonsterSize::Huge, 3, 6, 60);
    horror.fearless = true;
    horror.codex_value = 5;

    MonsterTemplates {
        templates: vec![rat, skeleton, goblin, cultist, ogre, wraith, horror],
    }
}
