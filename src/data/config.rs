//! Game configuration
//!
//! Tunables for generation, vision, monster behaviour and the starting
//! character. Every field has a default so a partial `config.ron` works.

use serde::{Deserialize, Serialize};

use crate::entities::Stats;

/// Floor layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub width: i32,
    pub height: i32,
    pub min_rooms: u32,
    pub max_rooms: u32,
    pub min_room_size: i32,
    pub max_room_size: i32,
    /// Two rooms must be more than this many wall cells apart on at least
    /// one axis, so padding 1 already rejects a single shared wall column
    pub room_padding: i32,
    /// Placement tries per room before it is skipped
    pub placement_attempts: u32,
    /// Percent chance that a large enough room gets obstacles
    pub obstacle_chance: i32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            width: 80,
            height: 40,
            min_rooms: 6,
            max_rooms: 12,
            min_room_size: 4,
            max_room_size: 10,
            room_padding: 2,
            placement_attempts: 50,
            obstacle_chance: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Sight radius outside rooms
    pub corridor_radius: i32,
    /// Randomly drop tiles on the edge of the sight circle
    pub soft_edge: bool,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            corridor_radius: 3,
            soft_edge: false,
        }
    }
}

/// Monster behaviour tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Turns a monster keeps hunting after losing the player
    pub tracking_turns: u32,
    /// Percent chance an idle monster wanders each turn
    pub wander_chance: i32,
    /// Percent chance a sleeper next to the player wakes up
    pub adjacent_wake_chance: i32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            tracking_turns: 8,
            wander_chance: 20,
            adjacent_wake_chance: 85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub name: String,
    pub stats: Stats,
    /// Codex points available at the start of a run
    pub starting_codex_points: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            name: "Delver".to_string(),
            stats: Stats::player_base(),
            starting_codex_points: 3,
        }
    }
}

/// Everything tunable about a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map: MapSettings,
    pub vision: VisionSettings,
    pub ai: AiSettings,
    pub player: PlayerSettings,
    /// Danger level of the first floor
    pub base_danger: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map: MapSettings::default(),
            vision: VisionSettings::default(),
            ai: AiSettings::default(),
            player: PlayerSettings::default(),
            base_danger: 1,
        }
    }
}

impl GameConfig {
    /// Repair values that would make generation or spawning degenerate
    pub fn sanitized(mut self) -> Self {
        let map = &mut self.map;
        map.width = map.width.max(20);
        map.height = map.height.max(20);
        map.min_room_size = map.min_room_size.max(3);
        map.max_room_size = map.max_room_size.max(map.min_room_size);
        map.max_rooms = map.max_rooms.max(map.min_rooms).max(1);
        map.room_padding = map.room_padding.max(1);
        map.placement_attempts = map.placement_attempts.max(1);
        self.vision.corridor_radius = self.vision.corridor_radius.max(1);
        self
    }
}
