//! Data loading and external game content
//!
//! This module handles loading game data from external RON files,
//! allowing for data-driven content and easy modding.

pub mod config;
pub mod loader;
pub mod monsters;

pub use config::{AiSettings, GameConfig, MapSettings, PlayerSettings, VisionSettings};
pub use loader::{export_default_data, DataManager};
pub use monsters::{default_monster_templates, MonsterTemplate, MonsterTemplates};
