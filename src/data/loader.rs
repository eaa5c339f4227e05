//! RON data loader
//!
//! Loads game data from external RON files, with fallback to hardcoded defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::config::GameConfig;
use super::monsters::{default_monster_templates, MonsterTemplates};
use crate::error::DataError;

/// Where data files live relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "assets/data";

const CONFIG_FILE: &str = "config.ron";
const MONSTERS_FILE: &str = "monsters.ron";

/// Manages all external game data
#[derive(Debug, Clone)]
pub struct DataManager {
    pub config: GameConfig,
    pub monsters: MonsterTemplates,
}

impl Default for DataManager {
    /// Built-in data only, without touching the filesystem
    fn default() -> Self {
        Self {
            config: GameConfig::default(),
            monsters: default_monster_templates(),
        }
    }
}

impl DataManager {
    /// Load from the default data directory, falling back to defaults
    pub fn new() -> Self {
        Self::load_from(Path::new(DEFAULT_DATA_DIR))
    }

    /// Load every data file under `base_path`. Missing or broken files fall
    /// back to the built-in defaults with a warning.
    pub fn load_from(base_path: &Path) -> Self {
        let config = Self::load_or_default(base_path, CONFIG_FILE, GameConfig::default);
        let mut monsters = Self::load_or_default(base_path, MONSTERS_FILE, default_monster_templates);
        if monsters.templates.is_empty() {
            log::warn!("{} holds no templates, using defaults", MONSTERS_FILE);
            monsters = default_monster_templates();
        }

        Self {
            config: config.sanitized(),
            monsters,
        }
    }

    fn load_or_default<T, F>(base_path: &Path, file: &str, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match load_file(&base_path.join(file)) {
            Ok(Some(value)) => {
                log::info!("Loaded {}", file);
                value
            }
            Ok(None) => default(),
            Err(e) => {
                log::warn!("Failed to load {}: {}. Using defaults.", file, e);
                default()
            }
        }
    }

    /// Get monster templates
    pub fn monster_templates(&self) -> &MonsterTemplates {
        &self.monsters
    }
}

/// Read and parse one RON file. A missing file is not an error.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DataError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    ron::from_str(&content)
        .map(Some)
        .map_err(|source| DataError::Parse {
            file: path.display().to_string(),
            source,
        })
}

fn write_file<T: Serialize>(path: PathBuf, value: &T) -> Result<(), DataError> {
    let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()).map_err(|source| {
        DataError::Serialize {
            file: path.display().to_string(),
            source,
        }
    })?;
    fs::write(path, text)?;
    Ok(())
}

/// Export all default data to RON files for easy editing
pub fn export_default_data(base_path: &Path) -> Result<(), DataError> {
    fs::create_dir_all(base_path)?;
    write_file(base_path.join(CONFIG_FILE), &GameConfig::default())?;
    write_file(base_path.join(MONSTERS_FILE), &default_monster_templates())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gloomdelve-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_export_then_load() {
        let dir = scratch_dir("export");
        let result = export_default_data(&dir);
        assert!(result.is_ok(), "Failed to export default data: {:?}", result.err());
        assert!(dir.join(CONFIG_FILE).exists(), "config.ron not created");
        assert!(dir.join(MONSTERS_FILE).exists(), "monsters.ron not created");

        let manager = DataManager::load_from(&dir);
        assert_eq!(manager.config, GameConfig::default().sanitized());
        assert_eq!(
            manager.monsters.templates.len(),
            default_monster_templates().templates.len()
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_dir_uses_defaults() {
        let manager = DataManager::load_from(&scratch_dir("missing"));
        assert!(!manager.monsters.templates.is_empty());
        assert_eq!(manager.config.map.width, GameConfig::default().map.width);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = scratch_dir("broken");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MONSTERS_FILE), "(templates: [oops").unwrap();
        let err = load_file::<MonsterTemplates>(&dir.join(MONSTERS_FILE)).unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));

        let manager = DataManager::load_from(&dir);
        assert!(manager.monsters.find("rat").is_some());
        let _ = fs::remove_dir_all(&dir);
    }
}
