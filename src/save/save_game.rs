//! Game save/load system
//!
//! Snapshots a [`GameSession`] into a flat [`SaveData`] and writes it to disk
//! as JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::data::DataManager;
use crate::entities::{IdAllocator, Monster, Player};
use crate::game::{EventQueue, GameSession, GameState, MessageCategory};
use crate::progression::SkillRegistry;
use crate::world::Map;

/// Save file version for compatibility checking
pub const SAVE_VERSION: u32 = 1;

/// Number of save slots
pub const SAVE_SLOTS: u8 = 3;

/// Complete save data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub seed: u64,
    pub floor: u32,
    pub danger_level: u32,
    pub turn: u64,
    pub next_monster_id: u32,
    pub player: Player,
    pub monsters: Vec<Monster>,
    /// Tiles carry their explored flag; rooms and stairs come along
    pub map: Map,
}

/// Brief summary of a save for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub floor: u32,
    pub level: u32,
    pub turn: u64,
}

impl SaveData {
    pub fn summary(&self) -> SaveSummary {
        SaveSummary {
            floor: self.floor,
            level: self.player.level(),
            turn: self.turn,
        }
    }

    /// Reject snapshots whose pieces do not fit together
    fn validate(&self) -> Result<(), SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        let cells = match (usize::try_from(self.map.width), usize::try_from(self.map.height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => w.checked_mul(h),
            _ => None,
        };
        let Some(cells) = cells else {
            return Err(SaveError::InvalidData(format!(
                "bad map size {}x{}",
                self.map.width, self.map.height
            )));
        };
        if self.map.tiles.len() != cells {
            return Err(SaveError::InvalidData(format!(
                "map has {} tiles, expected {}",
                self.map.tiles.len(),
                cells
            )));
        }
        let pos = self.player.position;
        if !self.map.in_bounds(pos.x, pos.y) {
            return Err(SaveError::InvalidData(format!("player outside the map at ({}, {})", pos.x, pos.y)));
        }
        if self.player.health.is_dead() {
            return Err(SaveError::InvalidData("player is dead".to_string()));
        }
        if let Some(m) = self.monsters.iter().find(|m| m.id.0 >= self.next_monster_id) {
            return Err(SaveError::InvalidData(format!("monster id {} not below the id counter", m.id.0)));
        }
        if let Some(m) = self
            .monsters
            .iter()
            .find(|m| !self.map.in_bounds(m.position.x, m.position.y))
        {
            return Err(SaveError::InvalidData(format!(
                "{} outside the map at ({}, {})",
                m.name, m.position.x, m.position.y
            )));
        }
        Ok(())
    }
}

/// Save error types
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Invalid save data: {0}")]
    InvalidData(String),
}

impl GameSession {
    /// Snapshot everything needed to pick the run up again. Finished runs
    /// cannot be saved.
    pub fn to_save(&self) -> Result<SaveData, SaveError> {
        if self.is_game_over() {
            return Err(SaveError::InvalidData("the run is over".to_string()));
        }
        Ok(SaveData {
            version: SAVE_VERSION,
            seed: self.seed,
            floor: self.floor,
            danger_level: self.danger_level,
            turn: self.turn,
            next_monster_id: self.ids.next,
            player: self.player.clone(),
            monsters: self.monsters.iter().filter(|m| m.is_alive()).cloned().collect(),
            map: self.map.clone(),
        })
    }

    /// Rebuild a session from a snapshot. The RNG is reseeded from the run
    /// seed and the turn, so a loaded run is deterministic from there on.
    pub fn from_save(save: SaveData, data: DataManager) -> Result<Self, SaveError> {
        save.validate()?;
        let DataManager { config, monsters } = data;
        let mut session = GameSession {
            state: GameState::Playing,
            config,
            templates: monsters,
            skills: SkillRegistry::with_defaults(),
            map: save.map,
            player: save.player,
            monsters: save.monsters,
            rng: StdRng::seed_from_u64(save.seed ^ save.turn),
            seed: save.seed,
            floor: save.floor,
            danger_level: save.danger_level,
            turn: save.turn,
            ids: IdAllocator::new(save.next_monster_id),
            noise: None,
            events: EventQueue::new(),
            messages: Vec::new(),
        };
        session.refresh_visibility();
        session.add_message(format!("You return to floor {}.", session.floor), MessageCategory::System);
        Ok(session)
    }
}

/// Get the save directory path
pub fn save_directory() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "gloomdelve", "Gloomdelve") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push("saves");
        path
    } else {
        // Fallback to current directory
        PathBuf::from("./saves")
    }
}

/// Path of a slot's file inside `dir`
pub fn slot_path(dir: &Path, slot: u8) -> PathBuf {
    dir.join(format!("save_{}.json", slot))
}

/// Get the path for a specific save slot
pub fn save_path(slot: u8) -> PathBuf {
    slot_path(&save_directory(), slot)
}

/// Check if a save exists in the given slot
pub fn save_exists(slot: u8) -> bool {
    save_path(slot).exists()
}

fn check_slot(slot: u8) -> Result<(), SaveError> {
    if slot >= SAVE_SLOTS {
        return Err(SaveError::InvalidData(format!(
            "slot {} out of range (0..{})",
            slot, SAVE_SLOTS
        )));
    }
    Ok(())
}

/// List every slot in `dir` with the summary of its save, if any.
/// Unreadable saves show up as empty.
pub fn list_saves_in(dir: &Path) -> Vec<(u8, Option<SaveSummary>)> {
    (0..SAVE_SLOTS)
        .map(|slot| {
            let path = slot_path(dir, slot);
            let summary = if path.exists() {
                read_save(&path).ok().map(|save| save.summary())
            } else {
                None
            };
            (slot, summary)
        })
        .collect()
}

/// List every slot with the summary of its save, if any
pub fn list_saves() -> Vec<(u8, Option<SaveSummary>)> {
    list_saves_in(&save_directory())
}

/// Write a snapshot to an arbitrary file
pub fn write_save(save: &SaveData, path: &Path) -> Result<(), SaveError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(save)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read and check a snapshot from an arbitrary file
pub fn read_save(path: &Path) -> Result<SaveData, SaveError> {
    let data = fs::read_to_string(path)?;
    let save: SaveData = serde_json::from_str(&data)?;
    save.validate()?;
    Ok(save)
}

/// Save the game to a slot inside `dir`
pub fn save_game_in(dir: &Path, session: &GameSession, slot: u8) -> Result<(), SaveError> {
    check_slot(slot)?;
    let save = session.to_save()?;
    write_save(&save, &slot_path(dir, slot))?;
    log::info!("Game saved to slot {}", slot);
    Ok(())
}

/// Load a game from a slot inside `dir`
pub fn load_game_from(dir: &Path, slot: u8) -> Result<SaveData, SaveError> {
    check_slot(slot)?;
    let save = read_save(&slot_path(dir, slot))?;
    log::info!("Game loaded from slot {}", slot);
    Ok(save)
}

/// Delete a save slot inside `dir`. An empty slot is not an error.
pub fn delete_save_in(dir: &Path, slot: u8) -> Result<(), SaveError> {
    check_slot(slot)?;
    let path = slot_path(dir, slot);
    if path.exists() {
        fs::remove_file(&path)?;
        log::info!("Deleted save slot {}", slot);
    }
    Ok(())
}

/// Save the game to a slot
pub fn save_game(session: &GameSession, slot: u8) -> Result<(), SaveError> {
    save_game_in(&save_directory(), session, slot)
}

/// Load a game from a slot
pub fn load_game(slot: u8) -> Result<SaveData, SaveError> {
    load_game_from(&save_directory(), slot)
}

/// Delete a save slot
pub fn delete_save(slot: u8) -> Result<(), SaveError> {
    delete_save_in(&save_directory(), slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::monsters::tests::flee_test_monster;
    use crate::entities::{MonsterId, Position};

    fn temp_file(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("gloomdelve_{}_{}.json", name, std::process::id()));
        path
    }

    #[test]
    fn test_snapshot_restores_run() {
        let mut session = GameSession::with_defaults(99);
        session.wait().unwrap();
        session.wait().unwrap();
        let save = session.to_save().unwrap();
        assert_eq!(save.turn, session.turn());

        let restored = GameSession::from_save(save, DataManager::default()).unwrap();
        assert_eq!(restored.turn(), session.turn());
        assert_eq!(restored.floor(), session.floor());
        assert_eq!(restored.player().position, session.player().position);
        assert_eq!(restored.player().health, session.player().health);
        assert_eq!(restored.living_monsters().count(), session.living_monsters().count());
        assert_eq!(restored.map().tiles.len(), session.map().tiles.len());
        assert_eq!(restored.map().explored_count(), session.map().explored_count());
    }

    #[test]
    fn test_file_round_trip_and_version_check() {
        let session = GameSession::with_defaults(5);
        let mut save = session.to_save().unwrap();
        let path = temp_file("version");

        write_save(&save, &path).unwrap();
        let loaded = read_save(&path).unwrap();
        assert_eq!(loaded.summary(), save.summary());

        save.version = SAVE_VERSION + 1;
        write_save(&save, &path).unwrap();
        assert!(matches!(
            read_save(&path),
            Err(SaveError::VersionMismatch { found, .. }) if found == SAVE_VERSION + 1
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_rejects_broken_snapshots() {
        let session = GameSession::with_defaults(6);
        let mut save = session.to_save().unwrap();
        save.map.tiles.pop();
        assert!(matches!(
            GameSession::from_save(save, DataManager::default()),
            Err(SaveError::InvalidData(_))
        ));

        let path = temp_file("garbage");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_save(&path), Err(SaveError::Parse(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_rejects_bad_map_size_and_stray_monsters() {
        let session = GameSession::with_defaults(12);
        let save = session.to_save().unwrap();

        let mut huge = save.clone();
        huge.map.width = i32::MAX;
        huge.map.height = i32::MAX;
        assert!(matches!(huge.validate(), Err(SaveError::InvalidData(_))));

        let mut negative = save.clone();
        negative.map.width = -save.map.width;
        negative.map.height = -save.map.height;
        assert!(matches!(negative.validate(), Err(SaveError::InvalidData(_))));

        let mut stray = save.clone();
        let mut monster = flee_test_monster();
        monster.id = MonsterId(0);
        monster.position = Position::new(save.map.width + 3, 1);
        stray.monsters.push(monster);
        stray.next_monster_id = stray.next_monster_id.max(1);
        assert!(matches!(
            GameSession::from_save(stray, DataManager::default()),
            Err(SaveError::InvalidData(msg)) if msg.contains("outside the map")
        ));

        assert!(save.validate().is_ok());
    }

    #[test]
    fn test_slot_helpers_in_directory() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("gloomdelve_slots_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        assert!(list_saves_in(&dir).iter().all(|(_, summary)| summary.is_none()));

        let mut session = GameSession::with_defaults(21);
        session.wait().unwrap();
        save_game_in(&dir, &session, 1).unwrap();
        assert!(slot_path(&dir, 1).exists());

        let slots = list_saves_in(&dir);
        assert_eq!(slots.len(), SAVE_SLOTS as usize);
        assert_eq!(slots[0], (0, None));
        assert_eq!(
            slots[1],
            (
                1,
                Some(SaveSummary {
                    floor: session.floor(),
                    level: session.player().level(),
                    turn: session.turn(),
                })
            )
        );

        let loaded = load_game_from(&dir, 1).unwrap();
        assert_eq!(loaded.turn, session.turn());
        assert!(matches!(load_game_from(&dir, 2), Err(SaveError::Io(_))));
        assert!(matches!(save_game_in(&dir, &session, SAVE_SLOTS), Err(SaveError::InvalidData(_))));

        delete_save_in(&dir, 1).unwrap();
        assert!(!slot_path(&dir, 1).exists());
        // deleting an empty slot is fine
        delete_save_in(&dir, 1).unwrap();
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_finished_run_cannot_be_saved() {
        let mut session = GameSession::with_defaults(8);
        session.game_over();
        assert!(session.to_save().is_err());
    }
}
