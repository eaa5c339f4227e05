//! Save/load system
//!
//! Handles game saving and loading.

pub mod save_game;

pub use save_game::{
    SaveData, SaveError, SaveSummary,
    save_game, load_game, delete_save,
    save_game_in, load_game_from, delete_save_in,
    save_exists, list_saves, list_saves_in, save_path, slot_path,
    read_save, write_save,
};
