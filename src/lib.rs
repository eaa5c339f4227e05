//! Gloomdelve - turn-based roguelike simulation core
//!
//! Combat resolution, monster behaviour and dungeon generation for a
//! single-player dungeon crawl. Rendering, audio and persistence front ends
//! consume the core through the event queue and the save snapshot.

pub mod error;
pub mod combat;
pub mod world;
pub mod entities;
pub mod ai;
pub mod progression;
pub mod data;
pub mod game;
pub mod save;

// Re-export commonly used types
pub use error::{ActionError, DataError};
pub use game::{ActionOutcome, GameEvent, GameSession, GameState, MessageCategory};
pub use entities::{Monster, Player, Position, Stats};
pub use world::Map;
