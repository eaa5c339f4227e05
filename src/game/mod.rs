//! Game module - the session, its turn loop and every player action

pub mod events;
pub mod state;
mod turn;
mod combat;
mod actions;

pub use actions::ActionOutcome;
pub use combat::ShotOutcome;
pub use events::{EventQueue, GameEvent, LogMessage, MessageCategory};
pub use state::{GameSession, GameState};
