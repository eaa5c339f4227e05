//! Outgoing events
//!
//! The simulation never draws, plays audio or touches the DOM/terminal.
//! It queues fire-and-forget events for whatever front end drains them,
//! and keeps a short message log of its own.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::entities::Position;

/// Undrained events kept before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 256;
/// Messages kept in the session log
pub const MAX_LOG_MESSAGES: usize = 100;

/// Categories for message filtering/coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCategory {
    Combat,
    System,
    Warning,
    Lore,
}

/// A message in the game log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub text: String,
    pub turn: u64,
    pub category: MessageCategory,
}

/// Something a front end may want to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Message { text: String, category: MessageCategory },
    /// Visual effect at a map cell
    Effect { name: &'static str, position: Position },
    Sound { name: &'static str, looped: bool },
    /// The world changed and should be redrawn
    Render,
}

/// Bounded FIFO of pending events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
