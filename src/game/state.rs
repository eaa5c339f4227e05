//! Game session
//!
//! One [`GameSession`] owns every piece of mutable state for a run: the
//! floor, the player, the monsters, the RNG and the outgoing event queue.
//! Nothing lives in globals.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::events::{EventQueue, GameEvent, LogMessage, MessageCategory, MAX_LOG_MESSAGES};
use crate::data::{DataManager, GameConfig, MonsterTemplates};
use crate::entities::{spawn_monsters_for_floor, IdAllocator, Monster, MonsterId, Player, Position};
use crate::progression::{danger_for_floor, SkillRegistry};
use crate::world::{generate, update_visibility, vision_radius, visible_tiles, visible_tiles_soft, Map};

/// Coarse session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    /// The player died. Turns are refused until the session is reset.
    GameOver { floor_reached: u32, turn: u64 },
}

/// The whole simulation for one run
pub struct GameSession {
    pub(crate) state: GameState,
    pub(crate) config: GameConfig,
    pub(crate) templates: MonsterTemplates,
    pub(crate) skills: SkillRegistry,
    pub(crate) map: Map,
    pub(crate) player: Player,
    /// Monsters act in this order. Dead ones linger until the next turn.
    pub(crate) monsters: Vec<Monster>,
    pub(crate) rng: StdRng,
    pub(crate) seed: u64,
    pub(crate) floor: u32,
    pub(crate) danger_level: u32,
    pub(crate) turn: u64,
    pub(crate) ids: IdAllocator,
    /// Where combat happened this turn
    pub(crate) noise: Option<Position>,
    pub(crate) events: EventQueue,
    pub(crate) messages: Vec<LogMessage>,
}

impl GameSession {
    /// Start a run on floor 1
    pub fn new(seed: u64, data: DataManager) -> Self {
        let DataManager { config, monsters } = data;
        let player_settings = config.player.clone();
        let mut player = Player::new(player_settings.name, Position::default(), player_settings.stats);
        player.codex_points = player_settings.starting_codex_points;

        let danger_level = danger_for_floor(1, config.base_danger);
        let mut session = Self {
            state: GameState::Playing,
            map: Map::new(config.map.width, config.map.height, 1, danger_level),
            config,
            templates: monsters,
            skills: SkillRegistry::with_defaults(),
            player,
            monsters: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            floor: 1,
            danger_level,
            turn: 0,
            ids: IdAllocator::default(),
            noise: None,
            events: EventQueue::new(),
            messages: Vec::new(),
        };

        session.generate_floor();
        session.add_message("You descend into the gloom...", MessageCategory::System);
        log::info!("New run with seed {}", seed);
        session
    }

    /// Start a run with built-in data
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(seed, DataManager::default())
    }

    /// Throw the run away and start over with the same data
    pub fn reset(&mut self, seed: u64) {
        let data = DataManager {
            config: self.config.clone(),
            monsters: self.templates.clone(),
        };
        *self = Self::new(seed, data);
    }

    /// Build the current floor's map and monsters and put the player on the
    /// start cell
    pub(crate) fn generate_floor(&mut self) {
        self.map = generate(&self.config.map, self.floor, self.danger_level, &mut self.rng);
        self.monsters = spawn_monsters_for_floor(&self.map, &self.templates, &mut self.ids, &mut self.rng);
        self.player.position = self.map.start_pos;
        self.noise = None;
        self.refresh_visibility();
        self.emit(GameEvent::Render);
        log::info!(
            "Generated floor {} (danger {}, {} monsters)",
            self.floor,
            self.danger_level,
            self.monsters.len()
        );
    }

    /// Recompute the visible set from the player's position
    pub fn refresh_visibility(&mut self) {
        let radius = vision_radius(&self.map, self.player.position, self.config.vision.corridor_radius);
        let visible = if self.config.vision.soft_edge {
            visible_tiles_soft(&self.map, self.player.position, radius, &mut self.rng)
        } else {
            visible_tiles(&self.map, self.player.position, radius)
        };
        update_visibility(&mut self.map, &visible);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.state, GameState::GameOver { .. })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn living_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(|m| m.is_alive())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn danger_level(&self) -> u32 {
        self.danger_level
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Position of this turn's combat noise
    pub fn noise(&self) -> Option<Position> {
        self.noise
    }

    // ========================================================================
    // Messages and events
    // ========================================================================

    pub fn messages(&self) -> &[LogMessage] {
        &self.messages
    }

    /// Add a message to the log and queue it for the front end
    pub fn add_message(&mut self, text: impl Into<String>, category: MessageCategory) {
        let text = text.into();
        self.messages.push(LogMessage {
            text: text.clone(),
            turn: self.turn,
            category,
        });
        if self.messages.len() > MAX_LOG_MESSAGES {
            self.messages.remove(0);
        }
        self.events.push(GameEvent::Message { text, category });
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn effect(&mut self, name: &'static str, position: Position) {
        self.emit(GameEvent::Effect { name, position });
    }

    pub fn sound(&mut self, name: &'static str) {
        self.emit(GameEvent::Sound { name, looped: false });
    }

    /// Hand every pending event to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    // ========================================================================
    // Monster queries
    // ========================================================================

    /// Index of the living monster standing on `pos`
    pub fn monster_index_at(&self, pos: Position) -> Option<usize> {
        self.monsters
            .iter()
            .position(|m| m.is_alive() && m.position == pos)
    }

    pub fn monster_index(&self, id: MonsterId) -> Option<usize> {
        self.monsters.iter().position(|m| m.id == id)
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    /// Cells held by living monsters, optionally leaving one out
    pub fn occupied_cells(&self, except: Option<usize>) -> HashSet<Position> {
        self.monsters
            .iter()
            .enumerate()
            .filter(|(idx, m)| Some(*idx) != except && m.is_alive())
            .map(|(_, m)| m.position)
            .collect()
    }

    /// Living monsters next to a cell
    pub fn monsters_adjacent_to(&self, pos: Position) -> u32 {
        self.living_monsters()
            .filter(|m| m.position.is_adjacent(&pos))
            .count() as u32
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        pos == self.player.position || self.monster_index_at(pos).is_some()
    }

    pub(crate) fn game_over(&mut self) {
        if self.is_game_over() {
            return;
        }
        self.state = GameState::GameOver {
            floor_reached: self.floor,
            turn: self.turn,
        };
        self.player.deactivate_ranged();
        self.player.meditation = None;
        self.add_message(
            format!("You have died on floor {} after {} turns.", self.floor, self.turn),
            MessageCategory::Warning,
        );
        self.sound("death");
        log::info!("Game over on floor {} at turn {}", self.floor, self.turn);
    }
}
