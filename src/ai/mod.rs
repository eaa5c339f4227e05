//! Monster AI
//!
//! Each monster plans one action per turn and the session carries it out,
//! the same collect-then-execute split used for every monster in a turn.
//! Planning updates the monster's own AI state (healing, waking, tracking,
//! fleeing); executing the action touches the map and the player.
//!
//! Per-turn order:
//! 1. A monster that already acted this turn skips and clears the flag.
//! 2. Natural healing, which may end a flight.
//! 3. Sleepers roll to wake and do nothing else.
//! 4. Low HP starts a flight, which sticks until healed above the threshold.
//! 5. Senses refresh the tracking target.
//! 6. Flee, attack, pursue, or wander.

pub mod perception;
pub mod movement;

use std::collections::HashSet;

use crate::combat::{formulas, Dice};
use crate::data::AiSettings;
use crate::entities::{Monster, Position};
use crate::world::{has_line_of_sight, Map};

pub use perception::Sense;

/// What a monster does with its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiAction {
    /// Turn already spent earlier this round
    Skip,
    Sleep,
    Wait,
    Move(Position),
    /// Spend the turn opening the door at this cell
    OpenDoor(Position),
    /// Melee the player
    Attack,
}

/// Noteworthy state changes during planning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiEvent {
    Healed(i32),
    Woke,
    Noticed(Sense),
    HeardNoise(Position),
    LostTrack,
    StartedFleeing,
    StoppedFleeing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    pub action: AiAction,
    pub events: Vec<AiEvent>,
}

impl TurnPlan {
    fn new(action: AiAction, events: Vec<AiEvent>) -> Self {
        Self { action, events }
    }
}

/// Read-only view of the world from one monster's point of view
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub map: &'a Map,
    pub player_pos: Position,
    /// Cells held by other living monsters
    pub occupied: &'a HashSet<Position>,
    /// Where combat happened this turn, if anywhere
    pub noise: Option<Position>,
    pub settings: &'a AiSettings,
}

/// Plan a monster's turn, updating its AI state on the way
pub fn plan_turn<D: Dice + ?Sized>(monster: &mut Monster, view: &Surroundings, dice: &mut D) -> TurnPlan {
    if monster.has_acted_this_turn {
        monster.has_acted_this_turn = false;
        return TurnPlan::new(AiAction::Skip, Vec::new());
    }

    let mut events = Vec::new();

    if let Some(healed) = natural_heal(monster, dice) {
        events.push(AiEvent::Healed(healed));
    }
    if monster.has_started_fleeing && !monster.should_flee() {
        monster.has_started_fleeing = false;
        events.push(AiEvent::StoppedFleeing);
    }

    if monster.is_sleeping {
        let woke = perception::roll_wake(
            monster.position,
            monster.derived.perception,
            view.player_pos,
            view.noise,
            view.settings.adjacent_wake_chance,
            dice,
        );
        return match woke {
            Some(source) => {
                monster.alert(source, view.settings.tracking_turns);
                events.push(AiEvent::Woke);
                TurnPlan::new(AiAction::Wait, events)
            }
            None => TurnPlan::new(AiAction::Sleep, events),
        };
    }

    if !monster.has_started_fleeing && monster.should_flee() {
        monster.has_started_fleeing = true;
        events.push(AiEvent::StartedFleeing);
    }

    perceive(monster, view, &mut events);

    let action = choose_action(monster, view, dice);
    log::debug!("{} ({:?}) plans {:?}", monster.name, monster.ai_state(), action);
    TurnPlan::new(action, events)
}

/// Roll for natural regeneration. Only wounded monsters roll.
fn natural_heal<D: Dice + ?Sized>(monster: &mut Monster, dice: &mut D) -> Option<i32> {
    if monster.health.is_full() || !dice.chance(formulas::heal_chance(&monster.stats)) {
        return None;
    }
    let amount = formulas::heal_dice(&monster.stats).roll(dice);
    let healed = monster.health.heal(amount);
    (healed > 0).then_some(healed)
}

fn perceive(monster: &mut Monster, view: &Surroundings, events: &mut Vec<AiEvent>) {
    let position = monster.position;
    let perception = monster.derived.perception;

    if let Some(sense) = perception::detect(view.map, position, view.player_pos, perception) {
        if !monster.has_spotted_player {
            events.push(AiEvent::Noticed(sense));
        }
        monster.has_spotted_player = true;
        monster.last_known_target_pos = Some(view.player_pos);
        monster.tracking_turns_remaining = view.settings.tracking_turns;
        return;
    }

    monster.has_spotted_player = false;
    if let Some(noise) = view.noise {
        if perception::can_hear(view.map, position, noise, perception) {
            monster.alert(noise, view.settings.tracking_turns);
            events.push(AiEvent::HeardNoise(noise));
            return;
        }
    }

    if monster.tracking_turns_remaining > 0 {
        monster.tracking_turns_remaining -= 1;
        if monster.tracking_turns_remaining == 0 {
            monster.last_known_target_pos = None;
            events.push(AiEvent::LostTrack);
        }
    }
}

fn choose_action<D: Dice + ?Sized>(monster: &Monster, view: &Surroundings, dice: &mut D) -> AiAction {
    let position = monster.position;
    let in_reach = position.is_adjacent(&view.player_pos) && has_line_of_sight(view.map, position, view.player_pos);

    if monster.has_started_fleeing {
        return match movement::flee_step(view, position, view.player_pos) {
            Some(step) => AiAction::Move(step),
            None if in_reach => AiAction::Attack,
            None => AiAction::Wait,
        };
    }

    if in_reach && monster.has_spotted_player {
        return AiAction::Attack;
    }

    if let Some(target) = monster.last_known_target_pos {
        return match movement::chase_step(view, position, target) {
            Some(step) if view.map.is_closed_door(step.x, step.y) => AiAction::OpenDoor(step),
            Some(step) => AiAction::Move(step),
            None => AiAction::Wait,
        };
    }

    if dice.chance(view.settings.wander_chance) {
        if let Some(step) = movement::wander_step(view, position, dice) {
            return AiAction::Move(step);
        }
    }
    AiAction::Wait
}
