//! Skill effects
//!
//! What each skill does when used. Effects are plain functions registered
//! per [`SkillId`] in a [`SkillRegistry`] the session builds at startup; the
//! caller handles cooldowns and turn processing based on the returned
//! [`SkillOutcome`].

use std::collections::HashMap;

use super::skills::{SkillId, CHARGE_STRIKE, MEDITATION_TURNS, POWER_STRIKE, PRECISE_STRIKE, QUICK_SHOT};
use crate::combat::formulas;
use crate::entities::{Meditation, Position};
use crate::error::ActionError;
use crate::game::{GameSession, MessageCategory};
use crate::world::fov::bresenham_line;
use crate::world::has_line_of_sight;

/// How a skill use went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillOutcome {
    /// Nothing happened: no cooldown, no turn
    NotConsumed,
    /// Cooldown starts; a full turn follows unless the skill is free
    Consumed,
    /// Cooldown starts; the effect already advanced the world
    ConsumedSkipTurn,
}

impl SkillOutcome {
    pub fn is_consumed(&self) -> bool {
        !matches!(self, SkillOutcome::NotConsumed)
    }
}

/// Applies a skill. An `Err` refuses the use the same way `NotConsumed`
/// does, with a reason attached.
pub type SkillEffect = fn(&mut GameSession, Option<Position>) -> Result<SkillOutcome, ActionError>;

/// Skill id to effect table
#[derive(Clone, Default)]
pub struct SkillRegistry {
    effects: HashMap<SkillId, SkillEffect>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in skill
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SkillId::PowerStrike, power_strike);
        registry.register(SkillId::PreciseStrike, precise_strike);
        registry.register(SkillId::QuickShot, quick_shot);
        registry.register(SkillId::Focus, focus);
        registry.register(SkillId::Jump, jump);
        registry.register(SkillId::Meditation, meditation);
        registry.register(SkillId::Charge, charge);
        registry
    }

    pub fn register(&mut self, id: SkillId, effect: SkillEffect) {
        self.effects.insert(id, effect);
    }

    pub fn get(&self, id: SkillId) -> Option<SkillEffect> {
        self.effects.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

// ============================================================================
// Attack modifiers
// ============================================================================

fn power_strike(session: &mut GameSession, _: Option<Position>) -> Result<SkillOutcome, ActionError> {
    session.player.queue_modifier(POWER_STRIKE);
    session.add_message("You gather your strength.", MessageCategory::System);
    Ok(SkillOutcome::Consumed)
}

fn precise_strike(session: &mut GameSession, _: Option<Position>) -> Result<SkillOutcome, ActionError> {
    session.player.queue_modifier(PRECISE_STRIKE);
    session.add_message("You study your foe's guard.", MessageCategory::System);
    Ok(SkillOutcome::Consumed)
}

fn quick_shot(session: &mut GameSession, _: Option<Position>) -> Result<SkillOutcome, ActionError> {
    session.player.queue_modifier(QUICK_SHOT);
    session.add_message("You ready a quick shot.", MessageCategory::System);
    Ok(SkillOutcome::Consumed)
}

// ============================================================================
// Self effects
// ============================================================================

fn focus(session: &mut GameSession, _: Option<Position>) -> Result<SkillOutcome, ActionError> {
    let max = session.player.derived.ranged.max_energy;
    let before = session.player.ranged.energy;
    if before >= max {
        session.add_message("Your energy is already full.", MessageCategory::System);
        return Ok(SkillOutcome::NotConsumed);
    }
    session.player.ranged.energy = (before + max / 2).min(max);
    let restored = session.player.ranged.energy - before;
    session.add_message(format!("You focus and recover {} energy.", restored), MessageCategory::System);
    Ok(SkillOutcome::Consumed)
}

fn meditation(session: &mut GameSession, _: Option<Position>) -> Result<SkillOutcome, ActionError> {
    if session.player.is_meditating() {
        return Ok(SkillOutcome::NotConsumed);
    }
    if session.player.health.is_full() {
        session.add_message("You are already at full health.", MessageCategory::System);
        return Ok(SkillOutcome::NotConsumed);
    }
    session.player.meditation = Some(Meditation {
        turns_remaining: MEDITATION_TURNS,
        heal_per_turn: formulas::meditation_heal(&session.player.stats),
        interrupted: false,
    });
    session.add_message("You sit down and meditate.", MessageCategory::System);
    Ok(SkillOutcome::Consumed)
}

// ============================================================================
// Movement
// ============================================================================

fn jump(session: &mut GameSession, target: Option<Position>) -> Result<SkillOutcome, ActionError> {
    let to = target.ok_or(ActionError::MissingTarget)?;
    let from = session.player.position;
    let range = formulas::jump_range(&session.player.stats);
    let distance = from.chebyshev_distance(&to);
    if distance > range {
        return Err(ActionError::OutOfRange { distance, range });
    }
    let landing_ok = to != from
        && session.map.is_walkable(to.x, to.y)
        && session.map.is_visible(to.x, to.y)
        && !session.is_occupied(to)
        && has_line_of_sight(&session.map, from, to);
    if !landing_ok {
        return Err(ActionError::InvalidTarget(to));
    }

    session.player.cancel_meditation();
    session.player.position = to;
    session.effect("jump", to);
    session.add_message("You leap across the floor.", MessageCategory::System);
    Ok(SkillOutcome::Consumed)
}

/// Cell the charger stops on: the last free cell of the straight line
/// before the target. Any blocked cell on the way fails the charge.
fn charge_destination(session: &GameSession, from: Position, to: Position) -> Result<Position, ActionError> {
    let line = bresenham_line(from, to);
    let mut destination = from;
    for cell in &line[1..line.len() - 1] {
        if !session.map.is_walkable(cell.x, cell.y) || session.is_occupied(*cell) {
            return Err(ActionError::Blocked(*cell));
        }
        destination = *cell;
    }
    Ok(destination)
}

fn charge(session: &mut GameSession, target: Option<Position>) -> Result<SkillOutcome, ActionError> {
    let to = target.ok_or(ActionError::MissingTarget)?;
    let idx = session.monster_index_at(to).ok_or(ActionError::InvalidTarget(to))?;
    if !session.map.is_visible(to.x, to.y) {
        return Err(ActionError::InvalidTarget(to));
    }
    let from = session.player.position;
    let range = formulas::charge_range(&session.player.stats);
    let distance = from.chebyshev_distance(&to);
    if distance > range {
        return Err(ActionError::OutOfRange { distance, range });
    }
    let destination = charge_destination(session, from, to)?;

    session.player.cancel_meditation();
    session.player.position = destination;
    session.effect("charge", destination);
    session.add_message("You charge!", MessageCategory::Combat);
    session.player.queue_modifier(CHARGE_STRIKE);
    session.player_attack_monster(idx);
    session.process_turn()?;
    Ok(SkillOutcome::ConsumedSkipTurn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::tests::{add_monster, arena};

    #[test]
    fn test_registry_covers_catalog() {
        let registry = SkillRegistry::with_defaults();
        for id in SkillId::ALL {
            assert!(registry.get(id).is_some(), "{:?} has no effect", id);
        }
        assert!(SkillRegistry::new().get(SkillId::Jump).is_none());
    }

    #[test]
    fn test_strike_queues_modifier() {
        let mut session = arena();
        assert_eq!(power_strike(&mut session, None), Ok(SkillOutcome::Consumed));
        assert_eq!(session.player.peek_modifiers(), POWER_STRIKE);
    }

    #[test]
    fn test_focus_restores_half() {
        let mut session = arena();
        let max = session.player.derived.ranged.max_energy;
        assert_eq!(focus(&mut session, None), Ok(SkillOutcome::NotConsumed));

        session.player.ranged.energy = 10;
        assert_eq!(focus(&mut session, None), Ok(SkillOutcome::Consumed));
        assert_eq!(session.player.ranged.energy, (10 + max / 2).min(max));
    }

    #[test]
    fn test_jump_checks_landing() {
        let mut session = arena();
        let range = formulas::jump_range(&session.player.stats);
        assert_eq!(jump(&mut session, None), Err(ActionError::MissingTarget));

        let too_far = Position::new(5 + range + 1, 5);
        assert_eq!(
            jump(&mut session, Some(too_far)),
            Err(ActionError::OutOfRange {
                distance: range + 1,
                range
            })
        );

        add_monster(&mut session, Position::new(7, 5));
        assert_eq!(
            jump(&mut session, Some(Position::new(7, 5))),
            Err(ActionError::InvalidTarget(Position::new(7, 5)))
        );
        assert_eq!(session.player.position, Position::new(5, 5));

        assert_eq!(jump(&mut session, Some(Position::new(5, 7))), Ok(SkillOutcome::Consumed));
        assert_eq!(session.player.position, Position::new(5, 7));
    }

    #[test]
    fn test_meditation_starts() {
        let mut session = arena();
        assert_eq!(meditation(&mut session, None), Ok(SkillOutcome::NotConsumed));
        session.player.health.current -= 5;
        assert_eq!(meditation(&mut session, None), Ok(SkillOutcome::Consumed));
        let state = session.player.meditation.unwrap();
        assert_eq!(state.turns_remaining, MEDITATION_TURNS);
        assert_eq!(state.heal_per_turn, formulas::meditation_heal(&session.player.stats));
        assert_eq!(meditation(&mut session, None), Ok(SkillOutcome::NotConsumed));
    }

    #[test]
    fn test_charge_moves_strikes_and_advances() {
        let mut session = arena();
        add_monster(&mut session, Position::new(9, 5));
        assert_eq!(charge(&mut session, Some(Position::new(9, 5))), Ok(SkillOutcome::ConsumedSkipTurn));
        assert_eq!(session.player.position, Position::new(8, 5));
        assert_eq!(session.turn(), 1);
        assert!(session.player.pending_modifiers.is_empty());
        assert_eq!(session.noise(), None);
        assert!(session.messages().iter().any(|m| m.text == "You charge!"));
    }

    #[test]
    fn test_charge_blocked_line() {
        let mut session = arena();
        add_monster(&mut session, Position::new(9, 5));
        add_monster(&mut session, Position::new(7, 5));
        assert_eq!(
            charge(&mut session, Some(Position::new(9, 5))),
            Err(ActionError::Blocked(Position::new(7, 5)))
        );
        assert_eq!(session.player.position, Position::new(5, 5));
        assert_eq!(session.turn(), 0);
    }
}
