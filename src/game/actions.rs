//! Player actions
//!
//! Every command the player can issue. A refused action returns an
//! [`ActionError`], logs a warning and leaves the session untouched; an
//! accepted one reports what happened and, unless it is free, advances the
//! world by one turn.

use super::combat::ShotOutcome;
use super::events::MessageCategory;
use super::state::GameSession;
use crate::combat::{AttackKind, AttackResult};
use crate::entities::{MonsterId, Position};
use crate::error::ActionError;
use crate::progression::{danger_for_floor, skill, SkillId, SkillOutcome};

/// What an accepted action did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionOutcome {
    Moved(Position),
    Attacked(AttackResult),
    OpenedDoor(Position),
    Waited,
    /// Ranged mode switched on (with its first target) or off
    RangedMode { active: bool, target: Option<MonsterId> },
    Fired { victim: MonsterId, result: AttackResult },
    /// A large body stopped the shot; nothing was spent
    ShotBlocked(MonsterId),
    SkillUsed { skill: SkillId, outcome: SkillOutcome },
    SkillLearned { skill: SkillId, slot: u8 },
    SkillAssigned { skill: SkillId, slot: u8 },
    Descended(u32),
    /// The player died before the action could finish
    Died,
}

impl GameSession {
    fn refuse<T>(&self, action: &str, err: ActionError) -> Result<T, ActionError> {
        log::warn!("{} refused: {}", action, err);
        Err(err)
    }

    fn ensure_playing(&self, action: &str) -> Result<(), ActionError> {
        if self.is_game_over() {
            return self.refuse(action, ActionError::GameOver);
        }
        Ok(())
    }

    /// Spend a turn if the player is still alive after acting
    fn finish_turn(&mut self, outcome: ActionOutcome) -> Result<ActionOutcome, ActionError> {
        if self.is_game_over() {
            return Ok(ActionOutcome::Died);
        }
        self.process_turn()?;
        if self.is_game_over() {
            return Ok(ActionOutcome::Died);
        }
        Ok(outcome)
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Step one cell. Bumping a monster attacks it and bumping a closed
    /// door opens it.
    pub fn move_player(&mut self, dx: i32, dy: i32) -> Result<ActionOutcome, ActionError> {
        self.ensure_playing("move")?;
        if dx.abs() > 1 || dy.abs() > 1 || (dx == 0 && dy == 0) {
            return self.refuse("move", ActionError::Refused("invalid direction"));
        }

        let from = self.player.position;
        let to = from.offset(dx, dy);

        if let Some(idx) = self.monster_index_at(to) {
            self.stop_meditating();
            let result = self.player_attack_monster(idx);
            return self.finish_turn(ActionOutcome::Attacked(result));
        }

        if self.map.is_closed_door(to.x, to.y) {
            self.stop_meditating();
            self.map.open_door(to.x, to.y);
            self.sound("door_open");
            self.add_message("You open the door.", MessageCategory::System);
            return self.finish_turn(ActionOutcome::OpenedDoor(to));
        }

        if !self.map.is_walkable(to.x, to.y) {
            return self.refuse("move", ActionError::Blocked(to));
        }

        self.stop_meditating();
        self.opportunity_attacks(from, to);
        if self.is_game_over() {
            return Ok(ActionOutcome::Died);
        }
        self.player.position = to;
        if self.map.stairs_pos == Some(to) {
            self.add_message("There are stairs leading down here.", MessageCategory::System);
        }
        self.finish_turn(ActionOutcome::Moved(to))
    }

    fn stop_meditating(&mut self) {
        if self.player.cancel_meditation() {
            self.add_message("You stop meditating.", MessageCategory::System);
        }
    }

    /// Awake monsters faster than the player get a free swing when the
    /// player steps out of their reach
    fn opportunity_attacks(&mut self, from: Position, to: Position) {
        let speed = self.player.derived.speed_tier;
        let attackers: Vec<usize> = self
            .monsters
            .iter()
            .enumerate()
            .filter(|(_, m)| {
                m.is_alive()
                    && !m.is_sleeping
                    && m.position.is_adjacent(&from)
                    && !m.position.is_adjacent(&to)
                    && m.derived.speed_tier > speed
            })
            .map(|(idx, _)| idx)
            .collect();

        for idx in attackers {
            self.monster_attacks_player(idx, AttackKind::Opportunity);
            if self.is_game_over() {
                return;
            }
        }
    }

    pub fn wait(&mut self) -> Result<ActionOutcome, ActionError> {
        self.ensure_playing("wait")?;
        self.finish_turn(ActionOutcome::Waited)
    }

    /// Take the stairs down. The player keeps everything; the floor,
    /// monsters and ranged mode are reset.
    pub fn descend(&mut self) -> Result<ActionOutcome, ActionError> {
        self.ensure_playing("descend")?;
        if self.map.stairs_pos != Some(self.player.position) {
            return self.refuse("descend", ActionError::NoStairs);
        }

        self.floor += 1;
        self.danger_level = danger_for_floor(self.floor, self.config.base_danger);
        self.player.deactivate_ranged();
        self.player.meditation = None;
        self.player.pending_modifiers.clear();
        self.generate_floor();
        self.add_message(format!("You descend to floor {}...", self.floor), MessageCategory::System);
        self.sound("descend");
        Ok(ActionOutcome::Descended(self.floor))
    }

    // ========================================================================
    // Ranged combat
    // ========================================================================

    /// Switch ranged mode. Turning it on needs energy for one shot and a
    /// target in range. Free action.
    pub fn toggle_ranged_mode(&mut self) -> Result<ActionOutcome, ActionError> {
        self.ensure_playing("toggle ranged")?;
        if self.player.ranged.active {
            self.player.deactivate_ranged();
            self.add_message("You lower your bow.", MessageCategory::System);
            return Ok(ActionOutcome::RangedMode {
                active: false,
                target: None,
            });
        }

        if !self.player.has_energy_for_shot() {
            let err = ActionError::InsufficientEnergy {
                available: self.player.ranged.energy,
                required: self.player.derived.ranged.energy_cost,
            };
            return self.refuse("toggle ranged", err);
        }
        let Some(target) = self.nearest_ranged_target() else {
            return self.refuse("toggle ranged", ActionError::NoTargetInRange);
        };

        self.player.ranged.active = true;
        self.player.ranged.target = Some(target);
        self.add_message("You ready your bow.", MessageCategory::System);
        Ok(ActionOutcome::RangedMode {
            active: true,
            target: Some(target),
        })
    }

    /// Shoot at the monster on `aim`, or at the current target
    pub fn fire(&mut self, aim: Option<Position>) -> Result<ActionOutcome, ActionError> {
        self.ensure_playing("fire")?;
        if !self.player.ranged.active {
            return self.refuse("fire", ActionError::RangedModeInactive);
        }
        if !self.player.has_energy_for_shot() {
            let err = ActionError::InsufficientEnergy {
                available: self.player.ranged.energy,
                required: self.player.derived.ranged.energy_cost,
            };
            self.player.deactivate_ranged();
            self.add_message("You are too exhausted to shoot.", MessageCategory::Warning);
            return self.refuse("fire", err);
        }
        let target_idx = match self.ranged_target_index(aim) {
            Ok(idx) => idx,
            Err(err) => {
                if aim.is_none() {
                    self.player.deactivate_ranged();
                }
                return self.refuse("fire", err);
            }
        };

        self.player.ranged.target = Some(self.monsters[target_idx].id);
        match self.resolve_shot(target_idx) {
            ShotOutcome::Blocked(blocker) => Ok(ActionOutcome::ShotBlocked(blocker)),
            ShotOutcome::PlayerDied => Ok(ActionOutcome::Died),
            ShotOutcome::Resolved { victim, result } => {
                self.stop_meditating();
                self.refresh_ranged_mode();
                self.finish_turn(ActionOutcome::Fired { victim, result })
            }
        }
    }

    // ========================================================================
    // Skills
    // ========================================================================

    /// Use the skill in `slot`. Refused or unconsumed uses cost nothing.
    pub fn use_skill(&mut self, slot: u8, target: Option<Position>) -> Result<ActionOutcome, ActionError> {
        self.ensure_playing("use skill")?;
        let entry = match self.player.skills.get(slot) {
            Ok(entry) => *entry,
            Err(err) => return self.refuse("use skill", err),
        };
        if entry.remaining_cooldown > 0 {
            let err = ActionError::OnCooldown {
                skill: entry.skill,
                turns: entry.remaining_cooldown,
            };
            return self.refuse("use skill", err);
        }
        let record = skill(entry.skill);
        if record.requires_target && target.is_none() {
            return self.refuse("use skill", ActionError::MissingTarget);
        }
        let Some(effect) = self.skills.get(entry.skill) else {
            return self.refuse("use skill", ActionError::UnknownSkill(entry.skill));
        };

        let outcome = match effect(self, target) {
            Ok(outcome) => outcome,
            Err(err) => return self.refuse("use skill", err),
        };
        let used = ActionOutcome::SkillUsed {
            skill: entry.skill,
            outcome,
        };
        log::debug!("{} -> {:?}", record.name, outcome);

        if !outcome.is_consumed() {
            return Ok(used);
        }
        self.player.skills.start_cooldown(slot);
        match outcome {
            SkillOutcome::ConsumedSkipTurn if self.is_game_over() => Ok(ActionOutcome::Died),
            SkillOutcome::Consumed if !record.is_free_action => self.finish_turn(used),
            _ => Ok(used),
        }
    }

    /// Spend codex points on a skill and put it in `slot`. Free action.
    pub fn learn_skill(&mut self, id: SkillId, slot: u8) -> Result<ActionOutcome, ActionError> {
        self.ensure_playing("learn skill")?;
        if self.player.has_learned(id) {
            return self.refuse("learn skill", ActionError::AlreadyLearned(id));
        }
        let cost = skill(id).cost;
        if self.player.codex_points < cost {
            let err = ActionError::InsufficientCodexPoints {
                available: self.player.codex_points,
                required: cost,
            };
            return self.refuse("learn skill", err);
        }
        if let Err(err) = self.player.skills.assign(slot, id) {
            return self.refuse("learn skill", err);
        }

        self.player.codex_points -= cost;
        self.player.learned.push(id);
        self.add_message(format!("You learn {}.", skill(id).name), MessageCategory::System);
        Ok(ActionOutcome::SkillLearned { skill: id, slot })
    }

    /// Move a learned skill to another slot. Free action.
    pub fn assign_skill(&mut self, id: SkillId, slot: u8) -> Result<ActionOutcome, ActionError> {
        self.ensure_playing("assign skill")?;
        if !self.player.has_learned(id) {
            return self.refuse("assign skill", ActionError::NotLearned(id));
        }
        if let Err(err) = self.player.skills.assign(slot, id) {
            return self.refuse("assign skill", err);
        }
        Ok(ActionOutcome::SkillAssigned { skill: id, slot })
    }
}
