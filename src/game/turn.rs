//! Turn processing
//!
//! One turn: dead monsters are cleared out, every living monster plans and
//! carries out its action in array order, then the player's timers tick
//! and the visible set is refreshed.

use super::events::{GameEvent, MessageCategory};
use super::state::GameSession;
use crate::ai::{self, AiAction, AiEvent, Sense, Surroundings};
use crate::combat::AttackKind;
use crate::error::ActionError;

impl GameSession {
    /// Advance the world by one turn after a player action
    pub fn process_turn(&mut self) -> Result<(), ActionError> {
        if self.is_game_over() {
            return Err(ActionError::GameOver);
        }

        self.turn += 1;
        self.monsters.retain(|m| m.is_alive());
        self.run_monsters();

        if !self.is_game_over() {
            self.end_of_turn();
        }
        self.emit(GameEvent::Render);
        Ok(())
    }

    /// Let every monster take its turn
    fn run_monsters(&mut self) {
        for idx in 0..self.monsters.len() {
            if self.is_game_over() {
                break;
            }
            // Killed earlier this turn
            if !self.monsters[idx].is_alive() {
                continue;
            }

            let occupied = self.occupied_cells(Some(idx));
            let plan = {
                let view = Surroundings {
                    map: &self.map,
                    player_pos: self.player.position,
                    occupied: &occupied,
                    noise: self.noise,
                    settings: &self.config.ai,
                };
                ai::plan_turn(&mut self.monsters[idx], &view, &mut self.rng)
            };

            for event in &plan.events {
                self.report_ai_event(idx, *event);
            }
            self.execute_ai_action(idx, plan.action);
        }
    }

    fn execute_ai_action(&mut self, idx: usize, action: AiAction) {
        match action {
            AiAction::Skip | AiAction::Sleep | AiAction::Wait => {}
            AiAction::Move(to) => {
                self.monsters[idx].position = to;
            }
            AiAction::OpenDoor(at) => {
                if self.map.open_door(at.x, at.y) {
                    self.sound("door_open");
                    if self.map.is_visible(at.x, at.y) {
                        let name = self.monsters[idx].name.clone();
                        self.add_message(format!("The {} opens a door.", name), MessageCategory::System);
                    }
                }
            }
            AiAction::Attack => {
                self.monster_attacks_player(idx, AttackKind::Melee);
            }
        }
    }

    /// Turn AI state changes the player can see into log messages
    fn report_ai_event(&mut self, idx: usize, event: AiEvent) {
        let monster = &self.monsters[idx];
        log::debug!("{} [{:?}]: {:?}", monster.name, monster.id, event);
        if !self.map.is_visible(monster.position.x, monster.position.y) {
            return;
        }

        let name = monster.name.clone();
        let text = match event {
            AiEvent::Woke => format!("The {} wakes up.", name),
            AiEvent::Noticed(Sense::Sight) => format!("The {} spots you!", name),
            AiEvent::Noticed(Sense::Sound) => format!("The {} hears you.", name),
            AiEvent::StartedFleeing => format!("The {} turns to flee!", name),
            AiEvent::StoppedFleeing => format!("The {} regains its courage.", name),
            AiEvent::Healed(_) | AiEvent::HeardNoise(_) | AiEvent::LostTrack => return,
        };
        let category = match event {
            AiEvent::Noticed(_) => MessageCategory::Warning,
            _ => MessageCategory::Combat,
        };
        self.add_message(text, category);
    }

    /// Player-side bookkeeping once the monsters are done
    fn end_of_turn(&mut self) {
        self.player.skills.tick();
        self.player.regenerate_energy();
        self.tick_meditation();
        self.noise = None;
        self.refresh_visibility();
    }

    fn tick_meditation(&mut self) {
        let Some(mut meditation) = self.player.meditation.take() else {
            return;
        };

        if meditation.interrupted {
            self.add_message("Your meditation is broken!", MessageCategory::Warning);
            return;
        }

        let healed = self.player.health.heal(meditation.heal_per_turn);
        if healed > 0 {
            self.effect("heal", self.player.position);
        }
        meditation.turns_remaining = meditation.turns_remaining.saturating_sub(1);
        if meditation.turns_remaining == 0 {
            self.add_message("You finish meditating.", MessageCategory::System);
        } else {
            self.player.meditation = Some(meditation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Meditation, Position};
    use crate::game::state::tests::{add_monster, arena};
    use crate::game::GameState;

    #[test]
    fn test_turn_counter_and_render() {
        let mut session = arena();
        session.process_turn().unwrap();
        assert_eq!(session.turn(), 1);
        assert!(session.drain_events().contains(&GameEvent::Render));
    }

    #[test]
    fn test_dead_monsters_removed_at_turn_start() {
        let mut session = arena();
        let dead = add_monster(&mut session, Position::new(15, 9));
        add_monster(&mut session, Position::new(16, 2));
        session.monsters[dead].health.current = 0;
        session.process_turn().unwrap();
        assert_eq!(session.monsters().len(), 1);
        assert!(session.monsters().iter().all(|m| m.is_alive()));
    }

    #[test]
    fn test_game_over_refuses_turns() {
        let mut session = arena();
        session.player.health.current = 0;
        session.game_over();
        assert!(matches!(session.state(), GameState::GameOver { floor_reached: 1, .. }));
        assert_eq!(session.process_turn(), Err(ActionError::GameOver));
        assert_eq!(session.turn(), 0);
    }

    #[test]
    fn test_cooldowns_and_energy_tick() {
        let mut session = arena();
        session.player.learned.push(crate::progression::SkillId::PowerStrike);
        session.player.skills.assign(1, crate::progression::SkillId::PowerStrike).unwrap();
        session.player.skills.start_cooldown(1);
        session.player.ranged.energy = 0;
        session.process_turn().unwrap();
        assert_eq!(session.player.skills.get(1).unwrap().remaining_cooldown, 3);
        assert_eq!(session.player.ranged.energy, session.player.derived.ranged.energy_regen);
    }

    #[test]
    fn test_meditation_heals_and_breaks() {
        let mut session = arena();
        session.player.health.current = 5;
        session.player.meditation = Some(Meditation {
            turns_remaining: 2,
            heal_per_turn: 3,
            interrupted: false,
        });
        session.process_turn().unwrap();
        assert_eq!(session.player.health.current, 8);
        assert!(session.player.is_meditating());

        session.player.meditation.as_mut().unwrap().interrupted = true;
        session.process_turn().unwrap();
        assert_eq!(session.player.health.current, 8);
        assert!(!session.player.is_meditating());
    }

    #[test]
    fn test_meditation_runs_out() {
        let mut session = arena();
        session.player.health.current = 5;
        session.player.meditation = Some(Meditation {
            turns_remaining: 1,
            heal_per_turn: 2,
            interrupted: false,
        });
        session.process_turn().unwrap();
        assert_eq!(session.player.health.current, 7);
        assert!(!session.player.is_meditating());
    }

    #[test]
    fn test_adjacent_monster_attacks() {
        let mut session = arena();
        let idx = add_monster(&mut session, Position::new(6, 5));
        session.monsters[idx].has_spotted_player = true;
        let before = session.player.health.current;
        for _ in 0..30 {
            if session.is_game_over() {
                break;
            }
            session.player.health.current = before;
            session.process_turn().unwrap();
        }
        // the noise of the fight lingers only for the turn it happened in
        assert_eq!(session.noise(), None);
        assert!(session
            .messages()
            .iter()
            .any(|m| m.category == MessageCategory::Combat));
    }
}
