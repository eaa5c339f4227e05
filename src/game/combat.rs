//! Combat inside a session
//!
//! Wires the pure resolution functions to the session: surround counts,
//! combat noise, log messages, death handling, and the ranged pipeline
//! (energy, interference, point-blank initiative, retargeting).

use super::events::MessageCategory;
use super::state::GameSession;
use crate::combat::{
    defender_strikes_first, find_interference, in_range, pick_victim, resolve_combat_action, AttackKind,
    AttackResult, CombatContext, Interference,
};
use crate::entities::{MonsterId, Position};
use crate::error::ActionError;
use crate::world::has_line_of_sight;

/// What came of one ranged shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    /// A large body stood in the way. No energy is spent.
    Blocked(MonsterId),
    Resolved { victim: MonsterId, result: AttackResult },
    /// The target struck first at point-blank range and killed the player
    PlayerDied,
}

impl GameSession {
    // ========================================================================
    // Melee
    // ========================================================================

    /// The player strikes the monster at `idx`
    pub(crate) fn player_attack_monster(&mut self, idx: usize) -> AttackResult {
        let target_pos = self.monsters[idx].position;
        let context = CombatContext::melee().with_surroundings(self.monsters_adjacent_to(self.player.position), 0);
        let result = resolve_combat_action(&mut self.player, &mut self.monsters[idx], &context, &mut self.rng);
        self.noise = Some(target_pos);

        let name = self.monsters[idx].name.clone();
        let text = if result.evaded {
            format!("The {} dodges your attack.", name)
        } else if !result.hit {
            format!("You miss the {}.", name)
        } else if result.critical {
            format!("Critical hit! You strike the {} for {} damage.", name, result.damage)
        } else {
            format!("You hit the {} for {} damage.", name, result.damage)
        };
        self.add_message(text, MessageCategory::Combat);
        self.hit_feedback(&result, target_pos);

        if result.killed {
            self.handle_monster_death(idx);
        }
        result
    }

    /// The monster at `idx` strikes the player. Melee and opportunity
    /// attacks only; monsters do not shoot.
    pub(crate) fn monster_attacks_player(&mut self, idx: usize, kind: AttackKind) -> AttackResult {
        let player_pos = self.player.position;
        // The attacker counts itself among the bodies around the player
        let context = CombatContext::new(kind).with_surroundings(1, self.monsters_adjacent_to(player_pos));
        let result = resolve_combat_action(&mut self.monsters[idx], &mut self.player, &context, &mut self.rng);
        self.noise = Some(player_pos);

        let name = self.monsters[idx].name.clone();
        let prefix = if kind == AttackKind::Opportunity {
            format!("As you step away, the {}", name)
        } else {
            format!("The {}", name)
        };
        let text = if result.evaded {
            format!("You dodge the {}'s attack.", name)
        } else if !result.hit {
            format!("{} misses you.", prefix)
        } else if result.critical {
            format!("{} lands a critical hit for {} damage!", prefix, result.damage)
        } else {
            format!("{} hits you for {} damage.", prefix, result.damage)
        };
        self.add_message(text, MessageCategory::Combat);
        self.hit_feedback(&result, player_pos);

        if result.killed {
            self.game_over();
        }
        result
    }

    fn hit_feedback(&mut self, result: &AttackResult, at: Position) {
        if !result.hit {
            self.sound("miss");
            return;
        }
        if result.critical {
            self.effect("critical", at);
            self.sound("critical");
        } else {
            self.effect("hit", at);
            self.sound("hit");
        }
    }

    /// Award experience and codex points for a kill. The body stays in the
    /// monster list until the next turn starts.
    pub(crate) fn handle_monster_death(&mut self, idx: usize) {
        let (id, name, xp, codex, pos) = {
            let m = &self.monsters[idx];
            (m.id, m.name.clone(), m.xp_value, m.codex_value, m.position)
        };

        self.add_message(format!("The {} dies.", name), MessageCategory::Combat);
        self.effect("death", pos);
        if self.player.ranged.target == Some(id) {
            self.player.ranged.target = None;
        }

        let levels = self.player.gain_experience(xp);
        self.player.codex_points += codex;
        log::info!("{} killed: +{} xp, +{} codex", name, xp, codex);
        if levels > 0 {
            self.add_message(
                format!("You reach level {}!", self.player.level()),
                MessageCategory::System,
            );
            self.sound("level_up");
        }
    }

    // ========================================================================
    // Ranged
    // ========================================================================

    /// Whether the monster at `idx` can be shot from where the player stands
    pub(crate) fn is_valid_ranged_target(&self, idx: usize) -> bool {
        let monster = &self.monsters[idx];
        let from = self.player.position;
        monster.is_alive()
            && self.map.is_visible(monster.position.x, monster.position.y)
            && in_range(from, monster.position, self.player.derived.ranged.range)
            && has_line_of_sight(&self.map, from, monster.position)
    }

    /// Closest valid ranged target, ties going to the earlier monster
    pub(crate) fn nearest_ranged_target(&self) -> Option<MonsterId> {
        let from = self.player.position;
        self.monsters
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.is_valid_ranged_target(*idx))
            .min_by_key(|(idx, m)| (m.position.distance_squared(&from), *idx))
            .map(|(_, m)| m.id)
    }

    /// One shot at the monster at `target_idx`: interference, initiative,
    /// resolution and death hand-off. Energy is checked by the caller.
    pub(crate) fn resolve_shot(&mut self, target_idx: usize) -> ShotOutcome {
        let from = self.player.position;
        let target_id = self.monsters[target_idx].id;
        let target_pos = self.monsters[target_idx].position;

        let bodies: Vec<_> = self
            .monsters
            .iter()
            .filter(|m| m.is_alive() && m.id != target_id)
            .map(|m| (m.id, m.position, m.size))
            .collect();

        let victim_id = match find_interference(from, target_pos, bodies) {
            Interference::Blocked(blocker) => {
                let name = self.monster(blocker).map(|m| m.name.clone()).unwrap_or_default();
                self.add_message(format!("The {} is in the way.", name), MessageCategory::Warning);
                return ShotOutcome::Blocked(blocker);
            }
            Interference::Clear => target_id,
            Interference::Candidates(candidates) => pick_victim(&mut self.rng, target_id, &candidates),
        };
        let Some(victim_idx) = self.monster_index(victim_id) else {
            return ShotOutcome::Blocked(victim_id);
        };

        self.player.spend_shot_energy();
        let victim_pos = self.monsters[victim_idx].position;
        let victim_name = self.monsters[victim_idx].name.clone();
        if victim_id != target_id {
            self.add_message(
                format!("The {} gets in the way of your shot!", victim_name),
                MessageCategory::Combat,
            );
        }

        // Point-blank: a quicker victim gets a free swing first
        if victim_pos.is_adjacent(&from) {
            let first = defender_strikes_first(
                self.player.derived.speed_tier,
                self.player.peek_modifiers().speed_tier,
                self.monsters[victim_idx].derived.speed_tier,
            );
            if first {
                self.add_message(
                    format!("The {} is quicker than your draw!", victim_name),
                    MessageCategory::Warning,
                );
                self.monster_attacks_player(victim_idx, AttackKind::Melee);
                self.monsters[victim_idx].has_acted_this_turn = true;
                if self.is_game_over() {
                    return ShotOutcome::PlayerDied;
                }
            }
        }

        let context = CombatContext::ranged().with_surroundings(self.monsters_adjacent_to(from), 0);
        let result = resolve_combat_action(&mut self.player, &mut self.monsters[victim_idx], &context, &mut self.rng);
        self.noise = Some(victim_pos);
        self.effect("arrow", victim_pos);

        let text = if !result.hit {
            format!("Your shot misses the {}.", victim_name)
        } else if result.critical {
            format!("Critical shot! The {} takes {} damage.", victim_name, result.damage)
        } else {
            format!("Your shot hits the {} for {} damage.", victim_name, result.damage)
        };
        self.add_message(text, MessageCategory::Combat);
        self.hit_feedback(&result, victim_pos);

        if result.killed {
            self.handle_monster_death(victim_idx);
        }
        ShotOutcome::Resolved {
            victim: victim_id,
            result,
        }
    }

    /// After a shot: pick a new target if needed and leave ranged mode once
    /// energy or targets run out
    pub(crate) fn refresh_ranged_mode(&mut self) {
        if !self.player.ranged.active {
            return;
        }
        let current_valid = self
            .player
            .ranged
            .target
            .and_then(|id| self.monster_index(id))
            .map_or(false, |idx| self.is_valid_ranged_target(idx));
        if !current_valid {
            self.player.ranged.target = self.nearest_ranged_target();
        }

        if !self.player.has_energy_for_shot() {
            self.player.deactivate_ranged();
            self.add_message("You are too exhausted to keep shooting.", MessageCategory::Warning);
        } else if self.player.ranged.target.is_none() {
            self.player.deactivate_ranged();
            self.add_message("No targets left in range.", MessageCategory::System);
        }
    }

    /// Resolve which monster a fire command aims at
    pub(crate) fn ranged_target_index(&self, aim: Option<Position>) -> Result<usize, ActionError> {
        match aim {
            Some(pos) => {
                let idx = self.monster_index_at(pos).ok_or(ActionError::InvalidTarget(pos))?;
                let distance = self.player.position.chebyshev_distance(&pos);
                let range = self.player.derived.ranged.range;
                if distance > range {
                    return Err(ActionError::OutOfRange { distance, range });
                }
                if !self.is_valid_ranged_target(idx) {
                    return Err(ActionError::InvalidTarget(pos));
                }
                Ok(idx)
            }
            None => self
                .player
                .ranged
                .target
                .and_then(|id| self.monster_index(id))
                .filter(|idx| self.is_valid_ranged_target(*idx))
                .or_else(|| self.nearest_ranged_target().and_then(|id| self.monster_index(id)))
                .ok_or(ActionError::NoTargetInRange),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MonsterSize;
    use crate::game::state::tests::{add_monster, arena};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_kill_awards_xp_and_codex() {
        let mut session = arena();
        let idx = add_monster(&mut session, Position::new(6, 5));
        let codex = session.player.codex_points;
        let xp = session.monsters[idx].xp_value;
        session.monsters[idx].health.current = 0;
        session.handle_monster_death(idx);
        assert_eq!(session.player.codex_points, codex + session.monsters[idx].codex_value);
        assert_eq!(session.player.experience.total(), xp);
    }

    #[test]
    fn test_melee_records_noise() {
        let mut session = arena();
        let idx = add_monster(&mut session, Position::new(6, 5));
        let result = session.player_attack_monster(idx);
        assert_eq!(session.noise(), Some(Position::new(6, 5)));
        assert!(result.damage <= 20);
        assert!(!session.messages().is_empty());
    }

    #[test]
    fn test_nearest_target_and_range() {
        let mut session = arena();
        add_monster(&mut session, Position::new(9, 5));
        let near = add_monster(&mut session, Position::new(7, 6));
        let near_id = session.monsters[near].id;
        assert_eq!(session.nearest_ranged_target(), Some(near_id));

        let range = session.player.derived.ranged.range;
        let far = Position::new(5 + range + 1, 5);
        add_monster(&mut session, far);
        session.refresh_visibility();
        assert_eq!(
            session.ranged_target_index(Some(far)),
            Err(ActionError::OutOfRange {
                distance: range + 1,
                range
            })
        );
        assert_eq!(
            session.ranged_target_index(Some(Position::new(3, 3))),
            Err(ActionError::InvalidTarget(Position::new(3, 3)))
        );
    }

    #[test]
    fn test_large_body_blocks_without_cost() {
        let mut session = arena();
        let blocker = add_monster(&mut session, Position::new(7, 5));
        session.monsters[blocker].size = MonsterSize::Large;
        let target = add_monster(&mut session, Position::new(9, 5));
        let energy = session.player.ranged.energy;
        let outcome = session.resolve_shot(target);
        assert_eq!(outcome, ShotOutcome::Blocked(session.monsters[blocker].id));
        assert_eq!(session.player.ranged.energy, energy);
        assert!(session.monsters[target].health.is_full());
    }

    #[test]
    fn test_small_body_can_take_the_shot() {
        let mut redirected = 0;
        for seed in 0..300 {
            let mut session = arena();
            session.rng = StdRng::seed_from_u64(seed);
            let small = add_monster(&mut session, Position::new(7, 5));
            session.monsters[small].size = MonsterSize::Small;
            session.monsters[small].health.current = 1;
            let target = add_monster(&mut session, Position::new(9, 5));
            let small_id = session.monsters[small].id;
            let energy = session.player.ranged.energy;
            let codex = session.player.codex_points;

            let ShotOutcome::Resolved { victim, result } = session.resolve_shot(target) else {
                panic!("shot past a small body must resolve");
            };
            assert_eq!(
                session.player.ranged.energy,
                energy - session.player.derived.ranged.energy_cost
            );
            if victim != small_id {
                assert_eq!(session.monsters[small].health.current, 1);
                continue;
            }

            redirected += 1;
            assert!(session.monsters[target].health.is_full());
            assert!(session
                .messages()
                .iter()
                .any(|m| m.text.contains("gets in the way")));
            assert_eq!(session.noise(), Some(Position::new(7, 5)));
            if result.hit {
                assert!(result.killed);
                assert!(!session.monsters[small].is_alive());
                assert!(session.player.codex_points > codex);
            } else {
                assert_eq!(session.monsters[small].health.current, 1);
            }
        }
        // weight 11 against the target's 50
        assert!(redirected > 0);
    }

    #[test]
    fn test_clear_shot_spends_energy() {
        let mut session = arena();
        let target = add_monster(&mut session, Position::new(9, 5));
        let energy = session.player.ranged.energy;
        match session.resolve_shot(target) {
            ShotOutcome::Resolved { victim, .. } => assert_eq!(victim, session.monsters[target].id),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            session.player.ranged.energy,
            energy - session.player.derived.ranged.energy_cost
        );
        assert_eq!(session.noise(), Some(Position::new(9, 5)));
    }

    #[test]
    fn test_faster_adjacent_target_strikes_first() {
        let mut session = arena();
        let target = add_monster(&mut session, Position::new(6, 5));
        // player tier 2 drops to 1 for the shot; tier 2 defender goes first
        session.monsters[target].derived.speed_tier = 2;
        session.resolve_shot(target);
        assert!(session.monsters[target].has_acted_this_turn);

        let mut session = arena();
        let target = add_monster(&mut session, Position::new(6, 5));
        session.monsters[target].derived.speed_tier = 1;
        session.resolve_shot(target);
        assert!(!session.monsters[target].has_acted_this_turn);
    }

    #[test]
    fn test_ranged_mode_drops_without_energy() {
        let mut session = arena();
        add_monster(&mut session, Position::new(8, 5));
        session.player.ranged.active = true;
        session.player.ranged.energy = 0;
        session.refresh_ranged_mode();
        assert!(!session.player.ranged.active);

        session.player.ranged.active = true;
        session.player.ranged.energy = session.player.derived.ranged.max_energy;
        session.refresh_ranged_mode();
        assert!(session.player.ranged.active);
        assert!(session.player.ranged.target.is_some());

        session.monsters.clear();
        session.refresh_ranged_mode();
        assert!(!session.player.ranged.active);
    }
}
