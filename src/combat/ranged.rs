//! Ranged attack helpers
//!
//! Bodies in the line of fire, shot redirection, and the initiative check
//! for shooting at point-blank range.

use super::dice::{weighted_choice, Dice};
use crate::entities::{MonsterSize, Position};
use crate::world::fov::bresenham_line;

/// Weight the intended target always keeps when the shot may be redirected
pub const TARGET_BASE_WEIGHT: u32 = 50;
/// Speed tiers a shooter loses for the initiative check
pub const RANGED_SPEED_PENALTY: i32 = 1;

/// What stands between a shooter and the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interference<T> {
    /// Nothing in the way
    Clear,
    /// A large body stops the shot outright
    Blocked(T),
    /// Smaller bodies that may catch the shot, with their weights
    Candidates(Vec<(T, u32)>),
}

/// Interception weight for a body `step` cells along a line of `steps`
/// cells. Bodies close to the shooter are more likely to catch the shot.
pub fn interference_weight(size: MonsterSize, step: usize, steps: usize) -> u32 {
    let base = size.interference_weight();
    if base == 0 || steps == 0 {
        return 0;
    }
    let closeness = (steps - step.min(steps) + 1) as u32;
    (base * closeness / steps as u32).max(1)
}

/// Scan the cells strictly between `from` and `to` for bodies. `bodies`
/// yields an identifier, position and size for every living creature other
/// than the shooter and the target.
pub fn find_interference<T, I>(from: Position, to: Position, bodies: I) -> Interference<T>
where
    T: Copy,
    I: IntoIterator<Item = (T, Position, MonsterSize)>,
{
    let line = bresenham_line(from, to);
    if line.len() <= 2 {
        return Interference::Clear;
    }
    let steps = line.len() - 1;
    let between = &line[1..steps];

    let mut hits: Vec<(usize, T, MonsterSize)> = bodies
        .into_iter()
        .filter_map(|(id, pos, size)| {
            between
                .iter()
                .position(|cell| *cell == pos)
                .map(|idx| (idx + 1, id, size))
        })
        .collect();
    hits.sort_by_key(|(step, _, _)| *step);

    if let Some((_, id, _)) = hits.iter().find(|(_, _, size)| size.blocks_projectiles()) {
        return Interference::Blocked(*id);
    }

    let candidates: Vec<(T, u32)> = hits
        .into_iter()
        .map(|(step, id, size)| (id, interference_weight(size, step, steps)))
        .filter(|(_, weight)| *weight > 0)
        .collect();

    if candidates.is_empty() {
        Interference::Clear
    } else {
        Interference::Candidates(candidates)
    }
}

/// Decide who the shot actually reaches. With no candidates the target is
/// returned without rolling.
pub fn pick_victim<T: Copy, D: Dice + ?Sized>(dice: &mut D, target: T, candidates: &[(T, u32)]) -> T {
    if candidates.iter().all(|(_, weight)| *weight == 0) {
        return target;
    }
    let mut table = Vec::with_capacity(candidates.len() + 1);
    table.push((target, TARGET_BASE_WEIGHT));
    table.extend_from_slice(candidates);
    weighted_choice(dice, &table).copied().unwrap_or(target)
}

/// Point-blank initiative: the shooter drops a speed tier (plus whatever a
/// queued modifier grants) and a strictly faster defender strikes first.
pub fn defender_strikes_first(attacker_speed: i32, modifier_speed: i32, defender_speed: i32) -> bool {
    attacker_speed - RANGED_SPEED_PENALTY + modifier_speed < defender_speed
}

/// Whether `to` lies within a shooter's range
pub fn in_range(from: Position, to: Position, range: i32) -> bool {
    from.chebyshev_distance(&to) <= range
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ScriptedDice;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_clear_line() {
        let bodies = vec![(1u32, p(5, 5), MonsterSize::Medium)];
        let found = find_interference(p(0, 0), p(6, 0), bodies);
        assert_eq!(found, Interference::Clear);
    }

    #[test]
    fn test_large_body_blocks() {
        let bodies = vec![
            (1u32, p(2, 0), MonsterSize::Small),
            (2u32, p(4, 0), MonsterSize::Large),
        ];
        assert_eq!(find_interference(p(0, 0), p(6, 0), bodies), Interference::Blocked(2));
    }

    #[test]
    fn test_bodies_on_endpoints_ignored() {
        let bodies = vec![(1u32, p(0, 0), MonsterSize::Huge), (2u32, p(6, 0), MonsterSize::Huge)];
        assert_eq!(find_interference(p(0, 0), p(6, 0), bodies), Interference::Clear);
    }

    #[test]
    fn test_candidate_weights_fall_off() {
        let bodies = vec![(1u32, p(1, 0), MonsterSize::Medium), (2u32, p(5, 0), MonsterSize::Medium)];
        match find_interference(p(0, 0), p(6, 0), bodies) {
            Interference::Candidates(c) => {
                assert_eq!(c.len(), 2);
                assert!(c[0].1 > c[1].1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(interference_weight(MonsterSize::Small, 1, 6) > interference_weight(MonsterSize::Tiny, 1, 6));
        assert_eq!(interference_weight(MonsterSize::Large, 1, 6), 0);
    }

    #[test]
    fn test_pick_victim_without_candidates_keeps_target() {
        let mut dice = ScriptedDice::new([]);
        assert_eq!(pick_victim(&mut dice, 7u32, &[]), 7);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_pick_victim_weighted() {
        // target 50, candidate 30: rolls 1..=50 hit the target
        let mut dice = ScriptedDice::new([50, 51, 80]);
        let candidates = [(2u32, 30)];
        assert_eq!(pick_victim(&mut dice, 1u32, &candidates), 1);
        assert_eq!(pick_victim(&mut dice, 1u32, &candidates), 2);
        assert_eq!(pick_victim(&mut dice, 1u32, &candidates), 2);
    }

    #[test]
    fn test_initiative() {
        // equal tiers: shooter drops to 1, defender at 2 strikes first
        assert!(defender_strikes_first(2, 0, 2));
        assert!(!defender_strikes_first(2, 0, 1));
        // a quick shot modifier restores the lead
        assert!(!defender_strikes_first(2, 2, 2));
    }
}
