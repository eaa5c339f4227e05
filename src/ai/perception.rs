//! Monster senses
//!
//! Wake checks for sleepers, plus sight and hearing for awake monsters.

use crate::combat::Dice;
use crate::entities::Position;
use crate::world::{has_line_of_sight, line_has_closed_door, Map};

/// Wake chance right next to a sleeper's hearing limit scales up to this
pub const MAX_DISTANT_WAKE_CHANCE: i32 = 40;

/// How the player was noticed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Sight,
    Sound,
}

/// Per-turn wake chance for a sleeper `distance` cells from a disturbance.
/// Anything adjacent uses `adjacent_chance`; beyond twice the perception
/// radius nothing wakes it.
pub fn wake_chance(perception: i32, distance: i32, adjacent_chance: i32) -> i32 {
    if distance <= 1 {
        return adjacent_chance;
    }
    let reach = perception.max(1) * 2;
    if distance >= reach {
        return 0;
    }
    (reach - distance) * MAX_DISTANT_WAKE_CHANCE / reach
}

/// Roll a sleeper's wake check against the closest disturbance, the player
/// or the last combat noise. Returns that disturbance if the sleeper wakes.
pub fn roll_wake<D: Dice + ?Sized>(
    position: Position,
    perception: i32,
    player_pos: Position,
    noise: Option<Position>,
    adjacent_chance: i32,
    dice: &mut D,
) -> Option<Position> {
    let source = std::iter::once(player_pos)
        .chain(noise)
        .min_by_key(|p| position.chebyshev_distance(p))?;
    let chance = wake_chance(perception, position.chebyshev_distance(&source), adjacent_chance);
    dice.chance(chance).then_some(source)
}

pub fn can_see(map: &Map, from: Position, to: Position, perception: i32) -> bool {
    from.chebyshev_distance(&to) <= perception && has_line_of_sight(map, from, to)
}

/// Hearing reaches half the perception radius, and half that again through
/// a closed door
pub fn sound_radius(map: &Map, from: Position, to: Position, perception: i32) -> i32 {
    let radius = perception / 2;
    if line_has_closed_door(map, from, to) {
        radius / 2
    } else {
        radius
    }
}

pub fn can_hear(map: &Map, from: Position, to: Position, perception: i32) -> bool {
    from.chebyshev_distance(&to) <= sound_radius(map, from, to, perception)
}

/// Sight takes precedence over sound
pub fn detect(map: &Map, from: Position, to: Position, perception: i32) -> Option<Sense> {
    if can_see(map, from, to, perception) {
        Some(Sense::Sight)
    } else if can_hear(map, from, to, perception) {
        Some(Sense::Sound)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ScriptedDice;
    use crate::world::TileType;

    fn open_map() -> Map {
        let mut map = Map::new(20, 20, 1, 0);
        for y in 1..19 {
            for x in 1..19 {
                map.set_tile(x, y, TileType::Floor);
            }
        }
        map
    }

    #[test]
    fn test_wake_chance_falls_with_distance() {
        assert_eq!(wake_chance(9, 1, 85), 85);
        // reach 18: (18 - 9) * 40 / 18 = 20
        assert_eq!(wake_chance(9, 9, 85), 20);
        assert_eq!(wake_chance(9, 18, 85), 0);
        assert_eq!(wake_chance(9, 30, 85), 0);
        assert!(wake_chance(9, 2, 85) > wake_chance(9, 5, 85));
    }

    #[test]
    fn test_roll_wake_uses_closest_disturbance() {
        let me = Position::new(5, 5);
        let player = Position::new(15, 15);
        let noise = Position::new(6, 5);
        let mut dice = ScriptedDice::new([85]);
        assert_eq!(roll_wake(me, 9, player, Some(noise), 85, &mut dice), Some(noise));

        let mut dice = ScriptedDice::new([86]);
        assert_eq!(roll_wake(me, 9, player, Some(noise), 85, &mut dice), None);
    }

    #[test]
    fn test_sight_needs_range_and_line() {
        let mut map = open_map();
        let from = Position::new(2, 5);
        assert!(can_see(&map, from, Position::new(8, 5), 6));
        assert!(!can_see(&map, from, Position::new(9, 5), 6));
        map.set_tile(5, 5, TileType::Wall);
        assert!(!can_see(&map, from, Position::new(8, 5), 6));
    }

    #[test]
    fn test_closed_door_muffles_sound() {
        let mut map = open_map();
        let from = Position::new(2, 5);
        let to = Position::new(6, 5);
        assert_eq!(sound_radius(&map, from, to, 9), 4);
        assert_eq!(detect(&map, from, to, 3), None);

        map.set_tile(4, 5, TileType::DoorClosed);
        assert_eq!(sound_radius(&map, from, to, 9), 2);
        assert!(!can_hear(&map, from, to, 9));
        assert_eq!(detect(&map, from, Position::new(3, 5), 9), Some(Sense::Sight));
    }

    #[test]
    fn test_hearing_without_sight() {
        let mut map = open_map();
        map.set_tile(4, 5, TileType::Wall);
        let from = Position::new(3, 5);
        assert_eq!(detect(&map, from, Position::new(6, 5), 9), Some(Sense::Sound));
    }
}
