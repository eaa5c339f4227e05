//! Monster movement
//!
//! Single-step choices over the eight neighbours: greedy pursuit, fleeing
//! and idle wandering. None of these ever picks an occupied cell or the
//! player's cell.

use super::Surroundings;
use crate::combat::Dice;
use crate::entities::Position;
use crate::world::map::NEIGHBOURS;

/// Whether a monster may step into `pos`. Closed doors count when
/// `through_doors` is set; the step then opens the door instead.
pub fn can_enter(view: &Surroundings, pos: Position, through_doors: bool) -> bool {
    let open = view.map.is_walkable(pos.x, pos.y) || (through_doors && view.map.is_closed_door(pos.x, pos.y));
    open && pos != view.player_pos && !view.occupied.contains(&pos)
}

fn neighbours(from: Position) -> impl Iterator<Item = Position> {
    NEIGHBOURS.iter().map(move |(dx, dy)| from.offset(*dx, *dy))
}

/// Greedy pursuit: the neighbour with the smallest Manhattan distance to
/// `target`, only if it is strictly closer than standing still. Ties keep
/// the first neighbour, orthogonal steps first.
pub fn chase_step(view: &Surroundings, from: Position, target: Position) -> Option<Position> {
    let mut best = None;
    let mut best_distance = from.distance(&target);
    for pos in neighbours(from).filter(|p| can_enter(view, *p, true)) {
        let distance = pos.distance(&target);
        if distance < best_distance {
            best = Some(pos);
            best_distance = distance;
        }
    }
    best
}

/// The neighbour farthest from `threat`, only if it gains ground
pub fn flee_step(view: &Surroundings, from: Position, threat: Position) -> Option<Position> {
    let mut best = None;
    let mut best_distance = from.distance_squared(&threat);
    for pos in neighbours(from).filter(|p| can_enter(view, *p, false)) {
        let distance = pos.distance_squared(&threat);
        if distance > best_distance {
            best = Some(pos);
            best_distance = distance;
        }
    }
    best
}

/// A uniformly random open neighbour
pub fn wander_step<D: Dice + ?Sized>(view: &Surroundings, from: Position, dice: &mut D) -> Option<Position> {
    let options: Vec<Position> = neighbours(from).filter(|p| can_enter(view, *p, false)).collect();
    dice.index(options.len()).map(|i| options[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ScriptedDice;
    use crate::data::AiSettings;
    use crate::world::{Map, TileType};
    use std::collections::HashSet;

    fn open_map() -> Map {
        let mut map = Map::new(12, 12, 1, 0);
        for y in 1..11 {
            for x in 1..11 {
                map.set_tile(x, y, TileType::Floor);
            }
        }
        map
    }

    fn view<'a>(map: &'a Map, occupied: &'a HashSet<Position>, settings: &'a AiSettings) -> Surroundings<'a> {
        Surroundings {
            map,
            player_pos: Position::new(9, 5),
            occupied,
            noise: None,
            settings,
        }
    }

    #[test]
    fn test_chase_prefers_orthogonal_on_ties() {
        let map = open_map();
        let occupied = HashSet::new();
        let settings = AiSettings::default();
        let v = view(&map, &occupied, &settings);
        assert_eq!(chase_step(&v, Position::new(5, 5), Position::new(9, 5)), Some(Position::new(6, 5)));
        // (6, 6) is the only neighbour two steps closer
        assert_eq!(chase_step(&v, Position::new(5, 5), Position::new(9, 9)), Some(Position::new(6, 6)));
    }

    #[test]
    fn test_chase_never_steps_onto_occupied() {
        let map = open_map();
        let occupied: HashSet<_> = [Position::new(6, 5)].into_iter().collect();
        let settings = AiSettings::default();
        let v = view(&map, &occupied, &settings);
        // diagonals do not shorten a straight Manhattan line
        assert_eq!(chase_step(&v, Position::new(5, 5), Position::new(9, 5)), None);
    }

    #[test]
    fn test_chase_goes_through_closed_doors() {
        let mut map = open_map();
        for y in 1..11 {
            map.set_tile(6, y, TileType::Wall);
        }
        map.set_tile(6, 5, TileType::DoorClosed);
        let occupied = HashSet::new();
        let settings = AiSettings::default();
        let v = view(&map, &occupied, &settings);
        assert_eq!(chase_step(&v, Position::new(5, 5), Position::new(8, 5)), Some(Position::new(6, 5)));
        assert!(!can_enter(&v, Position::new(6, 5), false));
    }

    #[test]
    fn test_flee_moves_away() {
        let map = open_map();
        let occupied = HashSet::new();
        let settings = AiSettings::default();
        let v = view(&map, &occupied, &settings);
        let from = Position::new(8, 5);
        let step = flee_step(&v, from, v.player_pos).unwrap();
        assert!(step.distance_squared(&v.player_pos) > from.distance_squared(&v.player_pos));
        assert_eq!(step, Position::new(7, 4));
    }

    #[test]
    fn test_flee_cornered() {
        let map = open_map();
        let occupied: HashSet<_> = [Position::new(2, 1), Position::new(1, 2)].into_iter().collect();
        let settings = AiSettings::default();
        let mut v = view(&map, &occupied, &settings);
        v.player_pos = Position::new(2, 2);
        assert_eq!(flee_step(&v, Position::new(1, 1), v.player_pos), None);
    }

    #[test]
    fn test_wander_picks_open_neighbour() {
        let map = open_map();
        let occupied: HashSet<_> = [Position::new(2, 1)].into_iter().collect();
        let settings = AiSettings::default();
        let v = view(&map, &occupied, &settings);
        // open around the corner cell: (1, 2) then (2, 2)
        let from = Position::new(1, 1);
        assert_eq!(wander_step(&v, from, &mut ScriptedDice::new([1])), Some(Position::new(2, 2)));
        assert_eq!(wander_step(&v, from, &mut ScriptedDice::new([0])), Some(Position::new(1, 2)));
    }
}
