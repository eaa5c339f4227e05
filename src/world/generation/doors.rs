//! Door placement
//!
//! Doors sit in the wall ring of a room, where a corridor punched through.

use crate::combat::Dice;
use crate::entities::Position;
use crate::world::{Map, TileType};

use super::rooms::Room;

/// A door only goes in if at least this many of its eight neighbours are
/// walls
pub const MIN_DOOR_WALLS: usize = 4;

/// Wall-ring cells of a room where a door could go: the cell itself and the
/// cell beyond it are walkable, both lateral neighbours are walls, and the
/// cell is at least one step away from the room corners.
pub fn door_candidates(map: &Map, room: &Room) -> Vec<Position> {
    let mut candidates = Vec::new();

    // Top and bottom rows, scanning along x
    for (row, outward) in [(room.y - 1, -1), (room.y2() + 1, 1)] {
        for x in room.x + 1..room.x2() {
            let cell = Position::new(x, row);
            if is_candidate(map, cell, (0, outward), (1, 0)) {
                candidates.push(cell);
            }
        }
    }

    // Left and right columns, scanning along y
    for (col, outward) in [(room.x - 1, -1), (room.x2() + 1, 1)] {
        for y in room.y + 1..room.y2() {
            let cell = Position::new(col, y);
            if is_candidate(map, cell, (outward, 0), (0, 1)) {
                candidates.push(cell);
            }
        }
    }

    candidates
}

fn is_candidate(map: &Map, cell: Position, outward: (i32, i32), lateral: (i32, i32)) -> bool {
    let walkable = |pos: Position| map.is_walkable(pos.x, pos.y);
    let wall = |pos: Position| map.is_wall(pos.x, pos.y);

    walkable(cell)
        && !matches!(map.tile_type(cell.x, cell.y), Some(TileType::StairsDown))
        && walkable(cell.offset(outward.0, outward.1))
        && wall(cell.offset(lateral.0, lateral.1))
        && wall(cell.offset(-lateral.0, -lateral.1))
}

/// Turn a chosen candidate into a closed door, or plain floor when the cell
/// is not really inside a wall. Returns whether a door was placed.
pub fn resolve_door_candidate(map: &mut Map, pos: Position) -> bool {
    if map.count_adjacent_walls(pos.x, pos.y) >= MIN_DOOR_WALLS {
        map.set_tile(pos.x, pos.y, TileType::DoorClosed);
        true
    } else {
        map.set_tile(pos.x, pos.y, TileType::Floor);
        false
    }
}

/// Pick at most one door per room. Rooms without candidates are skipped.
pub fn place_doors<D: Dice + ?Sized>(map: &mut Map, dice: &mut D) -> usize {
    let rooms = map.rooms.clone();
    let mut placed = 0;
    for room in &rooms {
        let candidates = door_candidates(map, room);
        let Some(idx) = dice.index(candidates.len()) else {
            continue;
        };
        if resolve_door_candidate(map, candidates[idx]) {
            placed += 1;
        }
    }
    placed
}
