//! Room obstacles
//!
//! Furniture placed inside large rooms. Patterns only ever produce isolated
//! cells or straight arms that keep one free cell to the room edge, so the
//! room floor stays connected.

use crate::combat::Dice;
use crate::entities::Position;
use crate::world::{Map, TileType};

use super::rooms::Room;

/// Rooms smaller than this in either direction stay empty
pub const MIN_OBSTACLE_ROOM: i32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstaclePattern {
    Corners,
    Cross,
    Pillars,
    Random,
}

impl ObstaclePattern {
    const ALL: [ObstaclePattern; 4] = [
        ObstaclePattern::Corners,
        ObstaclePattern::Cross,
        ObstaclePattern::Pillars,
        ObstaclePattern::Random,
    ];

    pub fn roll<D: Dice + ?Sized>(dice: &mut D) -> Self {
        let idx = dice.index(Self::ALL.len()).unwrap_or(0);
        Self::ALL[idx]
    }
}

pub fn room_fits_obstacles(room: &Room) -> bool {
    room.width >= MIN_OBSTACLE_ROOM && room.height >= MIN_OBSTACLE_ROOM
}

/// Cells a pattern would occupy in a room
pub fn pattern_cells<D: Dice + ?Sized>(pattern: ObstaclePattern, room: &Room, dice: &mut D) -> Vec<Position> {
    match pattern {
        ObstaclePattern::Corners => vec![
            Position::new(room.x + 1, room.y + 1),
            Position::new(room.x2() - 1, room.y + 1),
            Position::new(room.x + 1, room.y2() - 1),
            Position::new(room.x2() - 1, room.y2() - 1),
        ],
        ObstaclePattern::Cross => {
            let center = room.center();
            let arm = (room.width.min(room.height) / 2 - 2).max(1);
            let mut cells = vec![center];
            for i in 1..=arm {
                cells.push(center.offset(i, 0));
                cells.push(center.offset(-i, 0));
                cells.push(center.offset(0, i));
                cells.push(center.offset(0, -i));
            }
            cells
        }
        ObstaclePattern::Pillars => {
            let mut cells = Vec::new();
            let mut y = room.y + 2;
            while y <= room.y2() - 2 {
                let mut x = room.x + 2;
                while x <= room.x2() - 2 {
                    cells.push(Position::new(x, y));
                    x += 2;
                }
                y += 2;
            }
            cells
        }
        ObstaclePattern::Random => {
            let count = dice.range(2, (room.area() / 12).max(2));
            let mut cells: Vec<Position> = Vec::new();
            for _ in 0..count * 4 {
                if cells.len() as i32 >= count {
                    break;
                }
                let pos = Position::new(
                    dice.range(room.x + 1, room.x2() - 1),
                    dice.range(room.y + 1, room.y2() - 1),
                );
                // Keep every random obstacle isolated
                let crowded = cells
                    .iter()
                    .any(|other| *other == pos || other.is_adjacent(&pos));
                if !crowded {
                    cells.push(pos);
                }
            }
            cells
        }
    }
}

/// Maybe furnish a room. Each placed cell is independently see-through or
/// sight-blocking. Returns the number of obstacles placed.
pub fn place_obstacles<D: Dice + ?Sized>(map: &mut Map, room: &Room, chance: i32, dice: &mut D) -> usize {
    if !room_fits_obstacles(room) || !dice.chance(chance) {
        return 0;
    }

    let pattern = ObstaclePattern::roll(dice);
    let mut placed = 0;
    for pos in pattern_cells(pattern, room, dice) {
        if !room.contains(pos) || map.tile_type(pos.x, pos.y) != Some(TileType::Floor) {
            continue;
        }
        let transparent = dice.coin();
        map.set_tile(pos.x, pos.y, TileType::Obstacle { transparent });
        placed += 1;
    }
    log::debug!("Placed {} obstacles ({:?}) in room at ({}, {})", placed, pattern, room.x, room.y);
    placed
}
