//! Procedural map generation
//!
//! Rooms by rejection sampling, optional obstacles, L-shaped corridors
//! chaining the rooms in order, doors, then the start and the stairs.
//! Generation never fails: rooms that do not fit are skipped.

pub mod rooms;
pub mod obstacles;
pub mod doors;

pub use rooms::{Brightness, Room};

use crate::combat::Dice;
use crate::data::MapSettings;
use crate::entities::Position;

use super::{Map, TileType};

/// Generate a complete floor
pub fn generate<D: Dice + ?Sized>(settings: &MapSettings, floor: u32, danger_level: u32, dice: &mut D) -> Map {
    let mut map = Map::new(settings.width, settings.height, floor, danger_level);

    place_rooms(&mut map, settings, dice);
    if map.rooms.is_empty() {
        log::warn!("No room fit on floor {}, carving a fallback room", floor);
        carve_fallback_room(&mut map, settings);
    }

    let rooms = map.rooms.clone();
    for room in &rooms {
        obstacles::place_obstacles(&mut map, room, settings.obstacle_chance, dice);
    }

    for pair in rooms.windows(2) {
        connect_rooms(&mut map, &pair[0], &pair[1], dice);
    }

    let doors = doors::place_doors(&mut map, dice);
    place_start_and_stairs(&mut map, dice);

    log::info!(
        "Generated floor {} (danger {}): {} rooms, {} doors",
        floor,
        danger_level,
        map.rooms.len(),
        doors
    );
    map
}

/// Rejection-sample rooms until the rolled count is reached. Each room gets
/// a fixed number of attempts and is silently dropped if none fits.
fn place_rooms<D: Dice + ?Sized>(map: &mut Map, settings: &MapSettings, dice: &mut D) {
    let target = dice.range(settings.min_rooms as i32, settings.max_rooms as i32);

    for _ in 0..target {
        for _ in 0..settings.placement_attempts {
            let width = dice.range(settings.min_room_size, settings.max_room_size);
            let height = dice.range(settings.min_room_size, settings.max_room_size);
            // Leave the outer ring of the map as wall
            let max_x = map.width - width - 1;
            let max_y = map.height - height - 1;
            if max_x < 1 || max_y < 1 {
                continue;
            }

            let x = dice.range(1, max_x);
            let y = dice.range(1, max_y);
            let candidate = Room::new(x, y, width, height, Brightness::Normal);
            if map.rooms.iter().any(|r| candidate.intersects(r, settings.room_padding)) {
                continue;
            }

            let room = Room {
                brightness: Brightness::roll(dice),
                ..candidate
            };
            carve_room(map, &room);
            map.rooms.push(room);
            break;
        }
    }

    if (map.rooms.len() as i32) < target {
        log::debug!("Placed {} of {} rooms", map.rooms.len(), target);
    }
}

fn carve_room(map: &mut Map, room: &Room) {
    for cell in room.cells() {
        map.set_tile(cell.x, cell.y, TileType::Floor);
    }
}

fn carve_fallback_room(map: &mut Map, settings: &MapSettings) {
    let width = settings.min_room_size.min(map.width - 2).max(1);
    let height = settings.min_room_size.min(map.height - 2).max(1);
    let room = Room::new(
        (map.width - width) / 2,
        (map.height - height) / 2,
        width,
        height,
        Brightness::Normal,
    );
    carve_room(map, &room);
    map.rooms.push(room);
}

/// Join two room centers with an L-shaped corridor, randomly horizontal or
/// vertical first
fn connect_rooms<D: Dice + ?Sized>(map: &mut Map, from: &Room, to: &Room, dice: &mut D) {
    let a = from.center();
    let b = to.center();
    if dice.coin() {
        carve_h_corridor(map, a.x, b.x, a.y);
        carve_v_corridor(map, a.y, b.y, b.x);
    } else {
        carve_v_corridor(map, a.y, b.y, a.x);
        carve_h_corridor(map, a.x, b.x, b.y);
    }
}

fn carve_h_corridor(map: &mut Map, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        carve_corridor_cell(map, x, y);
    }
}

fn carve_v_corridor(map: &mut Map, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        carve_corridor_cell(map, x, y);
    }
}

/// Walls become corridor; an obstacle in the way becomes plain floor
fn carve_corridor_cell(map: &mut Map, x: i32, y: i32) {
    match map.tile_type(x, y) {
        Some(TileType::Wall) => map.set_tile(x, y, TileType::Corridor),
        Some(TileType::Obstacle { .. }) => map.set_tile(x, y, TileType::Floor),
        _ => {}
    }
}

fn walkable_cells(map: &Map, room: &Room) -> Vec<Position> {
    room.cells().filter(|p| map.is_walkable(p.x, p.y)).collect()
}

/// Start on a random walkable cell of the first room, stairs on a random
/// walkable cell of the last room other than the start
fn place_start_and_stairs<D: Dice + ?Sized>(map: &mut Map, dice: &mut D) {
    let (Some(first), Some(last)) = (map.rooms.first().copied(), map.rooms.last().copied()) else {
        return;
    };

    let starts = walkable_cells(map, &first);
    if let Some(idx) = dice.index(starts.len()) {
        map.start_pos = starts[idx];
    }

    let start = map.start_pos;
    let stairs: Vec<Position> = walkable_cells(map, &last)
        .into_iter()
        .filter(|p| *p != start)
        .collect();
    if let Some(idx) = dice.index(stairs.len()) {
        let pos = stairs[idx];
        map.set_tile(pos.x, pos.y, TileType::StairsDown);
        map.stairs_pos = Some(pos);
    }
}

/// Flood fill over walkable cells and closed doors from a position
pub fn reachable_from(map: &Map, origin: Position) -> Vec<bool> {
    let mut seen = vec![false; map.tiles.len()];
    let passable = |x: i32, y: i32| map.is_walkable(x, y) || map.is_closed_door(x, y);
    if !passable(origin.x, origin.y) {
        return seen;
    }

    let mut stack = vec![origin];
    seen[map.xy_to_idx(origin.x, origin.y)] = true;
    while let Some(pos) = stack.pop() {
        for (dx, dy) in super::map::NEIGHBOURS {
            let next = pos.offset(dx, dy);
            if !map.in_bounds(next.x, next.y) || !passable(next.x, next.y) {
                continue;
            }
            let idx = map.xy_to_idx(next.x, next.y);
            if !seen[idx] {
                seen[idx] = true;
                stack.push(next);
            }
        }
    }
    seen
}
