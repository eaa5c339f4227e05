//! Line of sight and field of view
//!
//! Bresenham tracing between cells and radius-limited visible tile sets.
//! The radius comes from the room the viewer stands in, or a fixed corridor
//! radius outside rooms.

use super::Map;
use crate::combat::Dice;
use crate::entities::Position;

/// Every cell on the Bresenham line from `from` to `to`, both included
pub fn bresenham_line(from: Position, to: Position) -> Vec<Position> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    let mut line = Vec::with_capacity((dx.max(-dy) + 1) as usize);

    loop {
        line.push(Position::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    line
}

/// Whether `from` can see `to`. Intermediate cells that block sight stop the
/// line, and so does a diagonal step squeezing between two walls.
pub fn has_line_of_sight(map: &Map, from: Position, to: Position) -> bool {
    let line = bresenham_line(from, to);
    let last = line.len() - 1;

    for i in 1..line.len() {
        let prev = line[i - 1];
        let cur = line[i];
        if prev.x != cur.x && prev.y != cur.y && map.is_wall(cur.x, prev.y) && map.is_wall(prev.x, cur.y) {
            return false;
        }
        if i < last && map.blocks_sight(cur.x, cur.y) {
            return false;
        }
    }
    true
}

/// Whether a closed door sits strictly between two cells
pub fn line_has_closed_door(map: &Map, from: Position, to: Position) -> bool {
    let line = bresenham_line(from, to);
    let last = line.len() - 1;
    line.iter()
        .enumerate()
        .any(|(i, p)| i > 0 && i < last && map.is_closed_door(p.x, p.y))
}

/// Sight radius at a position: the room's brightness, or the corridor radius
pub fn vision_radius(map: &Map, pos: Position, corridor_radius: i32) -> i32 {
    map.room_at(pos)
        .map_or(corridor_radius, |room| room.brightness.radius())
}

fn scan<F: FnMut(Position, f64) -> bool>(map: &Map, origin: Position, radius: i32, mut keep: F) -> Vec<Position> {
    let reach = radius as f64 + 0.5;
    let mut visible = Vec::new();
    for y in origin.y - radius..=origin.y + radius {
        for x in origin.x - radius..=origin.x + radius {
            if !map.in_bounds(x, y) {
                continue;
            }
            let pos = Position::new(x, y);
            let distance = (pos.distance_squared(&origin) as f64).sqrt();
            if distance > reach {
                continue;
            }
            if pos != origin && !(keep(pos, distance) && has_line_of_sight(map, origin, pos)) {
                continue;
            }
            visible.push(pos);
        }
    }
    visible
}

/// Tiles visible from `origin` within a hard circle of `radius + 0.5`
pub fn visible_tiles(map: &Map, origin: Position, radius: i32) -> Vec<Position> {
    scan(map, origin, radius, |_, _| true)
}

/// Like [`visible_tiles`], but each tile on the outer half-cell band of the
/// circle only shows up on a coin flip
pub fn visible_tiles_soft<D: Dice + ?Sized>(map: &Map, origin: Position, radius: i32, dice: &mut D) -> Vec<Position> {
    let edge = radius as f64 - 0.5;
    scan(map, origin, radius, |_, distance| distance <= edge || dice.coin())
}

/// Recompute the map's visible flags from a viewer, marking seen tiles
/// explored
pub fn update_visibility(map: &mut Map, visible: &[Position]) {
    map.clear_visibility();
    for pos in visible {
        map.set_visible(pos.x, pos.y, true);
    }
}
