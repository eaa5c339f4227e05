//! Map data structure
//!
//! The 2D grid representing a dungeon floor.

use serde::{Deserialize, Serialize};

use super::generation::Room;
use super::tile::{Tile, TileType};
use crate::entities::Position;

/// The eight neighbouring offsets, orthogonal first
pub const NEIGHBOURS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (-1, -1),
    (1, -1),
    (1, 1),
    (-1, 1),
];

/// A dungeon floor map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
    pub floor_number: u32,
    pub danger_level: u32,
    pub rooms: Vec<Room>,
    /// Start position for player
    pub start_pos: Position,
    /// Stairs down, if the floor has any
    pub stairs_pos: Option<Position>,
}

impl Map {
    /// Create a new map filled with walls
    pub fn new(width: i32, height: i32, floor_number: u32, danger_level: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            tiles: vec![Tile::default(); (width * height) as usize],
            floor_number,
            danger_level,
            rooms: Vec::new(),
            start_pos: Position::new(0, 0),
            stairs_pos: None,
        }
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    pub fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Convert 1D index to 2D coordinates
    #[inline]
    pub fn idx_to_xy(&self, idx: usize) -> (i32, i32) {
        let idx = idx as i32;
        (idx % self.width, idx / self.width)
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Get tile at position
    pub fn get_tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if self.in_bounds(x, y) {
            Some(&self.tiles[self.xy_to_idx(x, y)])
        } else {
            None
        }
    }

    /// Get mutable tile at position
    pub fn get_tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        if self.in_bounds(x, y) {
            let idx = self.xy_to_idx(x, y);
            Some(&mut self.tiles[idx])
        } else {
            None
        }
    }

    pub fn tile_type(&self, x: i32, y: i32) -> Option<TileType> {
        self.get_tile(x, y).map(|t| t.tile_type)
    }

    /// Set tile type at position
    pub fn set_tile(&mut self, x: i32, y: i32, tile_type: TileType) {
        if let Some(tile) = self.get_tile_mut(x, y) {
            tile.tile_type = tile_type;
        }
    }

    /// Check if a position is walkable
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).map_or(false, |t| t.is_walkable())
    }

    /// Check if a position blocks line of sight. Outside the map counts as
    /// blocking.
    pub fn blocks_sight(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).map_or(true, |t| t.blocks_sight())
    }

    /// Wall check, with everything outside the map treated as wall
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).map_or(true, |t| t.tile_type.is_wall())
    }

    pub fn is_closed_door(&self, x: i32, y: i32) -> bool {
        self.tile_type(x, y) == Some(TileType::DoorClosed)
    }

    /// Open a closed door, returning whether anything changed
    pub fn open_door(&mut self, x: i32, y: i32) -> bool {
        if self.is_closed_door(x, y) {
            self.set_tile(x, y, TileType::DoorOpen);
            true
        } else {
            false
        }
    }

    /// Walls among the eight neighbours of a cell
    pub fn count_adjacent_walls(&self, x: i32, y: i32) -> usize {
        NEIGHBOURS
            .iter()
            .filter(|(dx, dy)| self.is_wall(x + dx, y + dy))
            .count()
    }

    /// The room containing a position, if any
    pub fn room_at(&self, pos: Position) -> Option<&Room> {
        self.rooms.iter().find(|room| room.contains(pos))
    }

    pub fn room_index_at(&self, pos: Position) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(pos))
    }

    /// Set tile visibility
    pub fn set_visible(&mut self, x: i32, y: i32, visible: bool) {
        if let Some(tile) = self.get_tile_mut(x, y) {
            tile.visible = visible;
            if visible {
                tile.explored = true;
            }
        }
    }

    /// Clear all visibility (before recalculating FOV)
    pub fn clear_visibility(&mut self) {
        for tile in &mut self.tiles {
            tile.visible = false;
        }
    }

    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).map_or(false, |t| t.visible)
    }

    pub fn explored_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.explored).count()
    }

    /// Get all walkable positions (for spawning)
    pub fn walkable_positions(&self) -> Vec<Position> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_walkable())
            .map(|(idx, _)| {
                let (x, y) = self.idx_to_xy(idx);
                Position::new(x, y)
            })
            .collect()
    }

    /// One character per tile, one line per row
    pub fn to_ascii(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.tiles[self.xy_to_idx(x, y)].glyph())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::generation::Brightness;

    #[test]
    fn test_out_of_bounds_is_wall_and_opaque() {
        let map = Map::new(5, 5, 1, 0);
        assert!(map.is_wall(-1, 0));
        assert!(map.blocks_sight(0, 9));
        assert!(!map.is_walkable(9, 9));
        assert_eq!(map.count_adjacent_walls(0, 0), 8);
    }

    #[test]
    fn test_open_door() {
        let mut map = Map::new(5, 5, 1, 0);
        map.set_tile(2, 2, TileType::DoorClosed);
        assert!(!map.is_walkable(2, 2));
        assert!(map.open_door(2, 2));
        assert!(map.is_walkable(2, 2));
        assert!(!map.open_door(2, 2));
    }

    #[test]
    fn test_visibility_marks_explored() {
        let mut map = Map::new(5, 5, 1, 0);
        map.set_visible(1, 1, true);
        map.clear_visibility();
        assert!(!map.is_visible(1, 1));
        assert_eq!(map.explored_count(), 1);
    }

    #[test]
    fn test_room_lookup() {
        let mut map = Map::new(20, 20, 1, 0);
        map.rooms.push(Room::new(2, 2, 4, 4, Brightness::Dim));
        map.rooms.push(Room::new(10, 2, 4, 4, Brightness::Bright));
        assert_eq!(map.room_index_at(Position::new(11, 3)), Some(1));
        assert!(map.room_at(Position::new(8, 3)).is_none());
    }
}
