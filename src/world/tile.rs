//! Tile definitions
//!
//! Different tile types and their properties.

use serde::{Deserialize, Serialize};

/// A single tile in the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    pub explored: bool,
    pub visible: bool,
}

impl Tile {
    pub fn new(tile_type: TileType) -> Self {
        Self {
            tile_type,
            explored: false,
            visible: false,
        }
    }

    pub fn is_walkable(&self) -> bool {
        self.tile_type.is_walkable()
    }

    pub fn blocks_sight(&self) -> bool {
        self.tile_type.blocks_sight()
    }

    pub fn glyph(&self) -> char {
        self.tile_type.glyph()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::new(TileType::Wall)
    }
}

/// Types of tiles in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Floor,
    Wall,
    /// Floor carved by a corridor outside any room
    Corridor,
    DoorClosed,
    DoorOpen,
    StairsDown,
    /// Room furniture. Never walkable; some obstacles can be seen over.
    Obstacle { transparent: bool },
}

impl TileType {
    pub fn is_walkable(&self) -> bool {
        matches!(
            self,
            TileType::Floor | TileType::Corridor | TileType::DoorOpen | TileType::StairsDown
        )
    }

    pub fn blocks_sight(&self) -> bool {
        matches!(
            self,
            TileType::Wall | TileType::DoorClosed | TileType::Obstacle { transparent: false }
        )
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, TileType::Wall)
    }

    pub fn glyph(&self) -> char {
        match self {
            TileType::Floor => '.',
            TileType::Wall => '#',
            TileType::Corridor => ',',
            TileType::DoorClosed => '+',
            TileType::DoorOpen => '/',
            TileType::StairsDown => '>',
            TileType::Obstacle { transparent: true } => 'o',
            TileType::Obstacle { transparent: false } => 'O',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_properties() {
        assert!(TileType::Floor.is_walkable());
        assert!(TileType::DoorOpen.is_walkable());
        assert!(!TileType::DoorClosed.is_walkable());
        assert!(TileType::DoorClosed.blocks_sight());
        assert!(!TileType::DoorOpen.blocks_sight());
    }

    #[test]
    fn test_obstacles() {
        let low = TileType::Obstacle { transparent: true };
        let tall = TileType::Obstacle { transparent: false };
        assert!(!low.is_walkable() && !tall.is_walkable());
        assert!(!low.blocks_sight());
        assert!(tall.blocks_sight());
        assert!(!tall.is_wall());
    }
}
