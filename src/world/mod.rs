//! World module
//!
//! Contains map data structures, tiles, vision, and procedural generation.

pub mod map;
pub mod tile;
pub mod fov;
pub mod generation;

pub use map::Map;
pub use tile::{Tile, TileType};
pub use fov::{has_line_of_sight, line_has_closed_door, update_visibility, vision_radius, visible_tiles, visible_tiles_soft};
pub use generation::{generate, Brightness, Room};
