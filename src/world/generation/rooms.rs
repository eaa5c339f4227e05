//! Rooms
//!
//! Rectangular rooms with a brightness tier. The brightness doubles as the
//! vision radius while the player stands inside.

use serde::{Deserialize, Serialize};

use crate::combat::{weighted_choice, Dice};
use crate::entities::Position;

/// Light level of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brightness {
    Dim,
    Normal,
    Bright,
}

impl Brightness {
    /// Vision radius in tiles
    pub fn radius(&self) -> i32 {
        match self {
            Brightness::Dim => 4,
            Brightness::Normal => 6,
            Brightness::Bright => 9,
        }
    }

    /// Weighted roll: 30 % dim, 50 % normal, 20 % bright
    pub fn roll<D: Dice + ?Sized>(dice: &mut D) -> Self {
        const TABLE: [(Brightness, u32); 3] = [
            (Brightness::Dim, 30),
            (Brightness::Normal, 50),
            (Brightness::Bright, 20),
        ];
        weighted_choice(dice, &TABLE).copied().unwrap_or(Brightness::Normal)
    }
}

/// A rectangular room. `x`, `y`, `width` and `height` cover the floor
/// cells only; the surrounding wall ring is outside the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub brightness: Brightness,
}

impl Room {
    pub fn new(x: i32, y: i32, width: i32, height: i32, brightness: Brightness) -> Self {
        Self {
            x,
            y,
            width,
            height,
            brightness,
        }
    }

    pub fn x2(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn y2(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x && pos.x <= self.x2() && pos.y >= self.y && pos.y <= self.y2()
    }

    /// Cells strictly between the two rooms along x and along y. Negative
    /// when they overlap on that axis.
    pub fn gap(&self, other: &Room) -> (i32, i32) {
        let gap_x = (other.x - self.x2()).max(self.x - other.x2()) - 1;
        let gap_y = (other.y - self.y2()).max(self.y - other.y2()) - 1;
        (gap_x, gap_y)
    }

    /// Whether the two rooms are too close: no more than `padding` cells
    /// apart on both axes
    pub fn intersects(&self, other: &Room, padding: i32) -> bool {
        let (gap_x, gap_y) = self.gap(other);
        gap_x <= padding && gap_y <= padding
    }

    /// Every floor cell of the room, row by row
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (self.y..=self.y2()).flat_map(move |y| (self.x..=self.x2()).map(move |x| Position::new(x, y)))
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ScriptedDice;

    fn room(x: i32, y: i32, w: i32, h: i32) -> Room {
        Room::new(x, y, w, h, Brightness::Normal)
    }

    #[test]
    fn test_contains_and_cells() {
        let r = room(2, 3, 4, 2);
        assert!(r.contains(Position::new(2, 3)));
        assert!(r.contains(Position::new(5, 4)));
        assert!(!r.contains(Position::new(6, 4)));
        assert_eq!(r.cells().count(), 8);
        assert_eq!(r.center(), Position::new(4, 4));
    }

    #[test]
    fn test_intersects_with_padding() {
        let a = room(1, 1, 4, 4); // x 1..=4
        let b = room(6, 1, 4, 4); // x 6..=9, one wall column between
        assert!(!a.intersects(&b, 0));
        assert!(a.intersects(&b, 1));
        assert!(b.intersects(&a, 1));
        assert!(!a.intersects(&room(7, 1, 3, 3), 1));
    }

    #[test]
    fn test_intersects_matches_grown_box() {
        let a = room(10, 10, 4, 4);
        for x in 0..24 {
            for y in 0..24 {
                let b = room(x, y, 3, 3);
                // independent box test: grow `a` by padding + 1 and check overlap
                for padding in 0..4 {
                    let reach = padding + 1;
                    let too_close = a.x - reach <= b.x2()
                        && a.x2() + reach >= b.x
                        && a.y - reach <= b.y2()
                        && a.y2() + reach >= b.y;
                    assert_eq!(a.intersects(&b, padding), too_close, "{:?} pad {}", b, padding);
                    assert_eq!(b.intersects(&a, padding), too_close);
                }
            }
        }
        assert_eq!(a.gap(&room(16, 10, 2, 2)), (2, -2));
        assert_eq!(a.gap(&room(11, 11, 2, 2)), (-3, -3));
    }

    #[test]
    fn test_brightness_weights() {
        let mut dice = ScriptedDice::new([1, 30, 31, 80, 81, 100]);
        let rolls: Vec<_> = (0..6).map(|_| Brightness::roll(&mut dice)).collect();
        assert_eq!(
            rolls,
            vec![
                Brightness::Dim,
                Brightness::Dim,
                Brightness::Normal,
                Brightness::Normal,
                Brightness::Bright,
                Brightness::Bright
            ]
        );
        assert!(Brightness::Bright.radius() > Brightness::Dim.radius());
    }
}
