//! Integer grid coordinates.

use serde::{Deserialize, Serialize};

/// Location of a single grid cell. Coordinates may be negative: the surface
/// row sits at `y = 0` with the sky above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbours in E, W, S, N order.
    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
        ]
    }

    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Squared Euclidean distance, used for ranking candidates.
    pub fn distance_squared(self, other: Cell) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Cell::new(-2, 3);
        let b = Cell::new(1, -1);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(b.manhattan_distance(a), 7);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let origin = Cell::new(0, 0);
        for n in origin.neighbors() {
            assert!(origin.is_adjacent(n));
        }
        assert!(!origin.is_adjacent(Cell::new(1, 1)));
        assert!(!origin.is_adjacent(origin));
    }

    #[test]
    fn test_distance_squared() {
        assert_eq!(Cell::new(0, 0).distance_squared(Cell::new(3, 4)), 25);
    }
}
