//! Board coordinates and the four orthogonal directions.
//!
//! The board is a fixed rectangle of [`ROWS`] x [`COLS`] cells. Coordinates
//! are signed so that off-board neighbors can be represented and filtered,
//! rather than wrapping or panicking at the edges.

use serde::{Deserialize, Serialize};

/// Number of rows on the board.
pub const ROWS: i32 = 10;

/// Number of columns on the board.
pub const COLS: i32 = 15;

/// A cell position on the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    /// Create a new coordinate
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Whether this coordinate lies on the board
    pub const fn in_bounds(&self) -> bool {
        self.row >= 0 && self.row < ROWS && self.col >= 0 && self.col < COLS
    }

    /// The four orthogonal neighbors in Up, Down, Left, Right order.
    ///
    /// Neighbors may be off-board; callers filter with [`Coord::in_bounds`].
    pub fn neighbors(&self) -> [Coord; 4] {
        [
            Coord::new(self.row - 1, self.col),
            Coord::new(self.row + 1, self.col),
            Coord::new(self.row, self.col - 1),
            Coord::new(self.row, self.col + 1),
        ]
    }

    /// Step `n` cells in a direction
    pub const fn step(&self, direction: Direction, n: i32) -> Coord {
        let (dr, dc) = direction.offset();
        Coord::new(self.row + dr * n, self.col + dc * n)
    }
}

/// An orthogonal direction on the grid.
///
/// A tile run extends in the direction of its anchor cell relative to the
/// worker: the direction is computed once and then applied uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in Up, Down, Left, Right order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row/column delta for one step in this direction
    pub const fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Direction from one cell to an orthogonally adjacent cell.
    ///
    /// Returns `None` when the cells are not orthogonal neighbors.
    pub fn between(from: Coord, to: Coord) -> Option<Direction> {
        match (to.row - from.row, to.col - from.col) {
            (-1, 0) => Some(Direction::Up),
            (1, 0) => Some(Direction::Down),
            (0, -1) => Some(Direction::Left),
            (0, 1) => Some(Direction::Right),
            _ => None,
        }
    }
}
