//! Game board representation: the cell grid, buildings, outhouses, and the
//! worker markers.
//!
//! The layout is fixed: six sites per building type and eight outhouses at
//! hardcoded coordinates. Cells are only ever written once by play - a placed
//! tile permanently covers whatever was underneath it.

use crate::grid::{Coord, COLS, ROWS};
use crate::tile::TileFamily;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The six building types. Each player secretly protects one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    GeneralStore,
    Saloon,
    Jail,
    Bank,
    School,
    Stable,
}

impl BuildingType {
    /// All building types
    pub const ALL: [BuildingType; 6] = [
        BuildingType::GeneralStore,
        BuildingType::Saloon,
        BuildingType::Jail,
        BuildingType::Bank,
        BuildingType::School,
        BuildingType::Stable,
    ];

    /// Display name for UI rendering
    pub fn display_name(&self) -> &'static str {
        match self {
            BuildingType::GeneralStore => "General Store",
            BuildingType::Saloon => "Saloon",
            BuildingType::Jail => "Jail",
            BuildingType::Bank => "Bank",
            BuildingType::School => "School",
            BuildingType::Stable => "Stable",
        }
    }
}

/// Contents of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Cell {
    /// Nothing here yet
    #[default]
    Empty,
    /// A scoring building; covered permanently if a tile is placed over it
    Building { building: BuildingType, value: u32 },
    /// Covering an outhouse triggers a group vote
    Outhouse,
    /// A placed tile; final, never cleared
    Tile { family: TileFamily },
}

impl Cell {
    /// Whether a tile has been placed here
    pub fn is_tile(&self) -> bool {
        matches!(self, Cell::Tile { .. })
    }
}

/// Errors from board mutation
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("Coordinate ({row}, {col}) is off the board")]
    OutOfBounds { row: i32, col: i32 },
}

/// Fixed building sites: (row, col, value), six per type.
const BUILDING_SITES: [(BuildingType, [(i32, i32, u32); 6]); 6] = [
    (
        BuildingType::GeneralStore,
        [(1, 2, 1), (8, 3, 1), (2, 7, 2), (7, 11, 3), (4, 7, 4), (5, 8, 5)],
    ),
    (
        BuildingType::Saloon,
        [(2, 1, 1), (1, 12, 2), (8, 13, 1), (3, 8, 3), (6, 6, 4), (5, 7, 5)],
    ),
    (
        BuildingType::Jail,
        [(8, 1, 1), (7, 2, 2), (1, 10, 1), (2, 11, 3), (4, 9, 4), (6, 8, 5)],
    ),
    (
        BuildingType::Bank,
        [(3, 2, 2), (8, 11, 1), (1, 6, 3), (7, 8, 4), (5, 6, 5), (4, 8, 4)],
    ),
    (
        BuildingType::School,
        [(2, 13, 1), (7, 1, 2), (8, 8, 3), (3, 6, 4), (5, 9, 5), (6, 7, 4)],
    ),
    (
        BuildingType::Stable,
        [(1, 1, 1), (8, 12, 2), (2, 9, 1), (7, 7, 3), (4, 6, 4), (6, 9, 5)],
    ),
];

/// Fixed outhouse coordinates. A site already holding a building is skipped.
const OUTHOUSE_SITES: [(i32, i32); 8] = [
    (3, 4),
    (6, 3),
    (2, 8),
    (7, 9),
    (4, 11),
    (5, 5),
    (1, 14),
    (8, 6),
];

/// The game board: a fixed ROWS x COLS grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Row-major cell storage, ROWS * COLS entries
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::Empty; (ROWS * COLS) as usize],
        }
    }

    /// Create the standard board with all buildings and outhouses placed.
    ///
    /// Construction is deterministic; only secret-building assignment and
    /// tile dealing are randomized at game start.
    pub fn standard() -> Self {
        let mut board = Self::new();

        for (building, sites) in BUILDING_SITES {
            for (row, col, value) in sites {
                let coord = Coord::new(row, col);
                if let Some(idx) = board.index(coord) {
                    board.cells[idx] = Cell::Building { building, value };
                }
            }
        }

        for (row, col) in OUTHOUSE_SITES {
            let coord = Coord::new(row, col);
            if let Some(idx) = board.index(coord) {
                if board.cells[idx] == Cell::Empty {
                    board.cells[idx] = Cell::Outhouse;
                }
            }
        }

        board
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.in_bounds() {
            Some((coord.row * COLS + coord.col) as usize)
        } else {
            None
        }
    }

    /// Cell contents at a coordinate; `None` when off-board
    pub fn cell(&self, coord: Coord) -> Option<Cell> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    /// Whether a tile occupies this cell. Off-board coordinates are not tiles.
    pub fn has_tile(&self, coord: Coord) -> bool {
        matches!(self.cell(coord), Some(cell) if cell.is_tile())
    }

    /// Write a placed tile into a cell, covering whatever was there.
    ///
    /// Occupancy rules live in the move validator; this layer only rejects
    /// off-board coordinates.
    pub fn occupy(&mut self, coord: Coord, family: TileFamily) -> Result<(), BoardError> {
        let idx = self.index(coord).ok_or(BoardError::OutOfBounds {
            row: coord.row,
            col: coord.col,
        })?;
        self.cells[idx] = Cell::Tile { family };
        Ok(())
    }

    /// Whether every orthogonal neighbor of a cell is covered by a tile.
    ///
    /// Off-board neighbors count as covered: a worker in a corner needs only
    /// its two on-board neighbors tiled to be boxed in.
    pub fn is_boxed_in(&self, coord: Coord) -> bool {
        coord
            .neighbors()
            .iter()
            .all(|&n| !n.in_bounds() || self.has_tile(n))
    }

    /// Total building value still uncovered for one building type
    pub fn uncovered_value(&self, building_type: BuildingType) -> u32 {
        self.cells
            .iter()
            .map(|cell| match cell {
                Cell::Building { building, value } if *building == building_type => *value,
                _ => 0,
            })
            .sum()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// A worker marker that tile placements push across the board.
///
/// Exactly four exist per game: two railroad, one river, one street. A worker
/// retires permanently once boxed in at the end of its own move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub family: TileFamily,
    pub position: Coord,
    pub active: bool,
}

impl Worker {
    /// The four starting workers, one per board corner
    pub fn starting_set() -> Vec<Worker> {
        [
            (TileFamily::Railroad, Coord::new(9, 0)),
            (TileFamily::Railroad, Coord::new(0, 14)),
            (TileFamily::River, Coord::new(0, 0)),
            (TileFamily::Street, Coord::new(9, 14)),
        ]
        .into_iter()
        .map(|(family, position)| Worker {
            family,
            position,
            active: true,
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board_building_counts() {
        let board = Board::standard();
        for building_type in BuildingType::ALL {
            let count = (0..ROWS)
                .flat_map(|r| (0..COLS).map(move |c| Coord::new(r, c)))
                .filter(|&coord| {
                    matches!(
                        board.cell(coord),
                        Some(Cell::Building { building, .. }) if building == building_type
                    )
                })
                .count();
            assert_eq!(count, 6, "{:?} should have 6 sites", building_type);
        }
    }

    #[test]
    fn test_standard_board_outhouses() {
        let board = Board::standard();
        let count = (0..ROWS)
            .flat_map(|r| (0..COLS).map(move |c| Coord::new(r, c)))
            .filter(|&coord| board.cell(coord) == Some(Cell::Outhouse))
            .count();
        // No outhouse site collides with a building in the standard layout
        assert_eq!(count, 8);
    }

    #[test]
    fn test_occupy_overwrites_and_bounds() {
        let mut board = Board::standard();

        // Covers a building without complaint
        let site = Coord::new(1, 2);
        assert!(matches!(board.cell(site), Some(Cell::Building { .. })));
        board.occupy(site, TileFamily::Street).unwrap();
        assert_eq!(
            board.cell(site),
            Some(Cell::Tile {
                family: TileFamily::Street
            })
        );

        // Off-board fails
        assert!(matches!(
            board.occupy(Coord::new(10, 0), TileFamily::River),
            Err(BoardError::OutOfBounds { row: 10, col: 0 })
        ));
    }

    #[test]
    fn test_uncovered_value_drops_when_covered() {
        let mut board = Board::standard();
        let before = board.uncovered_value(BuildingType::Stable);
        assert_eq!(before, 1 + 2 + 1 + 3 + 4 + 5);

        // Cover the value-5 stable at (6, 9)
        board.occupy(Coord::new(6, 9), TileFamily::Railroad).unwrap();
        assert_eq!(board.uncovered_value(BuildingType::Stable), before - 5);
    }

    #[test]
    fn test_boxed_in_corner() {
        let mut board = Board::new();
        let corner = Coord::new(0, 0);
        assert!(!board.is_boxed_in(corner));

        board.occupy(Coord::new(0, 1), TileFamily::River).unwrap();
        assert!(!board.is_boxed_in(corner));

        board.occupy(Coord::new(1, 0), TileFamily::River).unwrap();
        // Both on-board neighbors tiled; off-board ones count as covered
        assert!(board.is_boxed_in(corner));
    }

    #[test]
    fn test_starting_workers() {
        let workers = Worker::starting_set();
        assert_eq!(workers.len(), 4);
        assert!(workers.iter().all(|w| w.active));
        assert_eq!(
            workers
                .iter()
                .filter(|w| w.family == TileFamily::Railroad)
                .count(),
            2
        );
        assert!(workers.iter().all(|w| w.position.in_bounds()));
    }
}
