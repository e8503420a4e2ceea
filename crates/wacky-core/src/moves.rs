//! Move validation: which placements are legal for a tile right now.
//!
//! A tile anchors on one of the four cells orthogonally adjacent to its
//! family's worker and extends away from the worker, one direction, one cell
//! per unit of length. Buildings and outhouses are legal targets; cells
//! already holding a placed tile are not.

use crate::board::{Board, Worker};
use crate::grid::{Coord, Direction};
use crate::tile::Tile;
use serde::{Deserialize, Serialize};

/// One legal placement: the anchor cell plus the full run the tile covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// The cell adjacent to the worker where the tile starts
    pub anchor: Coord,
    /// Every cell the tile will occupy, anchor first, far end last
    pub cells: Vec<Coord>,
}

impl Placement {
    /// The cell the worker ends on after this placement resolves
    pub fn far_end(&self) -> Coord {
        *self.cells.last().unwrap_or(&self.anchor)
    }
}

/// The worker a tile of this family would move: the first active worker of
/// the matching family. The second railroad worker only engages once the
/// first has retired.
pub fn worker_for_tile<'a>(tile: &Tile, workers: &'a [Worker]) -> Option<&'a Worker> {
    workers.iter().find(|w| w.active && w.family == tile.family)
}

/// Compute the run a tile would occupy from an anchor, extending away from
/// the worker. Returns `None` if any cell falls off-board or on a placed tile.
fn run_from(board: &Board, tile: &Tile, worker_pos: Coord, anchor: Coord) -> Option<Vec<Coord>> {
    let direction = Direction::between(worker_pos, anchor)?;
    let mut cells = Vec::with_capacity(tile.length as usize);

    for i in 0..tile.length as i32 {
        let cell = anchor.step(direction, i);
        if !cell.in_bounds() || board.has_tile(cell) {
            return None;
        }
        cells.push(cell);
    }

    Some(cells)
}

/// All legal placements for a tile given the current worker set and board.
///
/// Returns an empty set when the family's workers have all retired.
pub fn valid_placements(tile: &Tile, workers: &[Worker], board: &Board) -> Vec<Placement> {
    let worker = match worker_for_tile(tile, workers) {
        Some(w) => w,
        None => return Vec::new(),
    };

    worker
        .position
        .neighbors()
        .into_iter()
        .filter_map(|anchor| {
            let cells = run_from(board, tile, worker.position, anchor)?;
            Some(Placement { anchor, cells })
        })
        .collect()
}
