//! Wacky West - a frontier-town tile placement game engine
//!
//! This crate provides the core rules for Wacky West, including:
//! - The fixed 10x15 board of buildings, outhouses, and placed tiles
//! - Worker markers that tile placements push across the board
//! - Move validation and placement resolution
//! - The outhouse demolition vote sub-protocol
//! - Turn/phase management, end-of-game detection, and scoring
//!
//! # Architecture
//!
//! The engine is a synchronous, single-threaded state machine: every player
//! action is one atomic transition over a `GameState` aggregate, and every
//! rejected action leaves the aggregate untouched. Persistence and transport
//! live outside the engine behind the [`store::GameStore`] contract.
//!
//! # Modules
//!
//! - [`grid`]: Board coordinates and orthogonal directions
//! - [`board`]: The cell grid, fixed layout, and worker markers
//! - [`tile`]: Tile families and deck generation
//! - [`player`]: Player state, identity tokens, and vote cards
//! - [`moves`]: Legal-placement computation
//! - [`game`]: The game state machine
//! - [`store`]: Persistence interface and poll contract

pub mod board;
pub mod game;
pub mod grid;
pub mod moves;
pub mod player;
pub mod store;
pub mod tile;

// Re-export commonly used types
pub use board::{Board, BoardError, BuildingType, Cell, Worker};
pub use game::{
    CastVote, GameAction, GameError, GameEvent, GameId, GamePhase, GameState, PlayerScore,
    VotingTile, MAX_PLAYERS, MIN_PLAYERS,
};
pub use grid::{Coord, Direction, COLS, ROWS};
pub use moves::{valid_placements, Placement};
pub use player::{Player, PlayerId, VoteCard, VoteKind};
pub use store::{GameStore, MemoryStore, StoreError};
pub use tile::{Tile, TileFamily};
