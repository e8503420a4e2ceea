//! Tiles and the per-game tile deck.
//!
//! Every tile belongs to one of three families and has a length of 1-3 cells.
//! The full deck is generated once at game start, shuffled, and dealt evenly;
//! tiles that do not divide evenly among the players are dropped.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The three tile families. Tiles of one family share a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileFamily {
    Railroad,
    River,
    Street,
}

impl TileFamily {
    /// All tile families
    pub const ALL: [TileFamily; 3] = [TileFamily::Railroad, TileFamily::River, TileFamily::Street];

    /// Stable lowercase name, used in tile ids
    pub fn name(&self) -> &'static str {
        match self {
            TileFamily::Railroad => "railroad",
            TileFamily::River => "river",
            TileFamily::Street => "street",
        }
    }
}

/// An immutable linear tile. Owned by one player's hand until played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub family: TileFamily,
    /// Number of cells the tile covers (1-3)
    pub length: u8,
    /// Unique per game, e.g. "river-3-0"
    pub id: String,
}

impl Tile {
    /// Create a new tile with the deck's id convention
    pub fn new(family: TileFamily, length: u8, index: usize) -> Self {
        Self {
            family,
            length,
            id: format!("{}-{}-{}", family.name(), length, index),
        }
    }
}

/// How many tiles of each length to generate per family.
#[derive(Debug, Clone, Copy)]
struct DeckCounts {
    triple: usize,
    double: usize,
    single: usize,
}

impl DeckCounts {
    /// Counts scale down with player count so hands stay comparable in size
    fn for_players(player_count: usize) -> Self {
        match player_count {
            2 => Self {
                triple: 6,
                double: 12,
                single: 12,
            },
            3 => Self {
                triple: 4,
                double: 8,
                single: 8,
            },
            _ => Self {
                triple: 3,
                double: 6,
                single: 6,
            },
        }
    }
}

/// Generate and shuffle the full tile deck for a game.
pub fn shuffled_deck<R: Rng>(player_count: usize, rng: &mut R) -> Vec<Tile> {
    let counts = DeckCounts::for_players(player_count);
    let per_family = counts.triple + counts.double + counts.single;
    let mut deck = Vec::with_capacity(per_family * TileFamily::ALL.len());

    for family in TileFamily::ALL {
        for i in 0..counts.triple {
            deck.push(Tile::new(family, 3, i));
        }
        for i in 0..counts.double {
            deck.push(Tile::new(family, 2, i));
        }
        for i in 0..counts.single {
            deck.push(Tile::new(family, 1, i));
        }
    }

    deck.shuffle(rng);
    deck
}

/// Split a shuffled deck into one hand per player.
///
/// Each hand receives `deck.len() / player_count` tiles; any remainder is
/// discarded rather than redistributed.
pub fn deal(deck: Vec<Tile>, player_count: usize) -> Vec<Vec<Tile>> {
    let per_player = deck.len() / player_count;
    let mut hands: Vec<Vec<Tile>> = (0..player_count)
        .map(|_| Vec::with_capacity(per_player))
        .collect();
    if per_player == 0 {
        return hands;
    }

    for (i, tile) in deck.into_iter().enumerate() {
        let player = i / per_player;
        if player < player_count {
            hands[player].push(tile);
        }
    }

    hands
}
