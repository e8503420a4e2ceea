//! Player state, identity tokens, and vote cards.
//!
//! Each player holds a hand of tiles, one secret building assignment, and a
//! fixed set of eight vote cards. Vote cards other than the question card are
//! single-use for the whole game.

use crate::board::BuildingType;
use crate::tile::Tile;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque player token, generated at join time and unique within a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    const LEN: usize = 8;

    /// Generate a fresh random token
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let token: String = rng
            .sample_iter(&Alphanumeric)
            .take(Self::LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four kinds of vote card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteKind {
    /// Adds its weight to the yes total
    Yes,
    /// Adds its weight to the no total
    No,
    /// Adds a fixed bonus to whichever side is trailing when tallied
    Joker,
    /// Contributes nothing and is never consumed
    Question,
}

/// One vote card in a player's set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCard {
    /// Stable id within a player's set, e.g. "yes-2"
    pub id: String,
    pub kind: VoteKind,
    /// Vote weight; the joker's listed weight is unused in the tally
    pub weight: u32,
    /// Whether this card has been spent in an earlier vote
    pub used: bool,
}

impl VoteCard {
    fn new(id: &str, kind: VoteKind, weight: u32) -> Self {
        Self {
            id: id.to_string(),
            kind,
            weight,
            used: false,
        }
    }

    /// Whether submitting this card marks it used (question cards are reusable)
    pub fn is_consumable(&self) -> bool {
        !matches!(self.kind, VoteKind::Question)
    }

    /// The eight cards every player starts with
    pub fn standard_set() -> Vec<VoteCard> {
        vec![
            VoteCard::new("yes-1", VoteKind::Yes, 1),
            VoteCard::new("yes-2", VoteKind::Yes, 2),
            VoteCard::new("yes-3", VoteKind::Yes, 3),
            VoteCard::new("no-1", VoteKind::No, 1),
            VoteCard::new("no-2", VoteKind::No, 2),
            VoteCard::new("no-3", VoteKind::No, 3),
            VoteCard::new("joker", VoteKind::Joker, 2),
            VoteCard::new("question", VoteKind::Question, 0),
        ]
    }
}

/// A single player's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Secret building assignment; `None` until the game starts
    pub secret_building: Option<BuildingType>,
    /// Tiles still in hand, in dealt order
    pub hand: Vec<Tile>,
    /// This player's vote cards
    pub vote_cards: Vec<VoteCard>,
    /// Set once the game starts
    pub ready: bool,
}

impl Player {
    /// Create a new player with a full vote-card set and an empty hand
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            secret_building: None,
            hand: Vec::new(),
            vote_cards: VoteCard::standard_set(),
            ready: false,
        }
    }

    /// Find a tile in hand by id
    pub fn tile_in_hand(&self, tile_id: &str) -> Option<&Tile> {
        self.hand.iter().find(|t| t.id == tile_id)
    }

    /// Remove a tile from hand by id; returns whether it was present
    pub fn discard_tile(&mut self, tile_id: &str) -> bool {
        let before = self.hand.len();
        self.hand.retain(|t| t.id != tile_id);
        self.hand.len() < before
    }

    /// Find a vote card by id
    pub fn vote_card(&self, card_id: &str) -> Option<&VoteCard> {
        self.vote_cards.iter().find(|c| c.id == card_id)
    }

    /// Mark a vote card used (no-op for the question card)
    pub fn spend_vote_card(&mut self, card_id: &str) {
        if let Some(card) = self.vote_cards.iter_mut().find(|c| c.id == card_id) {
            if card.is_consumable() {
                card.used = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_vote_set() {
        let cards = VoteCard::standard_set();
        assert_eq!(cards.len(), 8);

        let yes_weights: Vec<u32> = cards
            .iter()
            .filter(|c| c.kind == VoteKind::Yes)
            .map(|c| c.weight)
            .collect();
        assert_eq!(yes_weights, vec![1, 2, 3]);

        let no_weights: Vec<u32> = cards
            .iter()
            .filter(|c| c.kind == VoteKind::No)
            .map(|c| c.weight)
            .collect();
        assert_eq!(no_weights, vec![1, 2, 3]);

        assert!(cards.iter().all(|c| !c.used));
        assert_eq!(
            cards.iter().filter(|c| c.kind == VoteKind::Joker).count(),
            1
        );
        assert_eq!(
            cards
                .iter()
                .filter(|c| c.kind == VoteKind::Question)
                .count(),
            1
        );
    }

    #[test]
    fn test_question_card_never_spent() {
        let mut rng = rand::thread_rng();
        let mut player = Player::new(PlayerId::generate(&mut rng), "Tex".to_string());

        player.spend_vote_card("question");
        assert!(!player.vote_card("question").unwrap().used);

        player.spend_vote_card("no-3");
        assert!(player.vote_card("no-3").unwrap().used);
    }

    #[test]
    fn test_discard_tile() {
        use crate::tile::{Tile, TileFamily};

        let mut rng = rand::thread_rng();
        let mut player = Player::new(PlayerId::generate(&mut rng), "Tex".to_string());
        player.hand.push(Tile::new(TileFamily::River, 2, 0));

        assert!(player.tile_in_hand("river-2-0").is_some());
        assert!(player.discard_tile("river-2-0"));
        assert!(player.hand.is_empty());
        assert!(!player.discard_tile("river-2-0"));
    }

    #[test]
    fn test_player_id_token_shape() {
        let mut rng = rand::thread_rng();
        let id = PlayerId::generate(&mut rng);
        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
