//! Core game state machine.
//!
//! This module contains the `GameState` aggregate and all rule enforcement:
//! join/start, tile placement, the outhouse vote sub-protocol, turn
//! advancement, end-of-game detection, and scoring.

use crate::board::{Board, BoardError, BuildingType, Cell, Worker};
use crate::grid::Coord;
use crate::moves::{self, Placement};
use crate::player::{Player, PlayerId, VoteCard, VoteKind};
use crate::tile::{self, Tile, TileFamily};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use thiserror::Error;

/// Minimum players needed to start
pub const MIN_PLAYERS: usize = 2;

/// Maximum players in one game
pub const MAX_PLAYERS: usize = 4;

/// Fixed bonus a joker card adds to the trailing side of a vote
const JOKER_BONUS: u32 = 2;

const GAME_ID_LEN: usize = 6;
const GAME_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Human-shareable game code: six uppercase alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(String);

impl GameId {
    /// Generate a fresh random game code
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let code: String = (0..GAME_ID_LEN)
            .map(|_| GAME_ID_CHARSET[rng.gen_range(0..GAME_ID_CHARSET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parse a user-entered code, normalizing case
    pub fn parse(input: &str) -> Result<Self, GameError> {
        let code = input.trim().to_ascii_uppercase();
        let valid = code.len() == GAME_ID_LEN
            && code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if valid {
            Ok(Self(code))
        } else {
            Err(GameError::InvalidGameId(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Lobby: accepts joins until the game starts
    Waiting,
    /// Normal play: one placement attempt per turn, current player only
    Playing,
    /// A pending placement covers an outhouse; collecting one card per player
    Voting,
    /// Terminal; only scoring queries are meaningful
    Ended,
}

/// Errors that can occur when applying actions.
///
/// Every rejection leaves the aggregate unchanged and playable.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Game is full")]
    GameFull,

    #[error("Game already started")]
    AlreadyStarted,

    #[error("Not enough players")]
    NotEnoughPlayers,

    #[error("No such player in this game")]
    UnknownPlayer,

    #[error("Tile is not in your hand")]
    TileNotInHand,

    #[error("Illegal placement")]
    IllegalPlacement,

    #[error("Already voted in this episode")]
    DuplicateVote,

    #[error("No such vote card")]
    NoSuchCard,

    #[error("Vote card already used")]
    CardAlreadyUsed,

    #[error("'{0}' is not a valid game code")]
    InvalidGameId(String),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// All actions a player can take once the game is running
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Place a tile from hand, anchored at (row, col)
    PlaceTile {
        tile_id: String,
        row: i32,
        col: i32,
    },
    /// Submit one vote card during a voting episode
    SubmitVote { card_id: String },
}

/// A player's final score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player: PlayerId,
    pub name: String,
    pub score: u32,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A tile placement resolved
    TilePlaced {
        player: PlayerId,
        family: TileFamily,
        cells: Vec<Coord>,
    },

    /// A worker was boxed in and permanently retired
    WorkerRetired {
        family: TileFamily,
        position: Coord,
    },

    /// The turn passed to the next player
    TurnEnded { next_player_index: usize },

    /// A pending placement covers an outhouse; a vote is now open
    VoteCalled { player: PlayerId, anchor: Coord },

    /// A player submitted a vote card
    VoteCast { player: PlayerId },

    /// All votes are in and the episode resolved
    VoteResolved {
        approved: bool,
        yes_total: u32,
        no_total: u32,
    },

    /// The game reached its end condition
    GameEnded { ranking: Vec<PlayerScore> },
}

/// The move suspended while a vote is in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingTile {
    pub tile: Tile,
    pub anchor: Coord,
    pub proposed_by: PlayerId,
}

/// One submitted vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
    pub player: PlayerId,
    pub card: VoteCard,
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Shareable game code
    pub id: GameId,
    /// All players in join order (fixed once the game starts)
    pub players: Vec<Player>,
    /// The game board
    pub board: Board,
    /// The four worker markers
    pub workers: Vec<Worker>,
    /// Index into `players` of whoever moves next
    pub current_player: usize,
    /// Current game phase
    pub phase: GamePhase,
    /// The suspended move while `phase == Voting`
    pub voting_tile: Option<VotingTile>,
    /// Votes submitted for the current episode, in arrival order
    pub votes: Vec<CastVote>,
    /// Resolved placements so far
    pub turn_number: u32,
    /// Monotonic save stamp; refreshed by the persistence layer
    pub last_update: u64,
}

impl GameState {
    /// Create a new game lobby with no players
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            players: Vec::new(),
            board: Board::standard(),
            workers: Worker::starting_set(),
            current_player: 0,
            phase: GamePhase::Waiting,
            voting_tile: None,
            votes: Vec::new(),
            turn_number: 0,
            last_update: 0,
        }
    }

    /// Number of players in the game
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Look up a player by id
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn player_index(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    /// Check if the game has reached its terminal phase
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    /// Refresh the save stamp, keeping it strictly increasing
    pub fn touch(&mut self, stamp: u64) {
        self.last_update = stamp.max(self.last_update + 1);
    }

    /// Add a player to the lobby, returning their new token.
    ///
    /// Rejected once the game has started or when four players are present.
    pub fn join(&mut self, name: impl Into<String>) -> Result<PlayerId, GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::GameFull);
        }

        let mut rng = rand::thread_rng();
        let mut id = PlayerId::generate(&mut rng);
        while self.player(&id).is_some() {
            id = PlayerId::generate(&mut rng);
        }

        self.players.push(Player::new(id.clone(), name.into()));
        Ok(id)
    }

    /// Start the game: assign secret buildings, deal tiles, begin play
    pub fn start(&mut self) -> Result<(), GameError> {
        let mut rng = rand::thread_rng();
        self.start_with_rng(&mut rng)
    }

    /// Start the game with a provided RNG, for deterministic setups
    pub fn start_with_rng<R: Rng>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        // One secret building per player; unassigned types get no owner
        let mut buildings = BuildingType::ALL.to_vec();
        buildings.shuffle(rng);

        let deck = tile::shuffled_deck(self.players.len(), rng);
        let hands = tile::deal(deck, self.players.len());

        for ((player, building), hand) in self.players.iter_mut().zip(buildings).zip(hands) {
            player.secret_building = Some(building);
            player.hand = hand;
            player.ready = true;
        }

        self.phase = GamePhase::Playing;
        Ok(())
    }

    /// All legal placements for a tile against the current board and workers
    pub fn legal_placements(&self, tile: &Tile) -> Vec<Placement> {
        moves::valid_placements(tile, &self.workers, &self.board)
    }

    /// Get all currently valid actions for a player
    pub fn valid_actions(&self, player: &PlayerId) -> Vec<GameAction> {
        let idx = match self.player_index(player) {
            Some(i) => i,
            None => return Vec::new(),
        };

        match self.phase {
            GamePhase::Waiting | GamePhase::Ended => Vec::new(),

            GamePhase::Playing => {
                if idx != self.current_player {
                    return Vec::new();
                }
                let mut actions = Vec::new();
                for tile in &self.players[idx].hand {
                    for placement in self.legal_placements(tile) {
                        actions.push(GameAction::PlaceTile {
                            tile_id: tile.id.clone(),
                            row: placement.anchor.row,
                            col: placement.anchor.col,
                        });
                    }
                }
                actions
            }

            GamePhase::Voting => {
                if self.votes.iter().any(|v| &v.player == player) {
                    return Vec::new();
                }
                self.players[idx]
                    .vote_cards
                    .iter()
                    .filter(|c| !c.used)
                    .map(|c| GameAction::SubmitVote {
                        card_id: c.id.clone(),
                    })
                    .collect()
            }
        }
    }

    /// Apply an action to the game state.
    ///
    /// Validation happens before any mutation: an `Err` means the state is
    /// exactly as it was.
    pub fn apply_action(
        &mut self,
        actor: &PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        let player_idx = self.player_index(actor).ok_or(GameError::UnknownPlayer)?;
        let mut events = Vec::new();

        match action {
            GameAction::PlaceTile { tile_id, row, col } => {
                if self.phase != GamePhase::Playing {
                    return Err(GameError::InvalidPhase);
                }
                if player_idx != self.current_player {
                    return Err(GameError::NotYourTurn);
                }

                let tile = self.players[player_idx]
                    .tile_in_hand(&tile_id)
                    .cloned()
                    .ok_or(GameError::TileNotInHand)?;

                let anchor = Coord::new(row, col);
                let placement = self
                    .legal_placements(&tile)
                    .into_iter()
                    .find(|p| p.anchor == anchor)
                    .ok_or(GameError::IllegalPlacement)?;

                let covers_outhouse = placement
                    .cells
                    .iter()
                    .any(|&c| self.board.cell(c) == Some(Cell::Outhouse));

                if covers_outhouse {
                    // Suspend the move and open a voting episode
                    self.phase = GamePhase::Voting;
                    self.voting_tile = Some(VotingTile {
                        tile,
                        anchor,
                        proposed_by: actor.clone(),
                    });
                    self.votes.clear();
                    events.push(GameEvent::VoteCalled {
                        player: actor.clone(),
                        anchor,
                    });
                } else {
                    self.resolve_placement(player_idx, &tile, &placement, &mut events)?;
                }
            }

            GameAction::SubmitVote { card_id } => {
                if self.phase != GamePhase::Voting {
                    return Err(GameError::InvalidPhase);
                }
                if self.votes.iter().any(|v| &v.player == actor) {
                    return Err(GameError::DuplicateVote);
                }

                let card = self.players[player_idx]
                    .vote_card(&card_id)
                    .cloned()
                    .ok_or(GameError::NoSuchCard)?;
                if card.used {
                    return Err(GameError::CardAlreadyUsed);
                }

                self.players[player_idx].spend_vote_card(&card_id);
                self.votes.push(CastVote {
                    player: actor.clone(),
                    card,
                });
                events.push(GameEvent::VoteCast {
                    player: actor.clone(),
                });

                if self.votes.len() == self.players.len() {
                    self.resolve_vote(&mut events)?;
                }
            }
        }

        Ok(events)
    }

    /// Commit a validated placement: write the run, push the worker, discard
    /// the tile, advance the turn, and check for game end.
    fn resolve_placement(
        &mut self,
        player_idx: usize,
        tile: &Tile,
        placement: &Placement,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        for &cell in &placement.cells {
            self.board.occupy(cell, tile.family)?;
        }

        events.push(GameEvent::TilePlaced {
            player: self.players[player_idx].id.clone(),
            family: tile.family,
            cells: placement.cells.clone(),
        });

        let far_end = placement.far_end();
        if let Some(worker) = self
            .workers
            .iter_mut()
            .find(|w| w.active && w.family == tile.family)
        {
            worker.position = far_end;
            if self.board.is_boxed_in(far_end) {
                worker.active = false;
                events.push(GameEvent::WorkerRetired {
                    family: tile.family,
                    position: far_end,
                });
            }
        }

        self.players[player_idx].discard_tile(&tile.id);

        self.current_player = (self.current_player + 1) % self.players.len();
        self.turn_number += 1;
        events.push(GameEvent::TurnEnded {
            next_player_index: self.current_player,
        });

        let hands_empty = self.players.iter().all(|p| p.hand.is_empty());
        let workers_done = self.workers.iter().all(|w| !w.active);
        if hands_empty || workers_done {
            self.phase = GamePhase::Ended;
            events.push(GameEvent::GameEnded {
                ranking: self.ranking(),
            });
        }

        Ok(())
    }

    /// Tally the completed vote and either commit or abandon the move
    fn resolve_vote(&mut self, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        let mut yes_total = 0;
        let mut no_total = 0;
        for vote in &self.votes {
            match vote.card.kind {
                VoteKind::Yes => yes_total += vote.card.weight,
                VoteKind::No => no_total += vote.card.weight,
                VoteKind::Joker | VoteKind::Question => {}
            }
        }

        // Each joker pads whichever side trails at this point in the tally,
        // so later jokers see the effect of earlier ones
        for vote in &self.votes {
            if vote.card.kind == VoteKind::Joker {
                if yes_total > no_total {
                    no_total += JOKER_BONUS;
                } else {
                    yes_total += JOKER_BONUS;
                }
            }
        }

        let approved = yes_total > no_total;
        let voting = self.voting_tile.take().ok_or(GameError::InvalidPhase)?;

        events.push(GameEvent::VoteResolved {
            approved,
            yes_total,
            no_total,
        });

        if approved {
            let proposer_idx = self
                .player_index(&voting.proposed_by)
                .ok_or(GameError::UnknownPlayer)?;
            let placement = self
                .legal_placements(&voting.tile)
                .into_iter()
                .find(|p| p.anchor == voting.anchor)
                .ok_or(GameError::IllegalPlacement)?;
            self.resolve_placement(proposer_idx, &voting.tile, &placement, events)?;
        } else {
            // Move abandoned; the tile stays in hand and the turn passes
            self.current_player = (self.current_player + 1) % self.players.len();
        }

        self.votes.clear();
        if self.phase != GamePhase::Ended {
            self.phase = GamePhase::Playing;
        }
        Ok(())
    }

    /// Final ranking; only meaningful once the game has ended
    pub fn final_scores(&self) -> Result<Vec<PlayerScore>, GameError> {
        if self.phase != GamePhase::Ended {
            return Err(GameError::InvalidPhase);
        }
        Ok(self.ranking())
    }

    /// Score every player and sort descending. The sort is stable, so ties
    /// keep join order.
    fn ranking(&self) -> Vec<PlayerScore> {
        let mut scores: Vec<PlayerScore> = self
            .players
            .iter()
            .map(|p| PlayerScore {
                player: p.id.clone(),
                name: p.name.clone(),
                score: p
                    .secret_building
                    .map(|b| self.board.uncovered_value(b))
                    .unwrap_or(0),
            })
            .collect();
        scores.sort_by_key(|s| Reverse(s.score));
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_player_game() -> (GameState, PlayerId, PlayerId) {
        let mut game = GameState::new(GameId::parse("TEST01").unwrap());
        let alice = game.join("Alice").unwrap();
        let bob = game.join("Bob").unwrap();
        game.start().unwrap();
        (game, alice, bob)
    }

    #[test]
    fn test_new_game_waits_for_players() {
        let game = GameState::new(GameId::parse("abc123").unwrap());
        assert_eq!(game.phase, GamePhase::Waiting);
        assert_eq!(game.player_count(), 0);
        assert_eq!(game.id.as_str(), "ABC123");
    }

    #[test]
    fn test_game_id_validation() {
        assert!(GameId::parse("QX7P2A").is_ok());
        assert!(GameId::parse(" qx7p2a ").is_ok());
        assert!(matches!(
            GameId::parse("TOOLONG"),
            Err(GameError::InvalidGameId(_))
        ));
        assert!(matches!(
            GameId::parse("AB-12"),
            Err(GameError::InvalidGameId(_))
        ));
    }

    #[test]
    fn test_join_capacity_and_phase() {
        let mut game = GameState::new(GameId::parse("TEST01").unwrap());
        for i in 0..MAX_PLAYERS {
            game.join(format!("P{}", i)).unwrap();
        }
        assert!(matches!(game.join("P5"), Err(GameError::GameFull)));

        let mut started = GameState::new(GameId::parse("TEST02").unwrap());
        started.join("A").unwrap();
        started.join("B").unwrap();
        started.start().unwrap();
        assert!(matches!(
            started.join("C"),
            Err(GameError::AlreadyStarted)
        ));
    }

    #[test]
    fn test_start_requires_two_players() {
        let mut game = GameState::new(GameId::parse("TEST01").unwrap());
        game.join("Solo").unwrap();
        assert!(matches!(game.start(), Err(GameError::NotEnoughPlayers)));
    }

    #[test]
    fn test_start_deals_and_assigns() {
        let (game, _, _) = two_player_game();

        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.current_player, 0);
        for player in &game.players {
            assert!(player.ready);
            assert!(player.secret_building.is_some());
            assert_eq!(player.hand.len(), 45);
        }
        // Secret buildings are unique
        assert_ne!(
            game.players[0].secret_building,
            game.players[1].secret_building
        );
    }

    #[test]
    fn test_start_twice_rejected() {
        let (mut game, _, _) = two_player_game();
        assert!(matches!(game.start(), Err(GameError::AlreadyStarted)));
    }

    #[test]
    fn test_placement_by_wrong_player_rejected() {
        let (mut game, _alice, bob) = two_player_game();
        let before = game.clone();

        let tile_id = game.players[1].hand[0].id.clone();
        let result = game.apply_action(
            &bob,
            GameAction::PlaceTile {
                tile_id,
                row: 0,
                col: 1,
            },
        );
        assert!(matches!(result, Err(GameError::NotYourTurn)));
        assert_eq!(game, before, "rejection must not mutate state");
    }

    #[test]
    fn test_placement_requires_known_tile_and_anchor() {
        let (mut game, alice, _) = two_player_game();

        assert!(matches!(
            game.apply_action(
                &alice,
                GameAction::PlaceTile {
                    tile_id: "no-such-tile".into(),
                    row: 0,
                    col: 1,
                }
            ),
            Err(GameError::TileNotInHand)
        ));

        // A real tile anchored nowhere near its worker
        let tile_id = game.players[0].hand[0].id.clone();
        assert!(matches!(
            game.apply_action(
                &alice,
                GameAction::PlaceTile {
                    tile_id,
                    row: 5,
                    col: 5,
                }
            ),
            Err(GameError::IllegalPlacement)
        ));
    }

    #[test]
    fn test_valid_actions_only_for_current_player() {
        let (game, alice, bob) = two_player_game();
        assert!(!game.valid_actions(&alice).is_empty());
        assert!(game.valid_actions(&bob).is_empty());
    }

    #[test]
    fn test_unknown_player_rejected() {
        let (mut game, _, _) = two_player_game();
        let mut rng = rand::thread_rng();
        let stranger = PlayerId::generate(&mut rng);
        assert!(matches!(
            game.apply_action(
                &stranger,
                GameAction::SubmitVote {
                    card_id: "yes-1".into()
                }
            ),
            Err(GameError::UnknownPlayer)
        ));
    }

    #[test]
    fn test_scoring_gated_on_ended() {
        let (game, _, _) = two_player_game();
        assert!(matches!(game.final_scores(), Err(GameError::InvalidPhase)));
    }

    #[test]
    fn test_ranking_stable_on_ties() {
        let (mut game, _, _) = two_player_game();
        // Erase both assignments: both players score 0
        game.players[0].secret_building = None;
        game.players[1].secret_building = None;
        game.phase = GamePhase::Ended;

        let scores = game.final_scores().unwrap();
        assert_eq!(scores[0].name, "Alice");
        assert_eq!(scores[1].name, "Bob");
    }

    #[test]
    fn test_touch_is_strictly_monotonic() {
        let (mut game, _, _) = two_player_game();
        game.touch(1000);
        assert_eq!(game.last_update, 1000);
        // A stale clock still advances the stamp
        game.touch(999);
        assert_eq!(game.last_update, 1001);
        game.touch(5000);
        assert_eq!(game.last_update, 5000);
    }
}
