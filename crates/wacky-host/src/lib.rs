//! In-process game host.
//!
//! The host owns every live game and serializes all writes to one game
//! through one per-game lock, so the engine below it never sees concurrent
//! mutation. Readers poll snapshots by save stamp: a caller hands in the
//! stamp it last saw and only gets a state back when something changed.

use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use wacky_core::store::now_millis;
use wacky_core::{GameAction, GameError, GameEvent, GameId, GameState, PlayerId, PlayerScore};

/// Errors surfaced by the host layer.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Game {0} not found")]
    GameNotFound(GameId),

    #[error(transparent)]
    Rules(#[from] GameError),
}

/// The shared host: all live games, keyed by game code.
///
/// `GameHost` is cheap to clone-share behind an `Arc`; every public method
/// takes `&self`.
pub struct GameHost {
    games: DashMap<GameId, Arc<Mutex<GameState>>>,
}

impl GameHost {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
        }
    }

    /// Number of live games
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    fn game(&self, id: &GameId) -> Result<Arc<Mutex<GameState>>, HostError> {
        self.games
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| HostError::GameNotFound(id.clone()))
    }

    /// Create a fresh game lobby and return its shareable code
    pub fn create_game(&self) -> GameId {
        let mut rng = rand::thread_rng();
        let id = loop {
            let candidate = GameId::generate(&mut rng);
            if !self.games.contains_key(&candidate) {
                break candidate;
            }
        };

        let mut state = GameState::new(id.clone());
        state.touch(now_millis());
        self.games
            .insert(id.clone(), Arc::new(Mutex::new(state)));

        info!(game = %id, "game created");
        id
    }

    /// Add a player to a lobby, returning their private token
    pub async fn join(&self, id: &GameId, name: &str) -> Result<PlayerId, HostError> {
        let game = self.game(id)?;
        let mut state = game.lock().await;

        let player = state.join(name)?;
        state.touch(now_millis());
        info!(game = %id, player = %player, name, "player joined");
        Ok(player)
    }

    /// Start a lobby: deal tiles, assign secret buildings, begin play
    pub async fn start(&self, id: &GameId) -> Result<(), HostError> {
        let game = self.game(id)?;
        let mut state = game.lock().await;

        state.start()?;
        state.touch(now_millis());
        info!(game = %id, players = state.player_count(), "game started");
        Ok(())
    }

    /// Apply one player action as a single atomic transaction.
    ///
    /// A rejected action leaves the game byte-for-byte as it was, including
    /// its save stamp.
    pub async fn apply(
        &self,
        id: &GameId,
        actor: &PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, HostError> {
        let game = self.game(id)?;
        let mut state = game.lock().await;

        match state.apply_action(actor, action) {
            Ok(events) => {
                state.touch(now_millis());
                info!(game = %id, player = %actor, events = events.len(), "action applied");
                Ok(events)
            }
            Err(e) => {
                warn!(game = %id, player = %actor, error = %e, "action rejected");
                Err(e.into())
            }
        }
    }

    /// All actions a player could legally take right now
    pub async fn valid_actions(
        &self,
        id: &GameId,
        player: &PlayerId,
    ) -> Result<Vec<GameAction>, HostError> {
        let game = self.game(id)?;
        let state = game.lock().await;
        Ok(state.valid_actions(player))
    }

    /// A full copy of the current game state
    pub async fn snapshot(&self, id: &GameId) -> Result<GameState, HostError> {
        let game = self.game(id)?;
        let state = game.lock().await;
        Ok(state.clone())
    }

    /// Poll for change: the state only if its stamp is strictly newer than
    /// `since`. Callers loop on this with the stamp from their last snapshot.
    pub async fn poll(&self, id: &GameId, since: u64) -> Result<Option<GameState>, HostError> {
        let game = self.game(id)?;
        let state = game.lock().await;
        if state.last_update > since {
            Ok(Some(state.clone()))
        } else {
            Ok(None)
        }
    }

    /// Final ranking of an ended game
    pub async fn final_scores(&self, id: &GameId) -> Result<Vec<PlayerScore>, HostError> {
        let game = self.game(id)?;
        let state = game.lock().await;
        Ok(state.final_scores()?)
    }

    /// Drop an ended or abandoned game
    pub fn remove_game(&self, id: &GameId) -> bool {
        let removed = self.games.remove(id).is_some();
        if removed {
            info!(game = %id, "game removed");
        }
        removed
    }
}

impl Default for GameHost {
    fn default() -> Self {
        Self::new()
    }
}
