//! Persistence interface between the engine and its environment.
//!
//! The core never talks to a network or disk itself; it only requires that
//! some store can load and save `GameState` aggregates, refreshing a strictly
//! increasing `last_update` stamp on every save so pollers can detect change
//! without adopting stale data.

use crate::game::{GameId, GameState};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Game {0} not found")]
    NotFound(GameId),

    #[error("Storage I/O failure: {0}")]
    Io(String),
}

/// Milliseconds since the Unix epoch, used as the save stamp baseline
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Storage contract for game aggregates.
///
/// Any number of readers may `load` concurrently; writes are assumed to be
/// serialized per game id by the caller.
pub trait GameStore {
    /// Read the current aggregate for a game
    fn load(&self, id: &GameId) -> Result<GameState, StoreError>;

    /// Persist an aggregate, refreshing its `last_update` stamp.
    ///
    /// Returns the new stamp, which is strictly greater than the stored one.
    fn save(&mut self, state: GameState) -> Result<u64, StoreError>;

    /// Poll helper: the aggregate only if it changed since `since`.
    ///
    /// Readers adopt a freshly loaded state only when its stamp is strictly
    /// greater than their last known value.
    fn load_newer(&self, id: &GameId, since: u64) -> Result<Option<GameState>, StoreError> {
        let state = self.load(id)?;
        if state.last_update > since {
            Ok(Some(state))
        } else {
            Ok(None)
        }
    }
}

/// In-memory store, the reference implementation of the contract.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: HashMap<GameId, GameState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn load(&self, id: &GameId) -> Result<GameState, StoreError> {
        self.games
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn save(&mut self, mut state: GameState) -> Result<u64, StoreError> {
        state.touch(now_millis());
        let stamp = state.last_update;
        self.games.insert(state.id.clone(), state);
        Ok(stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameId;

    fn seeded_store() -> (MemoryStore, GameId) {
        let mut store = MemoryStore::new();
        let id = GameId::parse("STOR01").unwrap();
        let mut game = GameState::new(id.clone());
        game.join("Alice").unwrap();
        store.save(game).unwrap();
        (store, id)
    }

    #[test]
    fn test_load_missing_game() {
        let store = MemoryStore::new();
        let id = GameId::parse("NOPE00").unwrap();
        assert!(matches!(store.load(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_save_then_load() {
        let (store, id) = seeded_store();
        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.player_count(), 1);
        assert!(loaded.last_update > 0);
    }

    #[test]
    fn test_save_stamp_strictly_increases() {
        let (mut store, id) = seeded_store();
        let first = store.load(&id).unwrap().last_update;

        let state = store.load(&id).unwrap();
        let second = store.save(state).unwrap();
        assert!(second > first, "{} should exceed {}", second, first);

        let state = store.load(&id).unwrap();
        let third = store.save(state).unwrap();
        assert!(third > second);
    }

    #[test]
    fn test_poll_contract() {
        let (mut store, id) = seeded_store();
        let stamp = store.load(&id).unwrap().last_update;

        // Nothing new since our stamp
        assert!(store.load_newer(&id, stamp).unwrap().is_none());

        // A save makes the aggregate adoptable again
        let mut state = store.load(&id).unwrap();
        state.join("Bob").unwrap();
        store.save(state).unwrap();

        let fresh = store.load_newer(&id, stamp).unwrap().expect("newer state");
        assert_eq!(fresh.player_count(), 2);
        assert!(fresh.last_update > stamp);
    }

    #[test]
    fn test_round_trip_preserves_all_but_stamp() {
        let (mut store, id) = seeded_store();
        let mut game = store.load(&id).unwrap();
        game.join("Bob").unwrap();
        game.start().unwrap();
        let before = game.clone();
        store.save(game).unwrap();

        // Serialize through the wire format and back
        let loaded = store.load(&id).unwrap();
        let json = serde_json::to_string(&loaded).unwrap();
        let decoded: GameState = serde_json::from_str(&json).unwrap();

        assert!(decoded.last_update > before.last_update);
        let mut normalized = decoded.clone();
        normalized.last_update = before.last_update;
        assert_eq!(normalized, before);
    }
}
