//! Authoritative run state: score, level, pause/end flags and best score
//!
//! Every observable change goes through a method here and is published on
//! the owned [`EventBus`]. The best score is written through to the
//! key-value store whenever it rises.

use super::events::{EventBus, EventKind, GameEvent, HandlerId};
use crate::persistence::{KeyValueStore, MemoryStore};

/// Storage key for the persisted best score
pub const BEST_SCORE_KEY: &str = "key_dash_best_score";

/// Coarse state of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Running,
    Paused,
    /// Terminal until the next `initialize`
    Ended,
}

pub struct GameState {
    score: u64,
    level: u32,
    best_score: u64,
    paused: bool,
    ended: bool,
    events: EventBus,
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("score", &self.score)
            .field("level", &self.level)
            .field("best_score", &self.best_score)
            .field("paused", &self.paused)
            .field("ended", &self.ended)
            .field("events", &self.events)
            .finish()
    }
}

impl GameState {
    /// Create a state backed by `store`, loading the persisted best score
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        let best_score = load_best_score(&store);
        Self {
            score: 0,
            level: 1,
            best_score,
            paused: false,
            ended: false,
            events: EventBus::new(),
            store: Box::new(store),
        }
    }

    /// State with a private in-memory store
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Start a new run. Leaves the best score alone and emits nothing.
    pub fn initialize(&mut self, starting_level: u32) {
        self.score = 0;
        self.level = starting_level.max(1);
        self.paused = false;
        self.ended = false;
    }

    /// Like `initialize(1)`, optionally wiping the best score and its stored copy
    pub fn reset(&mut self, clear_best_score: bool) {
        self.initialize(1);
        if clear_best_score {
            self.best_score = 0;
            if let Err(e) = self.store.remove(BEST_SCORE_KEY) {
                log::warn!("Could not clear stored best score: {}", e);
            }
        }
    }

    // === Accessors ===

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn phase(&self) -> GamePhase {
        if self.ended {
            GamePhase::Ended
        } else if self.paused {
            GamePhase::Paused
        } else {
            GamePhase::Running
        }
    }

    // === Events ===

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, kind: EventKind, id: HandlerId) -> bool {
        self.events.unsubscribe(kind, id)
    }

    // === Score ===

    /// Add (or, with a negative value, deduct) points. Score never drops below zero.
    pub fn add_score(&mut self, points: i64) {
        self.score = self.score.saturating_add_signed(points);
        self.after_score_change();
    }

    pub fn set_score(&mut self, score: u64) {
        self.score = score;
        self.after_score_change();
    }

    fn after_score_change(&mut self) {
        self.sync_best_score();
        self.events.publish(&GameEvent::ScoreChanged { score: self.score });
    }

    /// Raise the best score to the current score, persisting on change
    fn sync_best_score(&mut self) {
        if self.score > self.best_score {
            self.best_score = self.score;
            if let Err(e) = self
                .store
                .set(BEST_SCORE_KEY, &self.best_score.to_string())
            {
                log::warn!("Best score kept in memory only: {}", e);
            }
        }
    }

    // === Level ===

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
        self.events.publish(&GameEvent::LevelChanged { level });
    }

    pub fn advance_level(&mut self) {
        self.set_level(self.level.saturating_add(1));
    }

    // === Pause ===

    /// Flip the pause flag. Ignored once the run has ended.
    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Set the pause flag, emitting even when the value is unchanged.
    /// Ignored once the run has ended.
    pub fn set_paused(&mut self, paused: bool) {
        if self.ended {
            log::debug!("Pause change ignored after game over");
            return;
        }
        self.paused = paused;
        let event = if paused {
            GameEvent::Paused
        } else {
            GameEvent::Resumed
        };
        self.events.publish(&event);
    }

    // === End of run ===

    /// End the run. Only the first call per run has any effect.
    pub fn game_over(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.paused = true;
        self.sync_best_score();
        log::info!(
            "Game over: score {} (best {}) at level {}",
            self.score,
            self.best_score,
            self.level
        );
        self.events.publish(&GameEvent::GameOver {
            score: self.score,
            best_score: self.best_score,
        });
    }
}

/// Read the stored best score; missing, unreadable or non-numeric means zero
fn load_best_score(store: &dyn KeyValueStore) -> u64 {
    match store.get(BEST_SCORE_KEY) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring corrupt best score {:?}", raw);
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            log::warn!("Best score unavailable: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::BrokenStore;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(state: &mut GameState, kind: EventKind) -> Rc<RefCell<Vec<GameEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        state.subscribe(kind, move |e| sink.borrow_mut().push(*e));
        log
    }

    #[test]
    fn test_add_score_tracks_best() {
        let store = MemoryStore::new();
        let mut state = GameState::new(store.clone());
        let scores = record(&mut state, EventKind::ScoreChanged);

        state.add_score(10);
        assert_eq!(state.score(), 10);
        assert_eq!(state.best_score(), 10);
        assert_eq!(store.get(BEST_SCORE_KEY).unwrap().as_deref(), Some("10"));

        state.add_score(-5);
        assert_eq!(state.score(), 5);
        assert_eq!(state.best_score(), 10);

        assert_eq!(
            *scores.borrow(),
            vec![
                GameEvent::ScoreChanged { score: 10 },
                GameEvent::ScoreChanged { score: 5 }
            ]
        );
    }

    #[test]
    fn test_negative_score_saturates_at_zero() {
        let mut state = GameState::in_memory();
        state.add_score(3);
        state.add_score(-10);
        assert_eq!(state.score(), 0);
        assert_eq!(state.best_score(), 3);
    }

    #[test]
    fn test_set_score_updates_best() {
        let mut state = GameState::in_memory();
        state.set_score(250);
        assert_eq!(state.best_score(), 250);
        state.set_score(100);
        assert_eq!(state.score(), 100);
        assert_eq!(state.best_score(), 250);
    }

    #[test]
    fn test_loads_persisted_best_score() {
        let store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, "1200").unwrap();
        let state = GameState::new(store);
        assert_eq!(state.best_score(), 1200);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_corrupt_best_score_loads_as_zero() {
        let store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, "not-a-number").unwrap();
        let state = GameState::new(store);
        assert_eq!(state.best_score(), 0);
    }

    #[test]
    fn test_broken_storage_keeps_best_in_memory() {
        let mut state = GameState::new(BrokenStore);
        assert_eq!(state.best_score(), 0);
        state.add_score(40);
        assert_eq!(state.best_score(), 40);
        state.reset(true);
        assert_eq!(state.best_score(), 0);
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut state = GameState::in_memory();
        let overs = record(&mut state, EventKind::GameOver);
        state.add_score(30);

        for _ in 0..3 {
            state.game_over();
        }

        assert!(state.is_ended());
        assert!(state.is_paused());
        assert_eq!(state.phase(), GamePhase::Ended);
        assert_eq!(
            *overs.borrow(),
            vec![GameEvent::GameOver {
                score: 30,
                best_score: 30
            }]
        );
    }

    #[test]
    fn test_pause_emits_every_call() {
        let mut state = GameState::in_memory();
        let paused = record(&mut state, EventKind::Paused);
        let resumed = record(&mut state, EventKind::Resumed);

        state.toggle_pause();
        assert_eq!(state.phase(), GamePhase::Paused);
        state.set_paused(true);
        state.toggle_pause();
        assert_eq!(state.phase(), GamePhase::Running);

        assert_eq!(paused.borrow().len(), 2);
        assert_eq!(resumed.borrow().len(), 1);
    }

    #[test]
    fn test_pause_ignored_after_game_over() {
        let mut state = GameState::in_memory();
        state.game_over();
        let resumed = record(&mut state, EventKind::Resumed);

        state.set_paused(false);
        state.toggle_pause();

        assert!(state.is_paused());
        assert_eq!(state.phase(), GamePhase::Ended);
        assert!(resumed.borrow().is_empty());
    }

    #[test]
    fn test_level_changes_emit() {
        let mut state = GameState::in_memory();
        let levels = record(&mut state, EventKind::LevelChanged);

        state.advance_level();
        state.set_level(5);

        assert_eq!(state.level(), 5);
        assert_eq!(
            *levels.borrow(),
            vec![
                GameEvent::LevelChanged { level: 2 },
                GameEvent::LevelChanged { level: 5 }
            ]
        );
    }

    #[test]
    fn test_initialize_keeps_best_score() {
        let mut state = GameState::in_memory();
        state.add_score(80);
        state.set_level(3);
        state.game_over();

        state.initialize(1);
        assert_eq!(state.score(), 0);
        assert_eq!(state.level(), 1);
        assert!(!state.is_paused());
        assert!(!state.is_ended());
        assert_eq!(state.best_score(), 80);

        state.initialize(4);
        assert_eq!(state.level(), 4);
        state.initialize(0);
        assert_eq!(state.level(), 1);
    }

    #[test]
    fn test_reset_clears_best_score_when_asked() {
        let store = MemoryStore::new();
        let mut state = GameState::new(store.clone());
        state.add_score(90);

        state.reset(false);
        assert_eq!(state.best_score(), 90);
        assert!(store.get(BEST_SCORE_KEY).unwrap().is_some());

        state.reset(true);
        assert_eq!(state.best_score(), 0);
        assert_eq!(store.get(BEST_SCORE_KEY).unwrap(), None);
    }

    #[test]
    fn test_game_over_allows_new_run() {
        let mut state = GameState::in_memory();
        let overs = record(&mut state, EventKind::GameOver);
        state.game_over();
        state.initialize(1);
        state.game_over();
        assert_eq!(overs.borrow().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_best_score_never_lags(points in prop::collection::vec(-200i64..500, 1..40)) {
            let mut state = GameState::in_memory();
            for p in points {
                let best_before = state.best_score();
                state.add_score(p);
                prop_assert_eq!(state.best_score(), best_before.max(state.score()));
                prop_assert!(state.best_score() >= state.score());
            }
        }
    }
}
