//! Typed publish/subscribe channel for state-change notifications
//!
//! Handlers run synchronously, in registration order, on the caller's
//! thread. A panicking handler unwinds through `publish`; there is no
//! per-handler isolation.

use std::fmt;

/// Observable change emitted by [`GameState`](super::GameState)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged { score: u64 },
    LevelChanged { level: u32 },
    Paused,
    Resumed,
    /// Terminal event of a run, fired at most once
    GameOver { score: u64, best_score: u64 },
}

/// Variant tag used as the subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ScoreChanged,
    LevelChanged,
    Paused,
    Resumed,
    GameOver,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::ScoreChanged { .. } => EventKind::ScoreChanged,
            GameEvent::LevelChanged { .. } => EventKind::LevelChanged,
            GameEvent::Paused => EventKind::Paused,
            GameEvent::Resumed => EventKind::Resumed,
            GameEvent::GameOver { .. } => EventKind::GameOver,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&GameEvent)>;

struct Subscription {
    kind: EventKind,
    id: HandlerId,
    handler: Handler,
}

/// Registry of handlers keyed by [`EventKind`]
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            kind,
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove the first handler matching `kind` and `id`.
    /// Returns false if nothing matched.
    pub fn unsubscribe(&mut self, kind: EventKind, id: HandlerId) -> bool {
        match self
            .subscriptions
            .iter()
            .position(|s| s.kind == kind && s.id == id)
        {
            Some(index) => {
                self.subscriptions.remove(index);
                true
            }
            None => false,
        }
    }

    /// Deliver `event` to every handler registered for its kind
    pub fn publish(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for sub in self.subscriptions.iter_mut().filter(|s| s.kind == kind) {
            (sub.handler)(event);
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.subscriptions.iter().filter(|s| s.kind == kind).count()
    }
}
