//! Keyboard bindings and per-frame intent polling
//!
//! Key codes are `KeyboardEvent.code` strings. Held keys drive movement;
//! pause and confirm are edge-triggered and cleared once consumed.

use std::collections::HashMap;

use crate::sim::TickInput;

/// Control intent a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Up,
    Down,
    Left,
    Right,
    Pause,
    Confirm,
}

/// Key code → intent map
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<String, Intent>,
}

impl Default for KeyBindings {
    /// Arrows and WASD for movement, Escape/P for pause, Enter/Space to confirm
    fn default() -> Self {
        let mut bindings = Self {
            map: HashMap::new(),
        };
        for (code, intent) in [
            ("ArrowUp", Intent::Up),
            ("KeyW", Intent::Up),
            ("ArrowDown", Intent::Down),
            ("KeyS", Intent::Down),
            ("ArrowLeft", Intent::Left),
            ("KeyA", Intent::Left),
            ("ArrowRight", Intent::Right),
            ("KeyD", Intent::Right),
            ("Escape", Intent::Pause),
            ("KeyP", Intent::Pause),
            ("Enter", Intent::Confirm),
            ("Space", Intent::Confirm),
        ] {
            bindings.bind(code, intent);
        }
        bindings
    }
}

impl KeyBindings {
    pub fn bind(&mut self, code: &str, intent: Intent) {
        self.map.insert(code.to_string(), intent);
    }

    pub fn intent_for(&self, code: &str) -> Option<Intent> {
        self.map.get(code).copied()
    }
}

/// Current pressed/released state, polled once per frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    /// Number of held keys per movement intent (two bindings each)
    held: HashMap<Intent, u8>,
    pause_pressed: bool,
    confirm_pressed: bool,
    pub idle_mode: bool,
}

impl InputState {
    /// Returns true if the key is bound (caller may prevent default)
    pub fn key_down(&mut self, code: &str, repeat: bool) -> bool {
        let Some(intent) = self.bindings.intent_for(code) else {
            return false;
        };
        if repeat {
            return true;
        }
        match intent {
            Intent::Pause => self.pause_pressed = true,
            Intent::Confirm => self.confirm_pressed = true,
            movement => *self.held.entry(movement).or_insert(0) += 1,
        }
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        let Some(intent) = self.bindings.intent_for(code) else {
            return false;
        };
        if let Some(count) = self.held.get_mut(&intent) {
            *count = count.saturating_sub(1);
        }
        true
    }

    /// Release everything (window lost focus)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Queue a pause toggle from outside the keyboard (auto-pause, menu)
    pub fn request_pause(&mut self) {
        self.pause_pressed = true;
    }

    pub fn is_held(&self, intent: Intent) -> bool {
        self.held.get(&intent).is_some_and(|c| *c > 0)
    }

    pub fn snapshot(&self) -> TickInput {
        TickInput {
            up: self.is_held(Intent::Up),
            down: self.is_held(Intent::Down),
            left: self.is_held(Intent::Left),
            right: self.is_held(Intent::Right),
            pause: self.pause_pressed,
            confirm: self.confirm_pressed,
            idle_mode: self.idle_mode,
        }
    }

    /// Clear one-shot inputs after processing
    pub fn clear_one_shots(&mut self) {
        self.pause_pressed = false;
        self.confirm_pressed = false;
    }
}
