use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keys the viewer polls each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    O,
    P,
    Escape,
}

/// Current pressed state of the polled keys.
pub trait InputSource {
    fn is_pressed(&self, key: Key) -> bool;
}

/// Keys currently held down, fed from window key events.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    held: HashSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    pub fn press(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: Key) {
        self.set(key, false);
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

impl InputSource for HeldKeys {
    fn is_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}
