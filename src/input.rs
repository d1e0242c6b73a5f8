/// Backend-neutral input vocabulary.
///
/// Backends translate their native events into `InputEvent`s once, at the
/// edge; everything downstream matches on this closed set.

use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Space: shoot in the shooter, hard drop in tetris.
    Fire,
    Pause,
    Restart,
    /// Any other printable key (menu digits, "press any key" prompts).
    Char(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Leave the current game and return to the menu.
    Back,
    /// Close the program.
    Quit,
}

/// Keys considered held during the current tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    keys: HashSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Horizontal intent: left wins when both are held.
    pub fn horizontal(&self) -> i8 {
        if self.is_held(Key::Left) {
            -1
        } else if self.is_held(Key::Right) {
            1
        } else {
            0
        }
    }

    /// Vertical intent: up wins when both are held.
    pub fn vertical(&self) -> i8 {
        if self.is_held(Key::Up) {
            -1
        } else if self.is_held(Key::Down) {
            1
        } else {
            0
        }
    }
}

impl FromIterator<Key> for HeldKeys {
    fn from_iter<T: IntoIterator<Item = Key>>(iter: T) -> Self {
        HeldKeys {
            keys: iter.into_iter().collect(),
        }
    }
}
