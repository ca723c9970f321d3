//! Input symbols recognised by the simulation.

use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Open,
    Close,
    Quit,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Open,
        Key::Close,
        Key::Quit,
    ];
}

/// Keys held down during the current frame.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Input {
    pressed: BTreeSet<Key>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pressed(keys: &[Key]) -> Self {
        Self {
            pressed: keys.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn pressed(&self) -> impl Iterator<Item = Key> + '_ {
        self.pressed.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_press_release() {
        let mut input = Input::new();
        input.press(Key::Up);
        input.press(Key::Open);
        input.press(Key::Up);
        assert!(input.is_pressed(Key::Up));
        assert_eq!(input.pressed().collect::<Vec<_>>(), vec![Key::Up, Key::Open]);

        input.release(Key::Up);
        assert!(!input.is_pressed(Key::Up));
        assert_eq!(input, Input::with_pressed(&[Key::Open]));
    }
}
