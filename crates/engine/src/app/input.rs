use crate::world::Vec2;

/// Keys the game reads. Everything else on the keyboard is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    /// Alternate left.
    H,
    /// Alternate right.
    L,
    /// Alternate jump.
    K,
    Space,
    LeftShift,
    Escape,
    F2,
    F3,
    F5,
}

const KEY_COUNT: usize = 12;

impl Key {
    const fn index(self) -> usize {
        match self {
            Key::Left => 0,
            Key::Right => 1,
            Key::Up => 2,
            Key::H => 3,
            Key::L => 4,
            Key::K => 5,
            Key::Space => 6,
            Key::LeftShift => 7,
            Key::Escape => 8,
            Key::F2 => 9,
            Key::F3 => 10,
            Key::F5 => 11,
        }
    }
}

/// Held state of every tracked key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyStates {
    down: [bool; KEY_COUNT],
}

impl KeyStates {
    pub fn set(&mut self, key: Key, is_down: bool) {
        self.down[key.index()] = is_down;
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down[key.index()]
    }

    pub fn any_down(&self, keys: &[Key]) -> bool {
        keys.iter().any(|&key| self.is_down(key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Discrete things that happened since the previous tick, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    MouseButtonUp(MouseButton),
}

/// Everything a scene sees of the input devices for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    keys: KeyStates,
    events: Vec<InputEvent>,
    /// Logical framebuffer coordinates, `None` when the cursor is outside.
    cursor_position_px: Option<Vec2>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        keys: KeyStates,
        events: Vec<InputEvent>,
        cursor_position_px: Option<Vec2>,
    ) -> Self {
        Self {
            keys,
            events,
            cursor_position_px,
        }
    }

    pub fn keys(&self) -> &KeyStates {
        &self.keys
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys.is_down(key)
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn quit_requested(&self) -> bool {
        self.events.contains(&InputEvent::Quit)
    }

    pub fn with_key_down(mut self, key: Key, is_down: bool) -> Self {
        self.keys.set(key, is_down);
        self
    }

    pub fn with_event(mut self, event: InputEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_indices_are_unique() {
        let keys = [
            Key::Left,
            Key::Right,
            Key::Up,
            Key::H,
            Key::L,
            Key::K,
            Key::Space,
            Key::LeftShift,
            Key::Escape,
            Key::F2,
            Key::F3,
            Key::F5,
        ];
        let mut seen = [false; KEY_COUNT];
        for key in keys {
            assert!(!seen[key.index()], "duplicate index for {key:?}");
            seen[key.index()] = true;
        }
        assert!(seen.iter().all(|&value| value));
    }

    #[test]
    fn snapshot_builders_compose() {
        let snapshot = InputSnapshot::empty()
            .with_key_down(Key::Space, true)
            .with_event(InputEvent::KeyDown(Key::F2))
            .with_event(InputEvent::Quit)
            .with_cursor_position_px(Some(Vec2::new(10.0, 20.0)));
        assert!(snapshot.is_down(Key::Space));
        assert!(!snapshot.is_down(Key::Up));
        assert!(snapshot.keys().any_down(&[Key::Up, Key::Space]));
        assert!(snapshot.quit_requested());
        assert_eq!(snapshot.events().len(), 2);
        assert_eq!(snapshot.cursor_position_px(), Some(Vec2::new(10.0, 20.0)));
    }
}
