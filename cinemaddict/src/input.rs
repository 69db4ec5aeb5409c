/// Framework-agnostic key representation for testability
///
/// Mirrors the subset of DOM `KeyboardEvent.key` values the popup reacts to,
/// so tests can inject keyboard input without a browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
}

/// Modifier key state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Key event with modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new KeyEvent with the given key and no modifiers
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    /// Create a new KeyEvent with the given key and Ctrl modifier
    pub fn with_ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: true,
                ..Default::default()
            },
        }
    }

    /// Create a new KeyEvent with the given key and Cmd (meta) modifier
    pub fn with_meta(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                meta: true,
                ..Default::default()
            },
        }
    }

    pub fn is_escape(&self) -> bool {
        self.key == Key::Escape
    }

    /// Ctrl+Enter, or Cmd+Enter on macOS
    pub fn is_submit(&self) -> bool {
        self.key == Key::Enter && (self.modifiers.ctrl || self.modifiers.meta)
    }
}
