//! Keyboard shortcuts.

/// A key press with its modifiers. `key` is the logical key name as reported
/// by the UI toolkit (`"z"`, `"Delete"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS.
    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    DeleteSelection,
    Save,
    Undo,
    Redo,
    AutoAlign,
    CreateGroup,
    Duplicate,
}

impl Shortcut {
    pub fn from_chord(chord: &KeyChord) -> Option<Self> {
        if !chord.command() {
            return match chord.key.as_str() {
                "Delete" | "Backspace" => Some(Shortcut::DeleteSelection),
                _ => None,
            };
        }

        match (chord.key.to_ascii_lowercase().as_str(), chord.shift) {
            ("s", _) => Some(Shortcut::Save),
            ("z", false) => Some(Shortcut::Undo),
            ("z", true) | ("y", _) => Some(Shortcut::Redo),
            ("g", false) => Some(Shortcut::AutoAlign),
            ("g", true) => Some(Shortcut::CreateGroup),
            ("d", false) => Some(Shortcut::Duplicate),
            _ => None,
        }
    }
}
