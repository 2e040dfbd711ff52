//! Keyboard shortcuts handled by the surface itself.

use crate::input::KeyEvent;

/// History commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryShortcut {
    Undo,
    Redo,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub shift: bool,
    pub action: HistoryShortcut,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        shift: bool,
        action: HistoryShortcut,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = vec!["Ctrl"];
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Every shortcut a surface reacts to. All of them need the primary modifier.
pub const SHORTCUTS: [Shortcut; 2] = [
    Shortcut::new("Z", false, HistoryShortcut::Undo, "Undo"),
    Shortcut::new("Z", true, HistoryShortcut::Redo, "Redo"),
];

impl HistoryShortcut {
    /// Map a key press to a history command.
    ///
    /// The primary modifier plus `z` undoes, adding Shift redoes. Anything else
    /// is not a shortcut.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if !event.modifiers.primary() {
            return None;
        }
        SHORTCUTS
            .iter()
            .find(|s| s.key.eq_ignore_ascii_case(&event.key) && s.shift == event.modifiers.shift)
            .map(|s| s.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn key(key: &str, ctrl: bool, meta: bool, shift: bool) -> KeyEvent {
        KeyEvent::new(
            key,
            Modifiers {
                ctrl,
                meta,
                shift,
                alt: false,
            },
        )
    }

    #[test]
    fn test_undo() {
        assert_eq!(
            HistoryShortcut::from_key_event(&key("z", true, false, false)),
            Some(HistoryShortcut::Undo)
        );
        assert_eq!(
            HistoryShortcut::from_key_event(&key("z", false, true, false)),
            Some(HistoryShortcut::Undo)
        );
    }

    #[test]
    fn test_redo_with_shift() {
        // Shift usually uppercases the reported key.
        assert_eq!(
            HistoryShortcut::from_key_event(&key("Z", true, false, true)),
            Some(HistoryShortcut::Redo)
        );
    }

    #[test]
    fn test_ignored_combinations() {
        assert_eq!(HistoryShortcut::from_key_event(&key("z", false, false, false)), None);
        assert_eq!(HistoryShortcut::from_key_event(&key("y", true, false, false)), None);
        assert_eq!(HistoryShortcut::from_key_event(&key("zz", true, false, false)), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(SHORTCUTS[0].format(), "Ctrl+Z");
        assert_eq!(SHORTCUTS[1].format(), "Ctrl+Shift+Z");
    }
}
