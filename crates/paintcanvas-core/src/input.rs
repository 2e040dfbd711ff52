//! Pointer and keyboard input events.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Command on macOS, Control elsewhere. Either one counts.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

fn one_contact() -> u32 {
    1
}

/// Pointer event type for unified mouse/touch handling.
///
/// `contacts` is the number of active touch points reported by the input
/// source. Mouse input always reports one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default = "one_contact")]
        contacts: u32,
    },
    Move {
        position: Point,
        #[serde(default = "one_contact")]
        contacts: u32,
    },
    Up {
        position: Point,
        #[serde(default = "one_contact")]
        contacts: u32,
    },
    Cancel {
        position: Point,
        #[serde(default = "one_contact")]
        contacts: u32,
    },
    /// The pointer left the surface.
    Leave { position: Point },
}

impl PointerEvent {
    pub fn down(position: Point) -> Self {
        Self::Down { position, contacts: 1 }
    }

    pub fn moved(position: Point) -> Self {
        Self::Move { position, contacts: 1 }
    }

    pub fn up(position: Point) -> Self {
        Self::Up { position, contacts: 1 }
    }

    pub fn position(&self) -> Point {
        match *self {
            Self::Down { position, .. }
            | Self::Move { position, .. }
            | Self::Up { position, .. }
            | Self::Cancel { position, .. }
            | Self::Leave { position } => position,
        }
    }

    pub fn contacts(&self) -> u32 {
        match *self {
            Self::Down { contacts, .. }
            | Self::Move { contacts, .. }
            | Self::Up { contacts, .. }
            | Self::Cancel { contacts, .. } => contacts,
            Self::Leave { .. } => 1,
        }
    }

    /// Whether the source reports more than one contact point.
    pub fn is_multi_contact(&self) -> bool {
        self.contacts() > 1
    }
}

/// A key press with the modifiers held at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}
