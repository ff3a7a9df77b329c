//! # Input Module
//!
//! Input handling for player interactions.
//!
//! Local keyboard presses and remote action tokens are both reduced to a [`Key`]
//! before they reach the event handlers, so there is exactly one dispatch path.

pub mod commands;
pub mod handlers;

pub use commands::*;
pub use handlers::*;

use crate::Direction;
use macroquad::prelude::{get_last_key_pressed, KeyCode};
use serde::{Deserialize, Serialize};

/// The keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    /// `.` waits a turn
    Period,
    /// `g` picks up
    G,
    /// `i` drinks the first health potion
    I,
    /// `n` starts a procedural game from the menu
    N,
    Space,
    Escape,
    Q,
    F1,
    Enter,
    Shift,
    Control,
    Alt,
    /// Anything else; only useful for dismissing prompts
    Other,
}

impl Key {
    /// Maps a macroquad key code.
    pub fn from_keycode(code: KeyCode) -> Self {
        match code {
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::W => Key::W,
            KeyCode::A => Key::A,
            KeyCode::S => Key::S,
            KeyCode::D => Key::D,
            KeyCode::Period => Key::Period,
            KeyCode::G => Key::G,
            KeyCode::I => Key::I,
            KeyCode::N => Key::N,
            KeyCode::Space => Key::Space,
            KeyCode::Escape => Key::Escape,
            KeyCode::Q => Key::Q,
            KeyCode::F1 => Key::F1,
            KeyCode::Enter | KeyCode::KpEnter => Key::Enter,
            KeyCode::LeftShift | KeyCode::RightShift => Key::Shift,
            KeyCode::LeftControl | KeyCode::RightControl => Key::Control,
            KeyCode::LeftAlt | KeyCode::RightAlt => Key::Alt,
            _ => Key::Other,
        }
    }

    /// Movement direction for arrow keys and WASD.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Up | Key::W => Some(Direction::North),
            Key::Down | Key::S => Some(Direction::South),
            Key::Left | Key::A => Some(Direction::West),
            Key::Right | Key::D => Some(Direction::East),
            _ => None,
        }
    }

    pub fn is_modifier(self) -> bool {
        matches!(self, Key::Shift | Key::Control | Key::Alt)
    }

    /// Keys that leave terminal screens.
    pub fn is_dismiss(self) -> bool {
        matches!(self, Key::Escape | Key::Q)
    }
}

/// Reads the key pressed this frame, if any.
pub fn poll_keyboard() -> Option<Key> {
    get_last_key_pressed().map(Key::from_keycode)
}
