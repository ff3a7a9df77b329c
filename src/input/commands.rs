//! # Command Definitions
//!
//! The token vocabulary remote clients use to drive a session.

use crate::{Direction, Key, SessionConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Something a remote client asked for.
///
/// Gameplay tokens replay through the same key dispatch as local input. There is no
/// token for quitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionToken {
    Move(Direction),
    Wait,
    Pickup,
    Consume,
    TakeStairs,
    Restart(SessionConfig),
}

/// A token string no one understands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action token '{0}'")]
pub struct UnknownToken(pub String);

impl ActionToken {
    /// Every gameplay token, in the order legal actions are reported.
    pub fn gameplay() -> [ActionToken; 8] {
        [
            ActionToken::Move(Direction::North),
            ActionToken::Move(Direction::West),
            ActionToken::Move(Direction::South),
            ActionToken::Move(Direction::East),
            ActionToken::Pickup,
            ActionToken::Consume,
            ActionToken::Wait,
            ActionToken::TakeStairs,
        ]
    }

    /// The local key this token stands for; restarts have none.
    pub fn key(&self) -> Option<Key> {
        match self {
            ActionToken::Move(Direction::North) => Some(Key::W),
            ActionToken::Move(Direction::West) => Some(Key::A),
            ActionToken::Move(Direction::South) => Some(Key::S),
            ActionToken::Move(Direction::East) => Some(Key::D),
            ActionToken::Wait => Some(Key::Period),
            ActionToken::Pickup => Some(Key::G),
            ActionToken::Consume => Some(Key::I),
            ActionToken::TakeStairs => Some(Key::Space),
            ActionToken::Restart(_) => None,
        }
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ActionToken::Move(Direction::North) => "w",
            ActionToken::Move(Direction::West) => "a",
            ActionToken::Move(Direction::South) => "s",
            ActionToken::Move(Direction::East) => "d",
            ActionToken::Wait => ".",
            ActionToken::Pickup => "g",
            ActionToken::Consume => "i",
            ActionToken::TakeStairs => "space",
            ActionToken::Restart(_) => "restart",
        };
        f.write_str(text)
    }
}

impl FromStr for ActionToken {
    type Err = UnknownToken;

    /// Parses a gameplay token. Case and surrounding whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = if s == " " {
            "space".to_string()
        } else {
            s.trim().to_ascii_lowercase()
        };
        let parsed = match token.as_str() {
            "w" | "up" | "north" => ActionToken::Move(Direction::North),
            "a" | "left" | "west" => ActionToken::Move(Direction::West),
            "s" | "down" | "south" => ActionToken::Move(Direction::South),
            "d" | "right" | "east" => ActionToken::Move(Direction::East),
            "." | "wait" => ActionToken::Wait,
            "g" | "pickup" => ActionToken::Pickup,
            "i" | "consume" => ActionToken::Consume,
            "space" | "stairs" => ActionToken::TakeStairs,
            _ => return Err(UnknownToken(s.to_string())),
        };
        Ok(parsed)
    }
}
