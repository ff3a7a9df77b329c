//! # Utilities Module
//!
//! Shared helpers for AI navigation.

pub mod pathfinding;

pub use self::pathfinding::*;
