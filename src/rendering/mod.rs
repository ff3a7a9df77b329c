//! # Rendering Module
//!
//! Window rendering with macroquad. Nothing here mutates game state.

pub mod display;

pub use display::*;
