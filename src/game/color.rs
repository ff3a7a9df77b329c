//! Plain RGB colors shared by tiles, entities and the message log.

use serde::{Deserialize, Serialize};

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Returns the color scaled towards black, used for remembered tiles.
    pub fn dimmed(self, factor: f32) -> Self {
        let scale = |c: u8| ((c as f32) * factor.clamp(0.0, 1.0)).round() as u8;
        Self(scale(self.0), scale(self.1), scale(self.2))
    }
}

pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
pub const BLACK: Rgb = Rgb::new(0x0, 0x0, 0x0);
pub const RED: Rgb = Rgb::new(0xFF, 0x0, 0x0);

pub const PLAYER_ATK: Rgb = Rgb::new(0xE0, 0xE0, 0xE0);
pub const ENEMY_ATK: Rgb = Rgb::new(0xFF, 0xC0, 0xC0);
pub const NEEDS_TARGET: Rgb = Rgb::new(0x3F, 0xFF, 0xFF);
pub const STATUS_EFFECT_APPLIED: Rgb = Rgb::new(0x3F, 0xFF, 0x3F);
pub const DESCEND: Rgb = Rgb::new(0x9F, 0x3F, 0xFF);

pub const PLAYER_DIE: Rgb = Rgb::new(0xFF, 0x30, 0x30);
pub const ENEMY_DIE: Rgb = Rgb::new(0xFF, 0xA0, 0x30);

pub const INVALID: Rgb = Rgb::new(0xFF, 0xFF, 0x00);
pub const IMPOSSIBLE: Rgb = Rgb::new(0x80, 0x80, 0x80);
pub const ERROR: Rgb = Rgb::new(0xFF, 0x40, 0x40);

pub const WELCOME_TEXT: Rgb = Rgb::new(0x20, 0xA0, 0xFF);
pub const HEALTH_RECOVERED: Rgb = Rgb::new(0x0, 0xFF, 0x0);

pub const BAR_TEXT: Rgb = WHITE;
pub const BAR_FILLED: Rgb = Rgb::new(0x0, 0x60, 0x0);
pub const BAR_EMPTY: Rgb = Rgb::new(0x40, 0x10, 0x10);

pub const GHOST: Rgb = Rgb::new(71, 108, 108);
pub const RED_GHOST: Rgb = Rgb::new(191, 40, 40);
pub const POTION: Rgb = Rgb::new(127, 0, 255);
pub const CORPSE: Rgb = Rgb::new(191, 0, 0);

pub const FLOOR_LIGHT: Rgb = Rgb::new(200, 180, 50);
pub const FLOOR_DARK: Rgb = Rgb::new(50, 50, 150);
pub const WALL_LIGHT: Rgb = Rgb::new(130, 110, 50);
pub const WALL_DARK: Rgb = Rgb::new(0, 0, 100);
pub const STAIRS_LIGHT: Rgb = Rgb::new(255, 255, 255);
pub const STAIRS_DARK: Rgb = Rgb::new(0, 0, 100);
