//! # Generation Module
//!
//! Floor construction: procedural room-and-corridor dungeons, the per-floor
//! encounter tables that populate them, and the loader for fixed maps written as
//! text.
//!
//! Every generator produces a [`GeneratedFloor`]: a fully materialized map plus the
//! cell the player starts on. Placing the player is left to the caller so the same
//! actor can move from floor to floor.

pub mod custom_map;
pub mod dungeon;
pub mod encounters;

pub use custom_map::*;
pub use dungeon::*;
pub use encounters::*;

use crate::config::{
    DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, DEFAULT_MAX_ROOMS, DEFAULT_ROOM_MAX_SIZE,
    DEFAULT_ROOM_MIN_SIZE, MAX_MAP_DIMENSION, MAX_ROOM_ATTEMPTS,
};
use crate::{GameMap, Position, TombsError, TombsResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Number of room placement attempts per floor
    pub max_rooms: u32,
    /// Minimum room size (including walls)
    pub room_min_size: u32,
    /// Maximum room size (including walls)
    pub room_max_size: u32,
    /// Map width in tiles
    pub map_width: u32,
    /// Map height in tiles
    pub map_height: u32,
}

impl GenerationConfig {
    /// Creates the default configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tombs::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_rooms: DEFAULT_MAX_ROOMS,
            room_min_size: DEFAULT_ROOM_MIN_SIZE,
            room_max_size: DEFAULT_ROOM_MAX_SIZE,
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
        }
    }

    /// Creates a small configuration for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            max_rooms: 10,
            room_min_size: 4,
            room_max_size: 6,
            map_width: 24,
            map_height: 24,
        }
    }

    /// Rejects bounds that cannot produce a room or that exceed the supported size.
    pub fn validate(&self) -> TombsResult<()> {
        if self.map_width > MAX_MAP_DIMENSION || self.map_height > MAX_MAP_DIMENSION {
            return Err(TombsError::GenerationFailed(format!(
                "map {}x{} exceeds the {} tile limit per side",
                self.map_width, self.map_height, MAX_MAP_DIMENSION
            )));
        }
        if self.max_rooms > MAX_ROOM_ATTEMPTS {
            return Err(TombsError::GenerationFailed(format!(
                "max_rooms {} exceeds {}",
                self.max_rooms, MAX_ROOM_ATTEMPTS
            )));
        }
        if self.room_min_size < 2 || self.room_min_size > self.room_max_size {
            return Err(TombsError::GenerationFailed(format!(
                "invalid room size bounds {}..={}",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.max_rooms == 0 {
            return Err(TombsError::GenerationFailed(
                "max_rooms must be at least 1".to_string(),
            ));
        }
        let smallest_side = self.room_max_size.saturating_add(1);
        if self.map_width <= smallest_side || self.map_height <= smallest_side {
            return Err(TombsError::GenerationFailed(format!(
                "map {}x{} too small for rooms up to {}",
                self.map_width, self.map_height, self.room_max_size
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

/// A rectangular room. The outer ring is wall, everything inside is floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Top-left corner of the room (a wall cell)
    pub top_left: Position,
    /// Extent to the far wall, so the room spans `width + 1` cells
    pub width: u32,
    pub height: u32,
}

impl Room {
    /// Creates a new room.
    ///
    /// # Examples
    ///
    /// ```
    /// use tombs::{Position, Room};
    ///
    /// let room = Room::new(Position::new(2, 3), 4, 6);
    /// assert_eq!(room.center(), Position::new(4, 6));
    /// assert_eq!(room.floor_positions().len(), 3 * 5);
    /// ```
    pub fn new(top_left: Position, width: u32, height: u32) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    /// Gets the bottom-right wall corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32,
            self.top_left.y + self.height as i32,
        )
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        let br = self.bottom_right();
        Position::new((self.top_left.x + br.x) / 2, (self.top_left.y + br.y) / 2)
    }

    /// True when the rooms overlap or touch.
    pub fn intersects(&self, other: &Room) -> bool {
        let (a1, a2) = (self.top_left, self.bottom_right());
        let (b1, b2) = (other.top_left, other.bottom_right());
        a1.x <= b2.x && a2.x >= b1.x && a1.y <= b2.y && a2.y >= b1.y
    }

    /// Checks if a position lies on the wall ring.
    pub fn is_border(&self, pos: Position) -> bool {
        let br = self.bottom_right();
        let inside = pos.x >= self.top_left.x && pos.x <= br.x && pos.y >= self.top_left.y && pos.y <= br.y;
        inside && (pos.x == self.top_left.x || pos.x == br.x || pos.y == self.top_left.y || pos.y == br.y)
    }

    /// Interior (floor) cells, row-major.
    pub fn floor_positions(&self) -> Vec<Position> {
        let br = self.bottom_right();
        ((self.top_left.y + 1)..br.y)
            .flat_map(|y| ((self.top_left.x + 1)..br.x).map(move |x| Position::new(x, y)))
            .collect()
    }

    /// Wall ring cells, row-major.
    pub fn wall_positions(&self) -> Vec<Position> {
        let br = self.bottom_right();
        (self.top_left.y..=br.y)
            .flat_map(|y| (self.top_left.x..=br.x).map(move |x| Position::new(x, y)))
            .filter(|pos| self.is_border(*pos))
            .collect()
    }
}

/// A finished floor waiting for its player.
#[derive(Debug, Clone)]
pub struct GeneratedFloor {
    pub map: GameMap,
    pub player_start: Position,
}

/// Trait for floor generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TombsResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> TombsResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Checks that a floor is playable: the player starts on a walkable cell and any
    /// stairs sit on a walkable cell inside the map.
    pub fn validate_floor(floor: &GeneratedFloor) -> TombsResult<()> {
        if !floor.map.is_walkable(floor.player_start) {
            return Err(TombsError::InvalidMap(format!(
                "player start {:?} is not walkable",
                floor.player_start
            )));
        }
        if let Some(stairs) = floor.map.downstairs_location {
            if !floor.map.is_walkable(stairs) {
                return Err(TombsError::InvalidMap(format!(
                    "stairs {:?} are not walkable",
                    stairs
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generation_config_validation() {
        assert!(GenerationConfig::new(1).validate().is_ok());
        assert!(GenerationConfig::for_testing(1).validate().is_ok());

        let mut bad = GenerationConfig::new(1);
        bad.room_min_size = 8;
        assert!(bad.validate().is_err());

        let mut tiny = GenerationConfig::new(1);
        tiny.map_width = 5;
        assert!(tiny.validate().is_err());
    }

    #[test]
    fn test_generation_config_rejects_oversized_bounds() {
        let huge = GenerationConfig {
            map_width: 3_000_000_000,
            ..GenerationConfig::for_testing(1)
        };
        assert!(matches!(huge.validate(), Err(TombsError::GenerationFailed(_))));

        let wide = GenerationConfig {
            map_width: 100_000,
            map_height: 100_000,
            ..GenerationConfig::for_testing(1)
        };
        assert!(wide.validate().is_err());

        let unbounded_rooms = GenerationConfig {
            room_max_size: u32::MAX,
            ..GenerationConfig::for_testing(1)
        };
        assert!(unbounded_rooms.validate().is_err());

        let endless = GenerationConfig {
            max_rooms: u32::MAX,
            ..GenerationConfig::for_testing(1)
        };
        assert!(endless.validate().is_err());

        let largest = GenerationConfig {
            map_width: MAX_MAP_DIMENSION,
            map_height: MAX_MAP_DIMENSION,
            ..GenerationConfig::for_testing(1)
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_room_geometry() {
        let room = Room::new(Position::new(5, 5), 4, 4);
        assert_eq!(room.bottom_right(), Position::new(9, 9));
        assert_eq!(room.center(), Position::new(7, 7));
        assert!(room.is_border(Position::new(5, 5)));
        assert!(room.is_border(Position::new(9, 7)));
        assert!(!room.is_border(Position::new(7, 7)));
        assert!(!room.is_border(Position::new(10, 7)));

        let floors: HashSet<_> = room.floor_positions().into_iter().collect();
        let walls: HashSet<_> = room.wall_positions().into_iter().collect();
        assert_eq!(floors.len(), 9);
        assert_eq!(walls.len(), 16);
        assert!(floors.is_disjoint(&walls));
    }

    #[test]
    fn test_room_intersection_includes_touching() {
        let room1 = Room::new(Position::new(0, 0), 4, 4);
        let touching = Room::new(Position::new(4, 0), 4, 4);
        let apart = Room::new(Position::new(6, 6), 3, 3);
        assert!(room1.intersects(&touching));
        assert!(touching.intersects(&room1));
        assert!(!room1.intersects(&apart));
    }

    #[test]
    fn test_utils_rng_is_deterministic() {
        use rand::Rng;
        let config = GenerationConfig::new(12345);
        let a: u64 = utils::create_rng(&config).gen();
        let b: u64 = utils::create_rng(&config).gen();
        assert_eq!(a, b);
    }
}
