//! # Tombs Roguelike
//!
//! A turn-based, tile-grid roguelike that can be played locally or driven remotely
//! by scripted agents.
//!
//! ## Architecture Overview
//!
//! - **Game**: entities, components, the tile map, visibility and the turn engine
//! - **Actions**: command objects that either apply completely or fail as `Impossible`
//! - **Input**: the event-handler state machine shared by local keys and remote tokens
//! - **Generation**: procedural floors and fixed map loading
//! - **MCP**: the thread-safe session bridge and the JSON-RPC control surface
//! - **Rendering**: a macroquad view of the current session
//!
//! ## Remote Control
//!
//! Every gameplay input has a string token form (`"w"`, `"g"`, `"space"`, ...). Remote
//! tokens are queued and replayed through exactly the same dispatch path as local key
//! presses, so a turn is always resolved by the single turn-processing thread.

pub mod game;
pub mod generation;
pub mod input;
pub mod mcp;
pub mod rendering;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use mcp::*;
pub use utils::*;

pub use rendering::MacroquadDisplay;

/// Core error type for the Tombs engine.
#[derive(thiserror::Error, Debug)]
pub enum TombsError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A map source could not be turned into a playable map
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Network service error
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type used throughout the Tombs codebase.
pub type TombsResult<T> = Result<T, TombsError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_MAP_WIDTH: u32 = 30;

    /// Default dungeon height in tiles
    pub const DEFAULT_MAP_HEIGHT: u32 = 30;

    /// Default number of room placement attempts per floor
    pub const DEFAULT_MAX_ROOMS: u32 = 30;

    /// Default minimum room size (including walls)
    pub const DEFAULT_ROOM_MIN_SIZE: u32 = 4;

    /// Default maximum room size (including walls)
    pub const DEFAULT_ROOM_MAX_SIZE: u32 = 6;

    /// Largest accepted map side for procedural floors
    pub const MAX_MAP_DIMENSION: u32 = 1000;

    /// Largest accepted number of room placement attempts per floor
    pub const MAX_ROOM_ATTEMPTS: u32 = 10_000;

    /// Sight radii above this are treated as this
    pub const MAX_FOV_RADIUS: u32 = 1000;

    /// Default field-of-view radius in tiles
    pub const DEFAULT_FOV_RADIUS: u32 = 8;

    /// Player starting health
    pub const PLAYER_MAX_HP: i32 = 100;

    /// Player attack power
    pub const PLAYER_POWER: i32 = 4;

    /// Player inventory capacity
    pub const PLAYER_INVENTORY_CAPACITY: usize = 26;

    /// Health restored by one potion
    pub const HEALTH_POTION_AMOUNT: i32 = 5;

    /// Potions handed to the player at the start of a session
    pub const STARTING_POTIONS: usize = 2;

    /// Max hp gained per floor below the first
    pub const MAX_HP_PER_FLOOR: i32 = 15;

    /// Frames per second target for the game loop
    pub const TARGET_FPS: u64 = 60;

    /// Default JSON-RPC port
    pub const DEFAULT_API_PORT: u16 = 8000;

    /// Default JSON-RPC bind address
    pub const DEFAULT_API_HOST: &str = "0.0.0.0";

    /// How long a remote request waits for its action to be observed
    pub const ACTION_ACK_TIMEOUT_MS: u64 = 500;

    /// Poll interval while waiting for an action to be observed
    pub const ACTION_POLL_INTERVAL_MS: u64 = 10;

    /// Map file used by the fixed-map mode when none is given
    pub const DEFAULT_MAP_FILE: &str = "custom_map.txt";
}
