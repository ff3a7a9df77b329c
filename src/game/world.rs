//! # World Module
//!
//! Tiles, the per-floor map with its visibility masks and entity membership, and the
//! floor-to-floor world state.

use crate::game::color;
use crate::generation::{GeneratedFloor, GenerationConfig, Generator, RoomCorridorGenerator};
use crate::{Actor, ConcreteEntity, Entity, EntityId, Item, Position, Rgb, TombsError, TombsResult};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// What a tile is, independent of how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Floor,
    Wall,
    DownStairs,
    Void,
}

/// How a tile looks in one lighting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graphic {
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Graphic {
    pub const fn new(glyph: char, fg: Rgb, bg: Rgb) -> Self {
        Self { glyph, fg, bg }
    }
}

/// An immutable tile value. Maps hold one per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    pub walkable: bool,
    pub transparent: bool,
    /// Graphic when remembered but not in view
    pub dark: Graphic,
    /// Graphic when in view
    pub light: Graphic,
}

impl Tile {
    pub const fn floor() -> Self {
        Self {
            tile_type: TileType::Floor,
            walkable: true,
            transparent: true,
            dark: Graphic::new(' ', color::WHITE, color::FLOOR_DARK),
            light: Graphic::new(' ', color::WHITE, color::FLOOR_LIGHT),
        }
    }

    pub const fn wall() -> Self {
        Self {
            tile_type: TileType::Wall,
            walkable: false,
            transparent: false,
            dark: Graphic::new('#', color::WHITE, color::WALL_DARK),
            light: Graphic::new('#', color::WHITE, color::WALL_LIGHT),
        }
    }

    pub const fn down_stairs() -> Self {
        Self {
            tile_type: TileType::DownStairs,
            walkable: true,
            transparent: true,
            dark: Graphic::new('>', color::STAIRS_DARK, color::FLOOR_DARK),
            light: Graphic::new('>', color::STAIRS_LIGHT, color::FLOOR_LIGHT),
        }
    }

    /// Empty space outside the dungeon. Neither walkable nor transparent.
    pub const fn void() -> Self {
        Self {
            tile_type: TileType::Void,
            walkable: false,
            transparent: false,
            dark: Graphic::new(' ', color::BLACK, color::BLACK),
            light: Graphic::new(' ', color::BLACK, color::BLACK),
        }
    }
}

/// One dungeon floor.
///
/// Grids are stored row-major. The map is the sole owner of every entity placed on
/// it; entities keep insertion order so enemy turns resolve deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
    visible: Vec<bool>,
    explored: Vec<bool>,
    pub downstairs_location: Option<Position>,
    entities: Vec<ConcreteEntity>,
}

impl GameMap {
    /// Creates a map filled with `fill`.
    pub fn new(width: i32, height: i32, fill: Tile) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            tiles: vec![fill; size],
            visible: vec![false; size],
            explored: vec![false; size],
            downstairs_location: None,
            entities: Vec::new(),
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).map(|idx| &self.tiles[idx])
    }

    pub fn set_tile(&mut self, pos: Position, tile: Tile) {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx] = tile;
        }
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).is_some_and(|tile| tile.walkable)
    }

    /// Out-of-bounds cells are opaque.
    pub fn is_transparent(&self, pos: Position) -> bool {
        self.tile(pos).is_some_and(|tile| tile.transparent)
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|idx| self.visible[idx])
    }

    pub fn is_explored(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|idx| self.explored[idx])
    }

    /// Row-major visibility mask.
    pub fn visible_mask(&self) -> &[bool] {
        &self.visible
    }

    /// Row-major explored mask.
    pub fn explored_mask(&self) -> &[bool] {
        &self.explored
    }

    /// Replaces the visible set and folds it into explored memory.
    ///
    /// Explored cells are only ever added, never cleared.
    pub fn set_visible_mask(&mut self, visible: Vec<bool>) {
        debug_assert_eq!(visible.len(), self.visible.len());
        if visible.len() != self.visible.len() {
            return;
        }
        for (explored, &seen) in self.explored.iter_mut().zip(&visible) {
            *explored |= seen;
        }
        self.visible = visible;
    }

    /// All cells in bounds, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub fn entities(&self) -> &[ConcreteEntity] {
        &self.entities
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.entities.iter().filter_map(ConcreteEntity::as_actor)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entities.iter().filter_map(ConcreteEntity::as_item)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|entity| entity.id() == id)
    }

    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.actors().find(|actor| actor.id == id)
    }

    pub fn actor_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.entities
            .iter_mut()
            .filter_map(ConcreteEntity::as_actor_mut)
            .find(|actor| actor.id == id)
    }

    /// The living actor at `pos`, if any.
    pub fn get_actor_at_location(&self, pos: Position) -> Option<&Actor> {
        self.actors()
            .find(|actor| actor.position == pos && actor.is_alive())
    }

    /// Any actor at `pos` other than `exclude`, living or not.
    pub fn get_any_actor_at_location(&self, pos: Position, exclude: EntityId) -> Option<&Actor> {
        self.actors()
            .find(|actor| actor.position == pos && actor.id != exclude)
    }

    pub fn get_blocking_entity_at_location(&self, pos: Position) -> Option<&ConcreteEntity> {
        self.entities
            .iter()
            .find(|entity| entity.blocks_movement() && entity.position() == pos)
    }

    pub fn items_at(&self, pos: Position) -> impl Iterator<Item = &Item> {
        self.items().filter(move |item| item.position == pos)
    }

    /// Adds an entity, replacing any earlier copy with the same id.
    pub fn place(&mut self, entity: ConcreteEntity) {
        let id = entity.id();
        self.entities.retain(|existing| existing.id() != id);
        self.entities.push(entity);
    }

    /// Detaches an entity from this map and hands ownership back.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<ConcreteEntity> {
        let idx = self.entities.iter().position(|entity| entity.id() == id)?;
        Some(self.entities.remove(idx))
    }

    /// True when `pos` is inside the map, walkable, and not occupied by a blocker.
    pub fn is_open(&self, pos: Position) -> bool {
        self.is_walkable(pos) && self.get_blocking_entity_at_location(pos).is_none()
    }
}

/// State that spans floors: how floors are generated and how deep the player is.
#[derive(Debug, Clone)]
pub struct GameWorld {
    pub config: GenerationConfig,
    pub current_floor: u32,
    rng: StdRng,
}

impl GameWorld {
    pub fn new(config: GenerationConfig) -> Self {
        let rng = crate::generation::utils::create_rng(&config);
        Self {
            config,
            current_floor: 0,
            rng,
        }
    }

    /// Builds the next floor and moves the player onto it.
    ///
    /// The floor counter only advances once a map was produced.
    pub fn generate_floor(&mut self, mut player: Actor) -> TombsResult<GameMap> {
        let floor = self.current_floor + 1;
        let seed = self.rng.gen::<u64>();
        let mut floor_rng = StdRng::seed_from_u64(seed);
        let generator = RoomCorridorGenerator::new(floor);
        let generated = generator
            .generate(&self.config, &mut floor_rng)
            .map_err(|e| TombsError::GenerationFailed(format!("floor {}: {}", floor, e)))?;
        generator.validate(&generated, &self.config)?;

        let GeneratedFloor {
            mut map,
            player_start,
        } = generated;
        player.position = player_start;
        map.place(ConcreteEntity::Actor(player));
        self.current_floor = floor;
        debug!(
            "Generated floor {} ({}x{}, {} entities)",
            floor,
            map.width,
            map.height,
            map.entities().len()
        );
        Ok(map)
    }
}
