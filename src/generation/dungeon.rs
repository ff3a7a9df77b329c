//! # Dungeon Generation
//!
//! Room-and-corridor floors on a void background.
//!
//! The generator:
//! 1. Places non-touching rooms at random, each drawn as a wall ring around floor
//! 2. Joins each room to the previous one with an L-shaped tunnel walled on both sides
//! 3. Populates every room from the floor's encounter tables
//! 4. Puts the player start in the first room and the stairs in the last

use crate::generation::utils;
use crate::{
    EncounterGenerator, GameMap, GeneratedFloor, GenerationConfig, Generator, Position, Room,
    Tile, TileType, TombsError, TombsResult,
};
use log::debug;
use rand::{rngs::StdRng, Rng};
use std::collections::{HashSet, VecDeque};

/// Procedural floor generator for one dungeon depth.
#[derive(Debug, Clone)]
pub struct RoomCorridorGenerator {
    /// Dungeon depth, used for encounter tables
    pub floor: u32,
    /// Whether to check that the stairs are reachable from the start
    pub ensure_connectivity: bool,
}

impl RoomCorridorGenerator {
    /// Creates a generator for the given floor.
    ///
    /// # Examples
    ///
    /// ```
    /// use tombs::{Generator, GenerationConfig, RoomCorridorGenerator};
    /// use tombs::generation::utils::create_rng;
    ///
    /// let config = GenerationConfig::new(42);
    /// let mut rng = create_rng(&config);
    /// let floor = RoomCorridorGenerator::new(1).generate(&config, &mut rng).unwrap();
    /// assert!(floor.map.downstairs_location.is_some());
    /// ```
    pub fn new(floor: u32) -> Self {
        Self {
            floor,
            ensure_connectivity: true,
        }
    }

    /// Places rooms, rejecting candidates that touch an earlier room.
    fn place_rooms(
        &self,
        map: &mut GameMap,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> TombsResult<Vec<Room>> {
        let mut rooms: Vec<Room> = Vec::new();

        for _ in 0..config.max_rooms {
            let width = rng.gen_range(config.room_min_size..=config.room_max_size);
            let height = rng.gen_range(config.room_min_size..=config.room_max_size);
            let x = rng.gen_range(0..=(map.width - width as i32 - 1));
            let y = rng.gen_range(0..=(map.height - height as i32 - 1));
            let room = Room::new(Position::new(x, y), width, height);

            if rooms.iter().any(|other| room.intersects(other)) {
                continue;
            }

            self.carve_room(map, &room);
            if let Some(previous) = rooms.last() {
                let horizontal_first = rng.gen_bool(0.5);
                self.carve_l_corridor(map, previous.center(), room.center(), horizontal_first);
            }
            rooms.push(room);
        }

        if rooms.is_empty() {
            return Err(TombsError::GenerationFailed(
                "Failed to place any rooms".to_string(),
            ));
        }

        Ok(rooms)
    }

    /// Draws the wall ring over void, then fills the interior with floor.
    ///
    /// Existing floor on the ring is kept so earlier tunnels stay open.
    fn carve_room(&self, map: &mut GameMap, room: &Room) {
        for pos in room.wall_positions() {
            if map.tile(pos).is_some_and(|tile| tile.tile_type == TileType::Void) {
                map.set_tile(pos, Tile::wall());
            }
        }
        for pos in room.floor_positions() {
            map.set_tile(pos, Tile::floor());
        }
    }

    /// Carves an L-shaped tunnel and walls in any void around it.
    fn carve_l_corridor(
        &self,
        map: &mut GameMap,
        start: Position,
        end: Position,
        horizontal_first: bool,
    ) {
        let corner = if horizontal_first {
            Position::new(end.x, start.y)
        } else {
            Position::new(start.x, end.y)
        };

        for pos in straight_line(start, corner).chain(straight_line(corner, end)) {
            map.set_tile(pos, Tile::floor());
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let neighbor = Position::new(pos.x + dx, pos.y + dy);
                    if map
                        .tile(neighbor)
                        .is_some_and(|tile| tile.tile_type == TileType::Void)
                    {
                        map.set_tile(neighbor, Tile::wall());
                    }
                }
            }
        }
    }

    /// Puts the down stairs at the center of the last room.
    fn add_stairs(&self, map: &mut GameMap, rooms: &[Room]) {
        if let Some(last) = rooms.last() {
            let stairs = last.center();
            map.set_tile(stairs, Tile::down_stairs());
            map.downstairs_location = Some(stairs);
        }
    }

    /// Checks that the stairs can be walked to from the player start.
    fn validate_connectivity(&self, floor: &GeneratedFloor) -> TombsResult<()> {
        let Some(stairs) = floor.map.downstairs_location else {
            return Ok(());
        };
        if !self.ensure_connectivity {
            return Ok(());
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(floor.player_start);
        visited.insert(floor.player_start);

        while let Some(pos) = queue.pop_front() {
            if pos == stairs {
                return Ok(());
            }
            for adjacent_pos in pos.cardinal_adjacent_positions() {
                if !visited.contains(&adjacent_pos) && floor.map.is_walkable(adjacent_pos) {
                    visited.insert(adjacent_pos);
                    queue.push_back(adjacent_pos);
                }
            }
        }

        Err(TombsError::GenerationFailed(format!(
            "stairs at {:?} unreachable from {:?}",
            stairs, floor.player_start
        )))
    }
}

/// Cells of an axis-aligned segment, both ends included.
fn straight_line(from: Position, to: Position) -> impl Iterator<Item = Position> {
    let steps = (to.x - from.x).abs().max((to.y - from.y).abs());
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    (0..=steps).map(move |i| Position::new(from.x + dx * i, from.y + dy * i))
}

impl Generator<GeneratedFloor> for RoomCorridorGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TombsResult<GeneratedFloor> {
        config.validate()?;

        let mut map = GameMap::new(config.map_width as i32, config.map_height as i32, Tile::void());
        let rooms = self.place_rooms(&mut map, config, rng)?;
        self.add_stairs(&mut map, &rooms);

        let player_start = rooms[0].center();
        let encounters = EncounterGenerator::new(self.floor);
        for room in &rooms {
            encounters.place_entities(room, &mut map, rng, &[player_start]);
        }

        debug!(
            "{} built floor {} with {} rooms",
            self.generator_type(),
            self.floor,
            rooms.len()
        );

        Ok(GeneratedFloor { map, player_start })
    }

    fn validate(&self, floor: &GeneratedFloor, _config: &GenerationConfig) -> TombsResult<()> {
        utils::validate_floor(floor)?;
        self.validate_connectivity(floor)
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

impl Default for RoomCorridorGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_produces_playable_floor() {
        let generator = RoomCorridorGenerator::new(1);
        let config = GenerationConfig::for_testing(12345);
        let mut rng = utils::create_rng(&config);

        let floor = generator.generate(&config, &mut rng).unwrap();
        assert_eq!(floor.map.width, 24);
        assert_eq!(floor.map.height, 24);
        assert!(floor.map.is_walkable(floor.player_start));
        assert!(floor.map.downstairs_location.is_some());
        assert!(generator.validate(&floor, &config).is_ok());
        // The player start is never handed to a monster.
        assert!(floor.map.get_actor_at_location(floor.player_start).is_none());
    }

    #[test]
    fn test_generation_is_deterministic_for_seed() {
        let generator = RoomCorridorGenerator::new(2);
        let config = GenerationConfig::new(99);
        let a = generator.generate(&config, &mut utils::create_rng(&config)).unwrap();
        let b = generator.generate(&config, &mut utils::create_rng(&config)).unwrap();
        assert_eq!(a.player_start, b.player_start);
        assert_eq!(a.map.downstairs_location, b.map.downstairs_location);
        assert_eq!(a.map.entities().len(), b.map.entities().len());
    }

    #[test]
    fn test_many_seeds_stay_connected() {
        let generator = RoomCorridorGenerator::new(1);
        for seed in 0..25 {
            let config = GenerationConfig::new(seed);
            let floor = generator.generate(&config, &mut utils::create_rng(&config)).unwrap();
            assert!(generator.validate(&floor, &config).is_ok(), "seed {}", seed);
        }
    }

    #[test]
    fn test_l_corridor_is_walled() {
        let generator = RoomCorridorGenerator::new(1);
        let mut map = GameMap::new(20, 20, Tile::void());
        let start = Position::new(5, 5);
        let end = Position::new(15, 15);

        generator.carve_l_corridor(&mut map, start, end, true);

        assert_eq!(map.tile(start).unwrap().tile_type, TileType::Floor);
        assert_eq!(map.tile(Position::new(15, 5)).unwrap().tile_type, TileType::Floor);
        assert_eq!(map.tile(end).unwrap().tile_type, TileType::Floor);
        assert_eq!(map.tile(Position::new(10, 4)).unwrap().tile_type, TileType::Wall);
        assert_eq!(map.tile(Position::new(10, 6)).unwrap().tile_type, TileType::Wall);
        assert_eq!(map.tile(Position::new(0, 19)).unwrap().tile_type, TileType::Void);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let generator = RoomCorridorGenerator::new(1);
        let mut config = GenerationConfig::new(1);
        config.room_min_size = 9;
        assert!(generator.generate(&config, &mut utils::create_rng(&config)).is_err());
    }
}
