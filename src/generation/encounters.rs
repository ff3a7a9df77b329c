//! # Encounter Generation
//!
//! Per-floor monster and item tables and their placement inside rooms.
//!
//! Tables are keyed by the first floor an entry applies to. Later entries for the
//! same template override earlier weights, so a template can grow more common with
//! depth.

use crate::{ghost, health_potion, red_ghost, GameMap, Position, Room};
use log::trace;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;

/// Entity templates the generator knows how to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spawnable {
    Ghost,
    RedGhost,
    HealthPotion,
}

impl Spawnable {
    /// Spawns a fresh copy of the template on `map`.
    pub fn spawn(self, map: &mut GameMap, position: Position) {
        match self {
            Spawnable::Ghost => {
                ghost().spawn(map, position);
            }
            Spawnable::RedGhost => {
                red_ghost().spawn(map, position);
            }
            Spawnable::HealthPotion => {
                health_potion().spawn(map, position);
            }
        }
    }
}

/// `(first floor, value)` pairs, sorted by floor.
pub const MAX_ITEMS_BY_FLOOR: &[(u32, u32)] = &[(1, 1), (4, 2)];

/// `(first floor, value)` pairs, sorted by floor.
pub const MAX_MONSTERS_BY_FLOOR: &[(u32, u32)] = &[(1, 2), (4, 3), (6, 5)];

/// `(first floor, template, weight)`, sorted by floor.
pub const ITEM_CHANCES: &[(u32, Spawnable, u32)] = &[(0, Spawnable::HealthPotion, 35)];

/// `(first floor, template, weight)`, sorted by floor.
pub const ENEMY_CHANCES: &[(u32, Spawnable, u32)] = &[
    (0, Spawnable::Ghost, 80),
    (3, Spawnable::RedGhost, 15),
    (5, Spawnable::RedGhost, 30),
    (7, Spawnable::RedGhost, 60),
];

/// Value of the last table row whose floor does not exceed `floor`.
pub fn max_value_for_floor(table: &[(u32, u32)], floor: u32) -> u32 {
    table
        .iter()
        .take_while(|(minimum, _)| *minimum <= floor)
        .last()
        .map(|(_, value)| *value)
        .unwrap_or(0)
}

/// Weights in effect on `floor`, in first-seen order.
pub fn chances_for_floor(table: &[(u32, Spawnable, u32)], floor: u32) -> Vec<(Spawnable, u32)> {
    let mut chances: Vec<(Spawnable, u32)> = Vec::new();
    for (_, kind, weight) in table.iter().take_while(|(minimum, _, _)| *minimum <= floor) {
        match chances.iter_mut().find(|(existing, _)| existing == kind) {
            Some(entry) => entry.1 = *weight,
            None => chances.push((*kind, *weight)),
        }
    }
    chances
}

/// Draws `count` templates with replacement according to `chances`.
pub fn choose_at_random(
    chances: &[(Spawnable, u32)],
    count: u32,
    rng: &mut StdRng,
) -> Vec<Spawnable> {
    let Ok(dist) = WeightedIndex::new(chances.iter().map(|(_, weight)| *weight)) else {
        return Vec::new();
    };
    (0..count).map(|_| chances[dist.sample(rng)].0).collect()
}

/// Populates rooms for one floor.
#[derive(Debug, Clone, Copy)]
pub struct EncounterGenerator {
    pub floor: u32,
}

impl EncounterGenerator {
    pub fn new(floor: u32) -> Self {
        Self { floor }
    }

    /// Spawns a random number of monsters and items inside `room`.
    ///
    /// Candidates landing on an occupied cell or on a `reserved` cell are skipped.
    pub fn place_entities(
        &self,
        room: &Room,
        map: &mut GameMap,
        rng: &mut StdRng,
        reserved: &[Position],
    ) {
        let monster_count = rng.gen_range(0..=max_value_for_floor(MAX_MONSTERS_BY_FLOOR, self.floor));
        let item_count = rng.gen_range(0..=max_value_for_floor(MAX_ITEMS_BY_FLOOR, self.floor));

        let mut picks = choose_at_random(&chances_for_floor(ENEMY_CHANCES, self.floor), monster_count, rng);
        picks.extend(choose_at_random(&chances_for_floor(ITEM_CHANCES, self.floor), item_count, rng));

        let floor_cells = room.floor_positions();
        if floor_cells.is_empty() {
            return;
        }
        for kind in picks {
            let position = floor_cells[rng.gen_range(0..floor_cells.len())];
            let occupied = reserved.contains(&position)
                || map.entities().iter().any(|entity| crate::Entity::position(entity) == position);
            if occupied {
                continue;
            }
            trace!("Spawning {:?} at {:?} on floor {}", kind, position, self.floor);
            kind.spawn(map, position);
        }
    }
}
