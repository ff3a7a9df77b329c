//! # Pathfinding
//!
//! Shortest walkable paths for enemy movement.

use crate::{GameMap, Position};
use ::pathfinding::prelude::bfs;

/// Finds a shortest 4-connected path from `start` to `goal`.
///
/// Steps may not enter unwalkable tiles or cells held by a blocking entity; the goal
/// itself is exempt so a path can end on the actor being chased. Neighbors are
/// expanded in a fixed N, W, E, S order, which makes tie-breaking deterministic.
///
/// The returned path excludes `start` and ends with `goal`. Returns `None` when the
/// goal cannot be reached.
pub fn find_path(map: &GameMap, start: Position, goal: Position) -> Option<Vec<Position>> {
    if start == goal {
        return Some(Vec::new());
    }
    let path = bfs(
        &start,
        |pos: &Position| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|next| {
                    *next == goal
                        || (map.is_walkable(*next)
                            && map.get_blocking_entity_at_location(*next).is_none())
                })
                .filter(|next| map.in_bounds(*next))
                .collect::<Vec<_>>()
        },
        |pos: &Position| *pos == goal,
    )?;
    Some(path.into_iter().skip(1).collect())
}
