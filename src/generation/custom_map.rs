//! # Fixed Maps
//!
//! Loads a floor drawn as text.
//!
//! | Char | Meaning |
//! |------|---------|
//! | `#` | wall |
//! | `.` | floor |
//! | ` ` | void |
//! | `@` | player start (exactly one) |
//! | `>` | down stairs (required) |
//! | `O` | Ghost |
//! | `T` | Red Ghost |
//! | `h` | Health Potion |
//!
//! Short lines are padded with void. Unknown characters become void and are logged.

use crate::{GameMap, GeneratedFloor, Position, Spawnable, Tile, TombsError, TombsResult};
use log::{info, warn};
use std::path::Path;

/// Parses a map string into a floor.
///
/// # Examples
///
/// ```
/// use tombs::load_custom_map_from_str;
///
/// let floor = load_custom_map_from_str("#####\n#@.>#\n#####").unwrap();
/// assert_eq!(floor.player_start.x, 1);
/// assert_eq!(floor.map.downstairs_location.map(|p| p.x), Some(3));
/// ```
pub fn load_custom_map_from_str(source: &str) -> TombsResult<GeneratedFloor> {
    let mut lines: Vec<&str> = source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let height = lines.len() as i32;
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as i32;
    if width == 0 || height == 0 {
        return Err(TombsError::InvalidMap("map is empty".to_string()));
    }

    let mut map = GameMap::new(width, height, Tile::void());
    let mut player_start: Option<Position> = None;

    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            match ch {
                '#' => map.set_tile(pos, Tile::wall()),
                '.' => map.set_tile(pos, Tile::floor()),
                ' ' => {}
                '@' => {
                    if let Some(first) = player_start {
                        return Err(TombsError::InvalidMap(format!(
                            "second player start at {:?} (first at {:?})",
                            pos, first
                        )));
                    }
                    map.set_tile(pos, Tile::floor());
                    player_start = Some(pos);
                }
                '>' => {
                    map.set_tile(pos, Tile::down_stairs());
                    map.downstairs_location = Some(pos);
                }
                'O' | 'T' | 'h' => {
                    map.set_tile(pos, Tile::floor());
                    let kind = match ch {
                        'O' => Spawnable::Ghost,
                        'T' => Spawnable::RedGhost,
                        _ => Spawnable::HealthPotion,
                    };
                    kind.spawn(&mut map, pos);
                }
                other => warn!("Unknown map character {:?} at {:?}, using void", other, pos),
            }
        }
    }

    let player_start = player_start
        .ok_or_else(|| TombsError::InvalidMap("map has no player start '@'".to_string()))?;
    if map.downstairs_location.is_none() {
        return Err(TombsError::InvalidMap("map has no stairs '>'".to_string()));
    }

    Ok(GeneratedFloor { map, player_start })
}

/// Reads and parses a map file.
pub fn load_custom_map(path: impl AsRef<Path>) -> TombsResult<GeneratedFloor> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let floor = load_custom_map_from_str(&source)?;
    info!(
        "Loaded map {} ({}x{})",
        path.display(),
        floor.map.width,
        floor.map.height
    );
    Ok(floor)
}
