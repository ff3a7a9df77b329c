//! Field-of-view for the player.
//!
//! Recursive shadowcasting over eight octants with a Euclidean radius. Walls that
//! stop sight are themselves visible. A second pass drops cells with no direct
//! line from the origin so light does not leak around corners.

use crate::{GameMap, Position};
use serde::{Deserialize, Serialize};

/// How much of the map the player can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FovMode {
    /// Radius-limited sight blocked by opaque tiles
    Partial { radius: u32 },
    /// Every tile is visible; no fog of war
    All,
}

impl Default for FovMode {
    fn default() -> Self {
        FovMode::Partial {
            radius: crate::config::DEFAULT_FOV_RADIUS,
        }
    }
}

/// Recomputes `map`'s visible set from `origin` and folds it into explored memory.
pub fn update_visibility(map: &mut GameMap, origin: Position, mode: FovMode) {
    let visible = match mode {
        FovMode::All => vec![true; (map.width * map.height) as usize],
        FovMode::Partial { radius } => {
            compute_fov(map, origin, radius.min(crate::config::MAX_FOV_RADIUS) as i32)
        }
    };
    map.set_visible_mask(visible);
}

/// Returns the row-major visible mask seen from `origin`.
pub fn compute_fov(map: &GameMap, origin: Position, radius: i32) -> Vec<bool> {
    let mut visible = vec![false; (map.width * map.height) as usize];
    if !map.in_bounds(origin) {
        return visible;
    }

    let mut fov = Shadowcast {
        map,
        origin,
        radius,
        visible: &mut visible,
    };
    fov.mark(origin);
    for octant in 0..8 {
        fov.scan_octant(1, Slope::new(1, 1), Slope::new(0, 1), octant);
    }

    for pos in map.positions() {
        let idx = (pos.y * map.width + pos.x) as usize;
        if visible[idx] && pos != origin && !has_direct_line_of_sight(map, origin, pos) {
            visible[idx] = false;
        }
    }
    visible
}

#[derive(Clone, Copy)]
struct Slope {
    y: i32,
    x: i32,
}

impl Slope {
    fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    fn greater_or_equal(&self, other: &Slope) -> bool {
        self.y * other.x >= other.y * self.x
    }

    fn greater_than(&self, other: &Slope) -> bool {
        self.y * other.x > other.y * self.x
    }
}

struct Shadowcast<'a> {
    map: &'a GameMap,
    origin: Position,
    radius: i32,
    visible: &'a mut Vec<bool>,
}

impl Shadowcast<'_> {
    fn mark(&mut self, pos: Position) {
        if self.map.in_bounds(pos) {
            let idx = (pos.y * self.map.width + pos.x) as usize;
            self.visible[idx] = true;
        }
    }

    fn transform(&self, x: i32, y: i32, octant: u8) -> Position {
        let o = self.origin;
        match octant {
            0 => Position::new(o.x + x, o.y - y),
            1 => Position::new(o.x + y, o.y - x),
            2 => Position::new(o.x - y, o.y - x),
            3 => Position::new(o.x - x, o.y - y),
            4 => Position::new(o.x - x, o.y + y),
            5 => Position::new(o.x - y, o.y + x),
            6 => Position::new(o.x + y, o.y + x),
            _ => Position::new(o.x + x, o.y + y),
        }
    }

    fn scan_octant(&mut self, dist: i32, start: Slope, end: Slope, octant: u8) {
        if dist > self.radius {
            return;
        }
        let mut blocked = false;
        let mut cur_start = start;
        for y in (0..=dist).rev() {
            let top = Slope::new(2 * y + 1, 2 * dist - 1);
            let bot = Slope::new(2 * y - 1, 2 * dist + 1);
            if !(cur_start.greater_or_equal(&bot) && top.greater_than(&end)) {
                continue;
            }
            let pos = self.transform(dist, y, octant);
            if dist * dist + y * y <= self.radius * self.radius {
                self.mark(pos);
            }
            if !self.map.is_transparent(pos) {
                if !blocked {
                    self.scan_octant(dist + 1, cur_start, top, octant);
                    blocked = true;
                }
                cur_start = bot;
            } else if blocked {
                blocked = false;
            }
        }
        if !blocked {
            self.scan_octant(dist + 1, cur_start, end, octant);
        }
    }
}

/// Walks a grid line from `origin` to `target`; any opaque cell strictly between
/// them blocks the view.
fn has_direct_line_of_sight(map: &GameMap, origin: Position, target: Position) -> bool {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    let (sx, sy) = (dx.signum(), dy.signum());
    let (total_x, total_y) = (dx.abs(), dy.abs());

    let (mut x, mut y) = (origin.x, origin.y);
    let (mut step_x, mut step_y) = (0, 0);

    while step_x < total_x || step_y < total_y {
        let lhs = (1 + 2 * step_x) * total_y;
        let rhs = (1 + 2 * step_y) * total_x;
        if lhs == rhs {
            x += sx;
            y += sy;
            step_x += 1;
            step_y += 1;
        } else if lhs < rhs {
            x += sx;
            step_x += 1;
        } else {
            y += sy;
            step_y += 1;
        }

        if x == target.x && y == target.y {
            break;
        }
        if !map.is_transparent(Position::new(x, y)) {
            return false;
        }
    }
    true
}
