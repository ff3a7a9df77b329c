//! # Display Management
//!
//! Draws a [`GameSession`] with macroquad: the map with fog of war, the HUD, the
//! message log, and the menu, help and end screens.

use crate::game::color;
use crate::{
    Engine, Entity, EventHandler, GameMap, GameSession, MessageLog, Position, Rgb, HELP_LINES,
};
use macroquad::prelude::*;

/// Text and colors of one map cell as it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAppearance {
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

/// How a map cell looks: entities in view first, then the tile in its lighting
/// state. Unexplored cells are not drawn.
pub fn cell_appearance(map: &GameMap, pos: Position) -> Option<CellAppearance> {
    let tile = map.tile(pos)?;
    if map.is_visible(pos) {
        let top = map
            .entities()
            .iter()
            .filter(|entity| entity.position() == pos)
            .max_by_key(|entity| entity.render_order());
        let glyph_fg = top.map_or((tile.light.glyph, tile.light.fg), |entity| {
            (entity.glyph(), entity.color())
        });
        Some(CellAppearance {
            glyph: glyph_fg.0,
            fg: glyph_fg.1,
            bg: tile.light.bg,
        })
    } else if map.is_explored(pos) {
        Some(CellAppearance {
            glyph: tile.dark.glyph,
            fg: tile.dark.fg,
            bg: tile.dark.bg,
        })
    } else {
        None
    }
}

/// Converts a game color for macroquad.
pub fn to_color(rgb: Rgb) -> Color {
    Color::from_rgba(rgb.0, rgb.1, rgb.2, 255)
}

/// Macroquad display manager for the game.
pub struct MacroquadDisplay {
    /// Tile size in pixels
    pub tile_size: f32,
    /// Map viewport offset x in tiles
    pub viewport_x: i32,
    /// Map viewport offset y in tiles
    pub viewport_y: i32,
    /// UI panel width in pixels
    pub ui_panel_width: f32,
    /// Number of log lines shown under the map
    pub message_lines: usize,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadDisplay {
    pub fn new() -> Self {
        Self {
            tile_size: 20.0,
            viewport_x: 0,
            viewport_y: 0,
            ui_panel_width: 300.0,
            message_lines: 5,
        }
    }

    fn map_columns(&self) -> i32 {
        ((screen_width() - self.ui_panel_width) / self.tile_size) as i32
    }

    fn map_rows(&self) -> i32 {
        ((screen_height() - 120.0) / self.tile_size) as i32
    }

    /// Centers the viewport on the given position, or pins it to the origin when
    /// the whole map fits.
    pub fn center_viewport_on_position(&mut self, map: &GameMap, position: Position) {
        let (cols, rows) = (self.map_columns(), self.map_rows());
        self.viewport_x = if map.width <= cols {
            0
        } else {
            (position.x - cols / 2).clamp(0, map.width - cols)
        };
        self.viewport_y = if map.height <= rows {
            0
        } else {
            (position.y - rows / 2).clamp(0, map.height - rows)
        };
    }

    /// Draws whatever screen the session is on.
    pub fn render(&mut self, session: &GameSession) {
        clear_background(BLACK);
        match (session.handler, session.engine.as_ref()) {
            (EventHandler::MainMenu, _) | (_, None) => {
                self.render_main_menu(session.last_error.as_deref())
            }
            (handler, Some(engine)) => {
                self.render_game(engine);
                match handler {
                    EventHandler::AskUser => self.render_popup(HELP_LINES, WHITE),
                    EventHandler::GameOver => {
                        self.render_popup(&["You died!", "Press Esc to return to the menu."], RED)
                    }
                    EventHandler::GameDone => self.render_popup(
                        &["You have completed the map!", "Press Esc to return to the menu."],
                        to_color(color::WELCOME_TEXT),
                    ),
                    _ => {}
                }
            }
        }
    }

    /// Renders the complete game screen.
    pub fn render_game(&mut self, engine: &Engine) {
        if let Some(pos) = engine.player_position() {
            self.center_viewport_on_position(&engine.game_map, pos);
        }
        self.render_map(&engine.game_map);
        self.render_ui(engine);
        self.render_messages(&engine.message_log);
    }

    fn render_map(&self, map: &GameMap) {
        let font_size = self.tile_size * 0.9;
        for screen_y in 0..self.map_rows() {
            for screen_x in 0..self.map_columns() {
                let pos = Position::new(self.viewport_x + screen_x, self.viewport_y + screen_y);
                let Some(cell) = cell_appearance(map, pos) else {
                    continue;
                };
                let px = screen_x as f32 * self.tile_size;
                let py = screen_y as f32 * self.tile_size;
                draw_rectangle(px, py, self.tile_size, self.tile_size, to_color(cell.bg));
                if cell.glyph != ' ' {
                    draw_text(
                        &cell.glyph.to_string(),
                        px + self.tile_size * 0.2,
                        py + self.tile_size * 0.8,
                        font_size,
                        to_color(cell.fg),
                    );
                }
            }
        }
    }

    fn render_ui(&self, engine: &Engine) {
        let panel_x = screen_width() - self.ui_panel_width + 10.0;
        let mut line_y = 24.0;
        let line_height = 22.0;

        draw_text("TOMBS", panel_x, line_y, 28.0, WHITE);
        line_y += line_height * 2.0;

        if let Some(fighter) = engine.player().and_then(|p| p.fighter.as_ref()) {
            let bar_width = self.ui_panel_width - 30.0;
            let filled = if fighter.max_hp > 0 {
                bar_width * fighter.hp() as f32 / fighter.max_hp as f32
            } else {
                0.0
            };
            draw_rectangle(panel_x, line_y - 16.0, bar_width, 20.0, to_color(color::BAR_EMPTY));
            draw_rectangle(panel_x, line_y - 16.0, filled, 20.0, to_color(color::BAR_FILLED));
            draw_text(
                &format!("HP: {}/{}", fighter.hp(), fighter.max_hp),
                panel_x + 4.0,
                line_y,
                18.0,
                to_color(color::BAR_TEXT),
            );
            line_y += line_height * 1.5;
        }

        let lines = [
            format!("Dungeon level: {}", engine.dungeon_level()),
            format!("Health potions: {}", engine.health_potion_count()),
            format!("Step: {}", engine.step_counter),
            format!("Standing on: {}", engine.player_tile_description()),
        ];
        for line in &lines {
            draw_text(line, panel_x, line_y, 18.0, WHITE);
            line_y += line_height;
        }

        line_y += line_height;
        draw_text("F1: Help", panel_x, line_y, 16.0, GRAY);
    }

    fn render_messages(&self, log: &MessageLog) {
        let area_y = screen_height() - 110.0;
        let line_height = 18.0;
        let columns = ((screen_width() - self.ui_panel_width) / 8.0).max(20.0) as usize;

        draw_rectangle(0.0, area_y - 14.0, screen_width(), 124.0, Color::new(0.0, 0.0, 0.0, 0.8));

        let mut rows: Vec<(String, Rgb)> = Vec::new();
        for message in log.messages().iter().rev() {
            let wrapped = MessageLog::wrap(&message.full_text(), columns);
            for line in wrapped.into_iter().rev() {
                rows.push((line, message.fg));
            }
            if rows.len() >= self.message_lines {
                break;
            }
        }
        rows.truncate(self.message_lines);
        for (i, (text, fg)) in rows.iter().rev().enumerate() {
            draw_text(text, 10.0, area_y + i as f32 * line_height, 16.0, to_color(*fg));
        }
    }

    fn render_popup(&self, lines: &[&str], title_color: Color) {
        let width = 460.0;
        let height = 40.0 + lines.len() as f32 * 24.0;
        let x = (screen_width() - width) / 2.0;
        let y = (screen_height() - height) / 2.0;
        draw_rectangle(x, y, width, height, Color::new(0.0, 0.0, 0.0, 0.9));
        draw_rectangle_lines(x, y, width, height, 2.0, title_color);
        for (i, line) in lines.iter().enumerate() {
            let fg = if i == 0 { title_color } else { WHITE };
            draw_text(line, x + 20.0, y + 32.0 + i as f32 * 24.0, 20.0, fg);
        }
    }

    fn render_main_menu(&self, last_error: Option<&str>) {
        let cx = screen_width() / 2.0 - 160.0;
        let mut y = screen_height() / 3.0;
        draw_text("TOMBS", cx, y, 48.0, to_color(color::WELCOME_TEXT));
        y += 60.0;
        for line in ["[N] Play a new game", "[S] Play the custom map", "[Q] Quit"] {
            draw_text(line, cx, y, 24.0, WHITE);
            y += 32.0;
        }
        if let Some(error) = last_error {
            y += 16.0;
            draw_text(error, cx, y, 18.0, to_color(color::ERROR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load_custom_map_from_str, update_visibility, FovMode};

    #[test]
    fn test_fog_of_war_appearance() {
        let mut floor = load_custom_map_from_str("#######\n#@.#..#\n#.h#O>#\n#######").unwrap();
        let map = &mut floor.map;
        update_visibility(map, Position::new(1, 1), FovMode::Partial { radius: 8 });

        let potion = cell_appearance(map, Position::new(2, 2)).unwrap();
        assert_eq!((potion.glyph, potion.fg), ('!', color::POTION));
        assert_eq!(potion.bg, color::FLOOR_LIGHT);

        assert_eq!(cell_appearance(map, Position::new(4, 2)), None);

        update_visibility(map, Position::new(4, 1), FovMode::Partial { radius: 8 });
        let remembered = cell_appearance(map, Position::new(1, 1)).unwrap();
        assert_eq!(remembered.bg, color::FLOOR_DARK);
        let ghost = cell_appearance(map, Position::new(4, 2)).unwrap();
        assert_eq!(ghost.glyph, 'o');
    }

    #[test]
    fn test_to_color() {
        let c = to_color(Rgb::new(255, 0, 0));
        assert_eq!((c.r, c.g, c.b, c.a), (1.0, 0.0, 0.0, 1.0));
    }
}
