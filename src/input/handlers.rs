//! # Event Handlers
//!
//! The screen-level state machine. Each key press goes to the active handler,
//! which either switches to another handler or produces at most one action for the
//! engine to resolve.

use crate::game::color;
use crate::{
    BumpAction, ConcreteAction, Engine, ItemAction, Key, PickupAction, SessionConfig,
    TakeStairsAction, TombsResult, WaitAction,
};
use log::{error, info};
use serde::{Deserialize, Serialize};

/// Lines shown by the help prompt.
pub const HELP_LINES: &[&str] = &[
    "Arrow keys / WASD: move or attack",
    ".: wait a turn",
    "g: pick up an item",
    "i: drink a health potion",
    "space: take the stairs",
    "Press any key to continue.",
];

/// Which screen is receiving input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventHandler {
    #[default]
    MainMenu,
    MainGame,
    /// Modal prompt over the game; any non-modifier key closes it
    AskUser,
    GameOver,
    GameDone,
}

impl EventHandler {
    pub fn is_terminal(self) -> bool {
        matches!(self, EventHandler::GameOver | EventHandler::GameDone)
    }
}

/// What the caller should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Continue,
    Quit,
}

/// Sessions the main menu can start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuOptions {
    /// Started with `n`
    pub new_game: SessionConfig,
    /// Started with `s`
    pub fixed_map: SessionConfig,
}

/// The engine and the handler that owns input for it.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub engine: Option<Engine>,
    pub handler: EventHandler,
    pub menu: MenuOptions,
    /// Why the last session start failed, if it did
    pub last_error: Option<String>,
    /// Number of engines started so far
    pub generation: u64,
    /// Number of start attempts, successful or not
    pub start_attempts: u64,
}

impl GameSession {
    /// A session sitting in the main menu.
    pub fn new(menu: MenuOptions) -> Self {
        Self {
            engine: None,
            handler: EventHandler::MainMenu,
            menu,
            last_error: None,
            generation: 0,
            start_attempts: 0,
        }
    }

    /// Replaces the engine with a fresh one built from `config`.
    ///
    /// On error the current engine and handler are kept.
    pub fn start(&mut self, config: SessionConfig) -> TombsResult<()> {
        self.start_attempts += 1;
        let engine = Engine::new_game(config)?;
        self.engine = Some(engine);
        self.handler = EventHandler::MainGame;
        self.last_error = None;
        self.generation += 1;
        Ok(())
    }

    /// Like [`GameSession::start`], but records and logs a failure instead of
    /// returning it.
    pub fn try_start(&mut self, config: SessionConfig) -> bool {
        match self.start(config) {
            Ok(()) => true,
            Err(e) => {
                error!("Could not start a game: {}", e);
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    /// True while turns can be taken.
    pub fn is_playing(&self) -> bool {
        self.engine.is_some()
            && matches!(self.handler, EventHandler::MainGame | EventHandler::AskUser)
    }

    pub fn handle_key(&mut self, key: Key) -> HandlerOutcome {
        #[cfg(feature = "dev-tools")]
        tracing::trace!(?key, handler = ?self.handler, "dispatching key");
        match self.handler {
            EventHandler::MainMenu => match key {
                Key::N => {
                    self.try_start(self.menu.new_game.clone());
                }
                Key::S => {
                    self.try_start(self.menu.fixed_map.clone());
                }
                Key::Q | Key::Escape => return HandlerOutcome::Quit,
                _ => {}
            },
            EventHandler::MainGame => self.handle_main_game(key),
            EventHandler::AskUser => {
                if !key.is_modifier() {
                    self.handler = EventHandler::MainGame;
                }
            }
            EventHandler::GameOver | EventHandler::GameDone => {
                if key.is_dismiss() {
                    info!("Returning to the main menu");
                    self.engine = None;
                    self.handler = EventHandler::MainMenu;
                }
            }
        }
        HandlerOutcome::Continue
    }

    fn handle_main_game(&mut self, key: Key) {
        let Some(engine) = self.engine.as_mut() else {
            self.handler = EventHandler::MainMenu;
            return;
        };
        if key == Key::F1 {
            self.handler = EventHandler::AskUser;
            return;
        }

        let Some(action) = key_to_action(engine, key) else {
            return;
        };
        engine.start_new_step();
        engine.handle_player_action(&action);

        if engine.game_done {
            self.handler = EventHandler::GameDone;
        } else if !engine.is_player_alive() {
            self.handler = EventHandler::GameOver;
        }
    }
}

/// The action a gameplay key asks for, if any. Never touches the engine.
pub fn action_for_key(engine: &Engine, key: Key) -> Option<ConcreteAction> {
    let entity = engine.player_id;
    if let Some(direction) = key.direction() {
        return Some(ConcreteAction::Bump(BumpAction { entity, direction }));
    }
    match key {
        Key::Period => Some(ConcreteAction::Wait(WaitAction { entity })),
        Key::G => Some(ConcreteAction::Pickup(PickupAction { entity })),
        Key::Space => Some(ConcreteAction::TakeStairs(TakeStairsAction { entity })),
        Key::I => engine
            .player()
            .and_then(|player| player.inventory.as_ref())
            .and_then(|inventory| inventory.first_healing_item())
            .map(|item_index| ConcreteAction::Item(ItemAction { entity, item_index })),
        _ => None,
    }
}

fn key_to_action(engine: &mut Engine, key: Key) -> Option<ConcreteAction> {
    let action = action_for_key(engine, key);
    if action.is_none() && key == Key::I {
        engine
            .message_log
            .add_message("You don't have any health potions!", color::INVALID);
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerationConfig, Position};

    const CORRIDOR: &str = "######\n#@...#\n####.#\n####.#\n####>#\n######";

    fn menu() -> MenuOptions {
        MenuOptions {
            new_game: SessionConfig::procedural(GenerationConfig::for_testing(11)),
            fixed_map: SessionConfig::inline(CORRIDOR),
        }
    }

    fn playing(map: &str) -> GameSession {
        let mut session = GameSession::new(menu());
        session.start(SessionConfig::inline(map)).unwrap();
        session
    }

    #[test]
    fn test_main_menu_transitions() {
        let mut session = GameSession::new(menu());
        assert_eq!(session.handle_key(Key::W), HandlerOutcome::Continue);
        assert_eq!(session.handler, EventHandler::MainMenu);

        session.handle_key(Key::N);
        assert_eq!(session.handler, EventHandler::MainGame);
        assert!(!session.engine.as_ref().unwrap().uses_fixed_map());
        assert_eq!(session.generation, 1);

        let mut session = GameSession::new(menu());
        session.handle_key(Key::S);
        assert!(session.engine.as_ref().unwrap().uses_fixed_map());

        let mut session = GameSession::new(menu());
        assert_eq!(session.handle_key(Key::Escape), HandlerOutcome::Quit);
    }

    #[test]
    fn test_failed_start_stays_in_menu() {
        let mut session = GameSession::new(MenuOptions {
            new_game: SessionConfig::default(),
            fixed_map: SessionConfig::fixed_map("/no/such/map.txt"),
        });
        session.handle_key(Key::S);
        assert_eq!(session.handler, EventHandler::MainMenu);
        assert!(session.engine.is_none());
        assert!(session.last_error.is_some());
        assert_eq!(session.generation, 0);
        assert_eq!(session.start_attempts, 1);
    }

    #[test]
    fn test_corridor_walk_to_victory() {
        let mut session = playing(CORRIDOR);
        for key in [Key::D, Key::Right, Key::D, Key::S, Key::Down, Key::S, Key::Space] {
            session.handle_key(key);
        }
        let engine = session.engine.as_ref().unwrap();
        assert!(engine.game_done);
        assert_eq!(engine.dungeon_level(), 1);
        assert_eq!(engine.step_counter, 7);
        assert_eq!(session.handler, EventHandler::GameDone);

        assert!(!session.is_playing());
        session.handle_key(Key::W);
        assert_eq!(session.handler, EventHandler::GameDone);
        session.handle_key(Key::Q);
        assert_eq!(session.handler, EventHandler::MainMenu);
        assert!(session.engine.is_none());
    }

    #[test]
    fn test_impossible_still_counts_a_step() {
        let mut session = playing(CORRIDOR);
        session.handle_key(Key::W);
        let engine = session.engine.as_ref().unwrap();
        assert_eq!(engine.step_counter, 1);
        assert_eq!(engine.player_position(), Some(Position::new(1, 1)));
        assert_eq!(engine.message_log.step_texts(), vec!["That way is blocked.".to_string()]);
        assert_eq!(session.handler, EventHandler::MainGame);
    }

    #[test]
    fn test_consume_without_potions_takes_no_step() {
        let mut session = playing(CORRIDOR);
        if let Some(inventory) = session
            .engine
            .as_mut()
            .and_then(|e| e.player_mut())
            .and_then(|p| p.inventory.as_mut())
        {
            inventory.items.clear();
        }
        session.handle_key(Key::I);
        let engine = session.engine.as_ref().unwrap();
        assert_eq!(engine.step_counter, 0);
        assert_eq!(
            engine.message_log.messages().last().map(|m| m.plain_text.as_str()),
            Some("You don't have any health potions!")
        );
    }

    #[test]
    fn test_help_prompt_swallows_one_key() {
        let mut session = playing(CORRIDOR);
        session.handle_key(Key::F1);
        assert_eq!(session.handler, EventHandler::AskUser);
        session.handle_key(Key::Shift);
        assert_eq!(session.handler, EventHandler::AskUser);
        session.handle_key(Key::D);
        assert_eq!(session.handler, EventHandler::MainGame);
        assert_eq!(session.engine.as_ref().unwrap().step_counter, 0);
    }

    #[test]
    fn test_death_moves_to_game_over() {
        let mut session = playing("#####\n#@T>#\n#####");
        if let Some(fighter) = session
            .engine
            .as_mut()
            .and_then(|e| e.player_mut())
            .and_then(|p| p.fighter.as_mut())
        {
            fighter.set_hp(3);
        }
        session.handle_key(Key::Period);
        assert_eq!(session.handler, EventHandler::GameOver);
        session.handle_key(Key::Escape);
        assert_eq!(session.handler, EventHandler::MainMenu);
    }
}
