//! # Engine
//!
//! The per-session aggregate: the current floor, the player, the message log and
//! the turn counters. An engine is built once per session and replaced wholesale on
//! restart.

use crate::config::{DEFAULT_MAP_FILE, STARTING_POTIONS};
use crate::game::color;
use crate::generation::{load_custom_map, load_custom_map_from_str, GeneratedFloor, GenerationConfig};
use crate::{
    health_potion, player, update_visibility, Action, ActionResult, Actor, ConcreteEntity,
    EntityId, FovMode, GameMap, GameWorld, Impossible, MessageLog, Position, TombsResult,
};
use log::{debug, error, info, trace};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Greeting shown when a session starts.
pub const WELCOME_MESSAGE: &str = "Hello and welcome, adventurer, to yet another dungeon!";

/// Where a session's floors come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MapSource {
    /// Fresh random floors, descending forever
    Procedural(GenerationConfig),
    /// A single floor read from a text file; the stairs end the game
    FixedMap { path: PathBuf },
    /// A single floor given as a string; the stairs end the game
    InlineMap { map: String },
}

impl Default for MapSource {
    fn default() -> Self {
        MapSource::Procedural(GenerationConfig::default())
    }
}

/// Where the player has to stand to use the stairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StairsRule {
    /// On the stairs cell
    #[default]
    SameCell,
    /// On the stairs cell or orthogonally next to it
    Adjacent,
}

impl StairsRule {
    /// True when `pos` may use stairs at `stairs`.
    pub fn allows(self, pos: Position, stairs: Position) -> bool {
        match self {
            StairsRule::SameCell => pos == stairs,
            StairsRule::Adjacent => pos == stairs || pos.is_orthogonally_adjacent(stairs),
        }
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub map_source: MapSource,
    pub fov_mode: FovMode,
    pub stairs_rule: StairsRule,
    /// Overrides the procedural seed when set
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn procedural(config: GenerationConfig) -> Self {
        Self {
            map_source: MapSource::Procedural(config),
            ..Self::default()
        }
    }

    pub fn fixed_map(path: impl Into<PathBuf>) -> Self {
        Self {
            map_source: MapSource::FixedMap { path: path.into() },
            ..Self::default()
        }
    }

    pub fn default_fixed_map() -> Self {
        Self::fixed_map(DEFAULT_MAP_FILE)
    }

    pub fn inline(map: impl Into<String>) -> Self {
        Self {
            map_source: MapSource::InlineMap { map: map.into() },
            ..Self::default()
        }
    }

    pub fn with_fov(mut self, fov_mode: FovMode) -> Self {
        self.fov_mode = fov_mode;
        self
    }
}

/// One game session.
#[derive(Debug, Clone)]
pub struct Engine {
    pub player_id: EntityId,
    pub game_map: GameMap,
    pub game_world: GameWorld,
    pub message_log: MessageLog,
    /// Steps since the session started
    pub step_counter: u64,
    /// Steps since the player arrived on the current floor
    pub floor_step_counter: u64,
    /// Victory flag, independent of player death
    pub game_done: bool,
    pub config: SessionConfig,
}

impl Engine {
    /// Starts a session: a fresh player with the starting potions, the first floor
    /// and the welcome message.
    ///
    /// Malformed maps and failed generation are reported here, before any turn.
    pub fn new_game(config: SessionConfig) -> TombsResult<Self> {
        let mut hero = player();
        if let Some(inventory) = hero.inventory.as_mut() {
            for _ in 0..STARTING_POTIONS {
                inventory.items.push(health_potion());
            }
        }

        let mut engine = Self::with_player(config, hero)?;
        engine
            .message_log
            .add_message(WELCOME_MESSAGE, color::WELCOME_TEXT);
        info!(
            "New session on floor {} ({}x{} map, {:?})",
            engine.dungeon_level(),
            engine.game_map.width,
            engine.game_map.height,
            engine.config.fov_mode
        );
        Ok(engine)
    }

    /// Builds the first floor around an already created player.
    pub fn with_player(config: SessionConfig, hero: Actor) -> TombsResult<Self> {
        let player_id = hero.id;
        let (game_map, game_world) = match &config.map_source {
            MapSource::Procedural(generation) => {
                let mut generation = generation.clone();
                if let Some(seed) = config.seed {
                    generation.seed = seed;
                }
                let mut world = GameWorld::new(generation);
                let map = world.generate_floor(hero)?;
                (map, world)
            }
            MapSource::FixedMap { path } => Self::fixed_floor(load_custom_map(path)?, hero),
            MapSource::InlineMap { map } => {
                Self::fixed_floor(load_custom_map_from_str(map)?, hero)
            }
        };

        let mut engine = Self {
            player_id,
            game_map,
            game_world,
            message_log: MessageLog::new(),
            step_counter: 0,
            floor_step_counter: 0,
            game_done: false,
            config,
        };
        engine.update_fov();
        Ok(engine)
    }

    fn fixed_floor(floor: GeneratedFloor, mut hero: Actor) -> (GameMap, GameWorld) {
        let GeneratedFloor {
            mut map,
            player_start,
        } = floor;
        hero.position = player_start;
        map.place(ConcreteEntity::Actor(hero));
        let mut world = GameWorld::new(GenerationConfig::default());
        world.current_floor = 1;
        (map, world)
    }

    pub fn player(&self) -> Option<&Actor> {
        self.game_map.actor(self.player_id)
    }

    pub fn player_mut(&mut self) -> Option<&mut Actor> {
        self.game_map.actor_mut(self.player_id)
    }

    pub fn player_position(&self) -> Option<Position> {
        self.player().map(|player| player.position)
    }

    pub fn is_player_alive(&self) -> bool {
        self.player().is_some_and(Actor::is_alive)
    }

    pub fn uses_fixed_map(&self) -> bool {
        !matches!(self.config.map_source, MapSource::Procedural(_))
    }

    /// Current floor index, starting at 1.
    pub fn dungeon_level(&self) -> u32 {
        self.game_world.current_floor.max(1)
    }

    /// Number of healing items the player carries.
    pub fn health_potion_count(&self) -> usize {
        self.player()
            .and_then(|player| player.inventory.as_ref())
            .map_or(0, |inventory| inventory.healing_item_count())
    }

    /// Marks the start of a discrete turn.
    pub fn start_new_step(&mut self) {
        self.message_log.start_new_step();
        self.step_counter += 1;
        self.floor_step_counter += 1;
    }

    /// Resolves one turn for the player: perform, then enemies, then sight.
    ///
    /// On `Impossible` only the message is logged; enemies do not move and
    /// visibility is left as it was.
    pub fn handle_player_action(&mut self, action: &dyn Action) -> bool {
        match action.perform(self) {
            Ok(()) => {
                self.handle_enemy_turns();
                self.update_fov();
                true
            }
            Err(Impossible(reason)) => {
                debug!("Player action impossible: {}", reason);
                self.message_log.add_message(reason, color::IMPOSSIBLE);
                false
            }
        }
    }

    /// Gives every non-player actor with an AI one action, in map order.
    ///
    /// An enemy whose action is impossible simply loses its turn.
    pub fn handle_enemy_turns(&mut self) {
        let enemies: Vec<EntityId> = self
            .game_map
            .actors()
            .filter(|actor| actor.id != self.player_id && actor.ai.is_some())
            .map(|actor| actor.id)
            .collect();

        for id in enemies {
            let Some(mut ai) = self.game_map.actor_mut(id).and_then(|actor| actor.ai.take()) else {
                continue;
            };
            let action = ai.decide(id, self);
            if let Err(Impossible(reason)) = action.perform(self) {
                trace!("Enemy {} wasted its turn: {}", id, reason);
            }
            if let Some(actor) = self.game_map.actor_mut(id) {
                if actor.is_alive() {
                    actor.ai = Some(ai);
                }
            }
        }
    }

    /// Recomputes what the player can see.
    pub fn update_fov(&mut self) {
        if let Some(origin) = self.player_position() {
            update_visibility(&mut self.game_map, origin, self.config.fov_mode);
        }
    }

    /// Runs the death transition for `id`.
    ///
    /// The player stays on the map as remains and both message buffers are cleared
    /// first. Anyone else is removed from the map.
    pub fn die(&mut self, id: EntityId) {
        if id == self.player_id {
            self.message_log.clear();
            if let Some(player) = self.player_mut() {
                player.become_remains();
            }
            info!("Player died on floor {}", self.dungeon_level());
            self.message_log.add_message("You died!", color::PLAYER_DIE);
        } else if let Some(ConcreteEntity::Actor(actor)) = self.game_map.remove_entity(id) {
            self.message_log
                .add_message(format!("{} is dead!", actor.name), color::ENEMY_DIE);
        }
    }

    /// The shared stairs predicate used by the action and the legal-action query.
    pub fn can_take_stairs_from(&self, pos: Position) -> bool {
        self.game_map
            .downstairs_location
            .is_some_and(|stairs| self.config.stairs_rule.allows(pos, stairs))
    }

    /// Ends a fixed-map session in victory.
    pub fn complete_map(&mut self) {
        self.game_done = true;
        self.message_log.clear();
        self.message_log
            .add_message("You have completed the map! Game Done.", color::WELCOME_TEXT);
        info!("Map completed after {} steps", self.step_counter);
    }

    /// Moves the player to a freshly generated next floor.
    ///
    /// Generation happens before anything else changes; if it fails the player is
    /// put back and the action is impossible.
    pub fn descend(&mut self) -> ActionResult<()> {
        let Some(ConcreteEntity::Actor(hero)) = self.game_map.remove_entity(self.player_id) else {
            return Err(Impossible::new("There are no stairs here."));
        };

        let new_map = match self.game_world.generate_floor(hero.clone()) {
            Ok(map) => map,
            Err(e) => {
                error!("Could not generate the next floor: {}", e);
                self.game_map.place(ConcreteEntity::Actor(hero));
                return Err(Impossible::new("The stairs lead nowhere."));
            }
        };
        self.game_map = new_map;
        let floor = self.game_world.current_floor;

        let mut scaled = None;
        let mut heal_amount = 0;
        if let Some(fighter) = self.player_mut().and_then(|p| p.fighter.as_mut()) {
            scaled = fighter.apply_dungeon_level_scaling(floor);
            heal_amount = fighter.max_hp / 2;
            fighter.set_hp(fighter.hp() + heal_amount);
        }
        if let Some(increase) = scaled {
            self.message_log.add_message(
                format!(
                    "You adapt to the dungeon's depth! Max health increased by {}!",
                    increase
                ),
                color::HEALTH_RECOVERED,
            );
        }
        self.message_log
            .add_message("You descend the staircase.", color::DESCEND);
        self.message_log.add_message(
            format!("You feel refreshed! Restored {} health.", heal_amount),
            color::HEALTH_RECOVERED,
        );

        self.floor_step_counter = 0;
        self.update_fov();
        info!("Descended to floor {}", floor);
        Ok(())
    }

    /// Short description of what the player stands on.
    pub fn player_tile_description(&self) -> String {
        if self.game_done {
            return "-".to_string();
        }
        let Some(pos) = self.player_position() else {
            return "-".to_string();
        };
        if self.game_map.downstairs_location == Some(pos) {
            return "ladder/stairs".to_string();
        }
        if let Some(item) = self.game_map.items_at(pos).next() {
            return format!("item({}) (press 'g' to pick up)", item.name);
        }
        "floor".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, MovementAction, TakeStairsAction, WaitAction};

    const CORRIDOR: &str = "######\n#@...#\n####.#\n####.#\n####>#\n######";

    #[test]
    fn test_new_game_setup() {
        let engine = Engine::new_game(SessionConfig::inline(CORRIDOR)).unwrap();
        assert_eq!(engine.player_position(), Some(Position::new(1, 1)));
        assert_eq!(engine.health_potion_count(), 2);
        assert_eq!(engine.step_counter, 0);
        assert_eq!(engine.dungeon_level(), 1);
        assert!(engine.uses_fixed_map());
        assert_eq!(engine.message_log.step_texts(), vec![WELCOME_MESSAGE.to_string()]);
        assert!(engine.game_map.is_visible(Position::new(1, 1)));
    }

    #[test]
    fn test_invalid_inline_map_is_hard_error() {
        assert!(Engine::new_game(SessionConfig::inline("###\n#.#\n###")).is_err());
    }

    #[test]
    fn test_step_counters() {
        let mut engine = Engine::new_game(SessionConfig::inline(CORRIDOR)).unwrap();
        engine.start_new_step();
        engine.start_new_step();
        assert_eq!(engine.step_counter, 2);
        assert_eq!(engine.floor_step_counter, 2);
        assert!(engine.message_log.step_messages().is_empty());
    }

    #[test]
    fn test_impossible_action_is_logged_without_enemy_turn() {
        let mut engine = Engine::new_game(SessionConfig::inline("######\n#@.O>#\n######")).unwrap();
        let ghost_id = engine.game_map.get_actor_at_location(Position::new(3, 1)).unwrap().id;
        engine.start_new_step();
        let blocked = MovementAction {
            entity: engine.player_id,
            direction: Direction::North,
        };
        assert!(!engine.handle_player_action(&blocked));
        assert_eq!(engine.message_log.step_texts(), vec!["That way is blocked.".to_string()]);
        assert_eq!(engine.game_map.actor(ghost_id).map(|a| a.position), Some(Position::new(3, 1)));
    }

    #[test]
    fn test_enemy_turn_follows_successful_action() {
        let mut engine = Engine::new_game(SessionConfig::inline("#######\n#@..O>#\n#######")).unwrap();
        let ghost_id = engine.game_map.get_actor_at_location(Position::new(4, 1)).unwrap().id;
        engine.start_new_step();
        assert!(engine.handle_player_action(&WaitAction {
            entity: engine.player_id
        }));
        assert_eq!(engine.game_map.actor(ghost_id).map(|a| a.position), Some(Position::new(3, 1)));
        assert!(engine.game_map.actor(ghost_id).and_then(|a| a.ai.as_ref()).is_some());
    }

    #[test]
    fn test_failed_enemy_action_does_not_stop_the_sweep() {
        let mut engine = Engine::new_game(SessionConfig::inline("#######\n#O@..O#\n###>###")).unwrap();
        let unarmed_id = engine.game_map.get_actor_at_location(Position::new(1, 1)).unwrap().id;
        let chaser_id = engine.game_map.get_actor_at_location(Position::new(5, 1)).unwrap().id;
        if let Some(unarmed) = engine.game_map.actor_mut(unarmed_id) {
            unarmed.fighter = None;
        }

        engine.start_new_step();
        assert!(engine.handle_player_action(&WaitAction {
            entity: engine.player_id
        }));

        let unarmed = engine.game_map.actor(unarmed_id).unwrap();
        assert_eq!(unarmed.position, Position::new(1, 1));
        assert!(unarmed.ai.is_none());
        assert_eq!(engine.game_map.actor(chaser_id).map(|a| a.position), Some(Position::new(4, 1)));
        assert_eq!(engine.player().and_then(|p| p.fighter.as_ref()).map(|f| f.hp()), Some(100));
        assert!(engine.message_log.step_messages().is_empty());
    }

    #[test]
    fn test_player_death_keeps_remains_and_clears_log() {
        let mut engine = Engine::new_game(SessionConfig::inline("#####\n#@T>#\n#####")).unwrap();
        if let Some(fighter) = engine.player_mut().and_then(|p| p.fighter.as_mut()) {
            fighter.set_hp(8);
        }
        engine.start_new_step();
        assert!(engine.handle_player_action(&WaitAction {
            entity: engine.player_id
        }));

        assert!(!engine.is_player_alive());
        let remains = engine.player().unwrap();
        assert_eq!(remains.name, "remains of Player");
        assert!(!remains.blocks_movement);
        assert_eq!(remains.position, Position::new(1, 1));
        assert_eq!(engine.message_log.messages().len(), 1);
        assert_eq!(engine.message_log.step_texts(), vec!["You died!".to_string()]);
    }

    #[test]
    fn test_enemy_death_removes_it() {
        let mut engine = Engine::new_game(SessionConfig::inline("#####\n#@O>#\n#####")).unwrap();
        let ghost_id = engine.game_map.get_actor_at_location(Position::new(2, 1)).unwrap().id;
        if let Some(fighter) = engine.game_map.actor_mut(ghost_id).and_then(|a| a.fighter.as_mut()) {
            fighter.set_hp(1);
        }
        let attack = crate::MeleeAction {
            entity: engine.player_id,
            direction: Direction::East,
        };
        attack.perform(&mut engine).unwrap();
        assert!(!engine.game_map.contains(ghost_id));
        assert_eq!(
            engine.message_log.step_texts().last().map(String::as_str),
            Some("Ghost is dead!")
        );
    }

    #[test]
    fn test_descend_procedural_floor() {
        let mut engine = Engine::new_game(SessionConfig::procedural(GenerationConfig::for_testing(5))).unwrap();
        let stairs = engine.game_map.downstairs_location.unwrap();
        if let Some(player) = engine.player_mut() {
            player.position = stairs;
        }
        if let Some(fighter) = engine.player_mut().and_then(|p| p.fighter.as_mut()) {
            fighter.set_hp(40);
        }
        engine.start_new_step();
        let taken = TakeStairsAction {
            entity: engine.player_id,
        };
        taken.perform(&mut engine).unwrap();

        assert_eq!(engine.dungeon_level(), 2);
        assert_eq!(engine.floor_step_counter, 0);
        let fighter = engine.player().and_then(|p| p.fighter.clone()).unwrap();
        assert_eq!(fighter.max_hp, 115);
        // 40 + 15 from scaling + 57 from the refresh.
        assert_eq!(fighter.hp(), 112);
        assert_eq!(
            engine.message_log.step_texts(),
            vec![
                "You adapt to the dungeon's depth! Max health increased by 15!".to_string(),
                "You descend the staircase.".to_string(),
                "You feel refreshed! Restored 57 health.".to_string(),
            ]
        );
        assert!(engine.game_map.contains(engine.player_id));
        assert_eq!(engine.health_potion_count(), 2);
    }

    #[test]
    fn test_tile_description() {
        let mut engine = Engine::new_game(SessionConfig::inline("#####\n#@h>#\n#####")).unwrap();
        assert_eq!(engine.player_tile_description(), "floor");
        if let Some(player) = engine.player_mut() {
            player.position = Position::new(2, 1);
        }
        assert_eq!(
            engine.player_tile_description(),
            "item(Health Potion) (press 'g' to pick up)"
        );
        if let Some(player) = engine.player_mut() {
            player.position = Position::new(3, 1);
        }
        assert_eq!(engine.player_tile_description(), "ladder/stairs");
        engine.game_done = true;
        assert_eq!(engine.player_tile_description(), "-");
    }

    #[test]
    fn test_session_config_serde() {
        let json = r##"{"map_source":{"mode":"inline_map","map":"#@>#"},"fov_mode":{"mode":"all"}}"##;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.fov_mode, FovMode::All);
        assert_eq!(config.stairs_rule, StairsRule::SameCell);
        assert!(matches!(config.map_source, MapSource::InlineMap { .. }));

        let procedural = r#"{"map_source":{"mode":"procedural","seed":3,"max_rooms":5,"room_min_size":4,"room_max_size":6,"map_width":30,"map_height":30}}"#;
        let config: SessionConfig = serde_json::from_str(procedural).unwrap();
        assert!(matches!(config.map_source, MapSource::Procedural(ref g) if g.max_rooms == 5));
    }
}
