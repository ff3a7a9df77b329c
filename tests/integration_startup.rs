//! Integration tests to ensure sessions start from every map source.

use std::io::Write;
use tombs::{
    Engine, EventHandler, FovMode, GameSession, GenerationConfig, Key, MenuOptions, Position,
    SessionConfig, TileType, TombsError, TombsResult,
};

#[test]
fn test_procedural_startup() -> TombsResult<()> {
    let engine = Engine::new_game(SessionConfig::procedural(GenerationConfig::new(12345)))?;

    assert_eq!(engine.dungeon_level(), 1);
    assert_eq!(engine.step_counter, 0);
    assert!(engine.is_player_alive());
    assert_eq!(engine.health_potion_count(), 2);

    let pos = engine.player_position().expect("player is on the map");
    assert!(engine.game_map.is_walkable(pos));
    assert!(engine.game_map.is_visible(pos));
    let stairs = engine.game_map.downstairs_location.expect("floor has stairs");
    assert_eq!(
        engine.game_map.tile(stairs).map(|t| t.tile_type),
        Some(TileType::DownStairs)
    );
    Ok(())
}

#[test]
fn test_same_seed_same_floor() -> TombsResult<()> {
    let a = Engine::new_game(SessionConfig::procedural(GenerationConfig::new(7)))?;
    let b = Engine::new_game(SessionConfig::procedural(GenerationConfig::new(7)))?;
    assert_eq!(a.player_position(), b.player_position());
    assert_eq!(a.game_map.downstairs_location, b.game_map.downstairs_location);
    assert_eq!(a.game_map.entities().len(), b.game_map.entities().len());
    Ok(())
}

#[test]
fn test_fixed_map_file_startup() -> TombsResult<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "#######\n#@..O.#\n#.h..>#\n#######\n")?;

    let config = SessionConfig::fixed_map(file.path()).with_fov(FovMode::All);
    let engine = Engine::new_game(config)?;

    assert!(engine.uses_fixed_map());
    assert_eq!(engine.player_position(), Some(Position::new(1, 1)));
    assert_eq!(engine.game_map.downstairs_location, Some(Position::new(5, 2)));
    assert!(engine.game_map.explored_mask().iter().all(|e| *e));
    // Player, ghost and potion.
    assert_eq!(engine.game_map.entities().len(), 3);
    Ok(())
}

#[test]
fn test_malformed_maps_fail_before_play() {
    let no_player = Engine::new_game(SessionConfig::inline("#####\n#..>#\n#####"));
    assert!(matches!(no_player, Err(TombsError::InvalidMap(_))));

    let no_stairs = Engine::new_game(SessionConfig::inline("#####\n#@..#\n#####"));
    assert!(matches!(no_stairs, Err(TombsError::InvalidMap(_))));

    let missing = Engine::new_game(SessionConfig::fixed_map("/does/not/exist.txt"));
    assert!(matches!(missing, Err(TombsError::Io(_))));
}

#[test]
fn test_menu_starts_custom_map_from_file() -> TombsResult<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "#####\n#@.>#\n#####")?;

    let mut session = GameSession::new(MenuOptions {
        new_game: SessionConfig::procedural(GenerationConfig::for_testing(3)),
        fixed_map: SessionConfig::fixed_map(file.path()),
    });
    session.handle_key(Key::S);
    assert_eq!(session.handler, EventHandler::MainGame);

    session.handle_key(Key::D);
    session.handle_key(Key::D);
    session.handle_key(Key::Space);
    assert_eq!(session.handler, EventHandler::GameDone);
    Ok(())
}
