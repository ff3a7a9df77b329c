//! Integration tests for combat, consumables and the no-mutation guarantee.

use tombs::{
    Action, ConcreteEntity, Direction, Engine, GameSession, ItemAction, Key, MeleeAction,
    MenuOptions, PickupAction, SessionConfig, TombsResult,
};

fn engine_for(map: &str) -> TombsResult<Engine> {
    Engine::new_game(SessionConfig::inline(map))
}

/// Everything a failed action must leave untouched.
fn world_fingerprint(engine: &Engine) -> Vec<ConcreteEntity> {
    engine.game_map.entities().to_vec()
}

#[test]
fn test_player_attacks_ghost_until_it_dies() -> TombsResult<()> {
    let mut engine = engine_for("#####\n#@O>#\n#####")?;
    let ghost = engine
        .game_map
        .get_actor_at_location(tombs::Position::new(2, 1))
        .map(|a| a.id)
        .expect("ghost placed by the map");
    let attack = MeleeAction {
        entity: engine.player_id,
        direction: Direction::East,
    };

    attack.perform(&mut engine).expect("ghost is there");
    let ghost_actor = engine.game_map.actor(ghost).expect("ghost survives one hit");
    assert_eq!(ghost_actor.fighter.as_ref().map(|f| f.hp()), Some(6));
    assert!(ghost_actor.is_alive());
    assert_eq!(
        engine.message_log.step_texts().last().map(String::as_str),
        Some("Player attacks Ghost for 4 hit points.")
    );

    for _ in 0..4 {
        let _ = attack.perform(&mut engine);
    }
    assert!(!engine.game_map.contains(ghost));
    assert!(engine
        .game_map
        .get_blocking_entity_at_location(tombs::Position::new(2, 1))
        .is_none());
    assert_eq!(
        attack.perform(&mut engine).unwrap_err().reason(),
        "Nothing to attack."
    );
    Ok(())
}

#[test]
fn test_potion_heals_once_then_refuses() -> TombsResult<()> {
    let mut engine = engine_for("####\n#@>#\n####")?;
    if let Some(player) = engine.player_mut() {
        if let Some(fighter) = player.fighter.as_mut() {
            fighter.set_hp(50);
        }
        if let Some(inventory) = player.inventory.as_mut() {
            inventory.items.truncate(1);
        }
    }
    let drink = ItemAction {
        entity: engine.player_id,
        item_index: 0,
    };

    drink.perform(&mut engine).expect("player is hurt");
    let player = engine.player().expect("player");
    assert_eq!(player.fighter.as_ref().map(|f| f.hp()), Some(55));
    assert_eq!(engine.health_potion_count(), 0);

    if let Some(player) = engine.player_mut() {
        if let Some(fighter) = player.fighter.as_mut() {
            fighter.set_hp(100);
        }
        if let Some(inventory) = player.inventory.as_mut() {
            inventory.items.push(tombs::health_potion());
        }
    }
    let before = world_fingerprint(&engine);
    let error = drink.perform(&mut engine).unwrap_err();
    assert_eq!(error.reason(), "Your health is already full.");
    assert_eq!(world_fingerprint(&engine), before);
    assert_eq!(engine.health_potion_count(), 1);
    Ok(())
}

#[test]
fn test_failed_actions_change_nothing_but_the_step() -> TombsResult<()> {
    let mut session = GameSession::new(MenuOptions::default());
    session.start(SessionConfig::inline("#####\n#@.>#\n#.O.#\n#####"))?;

    let before = session
        .engine
        .as_ref()
        .map(world_fingerprint)
        .unwrap_or_default();
    // Wall, nothing to pick up, full health, not on the stairs.
    for key in [Key::W, Key::G, Key::I, Key::Space] {
        session.handle_key(key);
    }
    let engine = session.engine.as_ref().expect("still playing");
    assert_eq!(world_fingerprint(engine), before);
    assert_eq!(engine.step_counter, 4);
    assert_eq!(
        engine.message_log.step_texts(),
        vec!["There are no stairs here.".to_string()]
    );
    Ok(())
}

#[test]
fn test_pickup_moves_item_into_inventory() -> TombsResult<()> {
    let mut engine = engine_for("####\n#@>#\n####")?;
    let here = engine.player_position().expect("player");
    tombs::health_potion().spawn(&mut engine.game_map, here);
    assert_eq!(engine.game_map.items().count(), 1);

    PickupAction {
        entity: engine.player_id,
    }
    .perform(&mut engine)
    .expect("potion underfoot");

    assert_eq!(engine.game_map.items().count(), 0);
    assert_eq!(engine.health_potion_count(), 3);
    assert_eq!(
        engine.message_log.step_texts().last().map(String::as_str),
        Some("You picked up the Health Potion!")
    );
    Ok(())
}

#[test]
fn test_enemies_close_in_and_kill() -> TombsResult<()> {
    let mut session = GameSession::new(MenuOptions::default());
    session.start(SessionConfig::inline("########\n#@....T#\n#.....>#\n########"))?;
    if let Some(fighter) = session
        .engine
        .as_mut()
        .and_then(|e| e.player_mut())
        .and_then(|p| p.fighter.as_mut())
    {
        fighter.set_hp(10);
    }

    for _ in 0..10 {
        session.handle_key(Key::Period);
        if session.handler.is_terminal() {
            break;
        }
    }
    let engine = session.engine.as_ref().expect("engine kept for the end screen");
    assert!(!engine.is_player_alive());
    assert_eq!(engine.message_log.step_texts(), vec!["You died!".to_string()]);
    let remains = engine.player().expect("remains stay on the map");
    assert_eq!(remains.glyph, '%');
    assert!(!remains.blocks_movement);
    Ok(())
}
