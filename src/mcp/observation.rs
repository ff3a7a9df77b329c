//! Observation payload for agents: only what the player can currently see.

use crate::{legal_action_names, GameSession, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedActor {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub power: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedItem {
    pub name: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub step: u64,
    pub floor: u32,
    pub game_over: bool,
    pub game_done: bool,
    pub player: Option<ObservedActor>,
    pub enemies: Vec<ObservedActor>,
    pub items: Vec<ObservedItem>,
    /// Present only while the stairs are in view
    pub stairs: Option<Position>,
    pub width: i32,
    pub height: i32,
    /// Row-major, `width * height` entries
    pub visible: Vec<bool>,
    pub legal_actions: Vec<String>,
    pub messages: Vec<String>,
}

impl Observation {
    pub fn capture(session: &GameSession) -> Option<Self> {
        let engine = session.engine.as_ref()?;
        let map = &engine.game_map;

        let observe = |actor: &crate::Actor| {
            let (hp, power) = actor
                .fighter
                .as_ref()
                .map_or((0, 0), |fighter| (fighter.hp(), fighter.power));
            ObservedActor {
                name: actor.name.clone(),
                x: actor.position.x,
                y: actor.position.y,
                hp,
                power,
            }
        };

        let enemies = map
            .actors()
            .filter(|actor| {
                actor.id != engine.player_id && actor.is_alive() && map.is_visible(actor.position)
            })
            .map(observe)
            .collect();
        let items = map
            .items()
            .filter(|item| map.is_visible(item.position))
            .map(|item| ObservedItem {
                name: item.name.clone(),
                x: item.position.x,
                y: item.position.y,
            })
            .collect();

        Some(Self {
            step: engine.step_counter,
            floor: engine.dungeon_level(),
            game_over: !engine.is_player_alive(),
            game_done: engine.game_done,
            player: engine.player().map(observe),
            enemies,
            items,
            stairs: map
                .downstairs_location
                .filter(|stairs| map.is_visible(*stairs)),
            width: map.width,
            height: map.height,
            visible: map.visible_mask().to_vec(),
            legal_actions: legal_action_names(session),
            messages: engine.message_log.step_texts(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MenuOptions, SessionConfig};

    fn session(map: &str) -> GameSession {
        let mut session = GameSession::new(MenuOptions::default());
        session.start(SessionConfig::inline(map)).unwrap();
        session
    }

    #[test]
    fn test_only_visible_things_are_reported() {
        // The wall at x=5 hides the right half of the map.
        let map = "###########\n#@.O.#.T.>#\n#.h..#..h.#\n###########";
        let observation = Observation::capture(&session(map)).unwrap();

        assert_eq!(observation.enemies.len(), 1);
        assert_eq!(observation.enemies[0].name, "Ghost");
        assert_eq!((observation.enemies[0].x, observation.enemies[0].hp), (3, 10));
        assert_eq!(observation.items.len(), 1);
        assert_eq!(observation.stairs, None);
        assert_eq!(observation.visible.len(), 11 * 4);
        assert_eq!(observation.player.map(|p| (p.x, p.y, p.power)), Some((1, 1, 4)));
        assert!(observation.legal_actions.contains(&".".to_string()));
    }

    #[test]
    fn test_visible_stairs_are_reported() {
        let observation = Observation::capture(&session("#####\n#@.>#\n#####")).unwrap();
        assert_eq!(observation.stairs, Some(Position::new(3, 1)));
        assert!(!observation.game_done);
    }

    #[test]
    fn test_no_session_no_observation() {
        assert!(Observation::capture(&GameSession::new(MenuOptions::default())).is_none());
    }
}
