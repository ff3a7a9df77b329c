//! # Entities
//!
//! Actors and items placed on a map, plus the templates new entities are cloned from.
//!
//! Entities are plain records. Capabilities are optional components, so game logic
//! asks "does this actor have an inventory?" instead of inspecting types.

use crate::game::color;
use crate::config::{
    HEALTH_POTION_AMOUNT, PLAYER_INVENTORY_CAPACITY, PLAYER_MAX_HP, PLAYER_POWER,
};
use crate::{new_entity_id, Ai, Consumable, EntityId, Fighter, GameMap, Inventory, Position, Rgb};
use serde::{Deserialize, Serialize};

/// Draw layering. Higher values are drawn on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    Corpse,
    Item,
    Actor,
}

/// Behaviour shared by everything that can sit on a map.
pub trait Entity {
    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);
    fn glyph(&self) -> char;
    fn color(&self) -> Rgb;
    fn blocks_movement(&self) -> bool;
    fn render_order(&self) -> RenderOrder;
}

/// A creature: the player or a monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub glyph: char,
    pub color: Rgb,
    pub blocks_movement: bool,
    pub render_order: RenderOrder,
    pub fighter: Option<Fighter>,
    pub inventory: Option<Inventory>,
    pub ai: Option<Ai>,
}

impl Actor {
    pub fn new(name: &str, glyph: char, color: Rgb, fighter: Fighter) -> Self {
        Self {
            id: new_entity_id(),
            name: name.to_string(),
            position: Position::new(0, 0),
            glyph,
            color,
            blocks_movement: true,
            render_order: RenderOrder::Actor,
            fighter: Some(fighter),
            inventory: None,
            ai: None,
        }
    }

    pub fn with_inventory(mut self, capacity: usize) -> Self {
        self.inventory = Some(Inventory::new(capacity));
        self
    }

    pub fn with_ai(mut self, ai: Ai) -> Self {
        self.ai = Some(ai);
        self
    }

    /// An actor is alive while its fighter has hp left.
    pub fn is_alive(&self) -> bool {
        self.fighter.as_ref().is_some_and(Fighter::is_alive)
    }

    /// Re-skins a dead actor as inert remains.
    pub fn become_remains(&mut self) {
        self.glyph = '%';
        self.color = color::CORPSE;
        self.blocks_movement = false;
        self.ai = None;
        self.name = format!("remains of {}", self.name);
        self.render_order = RenderOrder::Corpse;
    }

    /// Clones this template with a fresh id at `position` and adds it to `map`.
    pub fn spawn(&self, map: &mut GameMap, position: Position) -> EntityId {
        let mut clone = self.clone();
        clone.id = new_entity_id();
        clone.position = position;
        let id = clone.id;
        map.place(ConcreteEntity::Actor(clone));
        id
    }
}

/// Something that can be picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub glyph: char,
    pub color: Rgb,
    pub consumable: Option<Consumable>,
}

impl Item {
    pub fn new(name: &str, glyph: char, color: Rgb, consumable: Option<Consumable>) -> Self {
        Self {
            id: new_entity_id(),
            name: name.to_string(),
            position: Position::new(0, 0),
            glyph,
            color,
            consumable,
        }
    }

    /// Clones this template with a fresh id at `position` and adds it to `map`.
    pub fn spawn(&self, map: &mut GameMap, position: Position) -> EntityId {
        let mut clone = self.clone();
        clone.id = new_entity_id();
        clone.position = position;
        let id = clone.id;
        map.place(ConcreteEntity::Item(clone));
        id
    }
}

impl Entity for Actor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn glyph(&self) -> char {
        self.glyph
    }

    fn color(&self) -> Rgb {
        self.color
    }

    fn blocks_movement(&self) -> bool {
        self.blocks_movement
    }

    fn render_order(&self) -> RenderOrder {
        self.render_order
    }
}

impl Entity for Item {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn glyph(&self) -> char {
        self.glyph
    }

    fn color(&self) -> Rgb {
        self.color
    }

    fn blocks_movement(&self) -> bool {
        false
    }

    fn render_order(&self) -> RenderOrder {
        RenderOrder::Item
    }
}

/// Any entity a map can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConcreteEntity {
    Actor(Actor),
    Item(Item),
}

impl ConcreteEntity {
    pub fn as_actor(&self) -> Option<&Actor> {
        match self {
            ConcreteEntity::Actor(actor) => Some(actor),
            ConcreteEntity::Item(_) => None,
        }
    }

    pub fn as_actor_mut(&mut self) -> Option<&mut Actor> {
        match self {
            ConcreteEntity::Actor(actor) => Some(actor),
            ConcreteEntity::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            ConcreteEntity::Item(item) => Some(item),
            ConcreteEntity::Actor(_) => None,
        }
    }

    fn inner(&self) -> &dyn Entity {
        match self {
            ConcreteEntity::Actor(actor) => actor,
            ConcreteEntity::Item(item) => item,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Entity {
        match self {
            ConcreteEntity::Actor(actor) => actor,
            ConcreteEntity::Item(item) => item,
        }
    }
}

impl Entity for ConcreteEntity {
    fn id(&self) -> EntityId {
        self.inner().id()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn position(&self) -> Position {
        self.inner().position()
    }

    fn set_position(&mut self, position: Position) {
        self.inner_mut().set_position(position);
    }

    fn glyph(&self) -> char {
        self.inner().glyph()
    }

    fn color(&self) -> Rgb {
        self.inner().color()
    }

    fn blocks_movement(&self) -> bool {
        self.inner().blocks_movement()
    }

    fn render_order(&self) -> RenderOrder {
        self.inner().render_order()
    }
}

// Templates

pub fn player() -> Actor {
    Actor::new("Player", '@', color::WHITE, Fighter::new(PLAYER_MAX_HP, PLAYER_POWER, 0))
        .with_inventory(PLAYER_INVENTORY_CAPACITY)
}

pub fn ghost() -> Actor {
    Actor::new("Ghost", 'o', color::GHOST, Fighter::new(10, 2, 0)).with_ai(Ai::hostile())
}

pub fn red_ghost() -> Actor {
    Actor::new("Red Ghost", 'T', color::RED_GHOST, Fighter::new(15, 8, 0)).with_ai(Ai::hostile())
}

pub fn health_potion() -> Item {
    Item::new(
        "Health Potion",
        '!',
        color::POTION,
        Some(Consumable::Healing {
            amount: HEALTH_POTION_AMOUNT,
        }),
    )
}
