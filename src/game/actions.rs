//! # Actions
//!
//! Command objects for everything an actor can do in one turn.
//!
//! Every action splits into a pure `validate` that reports why it would fail and a
//! `perform` that validates first and only then mutates. A failed action returns
//! [`Impossible`] with a player-facing reason and leaves the world untouched. The
//! legal-action query calls the same `validate`, so "legal" and "succeeds" cannot
//! drift apart.

use crate::game::color;
use crate::utils::find_path;
use crate::{Ai, ConcreteEntity, Consumable, Direction, Engine, EntityId, Position};
use log::trace;

/// The single recoverable gameplay failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Impossible(pub String);

impl Impossible {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// Result type for gameplay actions.
pub type ActionResult<T> = Result<T, Impossible>;

/// An intent bound to the actor that will carry it out.
pub trait Action {
    /// The acting entity.
    fn entity(&self) -> EntityId;

    /// Checks every failure condition without mutating anything.
    fn validate(&self, engine: &Engine) -> ActionResult<()>;

    /// Applies the action. Either completes or returns `Impossible` with no change.
    fn perform(&self, engine: &mut Engine) -> ActionResult<()>;
}

fn actor_position(engine: &Engine, entity: EntityId) -> ActionResult<Position> {
    engine
        .game_map
        .actor(entity)
        .map(|actor| actor.position)
        .ok_or_else(|| Impossible::new("You are nowhere to be found."))
}

/// Does nothing for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitAction {
    pub entity: EntityId,
}

impl Action for WaitAction {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn validate(&self, _engine: &Engine) -> ActionResult<()> {
        Ok(())
    }

    fn perform(&self, _engine: &mut Engine) -> ActionResult<()> {
        Ok(())
    }
}

/// Steps one cell in a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementAction {
    pub entity: EntityId,
    pub direction: Direction,
}

impl MovementAction {
    fn destination(&self, engine: &Engine) -> ActionResult<Position> {
        Ok(actor_position(engine, self.entity)? + self.direction.to_delta())
    }
}

impl Action for MovementAction {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn validate(&self, engine: &Engine) -> ActionResult<()> {
        let dest = self.destination(engine)?;
        if !engine.game_map.is_walkable(dest) {
            return Err(Impossible::new("That way is blocked."));
        }
        if engine.game_map.get_blocking_entity_at_location(dest).is_some() {
            return Err(Impossible::new("That way is blocked."));
        }
        Ok(())
    }

    fn perform(&self, engine: &mut Engine) -> ActionResult<()> {
        self.validate(engine)?;
        let dest = self.destination(engine)?;
        if let Some(actor) = engine.game_map.actor_mut(self.entity) {
            actor.position = dest;
        }
        Ok(())
    }
}

/// Attacks whatever actor stands one cell away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeAction {
    pub entity: EntityId,
    pub direction: Direction,
}

/// Resolved attack numbers.
struct Strike {
    target: EntityId,
    attacker_name: String,
    target_name: String,
    damage: i32,
}

impl MeleeAction {
    fn strike(&self, engine: &Engine) -> ActionResult<Strike> {
        let origin = actor_position(engine, self.entity)?;
        let dest = origin + self.direction.to_delta();
        let attacker = engine
            .game_map
            .actor(self.entity)
            .ok_or_else(|| Impossible::new("Nothing to attack."))?;
        let target = engine
            .game_map
            .get_any_actor_at_location(dest, self.entity)
            .ok_or_else(|| Impossible::new("Nothing to attack."))?;

        let (Some(attack), Some(defend)) = (&attacker.fighter, &target.fighter) else {
            return Err(Impossible::new("Nothing to attack."));
        };
        if !defend.is_alive() {
            return Err(Impossible::new(format!("{} is unharmed.", target.name)));
        }

        Ok(Strike {
            target: target.id,
            attacker_name: attacker.name.clone(),
            target_name: target.name.clone(),
            damage: (attack.power - defend.defense).max(0),
        })
    }
}

impl Action for MeleeAction {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn validate(&self, engine: &Engine) -> ActionResult<()> {
        self.strike(engine).map(|_| ())
    }

    fn perform(&self, engine: &mut Engine) -> ActionResult<()> {
        let strike = self.strike(engine)?;
        let attack_color = if self.entity == engine.player_id {
            color::PLAYER_ATK
        } else {
            color::ENEMY_ATK
        };
        let attack_desc = format!("{} attacks {}", strike.attacker_name, strike.target_name);

        if strike.damage == 0 {
            engine
                .message_log
                .add_message(format!("{} but does no damage.", attack_desc), attack_color);
            return Ok(());
        }

        engine.message_log.add_message(
            format!("{} for {} hit points.", attack_desc, strike.damage),
            attack_color,
        );
        let died = engine
            .game_map
            .actor_mut(strike.target)
            .and_then(|target| target.fighter.as_mut())
            .is_some_and(|fighter| fighter.take_damage(strike.damage));
        if died {
            engine.die(strike.target);
        }
        Ok(())
    }
}

/// Moves, or attacks when a living actor occupies the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpAction {
    pub entity: EntityId,
    pub direction: Direction,
}

impl BumpAction {
    /// The concrete action this bump turns into.
    pub fn resolve(&self, engine: &Engine) -> ActionResult<ConcreteAction> {
        let dest = actor_position(engine, self.entity)? + self.direction.to_delta();
        let occupied = engine
            .game_map
            .get_actor_at_location(dest)
            .is_some_and(|actor| actor.id != self.entity);
        Ok(if occupied {
            ConcreteAction::Melee(MeleeAction {
                entity: self.entity,
                direction: self.direction,
            })
        } else {
            ConcreteAction::Movement(MovementAction {
                entity: self.entity,
                direction: self.direction,
            })
        })
    }
}

impl Action for BumpAction {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn validate(&self, engine: &Engine) -> ActionResult<()> {
        self.resolve(engine)?.validate(engine)
    }

    fn perform(&self, engine: &mut Engine) -> ActionResult<()> {
        self.resolve(engine)?.perform(engine)
    }
}

/// Picks up the item underfoot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupAction {
    pub entity: EntityId,
}

impl PickupAction {
    fn item_underfoot(&self, engine: &Engine) -> ActionResult<EntityId> {
        let actor = engine
            .game_map
            .actor(self.entity)
            .ok_or_else(|| Impossible::new("There is nothing here to pick up."))?;
        let item = engine
            .game_map
            .items_at(actor.position)
            .next()
            .ok_or_else(|| Impossible::new("There is nothing here to pick up."))?;
        match &actor.inventory {
            Some(inventory) if !inventory.is_full() => Ok(item.id),
            _ => Err(Impossible::new("Your inventory is full.")),
        }
    }
}

impl Action for PickupAction {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn validate(&self, engine: &Engine) -> ActionResult<()> {
        self.item_underfoot(engine).map(|_| ())
    }

    fn perform(&self, engine: &mut Engine) -> ActionResult<()> {
        let item_id = self.item_underfoot(engine)?;
        let Some(ConcreteEntity::Item(item)) = engine.game_map.remove_entity(item_id) else {
            return Err(Impossible::new("There is nothing here to pick up."));
        };
        let name = item.name.clone();
        match engine
            .game_map
            .actor_mut(self.entity)
            .and_then(|actor| actor.inventory.as_mut())
        {
            Some(inventory) => inventory.items.push(item),
            None => {
                engine.game_map.place(ConcreteEntity::Item(item));
                return Err(Impossible::new("Your inventory is full."));
            }
        }
        engine
            .message_log
            .add(format!("You picked up the {}!", name));
        Ok(())
    }
}

/// Uses the carried item at `item_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemAction {
    pub entity: EntityId,
    pub item_index: usize,
}

impl ItemAction {
    fn healing(&self, engine: &Engine) -> ActionResult<(String, i32)> {
        let actor = engine
            .game_map
            .actor(self.entity)
            .ok_or_else(|| Impossible::new("You have nothing to use."))?;
        let item = actor
            .inventory
            .as_ref()
            .and_then(|inventory| inventory.items.get(self.item_index))
            .ok_or_else(|| Impossible::new("You have nothing to use."))?;
        let Some(Consumable::Healing { amount }) = item.consumable else {
            return Err(Impossible::new(format!("The {} cannot be used.", item.name)));
        };
        match &actor.fighter {
            Some(fighter) if fighter.is_alive() && fighter.hp() < fighter.max_hp && amount > 0 => {
                Ok((item.name.clone(), amount))
            }
            _ => Err(Impossible::new("Your health is already full.")),
        }
    }
}

impl Action for ItemAction {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn validate(&self, engine: &Engine) -> ActionResult<()> {
        self.healing(engine).map(|_| ())
    }

    fn perform(&self, engine: &mut Engine) -> ActionResult<()> {
        let (name, amount) = self.healing(engine)?;
        let Some(actor) = engine.game_map.actor_mut(self.entity) else {
            return Err(Impossible::new("You have nothing to use."));
        };
        let recovered = actor.fighter.as_mut().map_or(0, |fighter| fighter.heal(amount));
        if recovered == 0 {
            return Err(Impossible::new("Your health is already full."));
        }
        if let Some(inventory) = actor.inventory.as_mut() {
            inventory.items.remove(self.item_index);
        }
        engine.message_log.add_message(
            format!("You consume the {}, and recover {} HP!", name, recovered),
            color::HEALTH_RECOVERED,
        );
        Ok(())
    }
}

/// Uses the down stairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeStairsAction {
    pub entity: EntityId,
}

impl Action for TakeStairsAction {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn validate(&self, engine: &Engine) -> ActionResult<()> {
        let pos = actor_position(engine, self.entity)?;
        if engine.can_take_stairs_from(pos) {
            Ok(())
        } else {
            Err(Impossible::new("There are no stairs here."))
        }
    }

    fn perform(&self, engine: &mut Engine) -> ActionResult<()> {
        self.validate(engine)?;
        if engine.uses_fixed_map() {
            engine.complete_map();
            Ok(())
        } else {
            engine.descend()
        }
    }
}

/// Any action, as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcreteAction {
    Wait(WaitAction),
    Movement(MovementAction),
    Melee(MeleeAction),
    Bump(BumpAction),
    Pickup(PickupAction),
    Item(ItemAction),
    TakeStairs(TakeStairsAction),
}

impl ConcreteAction {
    fn inner(&self) -> &dyn Action {
        match self {
            ConcreteAction::Wait(action) => action,
            ConcreteAction::Movement(action) => action,
            ConcreteAction::Melee(action) => action,
            ConcreteAction::Bump(action) => action,
            ConcreteAction::Pickup(action) => action,
            ConcreteAction::Item(action) => action,
            ConcreteAction::TakeStairs(action) => action,
        }
    }
}

impl Action for ConcreteAction {
    fn entity(&self) -> EntityId {
        self.inner().entity()
    }

    fn validate(&self, engine: &Engine) -> ActionResult<()> {
        self.inner().validate(engine)
    }

    fn perform(&self, engine: &mut Engine) -> ActionResult<()> {
        self.inner().perform(engine)
    }
}

// Enemy decisions

impl Ai {
    /// Picks this turn's action for the actor `entity`.
    ///
    /// A hostile enemy that can see the player attacks when orthogonally adjacent and
    /// otherwise steps along a shortest path toward the player. Out of sight it waits.
    pub fn decide(&mut self, entity: EntityId, engine: &Engine) -> ConcreteAction {
        let wait = ConcreteAction::Wait(WaitAction { entity });
        let (Some(me), Some(target)) = (engine.game_map.actor(entity), engine.player()) else {
            return wait;
        };
        if !target.is_alive() {
            return wait;
        }

        match self {
            Ai::HostileEnemy { path } => {
                if !engine.game_map.is_visible(me.position) {
                    path.clear();
                    return wait;
                }
                if me.position.is_orthogonally_adjacent(target.position) {
                    if let Some(direction) = Direction::from_delta(target.position - me.position) {
                        return ConcreteAction::Melee(MeleeAction { entity, direction });
                    }
                }
                *path = find_path(&engine.game_map, me.position, target.position)
                    .unwrap_or_default();
                trace!("{} plans {} steps toward the player", me.name, path.len());

                if path.is_empty() {
                    return wait;
                }
                let next = path.remove(0);
                match Direction::from_delta(next - me.position) {
                    Some(direction) => ConcreteAction::Movement(MovementAction { entity, direction }),
                    None => {
                        path.clear();
                        wait
                    }
                }
            }
        }
    }
}
