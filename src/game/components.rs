//! # Components
//!
//! Optional capabilities an actor or item can carry: combat stats, an inventory,
//! a consumable effect and an AI strategy.
//!
//! Components never reach back into the map or engine. Operations that have side
//! effects beyond the component itself (death, messages) report what happened and
//! let the engine apply the rest.

use crate::config::{MAX_HP_PER_FLOOR, PLAYER_MAX_HP};
use crate::{Item, Position};
use serde::{Deserialize, Serialize};

/// Combat statistics for an actor.
///
/// `hp` is private so every write goes through the clamped setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    hp: i32,
    pub max_hp: i32,
    pub power: i32,
    pub defense: i32,
}

impl Fighter {
    /// Creates a fighter at full health.
    pub fn new(hp: i32, power: i32, defense: i32) -> Self {
        let max_hp = hp.max(0);
        Self {
            hp: max_hp,
            max_hp,
            power,
            defense,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Writes `hp`, clamped to `[0, max_hp]`.
    ///
    /// Returns `true` only when this write moved a living fighter to 0 hp, so the
    /// caller runs the death transition exactly once per actor.
    pub fn set_hp(&mut self, value: i32) -> bool {
        let was_alive = self.is_alive();
        self.hp = value.clamp(0, self.max_hp);
        was_alive && self.hp == 0
    }

    /// Applies damage. Returns `true` if this killed the fighter.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.set_hp(self.hp - amount)
    }

    /// Heals up to `amount`, returning how much was actually recovered.
    ///
    /// Returns 0 when already at full health. The dead are not healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.hp == self.max_hp || !self.is_alive() || amount <= 0 {
            return 0;
        }
        let before = self.hp;
        self.set_hp(before + amount);
        self.hp - before
    }

    /// Recomputes `max_hp` for the given dungeon floor.
    ///
    /// Floor 1 is a no-op. Deeper floors set `max_hp = 100 + 15 * (floor - 1)`; when
    /// that raises the cap the same delta is added to current hp. Returns the
    /// increase, if any.
    pub fn apply_dungeon_level_scaling(&mut self, dungeon_level: u32) -> Option<i32> {
        if dungeon_level <= 1 {
            return None;
        }
        let old_max_hp = self.max_hp;
        self.max_hp = PLAYER_MAX_HP + MAX_HP_PER_FLOOR * (dungeon_level as i32 - 1);
        if self.max_hp > old_max_hp {
            let increase = self.max_hp - old_max_hp;
            if self.is_alive() {
                self.set_hp(self.hp + increase);
            }
            Some(increase)
        } else {
            // A lower cap still has to hold the clamp invariant.
            self.hp = self.hp.min(self.max_hp);
            None
        }
    }
}

/// A bounded, insertion-ordered list of carried items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<Item>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the first item with a healing effect.
    pub fn first_healing_item(&self) -> Option<usize> {
        self.items.iter().position(|item| {
            matches!(item.consumable, Some(Consumable::Healing { .. }))
        })
    }

    /// Number of carried items with a healing effect.
    pub fn healing_item_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.consumable, Some(Consumable::Healing { .. })))
            .count()
    }
}

/// What happens when an item is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    /// Restores up to `amount` hp to the consumer.
    Healing { amount: i32 },
}

/// AI strategies. The enemy-turn sweep only relies on every variant being able to
/// decide one action per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ai {
    /// Chases and attacks the player while it is in sight.
    HostileEnemy {
        /// Steps toward the player, planned on the last turn it was in sight.
        path: Vec<Position>,
    },
}

impl Ai {
    pub fn hostile() -> Self {
        Ai::HostileEnemy { path: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_hp_clamps_and_reports_death_once() {
        let mut fighter = Fighter::new(10, 2, 0);
        assert!(!fighter.set_hp(25));
        assert_eq!(fighter.hp(), 10);

        assert!(fighter.set_hp(-5));
        assert_eq!(fighter.hp(), 0);
        assert!(!fighter.is_alive());

        // Further damage to the dead never reports a second death.
        assert!(!fighter.take_damage(3));
        assert!(!fighter.set_hp(0));
        assert_eq!(fighter.hp(), 0);
    }

    #[test]
    fn test_heal_returns_recovered_amount() {
        let mut fighter = Fighter::new(100, 4, 0);
        assert_eq!(fighter.heal(5), 0);

        fighter.set_hp(50);
        assert_eq!(fighter.heal(5), 5);
        assert_eq!(fighter.hp(), 55);

        fighter.set_hp(98);
        assert_eq!(fighter.heal(5), 2);
        assert_eq!(fighter.hp(), 100);
    }

    #[test]
    fn test_heal_does_not_resurrect() {
        let mut fighter = Fighter::new(10, 2, 0);
        fighter.take_damage(10);
        assert_eq!(fighter.heal(5), 0);
        assert!(!fighter.is_alive());
    }

    #[test]
    fn test_dungeon_level_scaling() {
        let mut fighter = Fighter::new(100, 4, 0);
        assert_eq!(fighter.apply_dungeon_level_scaling(1), None);
        assert_eq!(fighter.max_hp, 100);

        fighter.set_hp(60);
        assert_eq!(fighter.apply_dungeon_level_scaling(2), Some(15));
        assert_eq!(fighter.max_hp, 115);
        assert_eq!(fighter.hp(), 75);

        assert_eq!(fighter.apply_dungeon_level_scaling(4), Some(30));
        assert_eq!(fighter.max_hp, 145);
        assert_eq!(fighter.hp(), 105);

        // Same floor again does not stack.
        assert_eq!(fighter.apply_dungeon_level_scaling(4), None);
        assert_eq!(fighter.max_hp, 145);
    }

    #[test]
    fn test_inventory_capacity_and_healing_lookup() {
        let mut inventory = Inventory::new(1);
        assert!(inventory.is_empty());
        assert_eq!(inventory.first_healing_item(), None);

        inventory.items.push(crate::entities::health_potion());
        assert!(inventory.is_full());
        assert_eq!(inventory.first_healing_item(), Some(0));
        assert_eq!(inventory.healing_item_count(), 1);
    }

    proptest! {
        #[test]
        fn hp_stays_in_bounds(writes in proptest::collection::vec(-200i32..300, 1..40)) {
            let mut fighter = Fighter::new(100, 4, 0);
            for value in writes {
                let was_alive = fighter.is_alive();
                let died = fighter.set_hp(value);
                prop_assert!(fighter.hp() >= 0 && fighter.hp() <= fighter.max_hp);
                prop_assert_eq!(died, was_alive && fighter.hp() == 0);
                if !fighter.is_alive() {
                    // Nothing brings a fighter back through heal.
                    prop_assert_eq!(fighter.heal(10), 0);
                }
            }
        }

        #[test]
        fn heal_never_exceeds_max(start in 1i32..=100, amount in 0i32..200) {
            let mut fighter = Fighter::new(100, 4, 0);
            fighter.set_hp(start);
            let recovered = fighter.heal(amount);
            prop_assert!(fighter.hp() <= fighter.max_hp);
            prop_assert_eq!(fighter.hp(), start + recovered);
        }
    }
}
