//! Player state: inventory, coins, health and weapon selection.

use std::collections::BTreeMap;

use dungeon_core::{ItemKind, ItemStack, PlayerSnapshot, Position, WeaponStats};

use crate::{entities::NEVER_HURT, PlayerStats};

/// Pending coins above this amount trickle in gradually.
const COIN_FLUSH_THRESHOLD: f32 = 0.4;
/// Seconds without damage before health regenerates.
const HEAL_DELAY: f32 = 10.0;

/// Coins transferred from the pending balance on a single update.
pub(crate) fn coin_rate(pending: f32) -> f32 {
    (pending / 7.0).max(0.2)
}

/// Fixed number of item slots.
#[derive(Clone, Debug)]
pub(crate) struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub(crate) fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    pub(crate) fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    pub(crate) fn slot(&self, index: usize) -> Option<ItemStack> {
        self.slots.get(index).copied().flatten()
    }

    /// Stores `stack`, merging into a slot of the same kind or taking the
    /// first free slot. Returns `false` when no slot could take it.
    pub(crate) fn receive(&mut self, stack: ItemStack) -> bool {
        if stack.is_empty() {
            return true;
        }
        if let Some(existing) = self
            .slots
            .iter_mut()
            .flatten()
            .find(|existing| existing.kind() == stack.kind())
        {
            return existing.merge(stack);
        }
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(stack);
                true
            }
            None => false,
        }
    }

    fn total(&self, kind: ItemKind) -> u64 {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| stack.kind() == kind)
            .map(|stack| u64::from(stack.amount()))
            .sum()
    }

    /// Reports whether the inventory holds every stack in `required`,
    /// counting all slots of a kind together.
    pub(crate) fn has_items(&self, required: &[ItemStack]) -> bool {
        let mut needed: BTreeMap<ItemKind, u64> = BTreeMap::new();
        for stack in required {
            *needed.entry(stack.kind()).or_default() += u64::from(stack.amount());
        }
        needed
            .into_iter()
            .all(|(kind, amount)| self.total(kind) >= amount)
    }

    /// Removes every stack in `required`, clearing slots that run empty.
    pub(crate) fn subtract(&mut self, required: &[ItemStack]) {
        for wanted in required {
            let mut remaining = wanted.amount();
            for slot in &mut self.slots {
                if remaining == 0 {
                    break;
                }
                let Some(stack) = slot else {
                    continue;
                };
                if stack.kind() != wanted.kind() {
                    continue;
                }
                remaining -= stack.remove(remaining);
                if stack.is_empty() {
                    *slot = None;
                }
            }
        }
    }

    /// Takes one item out of `index`, clearing the slot when it empties.
    pub(crate) fn consume_one(&mut self, index: usize) -> Option<ItemKind> {
        let slot = self.slots.get_mut(index)?;
        let stack = slot.as_mut()?;
        let kind = stack.kind();
        if stack.remove(1) == 0 {
            return None;
        }
        if stack.is_empty() {
            *slot = None;
        }
        Some(kind)
    }
}

/// The player avatar.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Position,
    pub(crate) health: f32,
    pub(crate) coins: f32,
    pub(crate) pending_coins: f32,
    pub(crate) hurt_time: f32,
    pub(crate) selected_slot: Option<usize>,
    pub(crate) inventory: Inventory,
    stats: PlayerStats,
}

impl Player {
    pub(crate) fn new(position: Position, stats: PlayerStats, slot_count: usize) -> Self {
        Self {
            position,
            health: stats.max_health(),
            coins: 0.0,
            pending_coins: 0.0,
            hurt_time: NEVER_HURT,
            selected_slot: None,
            inventory: Inventory::new(slot_count),
            stats,
        }
    }

    /// Advances the hurt timer, regenerates health and moves pending coins
    /// into the balance.
    pub(crate) fn update(&mut self, dt: f32) {
        if self.hurt_time > HEAL_DELAY && self.health < self.stats.max_health() {
            self.health = (self.health + self.stats.heal_speed() * dt).min(self.stats.max_health());
        }
        self.hurt_time += dt;

        if self.pending_coins > COIN_FLUSH_THRESHOLD {
            let transfer = coin_rate(self.pending_coins);
            self.coins += transfer;
            self.pending_coins -= transfer;
        } else if self.pending_coins > 0.0 {
            self.coins = (self.coins + self.pending_coins).round();
            self.pending_coins = 0.0;
        }
    }

    /// Applies damage and returns the remaining health.
    pub(crate) fn hurt(&mut self, damage: f32) -> f32 {
        self.health -= damage;
        self.hurt_time = 0.0;
        self.health
    }

    /// Puts the player back at `position` with full health. Inventory, coins
    /// and the selected slot carry over.
    pub(crate) fn revive(&mut self, position: Position) {
        self.position = position;
        self.health = self.stats.max_health();
        self.hurt_time = NEVER_HURT;
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub(crate) fn selected_item(&self) -> Option<ItemStack> {
        self.selected_slot.and_then(|slot| self.inventory.slot(slot))
    }

    pub(crate) fn damage(&self) -> f32 {
        self.selected_item()
            .and_then(|stack| stack.kind().weapon_damage())
            .unwrap_or(self.stats.damage())
    }

    pub(crate) fn range(&self) -> f32 {
        self.selected_item()
            .and_then(|stack| stack.kind().weapon_range())
            .unwrap_or(self.stats.range())
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            health: self.health,
            max_health: self.stats.max_health(),
            coins: self.coins,
            pending_coins: self.pending_coins,
            hurt_time: self.hurt_time,
            speed: self.stats.speed(),
            selected_slot: self.selected_slot,
            selected_item: self.selected_item(),
            damage: self.damage(),
            range: self.range(),
        }
    }
}
