//! Enemy state and identifier allocation.

use std::collections::BTreeMap;

use dungeon_core::{AiStats, EnemyKind, EntityId, EntitySnapshot, EntityState, Position, RoomId};

/// Seconds since the last hit reported for enemies that were never hurt.
pub(crate) const NEVER_HURT: f32 = 9999.0;

/// Enemy stored inside the dungeon.
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) kind: EnemyKind,
    pub(crate) room: RoomId,
    pub(crate) position: Position,
    pub(crate) health: f32,
    pub(crate) cooldown: f32,
    pub(crate) state: EntityState,
    pub(crate) hurt_elapsed: f32,
}

impl Entity {
    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: self.kind,
            room: self.room,
            position: self.position,
            health: self.health,
            cooldown: self.cooldown,
            state: self.state,
            hurt_elapsed: self.hurt_elapsed,
        }
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, Entity>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    /// Stores a fresh enemy with full health and a ready attack.
    pub(crate) fn spawn(
        &mut self,
        kind: EnemyKind,
        room: RoomId,
        position: Position,
        cooldown: f32,
    ) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Entity {
                id,
                kind,
                room,
                position,
                health: kind.max_health(),
                cooldown,
                state: EntityState::Resting,
                hurt_elapsed: NEVER_HURT,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    /// Advances every enemy's hurt timer.
    pub(crate) fn advance_timers(&mut self, dt: f32) {
        for entity in self.entries.values_mut() {
            entity.hurt_elapsed += dt;
        }
    }
}
