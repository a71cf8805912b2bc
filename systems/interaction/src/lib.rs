#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction system that turns player taps into combat, looting and unlocking commands.

use dungeon_core::{
    CellCoord, CellKind, Command, EntitySnapshot, EntityView, Event, GamePhase, ItemKind,
    PlayerSnapshot, Position, RoomView,
};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionInput {
    /// World position the player tapped on this frame, if any.
    pub tap: Option<Position>,
}

impl InteractionInput {
    /// Creates a new input descriptor.
    #[must_use]
    pub const fn new(tap: Option<Position>) -> Self {
        Self { tap }
    }
}

/// Interaction system that resolves taps against enemies and cells.
#[derive(Debug, Clone)]
pub struct Interaction {
    phase: GamePhase,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    /// Creates a new interaction system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: GamePhase::Play,
        }
    }

    /// Consumes dungeon events and adapter input to emit interaction commands.
    ///
    /// A tap strikes the first enemy whose hit rectangle contains it, when the
    /// enemy is within the player's reach and the player stands inside the
    /// enemy's room. The tapped cell is then inspected: an open chest is
    /// drained and a locked door is unlocked when a key is selected.
    /// The `block_at` closure should mirror `Dungeon::block_at`.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: InteractionInput,
        player: &PlayerSnapshot,
        entities: &EntityView,
        rooms: &RoomView,
        block_at: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(Position) -> CellKind,
    {
        for event in events {
            if let Event::PhaseChanged { phase } = event {
                self.phase = *phase;
            }
        }

        if self.phase != GamePhase::Play {
            return;
        }
        let Some(tap) = input.tap else {
            return;
        };

        if let Some(target) = entities
            .iter()
            .find(|entity| entity.bounds().contains(tap))
        {
            if in_reach(target, player, rooms) {
                out.push(Command::StrikeEntity {
                    entity: target.id,
                    damage: player.damage,
                });
            }
        }

        let Some(cell) = CellCoord::containing(tap) else {
            return;
        };
        match block_at(tap) {
            CellKind::ChestOpen => out.push(Command::OpenChest { cell }),
            CellKind::DoorLocked if holds_key(player) => out.push(Command::UnlockDoor { cell }),
            _ => {}
        }
    }
}

fn in_reach(entity: &EntitySnapshot, player: &PlayerSnapshot, rooms: &RoomView) -> bool {
    if entity.center().distance(player.center()) >= player.range {
        return false;
    }
    rooms
        .get(entity.room)
        .is_some_and(|room| player.body().intersects(&room.rect.to_world()))
}

fn holds_key(player: &PlayerSnapshot) -> bool {
    player
        .selected_item
        .is_some_and(|stack| stack.kind() == ItemKind::Key)
}
