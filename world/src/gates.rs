//! Room typing, enemy spawns, reward chests and locked doors.

use std::collections::BTreeMap;

use dungeon_core::{
    CellCoord, CellKind, CellRect, EnemyKind, ItemKind, ItemStack, Position, RoomId, RoomKind,
};
use rand::{seq::SliceRandom, Rng};
use rand_chacha::ChaCha8Rng;

use crate::grid::Grid;

const MIN_ROOM_ENEMIES: u32 = 2;
const MAX_ROOM_ENEMIES: u32 = 4;
const KEY_CHESTS: usize = 2;
const MAX_CHEST_ATTEMPTS: usize = 1_000;
const MIN_RESOURCE_AMOUNT: u32 = 1;
const MAX_RESOURCE_AMOUNT: u32 = 3;

/// Enemy spawns and chest contents decided while gating the dungeon.
#[derive(Debug, Default)]
pub(crate) struct GatePlan {
    /// Enemies to spawn, in room order.
    pub(crate) spawns: Vec<EnemySpawn>,
    /// Contents of every chest placed on the grid.
    pub(crate) chests: BTreeMap<CellCoord, Vec<ItemStack>>,
}

/// Single enemy placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EnemySpawn {
    pub(crate) room: RoomId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Position,
}

/// Draws a lair flavour for every room, then marks the smallest room as the
/// start and the largest as the terminal. Among equal areas the start is the
/// earliest room and the terminal the latest, so they differ whenever there
/// is more than one room.
pub(crate) fn assign_room_kinds(rooms: &[CellRect], rng: &mut ChaCha8Rng) -> Vec<RoomKind> {
    let mut kinds: Vec<RoomKind> = rooms
        .iter()
        .map(|_| {
            let flavour = EnemyKind::LAIR_POOL
                .choose(rng)
                .copied()
                .unwrap_or(EnemyKind::Skull);
            RoomKind::Lair(flavour)
        })
        .collect();

    let smallest = rooms
        .iter()
        .enumerate()
        .min_by_key(|(_, rect)| rect.area())
        .map(|(index, _)| index);
    let largest = rooms
        .iter()
        .enumerate()
        .max_by_key(|(_, rect)| rect.area())
        .map(|(index, _)| index);

    if let Some(index) = smallest {
        kinds[index] = RoomKind::Start;
    }
    if let Some(index) = largest {
        kinds[index] = RoomKind::Terminal;
    }
    kinds
}

/// Mutates `grid` with chests and locked doors and returns the spawns and
/// chest contents that go with them.
///
/// `grid` must already be labelled so corridor thresholds are doors.
pub(crate) fn place_gates(
    grid: &mut Grid,
    rooms: &[CellRect],
    kinds: &[RoomKind],
    deadends: &[CellCoord],
    rng: &mut ChaCha8Rng,
) -> GatePlan {
    let mut plan = GatePlan::default();
    let mut locked_doors = 0_usize;
    let mut keys_left = KEY_CHESTS;

    for (index, (rect, kind)) in rooms.iter().zip(kinds).enumerate() {
        let room = RoomId::new(index as u32);
        match kind {
            RoomKind::Start => {}
            RoomKind::Terminal => {
                let doors: Vec<CellCoord> = grid
                    .padded(rect)
                    .filter(|cell| grid.get(*cell) == CellKind::Door)
                    .collect();
                for door in doors {
                    if grid.set(door, CellKind::DoorLocked) {
                        locked_doors += 1;
                    }
                }
            }
            RoomKind::Lair(enemy) => {
                let count = rng.gen_range(MIN_ROOM_ENEMIES..=MAX_ROOM_ENEMIES);
                for _ in 0..count {
                    let cell = random_cell(rect, rng);
                    plan.spawns.push(EnemySpawn {
                        room,
                        kind: *enemy,
                        position: cell.corner(),
                    });
                }

                let Some(cell) = find_chest_cell(grid, rect, rng) else {
                    tracing::warn!(
                        room = room.get(),
                        "no valid chest cell found; room has no chest"
                    );
                    continue;
                };
                let _ = grid.set(cell, CellKind::ChestClosed);
                let mut contents = vec![resource_stack(rng)];
                if keys_left > 0 {
                    keys_left -= 1;
                    contents.push(ItemStack::new(ItemKind::Key, 1));
                }
                let _ = plan.chests.insert(cell, contents);
            }
        }
    }

    for deadend in deadends {
        if grid.set(*deadend, CellKind::ChestOpen) {
            let _ = plan.chests.insert(*deadend, vec![resource_stack(rng)]);
        }
    }

    tracing::debug!(
        enemies = plan.spawns.len(),
        chests = plan.chests.len(),
        keys = KEY_CHESTS - keys_left,
        locked_doors,
        "placed dungeon gates"
    );

    plan
}

fn random_cell(rect: &CellRect, rng: &mut ChaCha8Rng) -> CellCoord {
    let origin = rect.origin();
    let size = rect.size();
    let column = origin.column() + rng.gen_range(0..size.width().max(1));
    let row = origin.row() + rng.gen_range(0..size.height().max(1));
    CellCoord::new(column, row)
}

fn find_chest_cell(grid: &Grid, rect: &CellRect, rng: &mut ChaCha8Rng) -> Option<CellCoord> {
    let boundary: Vec<CellCoord> = rect.cells().filter(|cell| rect.is_boundary(*cell)).collect();
    for _ in 0..MAX_CHEST_ATTEMPTS {
        let cell = *boundary.choose(rng)?;
        if grid.get(cell) != CellKind::Floor {
            continue;
        }
        let enclosed = grid
            .neighbours4(cell)
            .filter(|neighbour| matches!(grid.get(*neighbour), CellKind::Wall | CellKind::Floor))
            .count();
        if enclosed == 4 {
            return Some(cell);
        }
    }
    None
}

fn resource_stack(rng: &mut ChaCha8Rng) -> ItemStack {
    let kind = ItemKind::RESOURCES
        .choose(rng)
        .copied()
        .unwrap_or(ItemKind::Wood);
    ItemStack::new(kind, rng.gen_range(MIN_RESOURCE_AMOUNT..=MAX_RESOURCE_AMOUNT))
}
