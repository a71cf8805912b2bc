#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative dungeon state management.
//!
//! A [`Dungeon`] is assembled once from a generator [`Layout`]: the grid is
//! labelled into lighting regions, rooms are typed and gated, and enemies are
//! spawned. Afterwards all mutation flows through [`apply`], and adapters and
//! systems observe the state through the [`query`] module.

mod entities;
mod gates;
mod grid;
mod layout;
mod player;
mod regions;

use std::collections::{BTreeMap, BTreeSet};

use dungeon_core::{
    AiStats, CellCoord, CellKind, CellRect, Command, DungeonError, EnemyKind, EntityId,
    EntityState, Event, GamePhase, ItemKind, ItemStack, Position, RegionId, RoomId, RoomKind,
    ATTACK_COOLDOWN, DEFAULT_DARK_TINT, INVENTORY_SLOTS, WELCOME_BANNER,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    entities::EntityRegistry,
    gates::{assign_room_kinds, place_gates},
    grid::Grid,
    player::Player,
    regions::RegionMap,
};

pub use layout::{Layout, LayoutError};

const DEFAULT_SEED: u64 = 0x6d75_6e67_656f_6e21;

/// Tunable statistics of the player avatar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerStats {
    max_health: f32,
    heal_speed: f32,
    damage: f32,
    range: f32,
    speed: f32,
}

impl PlayerStats {
    /// Creates a new stat block.
    #[must_use]
    pub const fn new(
        max_health: f32,
        heal_speed: f32,
        damage: f32,
        range: f32,
        speed: f32,
    ) -> Self {
        Self {
            max_health,
            heal_speed,
            damage,
            range,
            speed,
        }
    }

    /// Health the player spawns with.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Health regenerated per second once the player has not been hurt for a while.
    #[must_use]
    pub const fn heal_speed(&self) -> f32 {
        self.heal_speed
    }

    /// Melee damage without a weapon.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Melee reach without a weapon.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Walking speed in cells per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::new(20.0, 0.5, 2.0, 2.0, 4.0)
    }
}

/// Parameters used when assembling a dungeon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    seed: u64,
    dark_tint: f32,
    player: PlayerStats,
}

impl Config {
    /// Creates a new dungeon configuration.
    #[must_use]
    pub const fn new(seed: u64, dark_tint: f32, player: PlayerStats) -> Self {
        Self {
            seed,
            dark_tint,
            player,
        }
    }

    /// Seed of the generator driving room typing, gating and loot.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Brightness of unlit regions.
    #[must_use]
    pub const fn dark_tint(&self) -> f32 {
        self.dark_tint
    }

    /// Player statistics.
    #[must_use]
    pub const fn player(&self) -> PlayerStats {
        self.player
    }

    /// Returns a copy of the configuration using a different seed.
    #[must_use]
    pub const fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SEED, DEFAULT_DARK_TINT, PlayerStats::default())
    }
}

#[derive(Clone, Debug)]
struct Room {
    id: RoomId,
    kind: RoomKind,
    rect: CellRect,
    entities: BTreeSet<EntityId>,
    cleared: bool,
}

/// Represents the authoritative dungeon state.
#[derive(Debug)]
pub struct Dungeon {
    banner: &'static str,
    phase: GamePhase,
    grid: Grid,
    regions: RegionMap,
    rooms: Vec<Room>,
    entities: EntityRegistry,
    chests: BTreeMap<CellCoord, Vec<ItemStack>>,
    brightness: Vec<f32>,
    dark_tint: f32,
    player: Player,
    start_position: Position,
    rng: ChaCha8Rng,
}

impl Dungeon {
    /// Assembles a dungeon, drawing room kinds from the seeded generator.
    #[must_use]
    pub fn new(layout: Layout, config: Config) -> Self {
        Self::assemble(layout, None, config)
    }

    /// Assembles a dungeon with explicit room kinds, one per layout room.
    pub fn with_room_kinds(
        layout: Layout,
        kinds: Vec<RoomKind>,
        config: Config,
    ) -> Result<Self, LayoutError> {
        if kinds.len() != layout.rooms().len() {
            return Err(LayoutError::RoomKindCount {
                expected: layout.rooms().len(),
                found: kinds.len(),
            });
        }
        Ok(Self::assemble(layout, Some(kinds), config))
    }

    fn assemble(layout: Layout, kinds: Option<Vec<RoomKind>>, config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed());
        let (columns, rows, cells, rects, deadends) = layout.into_parts();
        let mut grid = Grid::new(columns, rows, cells);
        let regions = RegionMap::label(&mut grid, &rects);
        let kinds = kinds.unwrap_or_else(|| assign_room_kinds(&rects, &mut rng));
        let plan = place_gates(&mut grid, &rects, &kinds, &deadends, &mut rng);

        let mut rooms: Vec<Room> = rects
            .iter()
            .zip(&kinds)
            .enumerate()
            .map(|(index, (rect, kind))| Room {
                id: RoomId::new(index as u32),
                kind: *kind,
                rect: *rect,
                entities: BTreeSet::new(),
                cleared: false,
            })
            .collect();

        let mut entities = EntityRegistry::new();
        for spawn in &plan.spawns {
            let id = entities.spawn(spawn.kind, spawn.room, spawn.position, ATTACK_COOLDOWN);
            if let Some(room) = rooms.get_mut(spawn.room.get() as usize) {
                let _ = room.entities.insert(id);
            }
        }

        let start_position = rooms
            .iter()
            .find(|room| room.kind == RoomKind::Start)
            .or_else(|| rooms.first())
            .map(|room| room.rect.to_world().center())
            .unwrap_or_default();

        let dark_tint = config.dark_tint().clamp(0.0, 1.0);
        let brightness = vec![dark_tint; regions.region_count() as usize];

        tracing::info!(
            seed = config.seed(),
            columns,
            rows,
            rooms = rooms.len(),
            regions = regions.region_count(),
            enemies = plan.spawns.len(),
            "dungeon assembled"
        );

        Self {
            banner: WELCOME_BANNER,
            phase: GamePhase::Play,
            grid,
            regions,
            rooms,
            entities,
            chests: plan.chests,
            brightness,
            dark_tint,
            player: Player::new(start_position, config.player(), INVENTORY_SLOTS),
            start_position,
            rng,
        }
    }

    /// Kind of the cell containing `position`; `Empty` outside the grid.
    #[must_use]
    pub fn block_at(&self, position: Position) -> CellKind {
        CellCoord::containing(position)
            .map(|cell| self.grid.get(cell))
            .unwrap_or(CellKind::Empty)
    }

    /// Kind of `cell`; `Empty` outside the grid.
    #[must_use]
    pub fn block_at_cell(&self, cell: CellCoord) -> CellKind {
        self.grid.get(cell)
    }

    /// Regions claiming the cell containing `position`.
    #[must_use]
    pub fn regions_at(&self, position: Position) -> &BTreeSet<RegionId> {
        match CellCoord::containing(position) {
            Some(cell) => self.regions.regions_at(cell),
            None => RegionMap::unclaimed(),
        }
    }

    /// Overwrites a cell. Returns `false` when the cell lies outside the grid.
    pub fn set_block(&mut self, cell: CellCoord, kind: CellKind) -> bool {
        self.grid.set(cell, kind)
    }

    /// Reports whether the cell containing `position` can be walked on.
    #[must_use]
    pub fn can_walk(&self, position: Position) -> bool {
        self.block_at(position).is_walkable()
    }

    /// Empties the chest at `cell` and returns what it held.
    ///
    /// Drained chests stay chests, so opening one again yields nothing.
    pub fn open_chest(&mut self, cell: CellCoord) -> Result<Vec<ItemStack>, DungeonError> {
        if !self.grid.contains(cell) {
            return Err(DungeonError::OutOfBounds);
        }
        if !self.grid.get(cell).is_chest() {
            return Err(DungeonError::NoChestHere);
        }
        let _ = self.grid.set(cell, CellKind::ChestEmpty);
        Ok(self.chests.remove(&cell).unwrap_or_default())
    }

    /// Turns a locked door into an open door.
    pub fn unlock_door(&mut self, cell: CellCoord) -> bool {
        if self.grid.get(cell) != CellKind::DoorLocked {
            return false;
        }
        self.grid.set(cell, CellKind::Door)
    }

    /// Adds an enemy to `room`, placed inside the room's extent.
    ///
    /// Returns `None` when the room does not exist.
    pub fn spawn_entity(
        &mut self,
        room: RoomId,
        kind: EnemyKind,
        position: Position,
    ) -> Option<EntityId> {
        let target = self.rooms.get_mut(room.get() as usize)?;
        let position = target.rect.clamp_position(position);
        let id = self.entities.spawn(kind, room, position, ATTACK_COOLDOWN);
        let _ = target.entities.insert(id);
        target.cleared = false;
        Some(id)
    }

    fn simulating(&self) -> bool {
        self.phase == GamePhase::Play
    }

    fn set_phase(&mut self, phase: GamePhase, out_events: &mut Vec<Event>) {
        if self.phase != phase {
            self.phase = phase;
            out_events.push(Event::PhaseChanged { phase });
        }
    }

    fn receive_items(&mut self, items: &[ItemStack], out_events: &mut Vec<Event>) {
        let mut stored = Vec::new();
        let mut dropped = Vec::new();
        for stack in items.iter().copied().filter(|stack| !stack.is_empty()) {
            if self.player.inventory.receive(stack) {
                stored.push(stack);
            } else {
                dropped.push(stack);
            }
        }
        if stored.is_empty() && dropped.is_empty() {
            return;
        }
        if !dropped.is_empty() {
            tracing::debug!(dropped = dropped.len(), "inventory full; items discarded");
        }
        out_events.push(Event::ItemsReceived { stored, dropped });
    }

    fn strike_player(&mut self, entity: EntityId, out_events: &mut Vec<Event>) {
        let Some(attacker) = self.entities.get_mut(entity) else {
            return;
        };
        if attacker.cooldown < ATTACK_COOLDOWN {
            return;
        }
        attacker.cooldown = 0.0;
        attacker.state = EntityState::Attacking;
        let damage = attacker.kind.damage();

        let health = self.player.hurt(damage);
        out_events.push(Event::PlayerHurt {
            entity,
            damage,
            health,
        });

        if self.player.is_dead() {
            tracing::info!(entity = entity.get(), "player died");
            self.set_phase(GamePhase::Death, out_events);
        }
    }

    fn strike_entity(&mut self, entity: EntityId, damage: f32, out_events: &mut Vec<Event>) {
        let Some(target) = self.entities.get_mut(entity) else {
            return;
        };
        target.health -= damage;
        target.hurt_elapsed = 0.0;
        if target.health > 0.0 {
            out_events.push(Event::EntityHurt {
                entity,
                damage,
                health: target.health,
            });
            return;
        }

        let Some(defeated) = self.entities.remove(entity) else {
            return;
        };
        let coins = defeated.kind.coin_drop();
        self.player.pending_coins += coins as f32;
        let loot = defeated
            .kind
            .loot_table()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ItemStack::new(ItemKind::Bone, 0));
        out_events.push(Event::EntityDefeated {
            entity,
            room: defeated.room,
            coins,
            loot,
        });
        self.receive_items(&[loot], out_events);

        let Some(room) = self.rooms.get_mut(defeated.room.get() as usize) else {
            return;
        };
        let _ = room.entities.remove(&entity);
        if !room.entities.is_empty() || room.cleared {
            return;
        }
        room.cleared = true;
        let rect = room.rect;
        tracing::info!(room = defeated.room.get(), "room cleared");
        out_events.push(Event::RoomCleared {
            room: defeated.room,
        });

        for cell in rect.cells() {
            if self.grid.get(cell) == CellKind::ChestClosed {
                let _ = self.grid.set(cell, CellKind::ChestOpen);
                out_events.push(Event::ChestReleased { cell });
            }
        }
    }

    fn unlock_with_key(&mut self, cell: CellCoord) -> Result<(), DungeonError> {
        if !self.grid.contains(cell) {
            return Err(DungeonError::OutOfBounds);
        }
        let holds_key = self
            .player
            .selected_item()
            .is_some_and(|stack| stack.kind() == ItemKind::Key);
        if !holds_key || self.grid.get(cell) != CellKind::DoorLocked {
            return Err(DungeonError::InvalidGateTransition);
        }
        let slot = self.player.selected_slot.ok_or(DungeonError::InvalidGateTransition)?;
        let _ = self.player.inventory.consume_one(slot);
        if self.unlock_door(cell) {
            Ok(())
        } else {
            Err(DungeonError::InvalidGateTransition)
        }
    }

    fn craft(&mut self, item: ItemKind) -> Result<(), DungeonError> {
        let recipe = item.recipe();
        if !ItemKind::CRAFTABLE.contains(&item) || !self.player.inventory.has_items(recipe) {
            return Err(DungeonError::InsufficientRecipeItems);
        }
        self.player.inventory.subtract(recipe);
        Ok(())
    }
}

/// Applies the provided command to the dungeon, mutating state deterministically.
pub fn apply(dungeon: &mut Dungeon, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if !dungeon.simulating() {
                return;
            }
            let seconds = dt.as_secs_f32();
            dungeon.player.update(seconds);
            dungeon.entities.advance_timers(seconds);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SetPhase { phase } => {
            if dungeon.phase == GamePhase::Death || phase == GamePhase::Death {
                tracing::debug!(?phase, current = ?dungeon.phase, "phase change ignored");
                return;
            }
            dungeon.set_phase(phase, out_events);
        }
        Command::Respawn => {
            if dungeon.phase != GamePhase::Death {
                return;
            }
            dungeon.player.revive(dungeon.start_position);
            out_events.push(Event::PlayerRespawned {
                position: dungeon.start_position,
            });
            dungeon.set_phase(GamePhase::Play, out_events);
        }
        Command::MovePlayer { position } => {
            if !dungeon.simulating() {
                return;
            }
            let from = dungeon.player.position;
            if from == position {
                return;
            }
            dungeon.player.position = position;
            out_events.push(Event::PlayerMoved { from, to: position });
        }
        Command::SetRegionBrightness { region, brightness } => {
            let dark_tint = dungeon.dark_tint;
            let cleared = dungeon
                .rooms
                .get(region.get() as usize)
                .is_some_and(|room| room.cleared);
            let Some(value) = dungeon.brightness.get_mut(region.get() as usize) else {
                return;
            };
            let brightness = brightness.clamp(dark_tint, 1.0);
            if cleared && brightness < *value {
                return;
            }
            *value = brightness;
        }
        Command::PursuePlayer { entity, position } => {
            if !dungeon.simulating() {
                return;
            }
            let Some(target) = dungeon.entities.get_mut(entity) else {
                return;
            };
            let Some(room) = dungeon.rooms.get(target.room.get() as usize) else {
                return;
            };
            let from = target.position;
            let to = room.rect.clamp_position(position);
            target.position = to;
            target.state = EntityState::Pursuing;
            out_events.push(Event::EntityMoved { entity, from, to });
        }
        Command::AccrueCooldown { entity, dt, state } => {
            if !dungeon.simulating() {
                return;
            }
            if let Some(target) = dungeon.entities.get_mut(entity) {
                target.cooldown += dt.as_secs_f32();
                target.state = state;
            }
        }
        Command::StrikePlayer { entity } => {
            if dungeon.simulating() {
                dungeon.strike_player(entity, out_events);
            }
        }
        Command::StrikeEntity { entity, damage } => {
            if dungeon.simulating() {
                dungeon.strike_entity(entity, damage, out_events);
            }
        }
        Command::OpenChest { cell } => {
            if !dungeon.simulating() {
                return;
            }
            match dungeon.open_chest(cell) {
                Ok(items) => {
                    out_events.push(Event::ChestOpened {
                        cell,
                        items: items.clone(),
                    });
                    dungeon.receive_items(&items, out_events);
                }
                Err(reason) => {
                    tracing::debug!(?cell, %reason, "chest open rejected");
                    out_events.push(Event::ChestOpenRejected { cell, reason });
                }
            }
        }
        Command::UnlockDoor { cell } => {
            if !dungeon.simulating() {
                return;
            }
            match dungeon.unlock_with_key(cell) {
                Ok(()) => out_events.push(Event::DoorUnlocked { cell }),
                Err(reason) => {
                    tracing::debug!(?cell, %reason, "door unlock rejected");
                    out_events.push(Event::DoorUnlockRejected { cell, reason });
                }
            }
        }
        Command::SelectSlot { slot } => {
            if dungeon.phase == GamePhase::Death {
                return;
            }
            let slot = slot.filter(|index| *index < dungeon.player.inventory.slots().len());
            dungeon.player.selected_slot = slot;
            out_events.push(Event::SlotSelected { slot });
        }
        Command::Craft { item } => {
            if dungeon.phase == GamePhase::Death {
                return;
            }
            match dungeon.craft(item) {
                Ok(()) => {
                    out_events.push(Event::ItemCrafted { item });
                    dungeon.receive_items(&[ItemStack::new(item, 1)], out_events);
                }
                Err(reason) => {
                    tracing::debug!(?item, %reason, "craft rejected");
                    out_events.push(Event::CraftRejected { item, reason });
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the dungeon state.
pub mod query {
    use std::collections::BTreeSet;

    use super::Dungeon;
    use dungeon_core::{
        BrightnessView, CellCoord, CellKind, EntitySnapshot, EntityView, GamePhase, ItemStack,
        PlayerSnapshot, Position, RegionId, RoomSnapshot, RoomView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(dungeon: &Dungeon) -> &'static str {
        dungeon.banner
    }

    /// Reports the active game phase.
    #[must_use]
    pub fn phase(dungeon: &Dungeon) -> GamePhase {
        dungeon.phase
    }

    /// Number of columns and rows of the grid.
    #[must_use]
    pub fn dimensions(dungeon: &Dungeon) -> (u32, u32) {
        dungeon.grid.dimensions()
    }

    /// Every cell with its kind, row by row.
    pub fn cells(dungeon: &Dungeon) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        dungeon.grid.iter()
    }

    /// Regions claiming `cell`.
    #[must_use]
    pub fn regions_at_cell(dungeon: &Dungeon, cell: CellCoord) -> &BTreeSet<RegionId> {
        dungeon.regions.regions_at(cell)
    }

    /// Regions the player currently stands in.
    #[must_use]
    pub fn player_regions(dungeon: &Dungeon) -> &BTreeSet<RegionId> {
        dungeon.regions_at(dungeon.player.position)
    }

    /// Total number of lighting regions.
    #[must_use]
    pub fn region_count(dungeon: &Dungeon) -> u32 {
        dungeon.regions.region_count()
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(dungeon: &Dungeon) -> PlayerSnapshot {
        dungeon.player.snapshot()
    }

    /// Position the player respawns at.
    #[must_use]
    pub fn start_position(dungeon: &Dungeon) -> Position {
        dungeon.start_position
    }

    /// Inventory slots in order.
    #[must_use]
    pub fn inventory(dungeon: &Dungeon) -> &[Option<ItemStack>] {
        dungeon.player.inventory.slots()
    }

    /// Captures a read-only view of the living enemies.
    #[must_use]
    pub fn entity_view(dungeon: &Dungeon) -> EntityView {
        let snapshots: Vec<EntitySnapshot> = dungeon
            .entities
            .iter()
            .map(|entity| entity.snapshot())
            .collect();
        EntityView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the rooms.
    #[must_use]
    pub fn room_view(dungeon: &Dungeon) -> RoomView {
        let snapshots: Vec<RoomSnapshot> = dungeon
            .rooms
            .iter()
            .map(|room| RoomSnapshot {
                id: room.id,
                kind: room.kind,
                rect: room.rect,
                cleared: room.cleared,
                entities: room.entities.iter().copied().collect(),
            })
            .collect();
        RoomView::from_snapshots(snapshots)
    }

    /// Exposes the brightness of every region.
    #[must_use]
    pub fn brightness_view(dungeon: &Dungeon) -> BrightnessView<'_> {
        BrightnessView::new(&dungeon.brightness, dungeon.dark_tint)
    }

    /// Items still waiting in the chest at `cell`.
    #[must_use]
    pub fn chest_contents(dungeon: &Dungeon, cell: CellCoord) -> Option<&[ItemStack]> {
        dungeon.chests.get(&cell).map(Vec::as_slice)
    }
}
