#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dungeon engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative dungeon, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the dungeon executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the dungeon.";

/// Lowest brightness a region can fade to.
pub const DEFAULT_DARK_TINT: f32 = 0.35;

/// Centre distance, in cells, below which an enemy stops pursuing and attacks.
pub const ENGAGEMENT_DISTANCE: f32 = 0.7;

/// Cooldown an enemy must accumulate before it may strike again.
pub const ATTACK_COOLDOWN: f32 = 1.0;

/// Number of slots in the player's inventory.
pub const INVENTORY_SLOTS: usize = 24;

/// Horizontal distance from the player's anchor to either side of its body.
pub const PLAYER_HALF_WIDTH: f32 = 0.35;
/// Distance from the player's anchor down to the bottom of its body.
pub const PLAYER_FOOT_OFFSET: f32 = 0.2;
/// Distance from the player's anchor up to the top of its body.
pub const PLAYER_HEAD_OFFSET: f32 = 0.6;

/// Describes the active phase of the game, used by adapters to pick a screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Regular play where the simulation advances.
    Play,
    /// Inventory and crafting screen; the simulation is paused.
    Inventory,
    /// The player died and waits to respawn.
    Death,
}

/// Commands that express all permissible dungeon mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Switches between the play and inventory phases.
    SetPhase {
        /// Phase the dungeon should activate.
        phase: GamePhase,
    },
    /// Returns a dead player to the start room.
    Respawn,
    /// Moves the player to an already collision-resolved position.
    MovePlayer {
        /// Destination of the player's anchor point.
        position: Position,
    },
    /// Stores a new brightness for a region.
    SetRegionBrightness {
        /// Region whose brightness changes.
        region: RegionId,
        /// New brightness, clamped by the dungeon to its valid range.
        brightness: f32,
    },
    /// Moves an enemy toward the player.
    PursuePlayer {
        /// Enemy that moves.
        entity: EntityId,
        /// Desired position; the dungeon keeps it inside the enemy's room.
        position: Position,
    },
    /// Lets an enemy accumulate attack cooldown without moving.
    AccrueCooldown {
        /// Enemy that waits.
        entity: EntityId,
        /// Simulated time to add to the cooldown counter.
        dt: Duration,
        /// State the enemy is in while waiting.
        state: EntityState,
    },
    /// An enemy with a ready cooldown hits the player.
    StrikePlayer {
        /// Enemy delivering the blow.
        entity: EntityId,
    },
    /// The player hits an enemy.
    StrikeEntity {
        /// Enemy receiving the blow.
        entity: EntityId,
        /// Damage dealt.
        damage: f32,
    },
    /// Drains a chest into the player's inventory.
    OpenChest {
        /// Cell holding the chest.
        cell: CellCoord,
    },
    /// Unlocks a locked door using a key from the selected slot.
    UnlockDoor {
        /// Cell holding the door.
        cell: CellCoord,
    },
    /// Selects an inventory slot, or clears the selection.
    SelectSlot {
        /// Slot index, if any.
        slot: Option<usize>,
    },
    /// Crafts one unit of the provided item from inventory resources.
    Craft {
        /// Item to craft.
        item: ItemKind,
    },
}

/// Events broadcast by the dungeon after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the game entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: GamePhase,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
    },
    /// Reports that an enemy hurt the player.
    PlayerHurt {
        /// Enemy that dealt the damage.
        entity: EntityId,
        /// Damage dealt.
        damage: f32,
        /// Player health after the hit.
        health: f32,
    },
    /// Confirms that the player was placed back in the start room.
    PlayerRespawned {
        /// Position the player respawned at.
        position: Position,
    },
    /// Confirms that an enemy moved.
    EntityMoved {
        /// Enemy that moved.
        entity: EntityId,
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
    },
    /// Reports that the player hurt an enemy that survived.
    EntityHurt {
        /// Enemy that was hit.
        entity: EntityId,
        /// Damage dealt.
        damage: f32,
        /// Remaining health.
        health: f32,
    },
    /// Reports that an enemy died and paid out its rewards.
    EntityDefeated {
        /// Enemy that died.
        entity: EntityId,
        /// Room the enemy belonged to.
        room: RoomId,
        /// Coins added to the player's pending balance.
        coins: u32,
        /// Loot handed to the player.
        loot: ItemStack,
    },
    /// Announces that every enemy of a room has been defeated.
    RoomCleared {
        /// Room that was cleared.
        room: RoomId,
    },
    /// Reports that a closed chest inside a cleared room became openable.
    ChestReleased {
        /// Cell holding the chest.
        cell: CellCoord,
    },
    /// Confirms that a chest was drained.
    ChestOpened {
        /// Cell holding the chest.
        cell: CellCoord,
        /// Items the chest held; empty when it had already been drained.
        items: Vec<ItemStack>,
    },
    /// Reports that an open-chest request targeted a cell without a chest.
    ChestOpenRejected {
        /// Targeted cell.
        cell: CellCoord,
        /// Reason the request failed.
        reason: DungeonError,
    },
    /// Confirms that a locked door was opened.
    DoorUnlocked {
        /// Cell holding the door.
        cell: CellCoord,
    },
    /// Reports that an unlock request was not applied.
    DoorUnlockRejected {
        /// Targeted cell.
        cell: CellCoord,
        /// Reason the request failed.
        reason: DungeonError,
    },
    /// Reports items handed to the player.
    ItemsReceived {
        /// Stacks that found room in the inventory.
        stored: Vec<ItemStack>,
        /// Stacks that were discarded because the inventory was full.
        dropped: Vec<ItemStack>,
    },
    /// Confirms that an item was crafted.
    ItemCrafted {
        /// Item that was crafted.
        item: ItemKind,
    },
    /// Reports that a craft request lacked resources.
    CraftRejected {
        /// Item that was requested.
        item: ItemKind,
        /// Reason the request failed.
        reason: DungeonError,
    },
    /// Confirms the player's slot selection.
    SlotSelected {
        /// Selected slot, if any.
        slot: Option<usize>,
    },
}

/// Recoverable failures reported by dungeon operations.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum DungeonError {
    /// The coordinate lies outside the grid.
    #[error("coordinate lies outside the dungeon grid")]
    OutOfBounds,
    /// The targeted cell does not hold a chest.
    #[error("no chest at the requested cell")]
    NoChestHere,
    /// The inventory lacks the stacks a recipe requires.
    #[error("inventory lacks the items required by the recipe")]
    InsufficientRecipeItems,
    /// The targeted cell is not a locked door, or no key is selected.
    #[error("cell cannot transition to an unlocked door")]
    InvalidGateTransition,
}

/// Kind of content stored in a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CellKind {
    /// Nothing; also reported for coordinates outside the grid.
    Empty,
    /// Room floor.
    Floor,
    /// Corridor floor.
    Corridor,
    /// Open door between a corridor and a room.
    Door,
    /// Door that needs a key.
    DoorLocked,
    /// Wall.
    Wall,
    /// Impassable obstacle.
    Obstacle,
    /// Cave rock.
    Cave,
    /// Chest that opens once its room is cleared.
    ChestClosed,
    /// Chest whose contents can be collected.
    ChestOpen,
    /// Chest that was already drained.
    ChestEmpty,
}

impl CellKind {
    /// Every cell kind ordered by its numeric code.
    pub const ALL: [CellKind; 11] = [
        CellKind::Empty,
        CellKind::Floor,
        CellKind::Corridor,
        CellKind::Door,
        CellKind::DoorLocked,
        CellKind::Wall,
        CellKind::Obstacle,
        CellKind::Cave,
        CellKind::ChestClosed,
        CellKind::ChestOpen,
        CellKind::ChestEmpty,
    ];

    /// Stable numeric code of the kind.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a kind by its numeric code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Character used for this kind in text layouts.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Floor => '.',
            Self::Corridor => ',',
            Self::Door => '+',
            Self::DoorLocked => 'L',
            Self::Wall => '#',
            Self::Obstacle => '*',
            Self::Cave => '~',
            Self::ChestClosed => 'C',
            Self::ChestOpen => 'O',
            Self::ChestEmpty => 'U',
        }
    }

    /// Parses a layout character.
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.glyph() == glyph)
    }

    /// Reports whether walkers may enter the cell.
    ///
    /// Only floor, corridor and open doors are walkable. Locked doors, chests
    /// and everything solid block movement.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Corridor | Self::Door)
    }

    /// Reports whether the cell holds a chest in any state.
    #[must_use]
    pub const fn is_chest(self) -> bool {
        matches!(self, Self::ChestClosed | Self::ChestOpen | Self::ChestEmpty)
    }
}

/// Continuous position measured in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate, growing with the column index.
    pub x: f32,
    /// Vertical coordinate, growing with the row index.
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns the position shifted by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle in continuous cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldRect {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl WorldRect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Reports whether the point lies inside. The left and bottom edges are
    /// inclusive, the right and top edges exclusive.
    #[must_use]
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.top()
    }

    /// Reports whether two rectangles overlap.
    #[must_use]
    pub fn intersects(&self, other: &WorldRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }
}

/// Rectangle covered by the player's body when anchored at `position`.
#[must_use]
pub fn player_body(position: Position) -> WorldRect {
    WorldRect::new(
        position.x - PLAYER_HALF_WIDTH,
        position.y - PLAYER_FOOT_OFFSET,
        PLAYER_HALF_WIDTH * 2.0,
        PLAYER_FOOT_OFFSET + PLAYER_HEAD_OFFSET,
    )
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell containing the provided position, or `None` when either
    /// coordinate is negative or not finite.
    #[must_use]
    pub fn containing(position: Position) -> Option<Self> {
        let column = position.x.floor();
        let row = position.y.floor();
        if !column.is_finite() || !row.is_finite() || column < 0.0 || row < 0.0 {
            return None;
        }
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }
        Some(Self::new(column as u32, row as u32))
    }

    /// Lower-left corner of the cell in continuous units.
    #[must_use]
    pub fn corner(&self) -> Position {
        Position::new(self.column as f32, self.row as f32)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Lower-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.size.width as u64 * self.size.height as u64
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = u64::from(cell.column());
        let row = u64::from(cell.row());
        let left = u64::from(self.origin.column());
        let bottom = u64::from(self.origin.row());
        column >= left
            && column < left + u64::from(self.size.width())
            && row >= bottom
            && row < bottom + u64::from(self.size.height())
    }

    /// Iterates every cell of the rectangle, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |dy| {
            (0..size.width())
                .map(move |dx| CellCoord::new(origin.column() + dx, origin.row() + dy))
        })
    }

    /// Reports whether the cell sits on the outermost ring of the rectangle.
    #[must_use]
    pub fn is_boundary(&self, cell: CellCoord) -> bool {
        if !self.contains(cell) {
            return false;
        }
        let right = self.origin.column() + self.size.width() - 1;
        let top = self.origin.row() + self.size.height() - 1;
        cell.column() == self.origin.column()
            || cell.column() == right
            || cell.row() == self.origin.row()
            || cell.row() == top
    }

    /// The rectangle in continuous units.
    #[must_use]
    pub fn to_world(&self) -> WorldRect {
        WorldRect::new(
            self.origin.column() as f32,
            self.origin.row() as f32,
            self.size.width() as f32,
            self.size.height() as f32,
        )
    }

    /// Clamps an anchor position so it stays within the rectangle's extent.
    ///
    /// The far edges are inclusive, so an anchor may sit exactly on the right
    /// or top edge.
    #[must_use]
    pub fn clamp_position(&self, position: Position) -> Position {
        let bounds = self.to_world();
        Position::new(
            position.x.clamp(bounds.x, bounds.right()),
            position.y.clamp(bounds.y, bounds.top()),
        )
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Unique identifier assigned to a room. Room ids double as region ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a new room identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Region claimed by the room.
    #[must_use]
    pub const fn region(&self) -> RegionId {
        RegionId(self.0)
    }
}

/// Key of a lit area: a room, or a connected corridor component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(u32);

impl RegionId {
    /// Creates a new region identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Role a room plays in the dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    /// Where the player spawns and respawns. Holds no enemies.
    Start,
    /// Final room guarded by locked doors. Holds no enemies.
    Terminal,
    /// Room populated by enemies of a single flavour.
    Lair(EnemyKind),
}

impl RoomKind {
    /// Enemy flavour spawned in the room, if any.
    #[must_use]
    pub const fn enemy(self) -> Option<EnemyKind> {
        match self {
            Self::Lair(kind) => Some(kind),
            Self::Start | Self::Terminal => None,
        }
    }
}

/// Enemy variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Slow skull that drops bones.
    Skull,
    /// Weakest slime.
    BlueSlime,
    /// Medium slime.
    GreenSlime,
    /// Strongest slime.
    PurpleSlime,
}

impl EnemyKind {
    /// Weighted pool lair rooms draw their flavour from.
    pub const LAIR_POOL: [EnemyKind; 6] = [
        EnemyKind::Skull,
        EnemyKind::Skull,
        EnemyKind::Skull,
        EnemyKind::BlueSlime,
        EnemyKind::GreenSlime,
        EnemyKind::PurpleSlime,
    ];
}

/// Combat and movement statistics of an enemy variant.
pub trait AiStats {
    /// Health on spawn.
    fn max_health(&self) -> f32;
    /// Damage inflicted per strike.
    fn damage(&self) -> f32;
    /// Pursuit speed in cells per second.
    fn speed(&self) -> f32;
    /// Coins awarded on defeat.
    fn coin_drop(&self) -> u32;
    /// Side length of the square hit rectangle.
    fn footprint(&self) -> f32;
    /// Loot candidates; one is picked uniformly on defeat.
    fn loot_table(&self) -> &'static [ItemStack];
}

const SKULL_LOOT: [ItemStack; 6] = [
    ItemStack::new(ItemKind::Bone, 1),
    ItemStack::new(ItemKind::Bone, 1),
    ItemStack::new(ItemKind::Bone, 1),
    ItemStack::new(ItemKind::Bone, 2),
    ItemStack::new(ItemKind::Bone, 2),
    ItemStack::new(ItemKind::Bone, 3),
];
const BLUE_SLIME_LOOT: [ItemStack; 1] = [ItemStack::new(ItemKind::BlueGel, 1)];
const GREEN_SLIME_LOOT: [ItemStack; 1] = [ItemStack::new(ItemKind::GreenGel, 1)];
const PURPLE_SLIME_LOOT: [ItemStack; 1] = [ItemStack::new(ItemKind::PurpleGel, 1)];

impl AiStats for EnemyKind {
    fn max_health(&self) -> f32 {
        match self {
            Self::Skull => 10.0,
            Self::BlueSlime => 12.0,
            Self::GreenSlime => 15.0,
            Self::PurpleSlime => 20.0,
        }
    }

    fn damage(&self) -> f32 {
        match self {
            Self::Skull => 2.0,
            Self::BlueSlime => 3.0,
            Self::GreenSlime => 4.0,
            Self::PurpleSlime => 5.0,
        }
    }

    fn speed(&self) -> f32 {
        match self {
            Self::Skull => 1.0,
            Self::BlueSlime | Self::GreenSlime | Self::PurpleSlime => 1.2,
        }
    }

    fn coin_drop(&self) -> u32 {
        match self {
            Self::Skull => 5,
            Self::BlueSlime => 10,
            Self::GreenSlime => 15,
            Self::PurpleSlime => 20,
        }
    }

    fn footprint(&self) -> f32 {
        1.0
    }

    fn loot_table(&self) -> &'static [ItemStack] {
        match self {
            Self::Skull => &SKULL_LOOT,
            Self::BlueSlime => &BLUE_SLIME_LOOT,
            Self::GreenSlime => &GREEN_SLIME_LOOT,
            Self::PurpleSlime => &PURPLE_SLIME_LOOT,
        }
    }
}

/// Behaviour an enemy exhibited on its latest tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Idle, recovering from its last strike while the player is out of reach.
    #[default]
    Resting,
    /// Moving toward the player.
    Pursuing,
    /// Next to the player, striking or waiting for the cooldown.
    Attacking,
}

/// Item identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Crafting resource found in chests.
    Wood,
    /// Crafting resource found in chests.
    Stone,
    /// Dropped by skulls.
    Bone,
    /// Dropped by blue slimes.
    BlueGel,
    /// Dropped by green slimes.
    GreenGel,
    /// Dropped by purple slimes.
    PurpleGel,
    /// Opens a locked door.
    Key,
    /// Craftable melee weapon.
    BoneDagger,
    /// Craftable armour.
    WoodenShield,
    /// Craftable explosive.
    Bomb,
}

const BONE_DAGGER_RECIPE: [ItemStack; 2] = [
    ItemStack::new(ItemKind::Wood, 1),
    ItemStack::new(ItemKind::Bone, 1),
];
const WOODEN_SHIELD_RECIPE: [ItemStack; 1] = [ItemStack::new(ItemKind::Wood, 3)];
const BOMB_RECIPE: [ItemStack; 2] = [
    ItemStack::new(ItemKind::BlueGel, 2),
    ItemStack::new(ItemKind::GreenGel, 1),
];

impl ItemKind {
    /// Items listed on the crafting screen.
    pub const CRAFTABLE: [ItemKind; 3] =
        [ItemKind::BoneDagger, ItemKind::WoodenShield, ItemKind::Bomb];

    /// Resources chests are stocked with.
    pub const RESOURCES: [ItemKind; 2] = [ItemKind::Wood, ItemKind::Stone];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wood => "Wood",
            Self::Stone => "Stone",
            Self::Bone => "Bone",
            Self::BlueGel => "Blue Gel",
            Self::GreenGel => "Green Gel",
            Self::PurpleGel => "Purple Gel",
            Self::Key => "Key",
            Self::BoneDagger => "Bone Dagger",
            Self::WoodenShield => "Wooden Shield",
            Self::Bomb => "Bomb",
        }
    }

    /// Stacks consumed when crafting one unit. Empty for raw items.
    #[must_use]
    pub fn recipe(self) -> &'static [ItemStack] {
        match self {
            Self::BoneDagger => &BONE_DAGGER_RECIPE,
            Self::WoodenShield => &WOODEN_SHIELD_RECIPE,
            Self::Bomb => &BOMB_RECIPE,
            _ => &[],
        }
    }
}

/// Melee statistics of items usable as weapons.
pub trait WeaponStats {
    /// Damage dealt per hit, when the item is a weapon.
    fn weapon_damage(&self) -> Option<f32>;
    /// Reach in cells, when the item is a weapon.
    fn weapon_range(&self) -> Option<f32>;
}

impl WeaponStats for ItemKind {
    fn weapon_damage(&self) -> Option<f32> {
        match self {
            Self::BoneDagger => Some(3.5),
            _ => None,
        }
    }

    fn weapon_range(&self) -> Option<f32> {
        match self {
            Self::BoneDagger => Some(2.0),
            _ => None,
        }
    }
}

/// Quantity of a single item kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    kind: ItemKind,
    amount: u32,
}

impl ItemStack {
    /// Creates a new stack.
    #[must_use]
    pub const fn new(kind: ItemKind, amount: u32) -> Self {
        Self { kind, amount }
    }

    /// Item held by the stack.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Number of items in the stack.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Reports whether the stack holds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.amount == 0
    }

    /// Adds another stack of the same kind. Returns `false` and leaves the
    /// stack untouched when the kinds differ.
    pub fn merge(&mut self, other: ItemStack) -> bool {
        if other.kind != self.kind {
            return false;
        }
        self.amount = self.amount.saturating_add(other.amount);
        true
    }

    /// Reports whether this stack satisfies `required`.
    #[must_use]
    pub fn covers(&self, required: &ItemStack) -> bool {
        self.kind == required.kind && self.amount >= required.amount
    }

    /// Removes up to `amount` items and returns how many were removed.
    pub fn remove(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.amount);
        self.amount -= removed;
        removed
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Anchor point of the player's body.
    pub position: Position,
    /// Current health. May drop below zero on a killing blow.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Coin balance shown to the player.
    pub coins: f32,
    /// Coins still trickling into the balance.
    pub pending_coins: f32,
    /// Seconds since the player was last hurt.
    pub hurt_time: f32,
    /// Walking speed in cells per second.
    pub speed: f32,
    /// Selected inventory slot, if any.
    pub selected_slot: Option<usize>,
    /// Stack held in the selected slot, if any.
    pub selected_item: Option<ItemStack>,
    /// Damage of a melee hit with the current selection.
    pub damage: f32,
    /// Reach of a melee hit with the current selection.
    pub range: f32,
}

impl PlayerSnapshot {
    /// Rectangle covered by the player's body.
    #[must_use]
    pub fn body(&self) -> WorldRect {
        player_body(self.position)
    }

    /// Centre of the player's body.
    #[must_use]
    pub fn center(&self) -> Position {
        self.body().center()
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EntityId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Room the enemy is confined to.
    pub room: RoomId,
    /// Lower-left corner of the enemy's hit rectangle.
    pub position: Position,
    /// Remaining health.
    pub health: f32,
    /// Attack cooldown accumulated since the last strike.
    pub cooldown: f32,
    /// Behaviour on the latest tick.
    pub state: EntityState,
    /// Seconds since the enemy was last hurt.
    pub hurt_elapsed: f32,
}

impl EntitySnapshot {
    /// Hit rectangle of the enemy.
    #[must_use]
    pub fn bounds(&self) -> WorldRect {
        let side = self.kind.footprint();
        WorldRect::new(self.position.x, self.position.y, side, side)
    }

    /// Centre of the hit rectangle.
    #[must_use]
    pub fn center(&self) -> Position {
        self.bounds().center()
    }
}

/// Read-only snapshot describing all enemies within the dungeon.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single enemy.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a room used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomSnapshot {
    /// Identifier of the room.
    pub id: RoomId,
    /// Role of the room.
    pub kind: RoomKind,
    /// Cells covered by the room's floor.
    pub rect: CellRect,
    /// Whether every enemy of the room has been defeated.
    pub cleared: bool,
    /// Enemies still alive in the room.
    pub entities: Vec<EntityId>,
}

/// Read-only snapshot describing all rooms, indexed by room id.
#[derive(Clone, Debug, Default)]
pub struct RoomView {
    snapshots: Vec<RoomSnapshot>,
}

impl RoomView {
    /// Creates a new room view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RoomSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the rooms in id order.
    pub fn iter(&self) -> impl Iterator<Item = &RoomSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a room.
    #[must_use]
    pub fn get(&self, id: RoomId) -> Option<&RoomSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the dungeon has no rooms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only view over per-region brightness values.
#[derive(Clone, Copy, Debug)]
pub struct BrightnessView<'a> {
    values: &'a [f32],
    dark_tint: f32,
}

impl<'a> BrightnessView<'a> {
    /// Captures a new brightness view backed by the provided slice, indexed
    /// by region id.
    #[must_use]
    pub fn new(values: &'a [f32], dark_tint: f32) -> Self {
        Self { values, dark_tint }
    }

    /// Brightness of a single region.
    #[must_use]
    pub fn get(&self, region: RegionId) -> Option<f32> {
        usize::try_from(region.get())
            .ok()
            .and_then(|index| self.values.get(index).copied())
    }

    /// Iterates regions together with their brightness.
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, f32)> + 'a {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (RegionId::new(index as u32), *value))
    }

    /// Lowest brightness any region may have.
    #[must_use]
    pub const fn dark_tint(&self) -> f32 {
        self.dark_tint
    }

    /// Tint of a cell claimed by `regions`: the brightest claiming region, or
    /// the dark tint when no region claims the cell.
    #[must_use]
    pub fn tint_for(&self, regions: &BTreeSet<RegionId>) -> f32 {
        regions
            .iter()
            .filter_map(|region| self.get(*region))
            .reduce(f32::max)
            .unwrap_or(self.dark_tint)
    }
}
