#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for dungeon adapters.

use anyhow::Result as AnyResult;
use dungeon_core::{
    BrightnessView, CellCoord, CellKind, EnemyKind, EntityId, EntityView, GamePhase, ItemStack,
    PlayerSnapshot, RegionId,
};
use glam::Vec2;
use std::{collections::BTreeSet, error::Error, fmt, time::Duration};

/// Seconds an enemy takes to fade from its hurt colour back to normal.
pub const ENTITY_HURT_FLASH: f32 = 0.5;

/// Seconds the player takes to fade from its hurt colour back to normal.
pub const PLAYER_HURT_FLASH: f32 = 1.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color multiplied by a uniform brightness.
    #[must_use]
    pub fn shade(self, brightness: f32) -> Self {
        let brightness = brightness.clamp(0.0, 1.0);

        Self {
            red: self.red * brightness,
            green: self.green * brightness,
            blue: self.blue * brightness,
            alpha: self.alpha,
        }
    }

    /// Returns the color tinted red; a `recovery` of 1.0 leaves it unchanged.
    #[must_use]
    pub fn hurt_flash(self, recovery: f32) -> Self {
        let recovery = recovery.clamp(0.0, 1.0);

        Self {
            red: self.red,
            green: self.green * recovery,
            blue: self.blue * recovery,
            alpha: self.alpha,
        }
    }

    /// Converts the color channels back to bytes, dropping alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
        ]
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Base color of a cell kind before lighting is applied.
#[must_use]
pub const fn cell_color(kind: CellKind) -> Color {
    match kind {
        CellKind::Empty => Color::from_rgb_u8(0, 0, 0),
        CellKind::Floor => Color::from_rgb_u8(150, 130, 110),
        CellKind::Corridor => Color::from_rgb_u8(120, 110, 100),
        CellKind::Door => Color::from_rgb_u8(140, 90, 40),
        CellKind::DoorLocked => Color::from_rgb_u8(200, 160, 40),
        CellKind::Wall => Color::from_rgb_u8(90, 90, 100),
        CellKind::Obstacle => Color::from_rgb_u8(70, 70, 70),
        CellKind::Cave => Color::from_rgb_u8(60, 50, 45),
        CellKind::ChestClosed | CellKind::ChestOpen | CellKind::ChestEmpty => {
            Color::from_rgb_u8(170, 110, 50)
        }
    }
}

/// Base color of an enemy before the hurt flash is applied.
#[must_use]
pub const fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Skull => Color::from_rgb_u8(230, 230, 220),
        EnemyKind::BlueSlime => Color::from_rgb_u8(70, 110, 230),
        EnemyKind::GreenSlime => Color::from_rgb_u8(80, 200, 90),
        EnemyKind::PurpleSlime => Color::from_rgb_u8(160, 80, 200),
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Direction of the joystick or keys on this frame, if the player is steering.
    pub heading: Option<Vec2>,
    /// World position of a tap on this frame, expressed in cell units.
    pub tap: Option<Vec2>,
}

/// Single grid cell as it should be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTile {
    /// Coordinate of the cell.
    pub cell: CellCoord,
    /// Kind of the cell.
    pub kind: CellKind,
    /// Brightness applied to the cell, between the dark tint and 1.0.
    pub tint: f32,
}

impl SceneTile {
    /// Lit color of the tile.
    #[must_use]
    pub fn color(&self) -> Color {
        cell_color(self.kind).shade(self.tint)
    }
}

/// Enemy visible to the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEntity {
    /// Identifier allocated to the enemy by the world.
    pub id: EntityId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Lower-left corner of the enemy's sprite in cell units.
    pub position: Vec2,
    /// Hurt recovery factor: 0.0 right after a hit, 1.0 once recovered.
    pub tint: f32,
}

impl SceneEntity {
    /// Color of the enemy including the hurt flash.
    #[must_use]
    pub fn color(&self) -> Color {
        enemy_color(self.kind).hurt_flash(self.tint)
    }
}

/// Player avatar and heads-up values.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePlayer {
    /// Anchor of the player's body in cell units.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Coin balance.
    pub coins: f32,
    /// Hurt recovery factor: 0.0 right after a hit, 1.0 once recovered.
    pub tint: f32,
    /// Occupied inventory slots as `(slot, stack)`, in slot order.
    pub items: Vec<(usize, ItemStack)>,
    /// Slot whose item is in hand.
    pub selected_slot: Option<usize>,
}

impl ScenePlayer {
    /// Fraction of the health bar to fill.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Scene description combining the lit grid, visible enemies and the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Tiles stored row-major starting at row zero.
    pub tiles: Vec<SceneTile>,
    /// Enemies sharing a region with the player.
    pub entities: Vec<SceneEntity>,
    /// Player avatar.
    pub player: ScenePlayer,
    /// Active phase, used to pick between the dungeon, inventory and death screens.
    pub phase: GamePhase,
}

impl Scene {
    /// Creates a new scene descriptor.
    ///
    /// Returns an error when `tiles` does not cover the grid exactly.
    pub fn new(
        columns: u32,
        rows: u32,
        tiles: Vec<SceneTile>,
        entities: Vec<SceneEntity>,
        player: ScenePlayer,
        phase: GamePhase,
    ) -> Result<Self, RenderingError> {
        let expected = columns as usize * rows as usize;
        if tiles.len() != expected {
            return Err(RenderingError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tiles,
            entities,
            player,
            phase,
        })
    }

    /// Looks up the tile drawn for `cell`.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&SceneTile> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.tiles.get(index)
    }
}

/// Dungeon observations a scene is composed from.
#[derive(Clone, Copy, Debug)]
pub struct SceneSources<'a> {
    /// Grid dimensions as `(columns, rows)`.
    pub dimensions: (u32, u32),
    /// Current region brightness.
    pub brightness: BrightnessView<'a>,
    /// Player snapshot.
    pub player: &'a PlayerSnapshot,
    /// Player inventory slots.
    pub inventory: &'a [Option<ItemStack>],
    /// Regions claiming the player's anchor.
    pub player_regions: &'a BTreeSet<RegionId>,
    /// All enemies alive in the dungeon.
    pub entities: &'a EntityView,
    /// Active phase.
    pub phase: GamePhase,
}

/// Composes a scene from dungeon observations.
///
/// `cells` must yield every cell row-major and `regions_at` must report the
/// regions claiming a cell. Tiles are lit by their brightest region, enemies
/// are kept only while the player shares a region with their room.
pub fn compose<'a, C, R>(
    sources: SceneSources<'_>,
    cells: C,
    regions_at: R,
) -> Result<Scene, RenderingError>
where
    C: IntoIterator<Item = (CellCoord, CellKind)>,
    R: Fn(CellCoord) -> &'a BTreeSet<RegionId>,
{
    let tiles = cells
        .into_iter()
        .map(|(cell, kind)| SceneTile {
            cell,
            kind,
            tint: sources.brightness.tint_for(regions_at(cell)),
        })
        .collect();

    let entities = sources
        .entities
        .iter()
        .filter(|entity| sources.player_regions.contains(&entity.room.region()))
        .map(|entity| SceneEntity {
            id: entity.id,
            kind: entity.kind,
            position: Vec2::new(entity.position.x, entity.position.y),
            tint: (entity.hurt_elapsed / ENTITY_HURT_FLASH).min(1.0),
        })
        .collect();

    let snapshot = sources.player;
    let player = ScenePlayer {
        position: Vec2::new(snapshot.position.x, snapshot.position.y),
        health: snapshot.health,
        max_health: snapshot.max_health,
        coins: snapshot.coins,
        tint: (snapshot.hurt_time / PLAYER_HURT_FLASH).min(1.0),
        items: sources
            .inventory
            .iter()
            .enumerate()
            .filter_map(|(slot, stack)| stack.map(|stack| (slot, stack)))
            .collect(),
        selected_slot: snapshot.selected_slot,
    };

    let (columns, rows) = sources.dimensions;
    Scene::new(columns, rows, tiles, entities, player, sources.phase)
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown above the first frame.
    pub title: String,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            scene,
        }
    }
}

/// Decision returned by the scene update closure after each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Stop the backend after presenting the current frame.
    Exit,
}

/// Rendering backend capable of presenting dungeon scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update closure asks it to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and per-frame input captured by the adapter, and refreshes the scene
    /// before it is presented. Errors returned by the closure stop the backend.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<FrameControl>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The tile list must hold exactly one tile per grid cell.
    TileCountMismatch {
        /// Tiles required by the grid dimensions.
        expected: usize,
        /// Tiles provided.
        actual: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TileCountMismatch { expected, actual } => {
                write!(f, "scene needs {expected} tiles (received {actual})")
            }
        }
    }
}

impl Error for RenderingError {}
