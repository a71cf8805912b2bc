#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless dungeon session.

mod ascii;
mod layout_file;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dungeon_core::{Command, Event, GamePhase, Position};
use dungeon_rendering::{
    compose, FrameControl, FrameInput, Presentation, RenderingBackend, Scene, SceneSources,
};
use dungeon_system_enemy_ai::{self as enemy_ai, EnemyAi};
use dungeon_system_illumination::{self as illumination, Illumination};
use dungeon_system_interaction::{Interaction, InteractionInput};
use dungeon_system_player_movement::{Heading, PlayerMovement};
use dungeon_world::{self as world, query, Dungeon, Layout};
use glam::Vec2;
use tracing_subscriber::EnvFilter;

use crate::{
    ascii::{AsciiBackend, AsciiOptions},
    layout_file::{LayoutFile, DEMO_LAYOUT},
};

/// Runs a dungeon for a number of frames and prints the final frame.
#[derive(Debug, Parser)]
#[command(name = "dungeon", version)]
struct Cli {
    /// JSON layout file; the bundled demo layout is used when omitted.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Seed for room kinds, enemies and loot. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    frames: u32,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Direction the player walks in on every frame.
    #[arg(long, value_enum, default_value_t = Direction::Still)]
    heading: Direction,
    /// Position tapped on the first frame, written as `x,y` in cell units.
    #[arg(long, value_parser = parse_tap)]
    tap: Option<Vec2>,
    /// Respawn at the start room as soon as the player dies.
    #[arg(long)]
    respawn: bool,
    /// Colour the frame with ANSI escape codes.
    #[arg(long)]
    color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Direction {
    Still,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Unit-free direction vector; rows grow northward.
    fn vector(self) -> Option<Vec2> {
        let (x, y) = match self {
            Self::Still => return None,
            Self::North => (0.0, 1.0),
            Self::NorthEast => (1.0, 1.0),
            Self::East => (1.0, 0.0),
            Self::SouthEast => (1.0, -1.0),
            Self::South => (0.0, -1.0),
            Self::SouthWest => (-1.0, -1.0),
            Self::West => (-1.0, 0.0),
            Self::NorthWest => (-1.0, 1.0),
        };
        Some(Vec2::new(x, y))
    }
}

fn parse_tap(value: &str) -> Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, found `{value}`"))?;
    let x = x
        .trim()
        .parse::<f32>()
        .map_err(|error| format!("invalid x coordinate `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse::<f32>()
        .map_err(|error| format!("invalid y coordinate `{y}`: {error}"))?;
    Ok(Vec2::new(x, y))
}

fn load_layout(path: Option<&Path>) -> Result<Layout> {
    let file = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read layout {}", path.display()))?;
            LayoutFile::parse(&json)
                .with_context(|| format!("failed to parse layout {}", path.display()))?
        }
        None => LayoutFile::parse(DEMO_LAYOUT).context("bundled demo layout is malformed")?,
    };
    let layout = file.into_layout().context("layout rejected")?;
    tracing::debug!(
        columns = layout.columns(),
        rows = layout.rows(),
        rooms = layout.rooms().len(),
        deadends = layout.deadends().len(),
        "layout loaded"
    );
    Ok(layout)
}

/// Dungeon plus the systems driving it, advanced one frame at a time.
struct Session {
    dungeon: Dungeon,
    illumination: Illumination,
    movement: PlayerMovement,
    ai: EnemyAi,
    interaction: Interaction,
    respawn: bool,
}

impl Session {
    fn new(dungeon: Dungeon, respawn: bool) -> Self {
        Self {
            dungeon,
            illumination: Illumination::new(illumination::Config::default()),
            movement: PlayerMovement::new(),
            ai: EnemyAi::new(enemy_ai::Config::default()),
            interaction: Interaction::new(),
            respawn,
        }
    }

    /// Advances the dungeon by `dt`: illumination, movement, then enemies.
    /// A tap is resolved last, against the settled positions.
    fn frame(&mut self, dt: Duration, input: &FrameInput) -> Vec<Event> {
        let mut events = Vec::new();
        if self.respawn && query::phase(&self.dungeon) == GamePhase::Death {
            world::apply(&mut self.dungeon, Command::Respawn, &mut events);
        }
        world::apply(&mut self.dungeon, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.illumination.handle(
            &events,
            query::brightness_view(&self.dungeon),
            query::player_regions(&self.dungeon),
            &query::room_view(&self.dungeon),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.movement
            .set_heading(input.heading.map(|heading| Heading::new(heading.x, heading.y)));
        let player = query::player(&self.dungeon);
        self.movement.handle(
            &events,
            &player,
            |position| self.dungeon.can_walk(position),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        let player = query::player(&self.dungeon);
        self.ai.handle(
            &events,
            &player,
            query::player_regions(&self.dungeon),
            &query::entity_view(&self.dungeon),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        let player = query::player(&self.dungeon);
        let tap = input.tap.map(|tap| Position::new(tap.x, tap.y));
        self.interaction.handle(
            &events,
            InteractionInput::new(tap),
            &player,
            &query::entity_view(&self.dungeon),
            &query::room_view(&self.dungeon),
            |position| self.dungeon.block_at(position),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        events
    }

    fn flush(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.dungeon, command, events);
        }
    }

    fn scene(&self) -> Result<Scene> {
        let dungeon = &self.dungeon;
        let player = query::player(dungeon);
        let entities = query::entity_view(dungeon);
        let sources = SceneSources {
            dimensions: query::dimensions(dungeon),
            brightness: query::brightness_view(dungeon),
            player: &player,
            inventory: query::inventory(dungeon),
            player_regions: query::player_regions(dungeon),
            entities: &entities,
            phase: query::phase(dungeon),
        };
        let scene = compose(sources, query::cells(dungeon), |cell| {
            query::regions_at_cell(dungeon, cell)
        })?;
        Ok(scene)
    }
}

fn log_notable(events: &[Event]) {
    for event in events {
        match event {
            Event::RoomCleared { room } => tracing::info!(room = room.get(), "room cleared"),
            Event::ChestOpened { cell, items } => tracing::info!(
                column = cell.column(),
                row = cell.row(),
                items = items.len(),
                "chest opened"
            ),
            Event::DoorUnlocked { cell } => {
                tracing::info!(column = cell.column(), row = cell.row(), "door unlocked")
            }
            Event::PlayerRespawned { .. } => tracing::info!("player respawned"),
            _ => {}
        }
    }
}

/// Entry point for the dungeon command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let layout = load_layout(cli.layout.as_deref())?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, frames = cli.frames, "starting dungeon session");

    let dungeon = Dungeon::new(layout, world::Config::default().with_seed(seed));
    let mut session = Session::new(dungeon, cli.respawn);
    let presentation = Presentation::new(query::welcome_banner(&session.dungeon), session.scene()?);

    let backend = AsciiBackend::new(
        std::io::stdout().lock(),
        AsciiOptions {
            frames: cli.frames,
            frame_delta: Duration::from_millis(cli.frame_ms),
            heading: cli.heading.vector(),
            tap: cli.tap,
            color: cli.color,
        },
    );

    backend.run(presentation, move |dt, input, scene| {
        let events = session.frame(dt, &input);
        log_notable(&events);
        *scene = session.scene()?;

        if scene.phase == GamePhase::Death && !session.respawn {
            tracing::info!("player died; stopping");
            return Ok(FrameControl::Exit);
        }
        Ok(FrameControl::Continue)
    })
}
