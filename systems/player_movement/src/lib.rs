#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player movement system that integrates the heading and resolves wall collisions.

use std::time::Duration;

use dungeon_core::{
    player_body, Command, Event, PlayerSnapshot, Position, PLAYER_FOOT_OFFSET, PLAYER_HALF_WIDTH,
    PLAYER_HEAD_OFFSET,
};

/// Gap kept between the player's body and a blocking cell after correction.
pub const COLLISION_EPSILON: f32 = 0.0001;

/// Direction the player wants to walk in; only its bearing matters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Heading {
    x: f32,
    y: f32,
}

impl Heading {
    /// Creates a heading from a direction vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_still(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    fn bearing(&self) -> f32 {
        self.y.atan2(self.x)
    }
}

/// Pure system that walks the player along the active heading.
#[derive(Debug, Default)]
pub struct PlayerMovement {
    heading: Option<Heading>,
}

impl PlayerMovement {
    /// Creates a movement system without an active heading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active heading. `None` stops the player.
    pub fn set_heading(&mut self, heading: Option<Heading>) {
        self.heading = heading;
    }

    /// Active heading, if any.
    #[must_use]
    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    /// Consumes events and the player snapshot to emit a movement command.
    ///
    /// `is_walkable` reports whether the cell containing a position can be
    /// entered. A respawn clears the heading.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        is_walkable: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(Position) -> bool,
    {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::PlayerRespawned { .. } => self.heading = None,
                _ => {}
            }
        }

        let Some(heading) = self.heading.filter(|heading| !heading.is_still()) else {
            return;
        };
        if elapsed.is_zero() {
            return;
        }

        let stride = player.speed * elapsed.as_secs_f32();
        let bearing = heading.bearing();
        let position = resolve_step(
            player.position,
            bearing.cos() * stride,
            bearing.sin() * stride,
            &is_walkable,
        );

        if position != player.position {
            out.push(Command::MovePlayer { position });
        }
    }
}

/// Moves `position` by `dx` then `dy`, pushing the body out of any blocking
/// cell after each axis so the player slides along walls.
pub fn resolve_step<F>(position: Position, dx: f32, dy: f32, is_walkable: &F) -> Position
where
    F: Fn(Position) -> bool,
{
    let mut position = position.offset(dx, 0.0);

    let body = player_body(position);
    let left = body.x;
    let bottom = body.y;
    let top = body.top();
    if !is_walkable(Position::new(left, bottom)) || !is_walkable(Position::new(left, top)) {
        position.x = left.floor() + 1.0 + PLAYER_HALF_WIDTH + COLLISION_EPSILON;
    }

    let right = player_body(position).right();
    if !is_walkable(Position::new(right, bottom)) || !is_walkable(Position::new(right, top)) {
        position.x = right.floor() - PLAYER_HALF_WIDTH - COLLISION_EPSILON;
    }

    position = position.offset(0.0, dy);

    let body = player_body(position);
    let left = body.x;
    let right = body.right();
    let bottom = body.y;
    if !is_walkable(Position::new(left, bottom)) || !is_walkable(Position::new(right, bottom)) {
        position.y = bottom.floor() + 1.0 + PLAYER_FOOT_OFFSET + COLLISION_EPSILON;
    }

    let top = player_body(position).top();
    if !is_walkable(Position::new(left, top)) || !is_walkable(Position::new(right, top)) {
        position.y = top.floor() - PLAYER_HEAD_OFFSET - COLLISION_EPSILON;
    }

    position
}
