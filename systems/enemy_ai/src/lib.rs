#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour: rest, pursue the player, and strike when close.

use std::{collections::BTreeSet, time::Duration};

use dungeon_core::{
    AiStats, Command, EntitySnapshot, EntityState, EntityView, Event, PlayerSnapshot, Position,
    RegionId, ATTACK_COOLDOWN, ENGAGEMENT_DISTANCE,
};

/// Configuration parameters required to construct the enemy AI system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    engagement_distance: f32,
}

impl Config {
    /// Creates a new configuration using the provided strike distance.
    #[must_use]
    pub const fn new(engagement_distance: f32) -> Self {
        Self {
            engagement_distance,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(ENGAGEMENT_DISTANCE)
    }
}

/// Pure system that drives every enemy sharing a region with the player.
#[derive(Debug)]
pub struct EnemyAi {
    engagement_distance: f32,
}

impl EnemyAi {
    /// Creates a new enemy AI system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            engagement_distance: config.engagement_distance,
        }
    }

    /// Consumes events and immutable views to emit enemy commands.
    ///
    /// Enemies whose room is not among `player_regions` stay frozen.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        player_regions: &BTreeSet<RegionId>,
        entities: &EntityView,
        out: &mut Vec<Command>,
    ) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() {
            return;
        }

        for entity in entities
            .iter()
            .filter(|entity| player_regions.contains(&entity.room.region()))
        {
            out.push(self.decide(entity, player, elapsed));
        }
    }

    fn decide(&self, entity: &EntitySnapshot, player: &PlayerSnapshot, dt: Duration) -> Command {
        let ready = entity.cooldown >= ATTACK_COOLDOWN;
        let distance = entity.center().distance(player.center());

        if distance > self.engagement_distance {
            if !ready {
                return Command::AccrueCooldown {
                    entity: entity.id,
                    dt,
                    state: EntityState::Resting,
                };
            }
            let stride = entity.kind.speed() * dt.as_secs_f32();
            return Command::PursuePlayer {
                entity: entity.id,
                position: step_toward(entity.position, player.position, stride),
            };
        }

        if ready {
            Command::StrikePlayer { entity: entity.id }
        } else {
            Command::AccrueCooldown {
                entity: entity.id,
                dt,
                state: EntityState::Attacking,
            }
        }
    }
}

/// Moves `from` by `distance` along the bearing toward `to`.
fn step_toward(from: Position, to: Position, distance: f32) -> Position {
    let bearing = (to.y - from.y).atan2(to.x - from.x);
    from.offset(bearing.cos() * distance, bearing.sin() * distance)
}
