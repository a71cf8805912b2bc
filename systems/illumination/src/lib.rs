#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Illumination system that fades regions in around the player and out elsewhere.

use std::{collections::BTreeSet, time::Duration};

use dungeon_core::{BrightnessView, Command, Event, RegionId, RoomId, RoomView, DEFAULT_DARK_TINT};

const DEFAULT_FADE_SPEED: Duration = Duration::from_millis(400);

/// Configuration parameters required to construct the illumination system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    dark_tint: f32,
    fade_speed: Duration,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `fade_speed` is the time a region needs to fade across the full
    /// brightness range.
    #[must_use]
    pub const fn new(dark_tint: f32, fade_speed: Duration) -> Self {
        Self {
            dark_tint,
            fade_speed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DARK_TINT, DEFAULT_FADE_SPEED)
    }
}

/// Pure system that eases region brightness toward lit or dark.
#[derive(Debug)]
pub struct Illumination {
    dark_tint: f32,
    fade_speed: Duration,
}

impl Illumination {
    /// Creates a new illumination system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            dark_tint: config.dark_tint,
            fade_speed: config.fade_speed,
        }
    }

    /// Consumes events and immutable views to emit brightness commands.
    ///
    /// Regions in `player_regions` brighten toward full light while every
    /// other region darkens toward the dark tint, except cleared rooms which
    /// keep their light.
    pub fn handle(
        &mut self,
        events: &[Event],
        brightness: BrightnessView<'_>,
        player_regions: &BTreeSet<RegionId>,
        rooms: &RoomView,
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

        let step = if self.fade_speed.is_zero() {
            f32::INFINITY
        } else {
            elapsed.as_secs_f32() / self.fade_speed.as_secs_f32()
        };

        for (region, current) in brightness.iter() {
            let lit = player_regions.contains(&region);
            let cleared = rooms
                .get(RoomId::new(region.get()))
                .is_some_and(|room| room.cleared);

            let next = if lit {
                (current + step).min(1.0)
            } else if cleared {
                continue;
            } else {
                (current - step).max(self.dark_tint)
            };

            if next != current {
                out.push(Command::SetRegionBrightness {
                    region,
                    brightness: next,
                });
            }
        }
    }
}
