#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Automatic controller for the Navi during continuous battle.
//!
//! The Navi is never steered directly while the battle runs. Every movement
//! check it dodges enemy shots closing in on its row, and otherwise shuffles
//! around its half of the grid at random. A buster fires on its own cadence.

use std::time::Duration;

use glam::Vec2;
use netbattle_core::{
    Command, Event, Heading, NaviSnapshot, OnHit, ProjectileView, Side, TileCoord,
    DEFAULT_HIT_RADIUS, GRID_ROWS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Speed of buster shots in tiles per second.
pub const BUSTER_SPEED: f32 = 8.0;

/// Configuration parameters required to construct the autopilot.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    move_check_interval: Duration,
    buster_cooldown: Duration,
    danger_reach: f32,
    danger_lane: f32,
    reposition_chance: f64,
    row_change_chance: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the provided cadences and seed.
    #[must_use]
    pub const fn new(
        move_check_interval: Duration,
        buster_cooldown: Duration,
        rng_seed: u64,
    ) -> Self {
        Self {
            move_check_interval,
            buster_cooldown,
            danger_reach: 3.5,
            danger_lane: 0.6,
            reposition_chance: 0.3,
            row_change_chance: 0.7,
            rng_seed,
        }
    }

    /// Default cadences: a movement check every 0.5s and a buster shot every 0.8s.
    #[must_use]
    pub const fn with_seed(rng_seed: u64) -> Self {
        Self::new(Duration::from_millis(500), Duration::from_millis(800), rng_seed)
    }
}

/// Pure system steering the Navi and firing its buster.
#[derive(Debug)]
pub struct Autopilot {
    config: Config,
    move_elapsed: Duration,
    buster_elapsed: Duration,
    rng: ChaCha8Rng,
}

impl Autopilot {
    /// Creates a new autopilot using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            move_elapsed: Duration::ZERO,
            buster_elapsed: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes time events and the current field to emit movement and buster commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        navi: &NaviSnapshot,
        projectiles: &ProjectileView,
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

        let mut tile = navi.tile;
        self.move_elapsed = self.move_elapsed.saturating_add(elapsed);
        if self.move_elapsed >= self.config.move_check_interval {
            self.move_elapsed = Duration::ZERO;
            if let Some(destination) = self.choose_move(tile, projectiles) {
                tile = destination;
                out.push(Command::MoveNavi { to: destination });
            }
        }

        self.buster_elapsed = self.buster_elapsed.saturating_add(elapsed);
        if self.buster_elapsed >= self.config.buster_cooldown {
            self.buster_elapsed = Duration::ZERO;
            out.push(Command::FireProjectile {
                origin: tile.point() + Vec2::new(0.5, 0.0),
                heading: Heading::forward(Side::Navi),
                damage: navi.stats.buster_attack,
                owner: Side::Navi,
                speed: BUSTER_SPEED,
                pierce: false,
                hit_radius: DEFAULT_HIT_RADIUS,
                on_hit: OnHit::None,
                shockwave: false,
            });
        }
    }

    fn choose_move(&mut self, tile: TileCoord, projectiles: &ProjectileView) -> Option<TileCoord> {
        if let Some(danger_row) = self.danger_row(tile, projectiles) {
            return escape_row(tile.row(), danger_row)
                .map(|row| TileCoord::new(tile.column(), row));
        }

        if !self.rng.gen_bool(self.config.reposition_chance) {
            return None;
        }
        let destination = if self.rng.gen_bool(self.config.row_change_chance) {
            TileCoord::new(tile.column(), self.rng.gen_range(0..GRID_ROWS))
        } else {
            let shift = if self.rng.gen_bool(0.5) { -1 } else { 1 };
            tile.offset(shift, 0).clamp_to(Side::Navi)
        };
        (destination != tile).then_some(destination)
    }

    fn danger_row(&self, tile: TileCoord, projectiles: &ProjectileView) -> Option<i32> {
        let row = tile.row() as f32;
        projectiles
            .iter()
            .find(|projectile| {
                projectile.owner == Side::Virus
                    && projectile.heading.dx() < 0
                    && projectile.position.x > 0.0
                    && projectile.position.x < self.config.danger_reach
                    && (projectile.position.y - row).abs() < self.config.danger_lane
            })
            .map(|projectile| projectile.position.y.round() as i32)
    }
}

/// Row closest to `current` other than `danger`, preferring the lower index on ties.
#[must_use]
pub fn escape_row(current: i32, danger: i32) -> Option<i32> {
    (0..GRID_ROWS)
        .filter(|row| *row != danger)
        .min_by_key(|row| (row - current).abs())
}
