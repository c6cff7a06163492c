#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Controller for virus-side combatants.
//!
//! Each enemy owns a movement timer and an attack timer. The world reports
//! when either elapses; this system re-arms it with a randomised interval and
//! decides what the enemy does in response.

use std::time::Duration;

use glam::Vec2;
use netbattle_core::{
    AttackStyle, Command, Direction, EnemySnapshot, EnemyTimer, EnemyView, Event, Heading,
    NaviSnapshot, OnHit, Side, DEFAULT_HIT_RADIUS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Speed of straight enemy shots in tiles per second.
pub const SHOT_SPEED: f32 = 3.5;
/// Speed of ground shockwaves in tiles per second.
///
/// Tuning choice: slower than [`SHOT_SPEED`] so a wave can be dodged by a row
/// change after it is seen.
pub const SHOCKWAVE_SPEED: f32 = 2.5;
/// Horizontal offset from the enemy's tile at which its attacks spawn.
pub const MUZZLE_OFFSET: f32 = -0.5;

/// Inclusive range a randomised timer interval is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    min: Duration,
    max: Duration,
}

impl Interval {
    /// Creates an interval spanning `min..=max`.
    #[must_use]
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Draws a duration from the interval.
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        Duration::from_secs_f64(rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64()))
    }
}

/// Configuration parameters required to construct the virus controller.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    move_interval: Interval,
    attack_interval: Interval,
    idle_chance: f64,
    track_chance: f64,
    retreat_chance: f64,
    advance_chance: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the provided timer intervals and seed.
    #[must_use]
    pub const fn new(move_interval: Interval, attack_interval: Interval, rng_seed: u64) -> Self {
        Self {
            move_interval,
            attack_interval,
            idle_chance: 0.5,
            track_chance: 0.6,
            retreat_chance: 0.3,
            advance_chance: 0.4,
            rng_seed,
        }
    }

    /// Default intervals: movement every 0.6 to 1.2s, attacks every 1.0 to 2.0s.
    #[must_use]
    pub const fn with_seed(rng_seed: u64) -> Self {
        Self::new(
            Interval::new(Duration::from_millis(600), Duration::from_millis(1_200)),
            Interval::new(Duration::from_secs(1), Duration::from_secs(2)),
            rng_seed,
        )
    }
}

/// Pure system deciding enemy movement and attacks.
#[derive(Debug)]
pub struct VirusAi {
    config: Config,
    rng: ChaCha8Rng,
}

impl VirusAi {
    /// Creates a new virus controller using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes elapsed enemy timers and emits re-arm, movement, and attack commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        navi: &NaviSnapshot,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::EnemyTimerElapsed { enemy, timer } = event else {
                continue;
            };
            let Some(snapshot) = enemies.get(*enemy).filter(|snapshot| snapshot.alive) else {
                continue;
            };
            match timer {
                EnemyTimer::Move => {
                    out.push(Command::ArmEnemyTimer {
                        enemy: *enemy,
                        timer: EnemyTimer::Move,
                        duration: self.config.move_interval.sample(&mut self.rng),
                    });
                    if snapshot.locked {
                        continue;
                    }
                    if let Some(direction) = self.choose_step(snapshot, navi.tile.row()) {
                        out.push(Command::StepEnemy {
                            enemy: *enemy,
                            direction,
                        });
                    }
                }
                EnemyTimer::Attack => {
                    out.push(Command::ArmEnemyTimer {
                        enemy: *enemy,
                        timer: EnemyTimer::Attack,
                        duration: self.config.attack_interval.sample(&mut self.rng),
                    });
                    tracing::trace!(
                        enemy = snapshot.id.get(),
                        name = %snapshot.name,
                        "enemy attack"
                    );
                    out.push(attack(snapshot));
                }
            }
        }
    }

    fn choose_step(&mut self, enemy: &EnemySnapshot, navi_row: i32) -> Option<Direction> {
        if self.rng.gen_bool(self.config.idle_chance) {
            return None;
        }
        let tile = enemy.tile;
        let side = Side::Virus;
        if self.rng.gen_bool(self.config.track_chance) {
            return match tile.row().cmp(&navi_row) {
                std::cmp::Ordering::Less => Some(Direction::South),
                std::cmp::Ordering::Greater => Some(Direction::North),
                std::cmp::Ordering::Equal => None,
            };
        }
        if tile.column() < side.max_column() && self.rng.gen_bool(self.config.retreat_chance) {
            return Some(Direction::East);
        }
        if tile.column() > side.min_column() && self.rng.gen_bool(self.config.advance_chance) {
            return Some(Direction::West);
        }
        None
    }
}

/// Projectile an enemy launches along its row.
#[must_use]
pub fn attack(enemy: &EnemySnapshot) -> Command {
    let (speed, shockwave) = match enemy.attack_style {
        AttackStyle::Straight => (SHOT_SPEED, false),
        AttackStyle::Shockwave => (SHOCKWAVE_SPEED, true),
    };
    Command::FireProjectile {
        origin: enemy.tile.point() + Vec2::new(MUZZLE_OFFSET, 0.0),
        heading: Heading::forward(Side::Virus),
        damage: enemy.attack,
        owner: Side::Virus,
        speed,
        pierce: false,
        hit_radius: DEFAULT_HIT_RADIUS,
        on_hit: OnHit::None,
        shockwave,
    }
}
