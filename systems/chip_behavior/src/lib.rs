#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Chip behaviour resolution.
//!
//! A chip's simulation effect is decided once, when its definition is loaded,
//! and stored beside the definition as a [`ChipBehavior`]. Dispatch follows a
//! fixed order where the first match wins:
//!
//! | Order | Condition | Behaviour |
//! |-------|-----------|-----------|
//! | 1 | category `heal` | restore `power` HP |
//! | 2 | tag `invis`/`buff_invis`, or name contains "invis" | invisibility, 3s unless `duration` is given |
//! | 3 | category `sword`/`widesword`/`longsword` | melee sweep over the category's range pattern |
//! | 4 | category `attack` | explicit tag, otherwise inferred from the name (below) |
//! | 5 | anything else | inert |
//!
//! Name inference for attack chips, checked case-insensitively in order:
//!
//! | Name contains | Behaviour |
//! |---------------|-----------|
//! | "bomb" and "mini" | lob 3 tiles ahead, 0.45s delay, single-tile splash |
//! | "bomb" | lob 3 tiles ahead, 0.5s delay, cross splash of range 1 |
//! | "spreader" | spreader shot with diagonal splashes |
//! | "shotgun" | shotgun shot |
//! | "airshot" or "air shot" | airshot pushing one column |
//! | otherwise | straight shot |

mod library;

use std::time::Duration;

use glam::Vec2;
use netbattle_core::{
    BehaviorTag, Chip, ChipBehavior, ChipCategory, ChipDefinition, ChipParams, Command, Event,
    Heading, OnHit, Side, SlashTint, SplashShape, TileCoord, DEFAULT_HIT_RADIUS, GRID_COLUMNS,
};

pub use library::{ChipLibrary, LibraryError};

/// Default invisibility window.
pub const DEFAULT_INVIS_DURATION: Duration = Duration::from_secs(3);
/// Default lob distance in columns ahead of the Navi.
pub const DEFAULT_LOB_DISTANCE: i32 = 3;
/// Default lob landing delay.
pub const DEFAULT_LOB_DELAY: Duration = Duration::from_millis(450);
/// Landing delay inferred for full-size bombs.
pub const BOMB_LOB_DELAY: Duration = Duration::from_millis(500);
/// Default speed of straight chip shots in tiles per second.
pub const SHOT_SPEED: f32 = 6.0;
/// Default speed of shotgun shots in tiles per second.
pub const SHOTGUN_SPEED: f32 = 6.5;
/// Default speed of spreader shots in tiles per second.
pub const SPREADER_SPEED: f32 = 6.0;
/// Default speed of airshots in tiles per second.
pub const AIRSHOT_SPEED: f32 = 7.0;
/// Horizontal offset from the Navi's tile at which its shots spawn.
pub const MUZZLE_OFFSET: f32 = 0.5;

/// Resolves the simulation effect of a chip definition.
#[must_use]
pub fn resolve(definition: &ChipDefinition) -> ChipBehavior {
    let lowered = definition.name.to_lowercase();

    if definition.category == ChipCategory::Heal {
        return ChipBehavior::Heal {
            amount: definition.power,
        };
    }

    if definition.behavior == Some(BehaviorTag::Invis) || lowered.contains("invis") {
        return ChipBehavior::Invisibility {
            duration: seconds(definition.params.duration).unwrap_or(DEFAULT_INVIS_DURATION),
        };
    }

    if definition.category.is_melee() {
        return ChipBehavior::Melee {
            pattern: definition.range_pattern(),
            damage: definition.power,
            tint: slash_tint(&definition.name),
        };
    }

    if definition.category != ChipCategory::Attack {
        return ChipBehavior::Inert;
    }

    match definition.behavior {
        Some(tag) => attack_behavior(tag, &definition.params, definition.power),
        None => infer_from_name(&lowered, &definition.params, definition.power),
    }
}

/// Pairs a definition with its resolved behaviour.
#[must_use]
pub fn resolve_chip(definition: ChipDefinition) -> Chip {
    let behavior = resolve(&definition);
    Chip::new(definition, behavior)
}

fn infer_from_name(lowered: &str, authored: &ChipParams, damage: i32) -> ChipBehavior {
    if lowered.contains("bomb") {
        let (delay, splash) = if lowered.contains("mini") {
            (DEFAULT_LOB_DELAY, SplashShape::Single)
        } else {
            (BOMB_LOB_DELAY, SplashShape::Cross1)
        };
        return ChipBehavior::Lob {
            damage,
            distance: DEFAULT_LOB_DISTANCE,
            delay,
            splash,
        };
    }
    let mut params = authored.clone();
    let tag = if lowered.contains("spreader") {
        params.diagonals = Some(true);
        BehaviorTag::Spreader
    } else if lowered.contains("shotgun") {
        BehaviorTag::Shotgun
    } else if lowered.contains("airshot") || lowered.contains("air shot") {
        params.push = Some(1);
        BehaviorTag::AirShot
    } else {
        BehaviorTag::Projectile
    };
    attack_behavior(tag, &params, damage)
}

fn attack_behavior(tag: BehaviorTag, params: &ChipParams, damage: i32) -> ChipBehavior {
    let shot = |default_speed: f32, pierce: bool, on_hit: OnHit| ChipBehavior::Shot {
        damage,
        speed: params.speed.unwrap_or(default_speed),
        pierce,
        on_hit,
    };
    match tag {
        BehaviorTag::Lob => ChipBehavior::Lob {
            damage,
            distance: params.dist.unwrap_or(DEFAULT_LOB_DISTANCE),
            delay: seconds(params.delay).unwrap_or(DEFAULT_LOB_DELAY),
            splash: params.splash.unwrap_or(SplashShape::Single),
        },
        BehaviorTag::Spreader => shot(
            SPREADER_SPEED,
            false,
            OnHit::Spreader {
                diagonals: params.diagonals.unwrap_or(true),
            },
        ),
        BehaviorTag::Shotgun => shot(SHOTGUN_SPEED, false, OnHit::Shotgun),
        BehaviorTag::AirShot => shot(
            AIRSHOT_SPEED,
            false,
            OnHit::AirShot {
                push: params.push.unwrap_or(1),
            },
        ),
        BehaviorTag::Projectile | BehaviorTag::Invis => {
            shot(SHOT_SPEED, params.pierce.unwrap_or(false), OnHit::None)
        }
    }
}

fn seconds(value: Option<f32>) -> Option<Duration> {
    value.and_then(|secs| Duration::try_from_secs_f32(secs).ok())
}

fn slash_tint(name: &str) -> SlashTint {
    if name.contains("Fire") {
        SlashTint::Fire
    } else if name.contains("Aqua") {
        SlashTint::Aqua
    } else {
        SlashTint::Default
    }
}

/// Pure system that turns activated chips into world commands.
#[derive(Debug, Default)]
pub struct ChipResolver;

impl ChipResolver {
    /// Creates a new chip resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes chip activations and emits the commands realising their effects.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::ChipActivated { chip, navi } = event {
                tracing::debug!(chip = chip.name(), ?navi, "chip activated");
                emit(chip.behavior(), *navi, out);
            }
        }
    }
}

fn emit(behavior: &ChipBehavior, navi: TileCoord, out: &mut Vec<Command>) {
    match behavior {
        ChipBehavior::Heal { amount } => out.push(Command::HealNavi { amount: *amount }),
        ChipBehavior::Invisibility { duration } => out.push(Command::GrantInvisibility {
            duration: *duration,
        }),
        ChipBehavior::Melee {
            pattern,
            damage,
            tint,
        } => out.push(Command::StrikeTiles {
            tiles: pattern
                .iter()
                .map(|(columns, rows)| navi.offset(*columns, *rows))
                .collect(),
            damage: *damage,
            owner: Side::Navi,
            tint: *tint,
        }),
        ChipBehavior::Shot {
            damage,
            speed,
            pierce,
            on_hit,
        } => out.push(Command::FireProjectile {
            origin: navi.point() + Vec2::new(MUZZLE_OFFSET, 0.0),
            heading: Heading::forward(Side::Navi),
            damage: *damage,
            owner: Side::Navi,
            speed: *speed,
            pierce: *pierce,
            hit_radius: DEFAULT_HIT_RADIUS,
            on_hit: *on_hit,
            shockwave: false,
        }),
        ChipBehavior::Lob {
            damage,
            distance,
            delay,
            splash,
        } => out.push(Command::ScheduleImpact {
            target: lob_target(navi, *distance),
            damage: *damage,
            delay: *delay,
            splash: *splash,
            owner: Side::Navi,
        }),
        ChipBehavior::Inert => {}
    }
}

/// Landing tile of a lob thrown from `navi`, capped at the last column.
#[must_use]
pub fn lob_target(navi: TileCoord, distance: i32) -> TileCoord {
    TileCoord::new(
        navi.column().saturating_add(distance).min(GRID_COLUMNS - 1),
        navi.row(),
    )
}
