#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the battle engine.
//!
//! This crate defines the message surface that connects the session driver,
//! the authoritative battle world, and pure systems. The driver submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

mod chip;
mod grid;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use chip::{
    BehaviorTag, Chip, ChipBehavior, ChipCategory, ChipDefinition, ChipParams, Element, OnHit,
    SlashTint, SplashShape,
};
pub use grid::{
    in_bounds, in_flight_bounds, Direction, Heading, Side, TileCoord, GRID_COLUMNS, GRID_ROWS,
    SIDE_COLUMNS,
};

/// Default half-width of the box used for projectile hit tests, in tiles.
pub const DEFAULT_HIT_RADIUS: f32 = 0.6;

/// Computes the HP lost by a target after defense.
///
/// Every landed hit removes at least one HP regardless of how much defense
/// the target has stacked.
#[must_use]
pub const fn mitigated_damage(raw: i32, defense: i32) -> i32 {
    let reduced = raw.saturating_sub(defense);
    if reduced < 1 {
        1
    } else {
        reduced
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the world into the intro phase of a new battle.
    ConfigureBattle {
        /// Persistent Navi stats entering the battle.
        navi: NaviStats,
        /// Enemies placed on the virus side.
        enemies: Vec<EnemySpawn>,
        /// Timing and selection rules for the battle.
        rules: BattleRules,
    },
    /// Advances entity positions and every countdown by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Relocates the Navi. The destination is clamped to the Navi side.
    MoveNavi {
        /// Requested destination tile.
        to: TileCoord,
    },
    /// Moves an enemy one tile. The result is clamped to the virus side.
    StepEnemy {
        /// Enemy being moved.
        enemy: EnemyId,
        /// Direction of the step.
        direction: Direction,
    },
    /// Re-arms one of an enemy's action timers.
    ArmEnemyTimer {
        /// Enemy owning the timer.
        enemy: EnemyId,
        /// Timer being armed.
        timer: EnemyTimer,
        /// Time until the timer elapses again.
        duration: Duration,
    },
    /// Launches a projectile.
    FireProjectile {
        /// Launch position in grid units.
        origin: Vec2,
        /// Travel direction.
        heading: Heading,
        /// Damage dealt on hit before defense.
        damage: i32,
        /// Side that fired the projectile. It only strikes the opposing side.
        owner: Side,
        /// Travel speed in tiles per second.
        speed: f32,
        /// Whether the projectile survives hits.
        pierce: bool,
        /// Half-width of the hit box in tiles.
        hit_radius: f32,
        /// Secondary effect applied on hit.
        on_hit: OnHit,
        /// Whether the projectile is a ground shockwave rather than a shot.
        shockwave: bool,
    },
    /// Schedules a delayed area impact.
    ScheduleImpact {
        /// Centre tile of the impact.
        target: TileCoord,
        /// Damage dealt to each struck combatant before defense.
        damage: i32,
        /// Delay before the impact resolves.
        delay: Duration,
        /// Footprint around the centre tile.
        splash: SplashShape,
        /// Side that launched the impact. It only strikes the opposing side.
        owner: Side,
    },
    /// Resolves a melee sweep immediately over the provided tiles.
    StrikeTiles {
        /// Absolute tiles swept. Off-grid entries are skipped.
        tiles: Vec<TileCoord>,
        /// Damage dealt to each struck combatant before defense.
        damage: i32,
        /// Side performing the sweep. It only strikes the opposing side.
        owner: Side,
        /// Cosmetic tint of the slash.
        tint: SlashTint,
    },
    /// Restores Navi HP, capped at its maximum.
    HealNavi {
        /// HP restored.
        amount: i32,
    },
    /// Extends the Navi's invulnerability window to at least `duration`.
    GrantInvisibility {
        /// Requested invulnerability window.
        duration: Duration,
    },
    /// Runs hit tests, on-hit effects, and due impacts against the current positions.
    ResolveCollisions,
    /// Checks whether the battle has been won or lost.
    EvaluateOutcome,
    /// Asks to open the custom screen. Ignored unless the gauge is full.
    RequestCustom,
    /// Opens the custom screen with the drawn hand.
    OpenCustom {
        /// Chips drawn from the folder.
        hand: Vec<Chip>,
    },
    /// Moves the custom-screen cursor by the provided number of slots.
    MoveCursor {
        /// Signed slot offset.
        offset: i32,
    },
    /// Selects or deselects the chip in the provided hand slot.
    ToggleChip {
        /// Hand slot index.
        slot: usize,
    },
    /// Closes the custom screen, replacing the chip queue with the selection.
    ConfirmCustom,
    /// Consumes the chip at the head of the queue.
    UseQueuedChip,
    /// Skips the remainder of the win/lose result window.
    DismissResult,
    /// Stores the rewards computed for a won battle.
    GrantRewards {
        /// Rewards earned.
        rewards: Rewards,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the battle entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: BattlePhase,
    },
    /// Reports that an enemy's action timer ran out and awaits re-arming.
    EnemyTimerElapsed {
        /// Enemy owning the timer.
        enemy: EnemyId,
        /// Timer that elapsed.
        timer: EnemyTimer,
    },
    /// Confirms that the Navi changed tiles.
    NaviMoved {
        /// Tile occupied before moving.
        from: TileCoord,
        /// Tile occupied after moving.
        to: TileCoord,
    },
    /// Confirms that an enemy changed tiles.
    EnemyMoved {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Tile occupied before moving.
        from: TileCoord,
        /// Tile occupied after moving.
        to: TileCoord,
    },
    /// Confirms that a projectile entered the battlefield.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Side that fired it.
        owner: Side,
    },
    /// Reports that a projectile left the flight envelope.
    ProjectileExpired {
        /// Projectile that despawned.
        projectile: ProjectileId,
    },
    /// Reports HP lost by the Navi.
    NaviDamaged {
        /// HP removed after defense.
        amount: i32,
        /// HP remaining.
        remaining: i32,
    },
    /// Reports a hit absorbed by the Navi's invulnerability window.
    HitBlocked,
    /// Reports HP lost by an enemy.
    EnemyDamaged {
        /// Enemy that was struck.
        enemy: EnemyId,
        /// HP removed after defense.
        amount: i32,
        /// HP remaining.
        remaining: i32,
    },
    /// Reports that an enemy's HP reached zero.
    EnemyDeleted {
        /// Enemy that was deleted.
        enemy: EnemyId,
    },
    /// Reports that an airshot displaced an enemy.
    EnemyPushed {
        /// Enemy that was pushed.
        enemy: EnemyId,
        /// Tile occupied before the push.
        from: TileCoord,
        /// Tile occupied after the push.
        to: TileCoord,
    },
    /// Confirms that a delayed impact was scheduled.
    ImpactScheduled {
        /// Identifier assigned to the impact.
        impact: ImpactId,
        /// Centre tile of the impact.
        target: TileCoord,
    },
    /// Reports that an impact resolved over its footprint.
    ImpactDetonated {
        /// Impact that resolved.
        impact: ImpactId,
        /// In-bounds tiles covered by the footprint.
        tiles: Vec<TileCoord>,
    },
    /// Reports a melee sweep over the listed in-bounds tiles.
    SlashPerformed {
        /// Tiles swept.
        tiles: Vec<TileCoord>,
        /// Cosmetic tint.
        tint: SlashTint,
    },
    /// Reports HP restored to the Navi.
    NaviHealed {
        /// HP actually restored.
        amount: i32,
        /// HP after healing.
        hp: i32,
    },
    /// Reports the Navi's invulnerability window after a grant.
    InvisibilityGranted {
        /// Remaining invulnerability.
        remaining: Duration,
    },
    /// Asks the folder to draw a hand for the custom screen.
    CustomRequested {
        /// Maximum number of chips to draw.
        hand_size: usize,
    },
    /// Confirms that the custom screen opened.
    CustomOpened {
        /// Names of the chips in the hand.
        hand: Vec<String>,
    },
    /// Reports a selection change on the custom screen.
    ChipToggled {
        /// Hand slot affected.
        slot: usize,
        /// Whether the chip is now selected.
        selected: bool,
    },
    /// Reports the chip queue established when the custom screen closed.
    ChipQueueSet {
        /// Names of the queued chips in use order.
        chips: Vec<String>,
    },
    /// Reports that a queued chip was consumed and must be resolved.
    ChipActivated {
        /// Chip being used.
        chip: Chip,
        /// Tile the Navi occupied when the chip was used.
        navi: TileCoord,
    },
    /// Announces that every enemy was deleted.
    BattleWon {
        /// Enemies that took part in the battle.
        defeated: Vec<DefeatedEnemy>,
    },
    /// Announces that the Navi's HP reached zero.
    BattleLost,
    /// Confirms that rewards were recorded.
    RewardsGranted {
        /// Rewards recorded for the battle.
        rewards: Rewards,
    },
    /// Announces that the result window elapsed and control returns to the caller.
    BattleConcluded {
        /// Where the caller should go next.
        transition: Transition,
    },
}

/// Phase of the battle state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Opening window with no simulation.
    Intro,
    /// Continuous simulation.
    Battle,
    /// Chip selection with the simulation frozen.
    Custom,
    /// Every enemy was deleted.
    Win,
    /// The Navi was deleted.
    Lose,
}

impl BattlePhase {
    /// Reports whether the phase ends the battle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// Where control goes once a battle concludes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// Return to the context that started the battle.
    ReturnToPrevious,
    /// Return to the home context.
    ReturnHome,
}

/// Enemy action timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyTimer {
    /// Movement decision timer.
    Move,
    /// Attack timer.
    Attack,
}

/// Effect an enemy produces when it attacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Straight shot travelling along the enemy's row.
    #[default]
    Straight,
    /// Slower ground shockwave travelling along the enemy's row.
    Shockwave,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
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

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
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

/// Unique identifier assigned to a delayed impact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImpactId(u32);

impl ImpactId {
    /// Creates a new impact identifier with the provided numeric value.
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

/// Persistent Navi stats read into a battle and written back afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaviStats {
    /// Current HP.
    pub hp: i32,
    /// Maximum HP.
    pub max_hp: i32,
    /// Base attack.
    pub attack: i32,
    /// Defense subtracted from incoming damage.
    pub defense: i32,
    /// Damage of each buster shot.
    pub buster_attack: i32,
    /// Buster speed level granted by equipment.
    pub buster_speed: i32,
    /// Buster charge level granted by equipment.
    pub buster_charge: i32,
}

impl NaviStats {
    /// Stats of a freshly created Navi.
    #[must_use]
    pub const fn starter() -> Self {
        Self {
            hp: 100,
            max_hp: 100,
            attack: 10,
            defense: 5,
            buster_attack: 1,
            buster_speed: 0,
            buster_charge: 0,
        }
    }

    /// Fraction of HP remaining in `0.0..=1.0`, or zero when `max_hp` is not positive.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        health_fraction(self.hp, self.max_hp)
    }
}

impl Default for NaviStats {
    fn default() -> Self {
        Self::starter()
    }
}

fn health_fraction(hp: i32, max_hp: i32) -> f32 {
    if max_hp <= 0 {
        return 0.0;
    }
    (hp as f32 / max_hp as f32).clamp(0.0, 1.0)
}

/// Template used to place an enemy when a battle is configured.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySpawn {
    /// Species or boss name.
    pub name: String,
    /// Starting and maximum HP.
    pub hp: i32,
    /// Damage dealt by the enemy's attacks before defense.
    pub attack: i32,
    /// Defense subtracted from incoming damage.
    pub defense: i32,
    /// Starting tile. Clamped to the virus side.
    pub tile: TileCoord,
    /// Whether the enemy is a boss.
    pub is_boss: bool,
    /// Effect produced when the enemy attacks.
    pub attack_style: AttackStyle,
    /// Window after each attack during which the enemy does not move.
    pub attack_lock: Duration,
    /// Time until the first movement decision.
    pub move_in: Duration,
    /// Time until the first attack.
    pub attack_in: Duration,
}

impl EnemySpawn {
    /// Creates a regular enemy with straight shots and one-second timers.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        hp: i32,
        attack: i32,
        defense: i32,
        tile: TileCoord,
    ) -> Self {
        Self {
            name: name.into(),
            hp,
            attack,
            defense,
            tile,
            is_boss: false,
            attack_style: AttackStyle::Straight,
            attack_lock: Duration::ZERO,
            move_in: Duration::from_secs(1),
            attack_in: Duration::from_secs(1),
        }
    }
}

/// Timing and selection rules for a battle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BattleRules {
    /// Length of the intro window.
    pub intro: Duration,
    /// Gauge level at which the custom screen becomes available.
    pub custom_gauge_max: Duration,
    /// Gauge fill rate relative to simulated time.
    pub gauge_rate: f32,
    /// Length of the win/lose result window.
    pub result_window: Duration,
    /// Maximum number of chips drawn for the custom screen.
    pub hand_size: usize,
    /// Maximum number of chips selectable per custom screen.
    pub selection_limit: usize,
    /// Lifetime of a melee slash record.
    pub slash_lifetime: Duration,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            intro: Duration::from_secs(1),
            custom_gauge_max: Duration::from_secs(15),
            gauge_rate: 1.0,
            result_window: Duration::from_millis(2_500),
            hand_size: 5,
            selection_limit: 5,
            slash_lifetime: Duration::from_millis(250),
        }
    }
}

/// Enemy summary handed to reward computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefeatedEnemy {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Species or boss name.
    pub name: String,
    /// Maximum HP.
    pub max_hp: i32,
    /// Whether the enemy was a boss.
    pub is_boss: bool,
}

/// Rewards earned by winning a battle, merged into persistent state by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    /// Currency earned.
    pub zenny: u32,
    /// Names of chips dropped by defeated enemies.
    pub chip_drops: Vec<String>,
    /// Name of the equipment dropped, if any.
    pub equipment_drop: Option<String>,
}

/// Immutable representation of the Navi used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NaviSnapshot {
    /// Tile occupied by the Navi.
    pub tile: TileCoord,
    /// Current stats.
    pub stats: NaviStats,
    /// Remaining invulnerability.
    pub invisibility: Duration,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Species or boss name.
    pub name: String,
    /// Tile occupied by the enemy.
    pub tile: TileCoord,
    /// Current HP.
    pub hp: i32,
    /// Maximum HP.
    pub max_hp: i32,
    /// Damage dealt by the enemy's attacks.
    pub attack: i32,
    /// Defense subtracted from incoming damage.
    pub defense: i32,
    /// Whether the enemy is a boss.
    pub is_boss: bool,
    /// Whether the enemy still participates in the simulation.
    pub alive: bool,
    /// Effect produced when the enemy attacks.
    pub attack_style: AttackStyle,
    /// Whether a post-attack lock currently prevents movement.
    pub locked: bool,
}

impl EnemySnapshot {
    /// Fraction of HP remaining in `0.0..=1.0`, or zero when `max_hp` is not positive.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        health_fraction(self.hp, self.max_hp)
    }
}

/// Read-only snapshot describing all enemies in the battle.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Position in grid units.
    pub position: Vec2,
    /// Travel direction.
    pub heading: Heading,
    /// Damage dealt on hit.
    pub damage: i32,
    /// Side that fired the projectile.
    pub owner: Side,
    /// Travel speed in tiles per second.
    pub speed: f32,
    /// Whether the projectile survives hits.
    pub pierce: bool,
    /// Half-width of the hit box.
    pub hit_radius: f32,
    /// Secondary effect applied on hit.
    pub on_hit: OnHit,
    /// Whether the projectile is a ground shockwave.
    pub shockwave: bool,
}

/// Read-only snapshot describing all live projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a pending impact used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpactSnapshot {
    /// Unique identifier assigned to the impact.
    pub id: ImpactId,
    /// Centre tile.
    pub target: TileCoord,
    /// Damage dealt to each struck combatant.
    pub damage: i32,
    /// Time until the impact resolves.
    pub delay_remaining: Duration,
    /// Footprint around the centre tile.
    pub splash: SplashShape,
    /// Side that launched the impact.
    pub owner: Side,
}

/// Immutable representation of a melee slash record used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct SlashSnapshot {
    /// Tiles swept by the slash.
    pub tiles: Vec<TileCoord>,
    /// Cosmetic tint.
    pub tint: SlashTint,
    /// Time until the record expires.
    pub remaining: Duration,
}

/// Immutable representation of the open custom screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomSnapshot {
    /// Names of the chips in the hand.
    pub hand: Vec<String>,
    /// Selected hand slots in selection order.
    pub selected: Vec<usize>,
    /// Slot under the cursor.
    pub cursor: usize,
}

/// Complete read-only picture of a battle, suitable for presentation and assertions.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleSnapshot {
    /// Current phase.
    pub phase: BattlePhase,
    /// Current custom gauge level.
    pub custom_gauge: Duration,
    /// Gauge level that unlocks the custom screen.
    pub custom_gauge_max: Duration,
    /// Navi state.
    pub navi: NaviSnapshot,
    /// Every enemy, alive or deleted.
    pub enemies: Vec<EnemySnapshot>,
    /// Live projectiles.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Pending impacts.
    pub impacts: Vec<ImpactSnapshot>,
    /// Live slash records.
    pub slashes: Vec<SlashSnapshot>,
    /// Names of queued chips in use order.
    pub chip_queue: Vec<String>,
    /// Custom screen state while it is open.
    pub custom: Option<CustomSnapshot>,
    /// Rewards recorded for a won battle.
    pub rewards: Option<Rewards>,
    /// Transition requested once the result window elapsed.
    pub concluded: Option<Transition>,
}

impl BattleSnapshot {
    /// Reports whether the custom gauge is full.
    #[must_use]
    pub fn gauge_full(&self) -> bool {
        self.custom_gauge >= self.custom_gauge_max
    }
}
