#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for the netbattle engine.
//!
//! The world owns every combatant and in-flight entity of a single battle.
//! It is mutated exclusively through [`apply`] and observed through the
//! [`query`] module. Commands that do not fit the current phase, name an
//! unknown enemy, or exceed a selection limit are dropped without emitting
//! events.

mod combat;
mod entities;

use std::{collections::VecDeque, time::Duration};

use netbattle_core::{
    BattlePhase, BattleRules, Chip, Command, DefeatedEnemy, EnemyId, EnemyTimer, Event, ImpactId,
    NaviStats, ProjectileId, Rewards, Side, Transition, DEFAULT_HIT_RADIUS,
};

use entities::{countdown, Enemy, Impact, Navi, Projectile, Slash};

/// Chip selection state while the custom screen is open.
#[derive(Clone, Debug, Default)]
struct CustomScreen {
    hand: Vec<Chip>,
    selected: Vec<usize>,
    cursor: usize,
}

/// Represents the authoritative state of one battle.
#[derive(Debug)]
pub struct World {
    phase: BattlePhase,
    phase_timer: Duration,
    rules: BattleRules,
    navi: Navi,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    impacts: Vec<Impact>,
    slashes: Vec<Slash>,
    custom_gauge: Duration,
    custom: Option<CustomScreen>,
    chip_queue: VecDeque<Chip>,
    rewards: Option<Rewards>,
    concluded: Option<Transition>,
    next_projectile: u32,
    next_impact: u32,
}

impl World {
    /// Creates an empty world in the intro phase with starter Navi stats.
    ///
    /// A battle only begins once [`Command::ConfigureBattle`] is applied.
    #[must_use]
    pub fn new() -> Self {
        let rules = BattleRules::default();
        Self {
            phase: BattlePhase::Intro,
            phase_timer: rules.intro,
            rules,
            navi: Navi::new(NaviStats::starter()),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            impacts: Vec::new(),
            slashes: Vec::new(),
            custom_gauge: Duration::ZERO,
            custom: None,
            chip_queue: VecDeque::new(),
            rewards: None,
            concluded: None,
            next_projectile: 0,
            next_impact: 0,
        }
    }

    fn enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.enemies
            .iter_mut()
            .find(|candidate| candidate.id == enemy && candidate.alive)
    }

    fn enter_phase(&mut self, phase: BattlePhase, out_events: &mut Vec<Event>) {
        self.phase = phase;
        out_events.push(Event::PhaseChanged { phase });
    }

    fn gauge_full(&self) -> bool {
        self.custom_gauge >= self.rules.custom_gauge_max
    }

    fn advance_battle(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for projectile in &mut self.projectiles {
            if projectile.advance(dt) {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                });
            }
        }

        for impact in &mut self.impacts {
            impact.countdown(dt);
        }

        for slash in &mut self.slashes {
            slash.remaining = slash.remaining.saturating_sub(dt);
        }
        self.slashes.retain(|slash| !slash.remaining.is_zero());

        self.navi.invisibility = self.navi.invisibility.saturating_sub(dt);

        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.alive) {
            enemy.lock_remaining = enemy.lock_remaining.saturating_sub(dt);
            if countdown(&mut enemy.move_timer, dt) {
                out_events.push(Event::EnemyTimerElapsed {
                    enemy: enemy.id,
                    timer: EnemyTimer::Move,
                });
            }
            if countdown(&mut enemy.attack_timer, dt) {
                out_events.push(Event::EnemyTimerElapsed {
                    enemy: enemy.id,
                    timer: EnemyTimer::Attack,
                });
            }
        }

        let filled = Duration::try_from_secs_f32(dt.as_secs_f32() * self.rules.gauge_rate)
            .unwrap_or(Duration::ZERO);
        self.custom_gauge = self
            .custom_gauge
            .saturating_add(filled)
            .min(self.rules.custom_gauge_max);

        out_events.push(Event::TimeAdvanced { dt });
    }

    fn finish(&mut self, phase: BattlePhase, out_events: &mut Vec<Event>) {
        self.projectiles.clear();
        self.impacts.clear();
        self.slashes.clear();
        self.custom = None;
        self.phase_timer = self.rules.result_window;
        self.enter_phase(phase, out_events);
        if phase == BattlePhase::Win {
            let defeated = self
                .enemies
                .iter()
                .map(|enemy| DefeatedEnemy {
                    id: enemy.id,
                    name: enemy.name.clone(),
                    max_hp: enemy.max_hp,
                    is_boss: enemy.is_boss,
                })
                .collect();
            out_events.push(Event::BattleWon { defeated });
        } else {
            out_events.push(Event::BattleLost);
        }
    }

    fn conclude(&mut self, out_events: &mut Vec<Event>) {
        if self.concluded.is_some() {
            return;
        }
        let transition = match self.phase {
            BattlePhase::Win => Transition::ReturnToPrevious,
            BattlePhase::Lose => Transition::ReturnHome,
            BattlePhase::Intro | BattlePhase::Battle | BattlePhase::Custom => return,
        };
        self.phase_timer = Duration::ZERO;
        self.concluded = Some(transition);
        out_events.push(Event::BattleConcluded { transition });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let in_battle = world.phase == BattlePhase::Battle;
    match command {
        Command::ConfigureBattle {
            navi,
            enemies,
            rules,
        } => {
            *world = World::new();
            world.rules = rules;
            world.phase_timer = rules.intro;
            world.navi = Navi::new(navi);
            world.enemies = enemies
                .into_iter()
                .zip(0_u32..)
                .map(|(spawn, id)| Enemy::from_spawn(EnemyId::new(id), spawn))
                .collect();
            world.enter_phase(BattlePhase::Intro, out_events);
        }
        Command::Tick { dt } => match world.phase {
            BattlePhase::Intro => {
                world.phase_timer = world.phase_timer.saturating_sub(dt);
                if world.phase_timer.is_zero() {
                    world.custom_gauge = world.rules.custom_gauge_max;
                    world.enter_phase(BattlePhase::Battle, out_events);
                }
            }
            BattlePhase::Battle => world.advance_battle(dt, out_events),
            BattlePhase::Custom => {}
            BattlePhase::Win | BattlePhase::Lose => {
                world.phase_timer = world.phase_timer.saturating_sub(dt);
                if world.phase_timer.is_zero() {
                    world.conclude(out_events);
                }
            }
        },
        Command::MoveNavi { to } => {
            if !in_battle {
                return;
            }
            let from = world.navi.tile;
            let to = to.clamp_to(Side::Navi);
            if from != to {
                world.navi.tile = to;
                out_events.push(Event::NaviMoved { from, to });
            }
        }
        Command::StepEnemy { enemy, direction } => {
            if !in_battle {
                return;
            }
            let Some(enemy) = world.enemy_mut(enemy) else {
                return;
            };
            if enemy.is_locked() {
                return;
            }
            let from = enemy.tile;
            let to = from.step(direction).clamp_to(Side::Virus);
            if from != to {
                enemy.tile = to;
                out_events.push(Event::EnemyMoved {
                    enemy: enemy.id,
                    from,
                    to,
                });
            }
        }
        Command::ArmEnemyTimer {
            enemy,
            timer,
            duration,
        } => {
            if !in_battle {
                return;
            }
            let Some(enemy) = world.enemy_mut(enemy) else {
                return;
            };
            match timer {
                EnemyTimer::Move => enemy.move_timer = Some(duration),
                EnemyTimer::Attack => {
                    enemy.attack_timer = Some(duration);
                    enemy.lock_remaining = enemy.attack_lock;
                }
            }
        }
        Command::FireProjectile {
            origin,
            heading,
            damage,
            owner,
            speed,
            pierce,
            hit_radius,
            on_hit,
            shockwave,
        } => {
            if !in_battle {
                return;
            }
            let id = ProjectileId::new(world.next_projectile);
            world.next_projectile = world.next_projectile.wrapping_add(1);
            let hit_radius = if hit_radius > 0.0 {
                hit_radius
            } else {
                DEFAULT_HIT_RADIUS
            };
            world.projectiles.push(Projectile {
                id,
                position: origin,
                heading,
                damage,
                owner,
                speed,
                pierce,
                hit_radius,
                on_hit,
                shockwave,
                alive: true,
            });
            out_events.push(Event::ProjectileFired {
                projectile: id,
                owner,
            });
        }
        Command::ScheduleImpact {
            target,
            damage,
            delay,
            splash,
            owner,
        } => {
            if !in_battle {
                return;
            }
            let id = ImpactId::new(world.next_impact);
            world.next_impact = world.next_impact.wrapping_add(1);
            world.impacts.push(Impact {
                id,
                target,
                damage,
                delay_remaining: delay,
                splash,
                owner,
                alive: true,
            });
            out_events.push(Event::ImpactScheduled { impact: id, target });
        }
        Command::StrikeTiles {
            tiles,
            damage,
            owner,
            tint,
        } => {
            if !in_battle {
                return;
            }
            let tiles: Vec<_> = tiles.into_iter().filter(|tile| tile.in_bounds()).collect();
            for tile in &tiles {
                world.strike_tile(*tile, damage, owner, out_events);
            }
            world.slashes.push(Slash {
                tiles: tiles.clone(),
                tint,
                remaining: world.rules.slash_lifetime,
            });
            out_events.push(Event::SlashPerformed { tiles, tint });
        }
        Command::HealNavi { amount } => {
            if !in_battle {
                return;
            }
            let stats = &mut world.navi.stats;
            let before = stats.hp;
            stats.hp = stats.hp.saturating_add(amount.max(0)).min(stats.max_hp).max(before);
            out_events.push(Event::NaviHealed {
                amount: stats.hp - before,
                hp: stats.hp,
            });
        }
        Command::GrantInvisibility { duration } => {
            if !in_battle {
                return;
            }
            world.navi.invisibility = world.navi.invisibility.max(duration);
            out_events.push(Event::InvisibilityGranted {
                remaining: world.navi.invisibility,
            });
        }
        Command::ResolveCollisions => {
            if in_battle {
                world.resolve_collisions(out_events);
            }
        }
        Command::EvaluateOutcome => {
            if !in_battle {
                return;
            }
            if world.enemies.iter().all(|enemy| !enemy.alive) {
                world.finish(BattlePhase::Win, out_events);
            } else if world.navi.stats.hp <= 0 {
                world.finish(BattlePhase::Lose, out_events);
            }
        }
        Command::RequestCustom => {
            if in_battle && world.gauge_full() {
                out_events.push(Event::CustomRequested {
                    hand_size: world.rules.hand_size,
                });
            }
        }
        Command::OpenCustom { hand } => {
            if !in_battle || !world.gauge_full() {
                return;
            }
            world.custom_gauge = Duration::ZERO;
            if hand.is_empty() {
                return;
            }
            let names = hand.iter().map(|chip| chip.name().to_owned()).collect();
            world.custom = Some(CustomScreen {
                hand,
                selected: Vec::new(),
                cursor: 0,
            });
            world.enter_phase(BattlePhase::Custom, out_events);
            out_events.push(Event::CustomOpened { hand: names });
        }
        Command::MoveCursor { offset } => {
            if let Some(screen) = world.custom.as_mut() {
                let last = screen.hand.len().saturating_sub(1);
                let moved = i64::try_from(screen.cursor)
                    .unwrap_or(i64::MAX)
                    .saturating_add(i64::from(offset));
                screen.cursor = usize::try_from(moved.max(0)).unwrap_or(last).min(last);
            }
        }
        Command::ToggleChip { slot } => {
            let limit = world.rules.selection_limit;
            let Some(screen) = world.custom.as_mut() else {
                return;
            };
            if slot >= screen.hand.len() {
                return;
            }
            if let Some(position) = screen.selected.iter().position(|chosen| *chosen == slot) {
                let _ = screen.selected.remove(position);
                out_events.push(Event::ChipToggled {
                    slot,
                    selected: false,
                });
            } else if screen.selected.len() < limit {
                screen.selected.push(slot);
                out_events.push(Event::ChipToggled {
                    slot,
                    selected: true,
                });
            }
        }
        Command::ConfirmCustom => {
            let Some(screen) = world.custom.take() else {
                return;
            };
            world.chip_queue = screen
                .selected
                .iter()
                .filter_map(|slot| screen.hand.get(*slot).cloned())
                .collect();
            let chips = world
                .chip_queue
                .iter()
                .map(|chip| chip.name().to_owned())
                .collect();
            world.enter_phase(BattlePhase::Battle, out_events);
            out_events.push(Event::ChipQueueSet { chips });
        }
        Command::UseQueuedChip => {
            if !in_battle {
                return;
            }
            if let Some(chip) = world.chip_queue.pop_front() {
                out_events.push(Event::ChipActivated {
                    chip,
                    navi: world.navi.tile,
                });
            }
        }
        Command::DismissResult => {
            if world.phase.is_terminal() {
                world.conclude(out_events);
            }
        }
        Command::GrantRewards { rewards } => {
            if world.phase != BattlePhase::Win || world.rewards.is_some() {
                return;
            }
            world.rewards = Some(rewards.clone());
            out_events.push(Event::RewardsGranted { rewards });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use netbattle_core::{
        BattlePhase, BattleRules, BattleSnapshot, CustomSnapshot, EnemySnapshot, EnemyView,
        ImpactSnapshot, NaviSnapshot, ProjectileSnapshot, ProjectileView, Rewards, SlashSnapshot,
        Transition,
    };

    use super::World;

    /// Current phase of the battle.
    #[must_use]
    pub fn phase(world: &World) -> BattlePhase {
        world.phase
    }

    /// Rules the battle was configured with.
    #[must_use]
    pub fn rules(world: &World) -> BattleRules {
        world.rules
    }

    /// Current custom gauge level.
    #[must_use]
    pub fn custom_gauge(world: &World) -> Duration {
        world.custom_gauge
    }

    /// Captures the Navi's position, stats, and invulnerability.
    #[must_use]
    pub fn navi(world: &World) -> NaviSnapshot {
        NaviSnapshot {
            tile: world.navi.tile,
            stats: world.navi.stats,
            invisibility: world.navi.invisibility,
        }
    }

    /// Captures a read-only view of every enemy, alive or deleted.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    name: enemy.name.clone(),
                    tile: enemy.tile,
                    hp: enemy.hp,
                    max_hp: enemy.max_hp,
                    attack: enemy.attack,
                    defense: enemy.defense,
                    is_boss: enemy.is_boss,
                    alive: enemy.alive,
                    attack_style: enemy.attack_style,
                    locked: enemy.is_locked(),
                })
                .collect(),
        )
    }

    /// Captures a read-only view of every live projectile.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .filter(|projectile| projectile.alive)
                .map(|projectile| ProjectileSnapshot {
                    id: projectile.id,
                    position: projectile.position,
                    heading: projectile.heading,
                    damage: projectile.damage,
                    owner: projectile.owner,
                    speed: projectile.speed,
                    pierce: projectile.pierce,
                    hit_radius: projectile.hit_radius,
                    on_hit: projectile.on_hit,
                    shockwave: projectile.shockwave,
                })
                .collect(),
        )
    }

    /// Pending impacts in scheduling order.
    #[must_use]
    pub fn impacts(world: &World) -> Vec<ImpactSnapshot> {
        world
            .impacts
            .iter()
            .filter(|impact| impact.alive)
            .map(|impact| ImpactSnapshot {
                id: impact.id,
                target: impact.target,
                damage: impact.damage,
                delay_remaining: impact.delay_remaining,
                splash: impact.splash,
                owner: impact.owner,
            })
            .collect()
    }

    /// Live slash records in creation order.
    #[must_use]
    pub fn slashes(world: &World) -> Vec<SlashSnapshot> {
        world
            .slashes
            .iter()
            .map(|slash| SlashSnapshot {
                tiles: slash.tiles.clone(),
                tint: slash.tint,
                remaining: slash.remaining,
            })
            .collect()
    }

    /// Names of the queued chips in use order.
    #[must_use]
    pub fn chip_queue(world: &World) -> Vec<String> {
        world
            .chip_queue
            .iter()
            .map(|chip| chip.name().to_owned())
            .collect()
    }

    /// Custom screen state, when it is open.
    #[must_use]
    pub fn custom(world: &World) -> Option<CustomSnapshot> {
        world.custom.as_ref().map(|screen| CustomSnapshot {
            hand: screen
                .hand
                .iter()
                .map(|chip| chip.name().to_owned())
                .collect(),
            selected: screen.selected.clone(),
            cursor: screen.cursor,
        })
    }

    /// Rewards recorded for a won battle.
    #[must_use]
    pub fn rewards(world: &World) -> Option<&Rewards> {
        world.rewards.as_ref()
    }

    /// Transition requested once the result window elapsed.
    #[must_use]
    pub fn concluded(world: &World) -> Option<Transition> {
        world.concluded
    }

    /// Captures the complete battle state.
    #[must_use]
    pub fn snapshot(world: &World) -> BattleSnapshot {
        BattleSnapshot {
            phase: world.phase,
            custom_gauge: world.custom_gauge,
            custom_gauge_max: world.rules.custom_gauge_max,
            navi: navi(world),
            enemies: enemy_view(world).into_vec(),
            projectiles: projectile_view(world).iter().copied().collect(),
            impacts: impacts(world),
            slashes: slashes(world),
            chip_queue: chip_queue(world),
            custom: custom(world),
            rewards: world.rewards.clone(),
            concluded: world.concluded,
        }
    }
}
