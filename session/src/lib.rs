#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Battle session driving the world and every system in tick order.
//!
//! Each [`BattleSession::update`] runs one simulation tick:
//!
//! 1. `Tick` advances time in the world.
//! 2. Controllers and chip systems react to the resulting events.
//! 3. `ResolveCollisions` settles hits and detonations.
//! 4. `EvaluateOutcome` checks for a win or a loss, and the rewards system
//!    answers a win.
//!
//! Every batch of events is fed back through the systems until none of them
//! has anything left to say.

use std::time::Duration;

use netbattle_core::{
    BattlePhase, BattleRules, BattleSnapshot, Command, EnemySpawn, Event, NaviStats, Rewards,
    Transition,
};
use netbattle_system_autopilot::{self as autopilot, Autopilot};
use netbattle_system_chip_behavior::ChipResolver;
use netbattle_system_folder::{ChipFolder, Dealer};
use netbattle_system_rewards::{self as rewards, RewardRoller};
use netbattle_system_virus_ai::{self as virus_ai, VirusAi};
use netbattle_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Logical input buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// Open the custom screen, toggle a chip, or dismiss a result.
    Confirm,
    /// Use the next queued chip, or close the custom screen.
    Cancel,
    /// Move the custom cursor left.
    Left,
    /// Move the custom cursor right.
    Right,
    /// Close the custom screen.
    Start,
}

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every enemy was deleted.
    Won,
    /// The Navi ran out of HP.
    Lost,
}

/// Summary of a concluded battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BattleReport {
    /// How the battle ended.
    pub outcome: Outcome,
    /// Navi stats at the end of the battle.
    pub navi: NaviStats,
    /// Rewards earned, empty after a loss.
    pub rewards: Rewards,
    /// Where control goes next.
    pub transition: Transition,
}

/// Everything needed to start a battle.
#[derive(Clone, Debug, Default)]
pub struct Setup {
    /// Navi stats entering the battle.
    pub navi: NaviStats,
    /// Enemies to spawn.
    pub enemies: Vec<EnemySpawn>,
    /// Battle tuning.
    pub rules: BattleRules,
    /// Folder hands are dealt from.
    pub folder: ChipFolder,
    /// Seed every system's generator is derived from.
    pub seed: u64,
}

/// A single battle with its world and systems.
#[derive(Debug)]
pub struct BattleSession {
    world: World,
    autopilot: Autopilot,
    virus_ai: VirusAi,
    resolver: ChipResolver,
    dealer: Dealer,
    rewards: RewardRoller,
    recent_events: Vec<Event>,
    report: Option<BattleReport>,
}

impl BattleSession {
    /// Configures a new battle from `setup`.
    #[must_use]
    pub fn new(setup: Setup) -> Self {
        let mut seeds = ChaCha8Rng::seed_from_u64(setup.seed);
        let mut session = Self {
            world: World::new(),
            autopilot: Autopilot::new(autopilot::Config::with_seed(seeds.gen())),
            virus_ai: VirusAi::new(virus_ai::Config::with_seed(seeds.gen())),
            resolver: ChipResolver::new(),
            dealer: Dealer::new(setup.folder, seeds.gen()),
            rewards: RewardRoller::new(rewards::Config::with_seed(seeds.gen())),
            recent_events: Vec::new(),
            report: None,
        };
        tracing::debug!(
            enemies = setup.enemies.len(),
            seed = setup.seed,
            "battle configured"
        );
        session.run(Command::ConfigureBattle {
            navi: setup.navi,
            enemies: setup.enemies,
            rules: setup.rules,
        });
        session
    }

    /// Advances the battle by `dt`.
    pub fn update(&mut self, dt: Duration) {
        self.recent_events.clear();
        self.run(Command::Tick { dt });
        self.run(Command::ResolveCollisions);
        self.run(Command::EvaluateOutcome);
        self.refresh_report();
    }

    /// Routes a button press according to the current phase.
    pub fn press(&mut self, button: Button) {
        self.recent_events.clear();
        let command = match (query::phase(&self.world), button) {
            (BattlePhase::Battle, Button::Confirm) => Some(Command::RequestCustom),
            (BattlePhase::Battle, Button::Cancel) => Some(Command::UseQueuedChip),
            (BattlePhase::Custom, Button::Left) => Some(Command::MoveCursor { offset: -1 }),
            (BattlePhase::Custom, Button::Right) => Some(Command::MoveCursor { offset: 1 }),
            (BattlePhase::Custom, Button::Confirm) => {
                query::custom(&self.world).map(|custom| Command::ToggleChip {
                    slot: custom.cursor,
                })
            }
            (BattlePhase::Custom, Button::Cancel | Button::Start) => Some(Command::ConfirmCustom),
            (BattlePhase::Win | BattlePhase::Lose, Button::Confirm) => Some(Command::DismissResult),
            _ => None,
        };
        if let Some(command) = command {
            self.run(command);
        }
        self.refresh_report();
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> BattlePhase {
        query::phase(&self.world)
    }

    /// Captures the complete battle state.
    #[must_use]
    pub fn snapshot(&self) -> BattleSnapshot {
        query::snapshot(&self.world)
    }

    /// Events produced by the most recent update or button press.
    #[must_use]
    pub fn recent_events(&self) -> &[Event] {
        &self.recent_events
    }

    /// Report of the battle once it has concluded.
    #[must_use]
    pub fn report(&self) -> Option<&BattleReport> {
        self.report.as_ref()
    }

    /// Read access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn run(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        while !events.is_empty() {
            self.record(&events);

            let navi = query::navi(&self.world);
            let mut commands = Vec::new();
            self.autopilot.handle(
                &events,
                &navi,
                &query::projectile_view(&self.world),
                &mut commands,
            );
            self.virus_ai.handle(
                &events,
                &navi,
                &query::enemy_view(&self.world),
                &mut commands,
            );
            self.resolver.handle(&events, &mut commands);
            self.dealer.handle(&events, &mut commands);
            self.rewards.handle(&events, &mut commands);

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            if let Event::PhaseChanged { phase } = event {
                tracing::debug!(?phase, "phase changed");
            }
        }
        self.recent_events.extend_from_slice(events);
    }

    fn refresh_report(&mut self) {
        if self.report.is_some() {
            return;
        }
        let Some(transition) = query::concluded(&self.world) else {
            return;
        };
        let outcome = match transition {
            Transition::ReturnToPrevious => Outcome::Won,
            Transition::ReturnHome => Outcome::Lost,
        };
        let report = BattleReport {
            outcome,
            navi: query::navi(&self.world).stats,
            rewards: query::rewards(&self.world).cloned().unwrap_or_default(),
            transition,
        };
        tracing::info!(
            ?outcome,
            hp = report.navi.hp,
            zenny = report.rewards.zenny,
            "battle concluded"
        );
        self.report = Some(report);
    }
}
