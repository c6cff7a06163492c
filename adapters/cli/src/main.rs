#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs seeded battles headlessly.

mod player;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use netbattle_core::{BattleRules, Transition};
use netbattle_session::{BattleReport, BattleSession, Setup};
use netbattle_system_chip_behavior::ChipLibrary;
use netbattle_system_folder::ChipFolder;
use netbattle_system_loadout::{Loadout, Profile};
use netbattle_system_roster::{BossOverride, Roster};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::player::ScriptedPlayer;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "netbattle", about = "Runs grid battles with a scripted player")]
struct Cli {
    /// Seed for encounters and every battle system.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of battles to fight in sequence.
    #[arg(long, default_value_t = 1)]
    battles: u32,
    /// Fight the boss instead of random viruses.
    #[arg(long)]
    boss: bool,
    /// TOML chip library replacing the built-in one.
    #[arg(long, value_name = "TOML")]
    chips: Option<PathBuf>,
    /// Comma-separated chip names replacing the starter folder.
    #[arg(long, value_delimiter = ',')]
    folder: Vec<String>,
    /// Simulation step in milliseconds.
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,
    /// Simulated seconds after which an undecided battle is abandoned.
    #[arg(long, default_value_t = 300)]
    time_limit_s: u64,
    /// Print the run summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Everything that happened during a run.
#[derive(Debug, Serialize)]
struct RunSummary {
    battles: Vec<BattleReport>,
    zenny: u64,
    folder: Vec<String>,
    loadout: Loadout,
}

/// Entry point for the battle command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let library = load_library(cli.chips.as_ref())?;
    let mut profile = Profile::starter(&library).context("failed to build starter profile")?;
    if !cli.folder.is_empty() {
        profile.folder = ChipFolder::new();
        for name in &cli.folder {
            profile
                .folder
                .add(&library, name.trim())
                .with_context(|| format!("failed to add `{name}` to the folder"))?;
        }
    }

    let dt = Duration::from_millis(cli.dt_ms.max(1));
    let max_frames = cli.time_limit_s.saturating_mul(1_000) / dt.as_millis().max(1) as u64;
    let mut roster = Roster::new(cli.seed);
    let mut reports = Vec::new();

    for battle in 0..cli.battles {
        let enemies = if cli.boss {
            roster.boss(&BossOverride::default())
        } else {
            roster.encounter()
        };
        let rules = BattleRules {
            gauge_rate: profile.gauge_rate(),
            ..BattleRules::default()
        };
        let mut session = BattleSession::new(Setup {
            navi: profile.battle_stats(),
            enemies,
            rules,
            folder: profile.folder.clone(),
            seed: cli.seed.wrapping_add(u64::from(battle)),
        });

        let Some(report) = fight(&mut session, dt, max_frames, rules.selection_limit) else {
            tracing::warn!(battle, "battle undecided within the time limit");
            break;
        };

        profile.navi = report.navi;
        let rejected = profile.merge_rewards(&report.rewards, &library);
        if !rejected.is_empty() {
            tracing::info!(?rejected, "folder full");
        }
        let deleted = report.transition == Transition::ReturnHome;
        if !cli.json {
            print_report(battle, &report);
        }
        reports.push(report);
        if deleted {
            tracing::info!(battle, "navi deleted, ending run");
            break;
        }
    }

    let summary = RunSummary {
        battles: reports,
        zenny: profile.zenny,
        folder: profile.folder.names(),
        loadout: profile.loadout,
    };
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode run summary")?
        );
    } else {
        println!(
            "{} battle(s), {} zenny, {} chip(s) in folder",
            summary.battles.len(),
            summary.zenny,
            summary.folder.len()
        );
    }
    Ok(())
}

fn load_library(path: Option<&PathBuf>) -> Result<ChipLibrary> {
    let Some(path) = path else {
        return ChipLibrary::builtin().context("built-in chip library is invalid");
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read chip library {}", path.display()))?;
    ChipLibrary::from_toml(&text)
        .with_context(|| format!("failed to parse chip library {}", path.display()))
}

fn fight(
    session: &mut BattleSession,
    dt: Duration,
    max_frames: u64,
    selection_limit: usize,
) -> Option<BattleReport> {
    let mut player = ScriptedPlayer::new();
    for _ in 0..max_frames {
        session.update(dt);
        for button in player.buttons(&session.snapshot(), selection_limit) {
            session.press(button);
        }
        if let Some(report) = session.report() {
            return Some(report.clone());
        }
    }
    None
}

fn print_report(battle: u32, report: &BattleReport) {
    println!(
        "battle {}: {:?} with {}/{} HP, {} zenny, chips {:?}, equipment {}",
        battle + 1,
        report.outcome,
        report.navi.hp,
        report.navi.max_hp,
        report.rewards.zenny,
        report.rewards.chip_drops,
        report.rewards.equipment_drop.as_deref().unwrap_or("none"),
    );
}
