#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Encounter generation for random virus battles and boss fights.

use std::time::Duration;

use netbattle_core::{AttackStyle, EnemySpawn, TileCoord};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Stat template of a virus species.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirusTemplate {
    /// Species name.
    pub name: &'static str,
    /// Maximum HP.
    pub hp: i32,
    /// Attack damage.
    pub attack: i32,
    /// Defense.
    pub defense: i32,
    /// Attack effect used by the species.
    pub attack_style: AttackStyle,
}

/// Species that appear in random encounters.
pub const VIRUS_TEMPLATES: [VirusTemplate; 5] = [
    VirusTemplate {
        name: "Mettaur",
        hp: 40,
        attack: 10,
        defense: 2,
        attack_style: AttackStyle::Shockwave,
    },
    VirusTemplate {
        name: "Spikey",
        hp: 50,
        attack: 12,
        defense: 1,
        attack_style: AttackStyle::Straight,
    },
    VirusTemplate {
        name: "Bunny",
        hp: 35,
        attack: 15,
        defense: 0,
        attack_style: AttackStyle::Straight,
    },
    VirusTemplate {
        name: "Fishy",
        hp: 45,
        attack: 14,
        defense: 2,
        attack_style: AttackStyle::Straight,
    },
    VirusTemplate {
        name: "Canodumb",
        hp: 60,
        attack: 8,
        defense: 4,
        attack_style: AttackStyle::Straight,
    },
];

/// Candidate spawn tiles for random encounters.
pub const SPAWN_TILES: [TileCoord; 5] = [
    TileCoord::new(4, 0),
    TileCoord::new(5, 1),
    TileCoord::new(4, 2),
    TileCoord::new(5, 0),
    TileCoord::new(5, 2),
];

/// Tile a boss starts on.
pub const BOSS_TILE: TileCoord = TileCoord::new(4, 1);

/// Window after each boss attack during which the boss holds still.
pub const BOSS_ATTACK_LOCK: Duration = Duration::from_millis(400);

/// Stats of a boss encounter. Every field may be overridden by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BossOverride {
    /// Boss name.
    pub name: String,
    /// Maximum HP.
    pub hp: i32,
    /// Attack damage.
    pub attack: i32,
    /// Defense.
    pub defense: i32,
}

impl Default for BossOverride {
    fn default() -> Self {
        Self {
            name: "BossVirus".to_owned(),
            hp: 120,
            attack: 20,
            defense: 5,
        }
    }
}

/// Seeded encounter generator.
#[derive(Debug)]
pub struct Roster {
    rng: ChaCha8Rng,
}

impl Roster {
    /// Creates a generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Rolls a random encounter of one to three viruses.
    pub fn encounter(&mut self) -> Vec<EnemySpawn> {
        let roll: f64 = self.rng.gen();
        let count = if roll < 0.5 {
            1
        } else if roll < 0.85 {
            2
        } else {
            3
        };

        let mut tiles = SPAWN_TILES;
        tiles.shuffle(&mut self.rng);

        tiles
            .into_iter()
            .take(count)
            .map(|tile| {
                let template = VIRUS_TEMPLATES[self.rng.gen_range(0..VIRUS_TEMPLATES.len())];
                let mut spawn = EnemySpawn::new(
                    template.name,
                    template.hp,
                    template.attack,
                    template.defense,
                    tile,
                );
                spawn.attack_style = template.attack_style;
                self.stagger(spawn)
            })
            .collect()
    }

    /// Builds a single-boss encounter.
    pub fn boss(&mut self, boss: &BossOverride) -> Vec<EnemySpawn> {
        let mut spawn = EnemySpawn::new(
            boss.name.clone(),
            boss.hp,
            boss.attack,
            boss.defense,
            BOSS_TILE,
        );
        spawn.is_boss = true;
        spawn.attack_lock = BOSS_ATTACK_LOCK;
        vec![self.stagger(spawn)]
    }

    fn stagger(&mut self, mut spawn: EnemySpawn) -> EnemySpawn {
        spawn.attack_in = Duration::from_secs_f64(self.rng.gen_range(0.5..=1.5));
        spawn.move_in = Duration::from_secs_f64(self.rng.gen_range(0.3..=0.8));
        spawn
    }
}
