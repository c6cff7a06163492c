#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rewards handed out when a battle is won.

use netbattle_core::{Command, DefeatedEnemy, Event, Rewards};
use netbattle_system_loadout::{pool, Rarity};
use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::IteratorRandom,
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;

/// Zenny granted per defeated enemy on top of its maximum HP.
pub const ZENNY_PER_ENEMY: u32 = 20;

/// Chips enemies may drop and their relative weights.
pub const DROPPABLE_CHIPS: [(&str, u32); 15] = [
    ("Cannon", 40),
    ("MiniBomb", 30),
    ("Recover10", 25),
    ("Sword", 20),
    ("HiCannon", 15),
    ("Recover30", 15),
    ("WideSword", 10),
    ("LongSword", 10),
    ("Spreader", 10),
    ("M-Cannon", 5),
    ("Recover50", 5),
    ("FireSword", 3),
    ("AquaSword", 3),
    ("Barrier", 8),
    ("Invis", 2),
];

/// Configuration parameters required to construct the rewards system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    chip_drop_chance: f64,
    equipment_drop_chance: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with explicit drop chances.
    #[must_use]
    pub const fn new(chip_drop_chance: f64, equipment_drop_chance: f64, rng_seed: u64) -> Self {
        Self {
            chip_drop_chance,
            equipment_drop_chance,
            rng_seed,
        }
    }

    /// Standard chances: 4% per enemy for a chip, 3% per battle for equipment.
    #[must_use]
    pub const fn with_seed(rng_seed: u64) -> Self {
        Self::new(0.04, 0.03, rng_seed)
    }
}

/// Zenny earned for a set of defeated enemies.
#[must_use]
pub fn base_zenny(defeated: &[DefeatedEnemy]) -> u32 {
    defeated
        .iter()
        .map(|enemy| ZENNY_PER_ENEMY.saturating_add(u32::try_from(enemy.max_hp).unwrap_or(0)))
        .fold(0, u32::saturating_add)
}

/// Pure system rolling rewards in response to a won battle.
#[derive(Debug)]
pub struct RewardRoller {
    config: Config,
    rng: ChaCha8Rng,
    chip_weights: Option<WeightedIndex<u32>>,
}

impl RewardRoller {
    /// Creates a new rewards system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let chip_weights =
            WeightedIndex::new(DROPPABLE_CHIPS.iter().map(|(_, weight)| *weight)).ok();
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            chip_weights,
        }
    }

    /// Answers a won battle with a reward grant.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::BattleWon { defeated } = event {
                let rewards = self.roll(defeated);
                tracing::info!(
                    zenny = rewards.zenny,
                    chips = rewards.chip_drops.len(),
                    equipment = ?rewards.equipment_drop,
                    "rewards rolled"
                );
                out.push(Command::GrantRewards { rewards });
            }
        }
    }

    /// Rolls the rewards for `defeated`.
    pub fn roll(&mut self, defeated: &[DefeatedEnemy]) -> Rewards {
        let zenny = base_zenny(defeated);
        let chip_drops = defeated
            .iter()
            .filter_map(|_| self.roll_chip())
            .map(str::to_owned)
            .collect();
        let equipment_drop = self.roll_equipment().map(str::to_owned);
        Rewards {
            zenny,
            chip_drops,
            equipment_drop,
        }
    }

    fn roll_chip(&mut self) -> Option<&'static str> {
        if self.rng.gen::<f64>() >= self.config.chip_drop_chance {
            return None;
        }
        let index = self.chip_weights.as_ref()?.sample(&mut self.rng);
        DROPPABLE_CHIPS.get(index).map(|(name, _)| *name)
    }

    fn roll_equipment(&mut self) -> Option<&'static str> {
        if self.rng.gen::<f64>() >= self.config.equipment_drop_chance {
            return None;
        }
        let tier: f64 = self.rng.gen();
        let rarity = if tier < 0.6 {
            Rarity::Common
        } else if tier < 0.9 {
            Rarity::Uncommon
        } else {
            Rarity::Rare
        };
        pool(rarity).choose(&mut self.rng).map(|item| item.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netbattle_core::EnemyId;
    use netbattle_system_loadout::equipment;

    fn defeated(max_hp: i32) -> DefeatedEnemy {
        DefeatedEnemy {
            id: EnemyId::new(0),
            name: "Mettaur".to_owned(),
            max_hp,
            is_boss: false,
        }
    }

    #[test]
    fn zenny_is_twenty_plus_max_hp_per_enemy() {
        assert_eq!(base_zenny(&[defeated(40), defeated(50)]), 130);
        assert_eq!(base_zenny(&[]), 0);
        assert_eq!(base_zenny(&[defeated(-5)]), 20);
    }

    #[test]
    fn zero_chances_never_drop() {
        let mut roller = RewardRoller::new(Config::new(0.0, 0.0, 9));
        for _ in 0..100 {
            let rewards = roller.roll(&[defeated(40), defeated(60)]);
            assert_eq!(rewards.zenny, 140);
            assert!(rewards.chip_drops.is_empty());
            assert!(rewards.equipment_drop.is_none());
        }
    }

    #[test]
    fn certain_drops_come_from_the_tables() {
        let mut roller = RewardRoller::new(Config::new(1.0, 1.0, 9));
        for _ in 0..100 {
            let rewards = roller.roll(&[defeated(40), defeated(60), defeated(35)]);
            assert_eq!(rewards.chip_drops.len(), 3);
            assert!(rewards
                .chip_drops
                .iter()
                .all(|name| DROPPABLE_CHIPS.iter().any(|(chip, _)| *chip == name.as_str())));
            let item = rewards.equipment_drop.expect("equipment drop");
            assert!(equipment(&item).is_some());
        }
    }

    #[test]
    fn battle_won_produces_a_grant() {
        let mut roller = RewardRoller::new(Config::with_seed(5));
        let mut out = Vec::new();
        roller.handle(
            &[
                Event::BattleLost,
                Event::BattleWon {
                    defeated: vec![defeated(40), defeated(50)],
                },
            ],
            &mut out,
        );
        assert_eq!(out.len(), 1);
        let Command::GrantRewards { rewards } = &out[0] else {
            panic!("expected a reward grant, got {:?}", out[0]);
        };
        assert_eq!(rewards.zenny, 130);
    }

    #[test]
    fn same_seed_rolls_the_same_rewards() {
        let enemies: Vec<_> = (0..40).map(|_| defeated(40)).collect();
        let mut first = RewardRoller::new(Config::new(0.5, 0.5, 77));
        let mut second = RewardRoller::new(Config::new(0.5, 0.5, 77));
        for _ in 0..10 {
            assert_eq!(first.roll(&enemies), second.roll(&enemies));
        }
    }
}
