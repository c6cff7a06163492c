#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Equipment, CP budget, and the persistent player profile.
//!
//! Equipment raises Navi stats while equipped. Each item costs CP and the sum
//! of equipped costs may not exceed the loadout's CP budget. Bonuses are
//! re-applied onto the Navi's stats before every battle.

use std::collections::BTreeMap;

use netbattle_core::{NaviStats, Rewards};
use netbattle_system_chip_behavior::ChipLibrary;
use netbattle_system_folder::{ChipFolder, FolderError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum HP of a Navi without equipment.
pub const BASE_MAX_HP: i32 = 100;
/// Buster damage without equipment.
pub const BASE_BUSTER_ATTACK: i32 = 1;
/// CP budget of a new loadout.
pub const DEFAULT_MAX_CP: u32 = 10;
/// Extra custom gauge fill rate granted per custom gauge level.
///
/// Tuning choice: each level halves the wait for the custom screen relative
/// to the base rate of one.
pub const GAUGE_RATE_PER_LEVEL: f32 = 0.5;

/// Drop rarity tier of an equipment item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Most frequent drops.
    Common,
    /// Middle tier.
    Uncommon,
    /// Least frequent drops.
    Rare,
}

/// Numeric stat an equipment item raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Buster damage.
    Attack,
    /// Maximum HP.
    MaxHp,
    /// Buster speed level.
    BusterSpeed,
    /// Buster charge level.
    ChargeSpeed,
    /// Custom gauge fill level.
    CustomGauge,
    /// Damage reduction.
    Defense,
}

/// What an equipment item does while equipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Adds `amount` to a numeric stat.
    Raise {
        /// Stat raised.
        stat: Stat,
        /// Amount added.
        amount: i32,
    },
    /// Grants a named ability flag.
    Special(&'static str),
}

/// Entry of the equipment catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Equipment {
    /// Display and lookup name.
    pub name: &'static str,
    /// CP consumed while equipped.
    pub cost: u32,
    /// Effect while equipped.
    pub effect: Effect,
    /// Drop tier.
    pub rarity: Rarity,
}

const fn raise(
    name: &'static str,
    cost: u32,
    stat: Stat,
    amount: i32,
    rarity: Rarity,
) -> Equipment {
    Equipment {
        name,
        cost,
        effect: Effect::Raise { stat, amount },
        rarity,
    }
}

/// Every equipment item in the game, in catalogue order.
pub static CATALOGUE: [Equipment; 9] = [
    raise("ATK+1", 2, Stat::Attack, 1, Rarity::Common),
    raise("HP+50", 3, Stat::MaxHp, 50, Rarity::Common),
    raise("Speed+1", 2, Stat::BusterSpeed, 1, Rarity::Common),
    raise("Charge+1", 3, Stat::ChargeSpeed, 1, Rarity::Uncommon),
    raise("Custom+1", 3, Stat::CustomGauge, 1, Rarity::Uncommon),
    raise("Shield", 4, Stat::Defense, 2, Rarity::Uncommon),
    Equipment {
        name: "Float",
        cost: 5,
        effect: Effect::Special("float"),
        rarity: Rarity::Rare,
    },
    Equipment {
        name: "SuperArmor",
        cost: 6,
        effect: Effect::Special("no_flinch"),
        rarity: Rarity::Rare,
    },
    raise("BusterPack", 5, Stat::Attack, 3, Rarity::Rare),
];

/// Looks up a catalogue entry by name.
#[must_use]
pub fn equipment(name: &str) -> Option<&'static Equipment> {
    CATALOGUE.iter().find(|item| item.name == name)
}

/// Catalogue entries of the given rarity, in catalogue order.
pub fn pool(rarity: Rarity) -> impl Iterator<Item = &'static Equipment> {
    CATALOGUE.iter().filter(move |item| item.rarity == rarity)
}

/// Reasons a loadout change is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadoutError {
    /// The name is not in the catalogue.
    #[error("unknown equipment `{name}`")]
    Unknown {
        /// Requested name.
        name: String,
    },
    /// The player owns no copy of the item.
    #[error("`{name}` is not owned")]
    NotOwned {
        /// Requested name.
        name: String,
    },
    /// The item is already equipped.
    #[error("`{name}` is already equipped")]
    AlreadyEquipped {
        /// Requested name.
        name: String,
    },
    /// Equipping the item would exceed the CP budget.
    #[error("`{name}` needs {cost} CP but only {available} CP are free")]
    OverBudget {
        /// Requested name.
        name: String,
        /// CP the item costs.
        cost: u32,
        /// CP still unused.
        available: u32,
    },
}

/// Summed effect of every equipped item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatBonuses {
    /// Buster damage bonus.
    pub attack: i32,
    /// Maximum HP bonus.
    pub max_hp: i32,
    /// Buster speed levels.
    pub buster_speed: i32,
    /// Buster charge levels.
    pub charge_speed: i32,
    /// Custom gauge levels.
    pub custom_gauge: i32,
    /// Defense bonus.
    pub defense: i32,
    /// Ability flags granted by special items.
    pub specials: Vec<&'static str>,
}

impl StatBonuses {
    fn add(&mut self, effect: Effect) {
        match effect {
            Effect::Raise { stat, amount } => {
                let slot = match stat {
                    Stat::Attack => &mut self.attack,
                    Stat::MaxHp => &mut self.max_hp,
                    Stat::BusterSpeed => &mut self.buster_speed,
                    Stat::ChargeSpeed => &mut self.charge_speed,
                    Stat::CustomGauge => &mut self.custom_gauge,
                    Stat::Defense => &mut self.defense,
                };
                *slot += amount;
            }
            Effect::Special(flag) => {
                if !self.specials.contains(&flag) {
                    self.specials.push(flag);
                }
            }
        }
    }

    /// Custom gauge fill rate multiplier these bonuses give.
    #[must_use]
    pub fn gauge_rate(&self) -> f32 {
        1.0 + GAUGE_RATE_PER_LEVEL * self.custom_gauge as f32
    }
}

/// Rewrites `stats` from base values plus `bonuses`.
///
/// Current HP keeps its proportion of maximum HP. A Navi with no previous
/// maximum starts at full health.
pub fn apply_bonuses(stats: &mut NaviStats, base_defense: i32, bonuses: &StatBonuses) {
    let max_hp = (BASE_MAX_HP + bonuses.max_hp).max(1);
    stats.hp = if stats.max_hp > 0 {
        let scaled = i64::from(stats.hp) * i64::from(max_hp) / i64::from(stats.max_hp);
        i32::try_from(scaled).unwrap_or(max_hp).clamp(0, max_hp)
    } else {
        max_hp
    };
    stats.max_hp = max_hp;
    stats.buster_attack = BASE_BUSTER_ATTACK + bonuses.attack;
    stats.defense = base_defense + bonuses.defense;
    stats.buster_speed = bonuses.buster_speed;
    stats.buster_charge = bonuses.charge_speed;
}

/// Owned and equipped equipment under a CP budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    owned: BTreeMap<String, u32>,
    equipped: Vec<String>,
    max_cp: u32,
}

impl Loadout {
    /// Creates an empty loadout with the given CP budget.
    #[must_use]
    pub fn new(max_cp: u32) -> Self {
        Self {
            owned: BTreeMap::new(),
            equipped: Vec::new(),
            max_cp,
        }
    }

    /// Loadout of a new player: two ATK+1 and one HP+50 owned, one ATK+1 equipped.
    #[must_use]
    pub fn starter() -> Self {
        let mut loadout = Self::new(DEFAULT_MAX_CP);
        let _ = loadout.owned.insert("ATK+1".to_owned(), 2);
        let _ = loadout.owned.insert("HP+50".to_owned(), 1);
        loadout.equipped.push("ATK+1".to_owned());
        loadout
    }

    /// Adds one owned copy of a catalogue item.
    pub fn acquire(&mut self, name: &str) -> Result<(), LoadoutError> {
        let item = equipment(name).ok_or_else(|| LoadoutError::Unknown {
            name: name.to_owned(),
        })?;
        *self.owned.entry(item.name.to_owned()).or_insert(0) += 1;
        Ok(())
    }

    /// Number of owned copies of `name`.
    #[must_use]
    pub fn owned(&self, name: &str) -> u32 {
        self.owned.get(name).copied().unwrap_or(0)
    }

    /// Names of equipped items in equip order.
    #[must_use]
    pub fn equipped(&self) -> &[String] {
        &self.equipped
    }

    /// Reports whether `name` is equipped.
    #[must_use]
    pub fn is_equipped(&self, name: &str) -> bool {
        self.equipped.iter().any(|equipped| equipped == name)
    }

    /// CP budget.
    #[must_use]
    pub const fn max_cp(&self) -> u32 {
        self.max_cp
    }

    /// CP consumed by equipped items.
    #[must_use]
    pub fn used_cp(&self) -> u32 {
        self.equipped
            .iter()
            .filter_map(|name| equipment(name))
            .map(|item| item.cost)
            .sum()
    }

    /// Checks whether `name` could be equipped right now.
    pub fn can_equip(&self, name: &str) -> Result<&'static Equipment, LoadoutError> {
        let item = equipment(name).ok_or_else(|| LoadoutError::Unknown {
            name: name.to_owned(),
        })?;
        if self.owned(name) == 0 {
            return Err(LoadoutError::NotOwned {
                name: name.to_owned(),
            });
        }
        if self.is_equipped(name) {
            return Err(LoadoutError::AlreadyEquipped {
                name: name.to_owned(),
            });
        }
        let available = self.max_cp.saturating_sub(self.used_cp());
        if item.cost > available {
            return Err(LoadoutError::OverBudget {
                name: name.to_owned(),
                cost: item.cost,
                available,
            });
        }
        Ok(item)
    }

    /// Equips `name` if ownership and CP allow.
    pub fn equip(&mut self, name: &str) -> Result<(), LoadoutError> {
        let item = self.can_equip(name)?;
        self.equipped.push(item.name.to_owned());
        tracing::debug!(item = item.name, used_cp = self.used_cp(), "equipment equipped");
        Ok(())
    }

    /// Unequips `name`, reporting whether it was equipped.
    pub fn unequip(&mut self, name: &str) -> bool {
        let before = self.equipped.len();
        self.equipped.retain(|equipped| equipped != name);
        before != self.equipped.len()
    }

    /// Sums the effects of every equipped item.
    #[must_use]
    pub fn bonuses(&self) -> StatBonuses {
        let mut bonuses = StatBonuses::default();
        for item in self.equipped.iter().filter_map(|name| equipment(name)) {
            bonuses.add(item.effect);
        }
        bonuses
    }
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CP)
    }
}

/// Persistent player state carried between battles.
#[derive(Clone, Debug)]
pub struct Profile {
    /// Navi stats as they stand after the last battle.
    pub navi: NaviStats,
    /// Defense before equipment.
    pub base_defense: i32,
    /// Currency.
    pub zenny: u64,
    /// Chip deck.
    pub folder: ChipFolder,
    /// Equipment.
    pub loadout: Loadout,
}

impl Profile {
    /// Profile of a new player.
    pub fn starter(library: &ChipLibrary) -> Result<Self, FolderError> {
        let navi = NaviStats::starter();
        Ok(Self {
            navi,
            base_defense: navi.defense,
            zenny: 0,
            folder: ChipFolder::starter(library)?,
            loadout: Loadout::starter(),
        })
    }

    /// Re-applies equipment onto the Navi and returns the stats to battle with.
    pub fn battle_stats(&mut self) -> NaviStats {
        apply_bonuses(&mut self.navi, self.base_defense, &self.loadout.bonuses());
        self.navi
    }

    /// Custom gauge fill rate from equipped items.
    #[must_use]
    pub fn gauge_rate(&self) -> f32 {
        self.loadout.bonuses().gauge_rate()
    }

    /// Merges battle rewards. Returns the names of chip drops that did not fit.
    pub fn merge_rewards(&mut self, rewards: &Rewards, library: &ChipLibrary) -> Vec<String> {
        self.zenny += u64::from(rewards.zenny);

        let mut rejected = Vec::new();
        for name in &rewards.chip_drops {
            if let Err(error) = self.folder.add(library, name) {
                tracing::warn!(chip = %name, %error, "chip drop not added to folder");
                rejected.push(name.clone());
            }
        }

        if let Some(name) = &rewards.equipment_drop {
            if let Err(error) = self.loadout.acquire(name) {
                tracing::warn!(item = %name, %error, "equipment drop ignored");
            }
        }
        rejected
    }
}
