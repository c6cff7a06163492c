use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::TileCoord;

/// Broad family a chip belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipCategory {
    /// Ranged attacks: shots, spreaders, bombs.
    Attack,
    /// Instant HP restoration.
    Heal,
    /// Defensive utility such as barriers and invisibility.
    Defense,
    /// Single-tile melee strike.
    Sword,
    /// Melee strike covering the whole column in front.
    WideSword,
    /// Melee strike reaching two tiles forward.
    LongSword,
    /// Category not understood by this engine; using the chip has no effect.
    #[serde(other)]
    Unknown,
}

impl ChipCategory {
    /// Relative `(columns, rows)` offsets struck by melee categories.
    ///
    /// Non-melee categories have an empty pattern.
    #[must_use]
    pub const fn range_pattern(self) -> &'static [(i32, i32)] {
        match self {
            Self::Sword => &[(1, 0)],
            Self::WideSword => &[(1, -1), (1, 0), (1, 1)],
            Self::LongSword => &[(1, 0), (2, 0)],
            Self::Attack | Self::Heal | Self::Defense | Self::Unknown => &[],
        }
    }

    /// Reports whether the category resolves as a melee sweep.
    #[must_use]
    pub const fn is_melee(self) -> bool {
        matches!(self, Self::Sword | Self::WideSword | Self::LongSword)
    }
}

/// Elemental affinity carried by a chip. Purely informational for now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// Fire element.
    Fire,
    /// Aqua element.
    Aqua,
    /// Electric element.
    Elec,
    /// Wood element.
    Wood,
    /// No element.
    #[default]
    #[serde(other)]
    Null,
}

/// Explicit behaviour tag authored on a chip definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorTag {
    /// Shot that splashes behind and diagonally behind the struck target.
    Spreader,
    /// Shot that also hits the tile directly behind the struck target.
    Shotgun,
    /// Shot that pushes the struck target back.
    AirShot,
    /// Lobbed attack landing on a tile after a delay.
    Lob,
    /// Timed invulnerability for the Navi.
    #[serde(alias = "buff_invis")]
    Invis,
    /// Straight shot. Unrecognised tags also land here.
    #[serde(other)]
    Projectile,
}

/// Footprint of an area-of-effect impact around its centre tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplashShape {
    /// No splash; only the centre tile is struck.
    #[default]
    None,
    /// Only the centre tile is struck.
    Single,
    /// Centre plus the four orthogonal neighbours.
    Cross1,
    /// Centre plus orthogonal tiles up to two away.
    Cross2,
    /// The 3x3 block around the centre.
    Square1,
}

impl SplashShape {
    /// Tiles covered by the shape around `center`, in a stable order without duplicates.
    ///
    /// Off-grid tiles are included; callers bounds-check each entry.
    #[must_use]
    pub fn footprint(self, center: TileCoord) -> Vec<TileCoord> {
        let mut tiles = vec![center];
        match self {
            Self::None | Self::Single => {}
            Self::Cross1 => push_cross(&mut tiles, center, 1),
            Self::Cross2 => {
                push_cross(&mut tiles, center, 1);
                push_cross(&mut tiles, center, 2);
            }
            Self::Square1 => {
                for columns in -1..=1 {
                    for rows in -1..=1 {
                        let tile = center.offset(columns, rows);
                        if !tiles.contains(&tile) {
                            tiles.push(tile);
                        }
                    }
                }
            }
        }
        tiles
    }
}

fn push_cross(tiles: &mut Vec<TileCoord>, center: TileCoord, reach: i32) {
    tiles.extend([
        center.offset(-reach, 0),
        center.offset(reach, 0),
        center.offset(0, -reach),
        center.offset(0, reach),
    ]);
}

/// Optional per-chip overrides accompanying an explicit behaviour tag.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipParams {
    /// Lob travel distance in tiles.
    pub dist: Option<i32>,
    /// Lob landing delay in seconds.
    pub delay: Option<f32>,
    /// Lob splash footprint.
    pub splash: Option<SplashShape>,
    /// Whether spreader splashes also strike the diagonals behind the target.
    pub diagonals: Option<bool>,
    /// Airshot push distance in columns.
    pub push: Option<i32>,
    /// Projectile speed in tiles per second.
    pub speed: Option<f32>,
    /// Whether the projectile survives hits.
    pub pierce: Option<bool>,
    /// Invisibility duration in seconds.
    pub duration: Option<f32>,
}

/// Authored chip content as it appears in a chip library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChipDefinition {
    /// Display name. Also the content key and the behaviour inference input.
    pub name: String,
    /// Chip family.
    pub category: ChipCategory,
    /// Damage or heal amount.
    pub power: i32,
    /// Folder code letter.
    #[serde(default)]
    pub code: String,
    /// Elemental affinity.
    #[serde(default)]
    pub element: Element,
    /// Explicit behaviour, when authored.
    #[serde(default)]
    pub behavior: Option<BehaviorTag>,
    /// Overrides that accompany the behaviour.
    #[serde(default)]
    pub params: ChipParams,
}

impl ChipDefinition {
    /// Creates a definition without explicit behaviour metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, category: ChipCategory, power: i32, code: &str) -> Self {
        Self {
            name: name.into(),
            category,
            power,
            code: code.to_owned(),
            element: Element::Null,
            behavior: None,
            params: ChipParams::default(),
        }
    }

    /// Assigns an elemental affinity.
    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    /// Attaches an explicit behaviour tag and its parameters.
    #[must_use]
    pub fn with_behavior(mut self, behavior: BehaviorTag, params: ChipParams) -> Self {
        self.behavior = Some(behavior);
        self.params = params;
        self
    }

    /// Melee offsets derived from the category.
    #[must_use]
    pub fn range_pattern(&self) -> &'static [(i32, i32)] {
        self.category.range_pattern()
    }
}

/// Secondary effect carried by a projectile and interpreted when it strikes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OnHit {
    /// No secondary effect.
    #[default]
    None,
    /// Damages the tile one column further from the shooter, plus the two
    /// diagonals beside it when enabled.
    Spreader {
        /// Whether the diagonal tiles are struck as well.
        diagonals: bool,
    },
    /// Damages the tile directly behind the struck target.
    Shotgun,
    /// Pushes the struck target back by `push` columns unless blocked.
    AirShot {
        /// Number of columns the target is pushed.
        push: i32,
    },
}

/// Cosmetic tint applied to a melee slash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SlashTint {
    /// Default cyan slash.
    #[default]
    Default,
    /// Orange slash for fire-named swords.
    Fire,
    /// Blue slash for aqua-named swords.
    Aqua,
}

/// Concrete simulation effect of a chip, resolved once from its definition.
#[derive(Clone, Debug, PartialEq)]
pub enum ChipBehavior {
    /// Restores Navi HP up to its maximum.
    Heal {
        /// HP restored.
        amount: i32,
    },
    /// Grants timed invulnerability; overlapping grants keep the longer window.
    Invisibility {
        /// Length of the invulnerability window.
        duration: Duration,
    },
    /// Strikes the tiles of a relative range pattern immediately.
    Melee {
        /// Relative `(columns, rows)` offsets from the Navi.
        pattern: &'static [(i32, i32)],
        /// Damage per struck enemy.
        damage: i32,
        /// Slash tint.
        tint: SlashTint,
    },
    /// Fires a projectile along the Navi's row.
    Shot {
        /// Primary and secondary damage.
        damage: i32,
        /// Travel speed in tiles per second.
        speed: f32,
        /// Whether the projectile survives hits.
        pierce: bool,
        /// Secondary effect applied on hit.
        on_hit: OnHit,
    },
    /// Schedules a delayed impact a fixed distance ahead.
    Lob {
        /// Damage per struck enemy.
        damage: i32,
        /// Columns ahead of the Navi where the impact lands.
        distance: i32,
        /// Delay before the impact resolves.
        delay: Duration,
        /// Splash footprint.
        splash: SplashShape,
    },
    /// Consumed without effect.
    Inert,
}

/// A chip paired with its resolved behaviour, ready to be queued and used.
#[derive(Clone, Debug, PartialEq)]
pub struct Chip {
    definition: ChipDefinition,
    behavior: ChipBehavior,
}

impl Chip {
    /// Pairs a definition with the behaviour resolved for it.
    #[must_use]
    pub fn new(definition: ChipDefinition, behavior: ChipBehavior) -> Self {
        Self {
            definition,
            behavior,
        }
    }

    /// Display name of the chip.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Authored definition.
    #[must_use]
    pub fn definition(&self) -> &ChipDefinition {
        &self.definition
    }

    /// Resolved behaviour.
    #[must_use]
    pub fn behavior(&self) -> &ChipBehavior {
        &self.behavior
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_one_covers_centre_and_neighbours() {
        let tiles = SplashShape::Cross1.footprint(TileCoord::new(3, 1));
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(3, 1),
                TileCoord::new(2, 1),
                TileCoord::new(4, 1),
                TileCoord::new(3, 0),
                TileCoord::new(3, 2),
            ]
        );
        assert!(!tiles.contains(&TileCoord::new(5, 1)));
    }

    #[test]
    fn square_footprint_has_no_duplicates() {
        let tiles = SplashShape::Square1.footprint(TileCoord::new(4, 1));
        assert_eq!(tiles.len(), 9);
        assert_eq!(tiles[0], TileCoord::new(4, 1));
    }

    #[test]
    fn cross_two_reaches_two_tiles() {
        let tiles = SplashShape::Cross2.footprint(TileCoord::new(3, 1));
        assert_eq!(tiles.len(), 9);
        assert!(tiles.contains(&TileCoord::new(5, 1)));
        assert!(tiles.contains(&TileCoord::new(3, 3)));
    }

    #[test]
    fn sword_patterns_follow_category() {
        assert_eq!(ChipCategory::Sword.range_pattern(), &[(1, 0)]);
        assert_eq!(ChipCategory::WideSword.range_pattern().len(), 3);
        assert_eq!(ChipCategory::LongSword.range_pattern(), &[(1, 0), (2, 0)]);
        assert!(ChipCategory::Heal.range_pattern().is_empty());
    }
}
