use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of tile columns on the battlefield.
pub const GRID_COLUMNS: i32 = 6;

/// Number of tile rows on the battlefield.
pub const GRID_ROWS: i32 = 3;

/// Number of columns owned by each side of the battlefield.
pub const SIDE_COLUMNS: i32 = 3;

/// Reports whether the provided tile indices fall inside the battlefield.
#[must_use]
pub const fn in_bounds(column: i32, row: i32) -> bool {
    column >= 0 && column < GRID_COLUMNS && row >= 0 && row < GRID_ROWS
}

/// Reports whether a free-flying position is still inside the flight envelope.
///
/// The envelope extends one tile beyond the battlefield on every edge so that
/// projectiles visibly leave the grid before they despawn.
#[must_use]
pub fn in_flight_bounds(position: Vec2) -> bool {
    position.x >= -1.0
        && position.x <= GRID_COLUMNS as f32
        && position.y >= -1.0
        && position.y <= GRID_ROWS as f32
}

/// Half of the battlefield a combatant or tile belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Left half, columns `0..=2`, owned by the player's Navi.
    Navi,
    /// Right half, columns `3..=5`, owned by the viruses.
    Virus,
}

impl Side {
    /// Leftmost column owned by the side.
    #[must_use]
    pub const fn min_column(self) -> i32 {
        match self {
            Self::Navi => 0,
            Self::Virus => SIDE_COLUMNS,
        }
    }

    /// Rightmost column owned by the side.
    #[must_use]
    pub const fn max_column(self) -> i32 {
        match self {
            Self::Navi => SIDE_COLUMNS - 1,
            Self::Virus => GRID_COLUMNS - 1,
        }
    }

    /// Side facing this one across the battlefield.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Navi => Self::Virus,
            Self::Virus => Self::Navi,
        }
    }

    /// Column step that moves away from this side's own edge toward the opponent.
    #[must_use]
    pub const fn forward(self) -> i32 {
        match self {
            Self::Navi => 1,
            Self::Virus => -1,
        }
    }

    /// Side owning the provided column, if the column is on the battlefield.
    #[must_use]
    pub const fn of_column(column: i32) -> Option<Self> {
        if column < 0 || column >= GRID_COLUMNS {
            None
        } else if column < SIDE_COLUMNS {
            Some(Self::Navi)
        } else {
            Some(Self::Virus)
        }
    }
}

/// Cardinal step directions used by combatant movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward row zero.
    North,
    /// Toward increasing columns, i.e. toward the virus side.
    East,
    /// Toward increasing rows.
    South,
    /// Toward decreasing columns, i.e. toward the Navi side.
    West,
}

impl Direction {
    /// Column and row delta produced by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Integer tile location on the battlefield.
///
/// Coordinates are signed because relative targeting (sword ranges, splash
/// footprints, spreader tiles) routinely produces off-grid candidates that
/// must be bounds-checked rather than wrapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the tile displaced by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// Returns the neighbouring tile in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (columns, rows) = direction.delta();
        self.offset(columns, rows)
    }

    /// Reports whether the tile lies on the battlefield.
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        in_bounds(self.column, self.row)
    }

    /// Side of the battlefield owning the tile, if it is on the grid.
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        if self.row < 0 || self.row >= GRID_ROWS {
            return None;
        }
        Side::of_column(self.column)
    }

    /// Clamps the tile into the half of the battlefield owned by `side`.
    #[must_use]
    pub fn clamp_to(self, side: Side) -> Self {
        Self::new(
            self.column.clamp(side.min_column(), side.max_column()),
            self.row.clamp(0, GRID_ROWS - 1),
        )
    }

    /// Tile position expressed in grid units for comparison with projectiles.
    #[must_use]
    pub fn point(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }
}

/// Unit travel direction of a projectile with components in `{-1, 0, 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Heading {
    dx: i8,
    dy: i8,
}

impl Heading {
    /// Travel toward the virus side along the current row.
    pub const EAST: Self = Self { dx: 1, dy: 0 };
    /// Travel toward the Navi side along the current row.
    pub const WEST: Self = Self { dx: -1, dy: 0 };

    /// Creates a heading, reducing each component to its sign.
    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx: dx.signum(),
            dy: dy.signum(),
        }
    }

    /// Heading pointing from `side` toward its opponent.
    #[must_use]
    pub const fn forward(side: Side) -> Self {
        match side {
            Side::Navi => Self::EAST,
            Side::Virus => Self::WEST,
        }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> i8 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> i8 {
        self.dy
    }

    /// Heading as a vector in grid units.
    #[must_use]
    pub fn vector(self) -> Vec2 {
        Vec2::new(f32::from(self.dx), f32::from(self.dy))
    }
}
