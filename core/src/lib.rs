#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Track Defence prototypes.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Invalid player actions are rejected
//! silently at the state level and surfaced only as rejection events;
//! rendering consumes read-only query snapshots and never mutates state.

pub mod geometry;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Track Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the level grid and regenerates the zig-zag track.
    ConfigureGrid {
        /// Number of cell columns laid out in the grid.
        columns: u32,
        /// Number of cell rows laid out in the grid.
        rows: u32,
        /// Requested number of track segments; odd counts are rounded up.
        segments: u32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the track at its first waypoint.
    SpawnEnemy {
        /// Hit points assigned to the enemy on spawn.
        health: f32,
        /// Gold credited to the player when the enemy dies.
        bounty: f32,
    },
    /// Requests construction of a tower on the provided grass cell.
    PlaceTower {
        /// Cell that anchors the tower.
        origin: CellCoord,
    },
    /// Requests an upgrade of the identified tower to its next level.
    UpgradeTower {
        /// Identifier of the tower targeted for the upgrade.
        tower: TowerId,
    },
    /// Requests a paid range boost for the identified tower.
    BoostTowerRange {
        /// Identifier of the tower whose range should grow.
        tower: TowerId,
    },
    /// Requests that a tower emit a bullet at the identified enemy.
    FireBullet {
        /// Tower doing the shooting.
        tower: TowerId,
        /// Enemy the bullet will home toward.
        target: EnemyId,
    },
    /// Restores a tower from an imported layout, bypassing the economy.
    RestoreTower {
        /// Cell that anchors the restored tower.
        origin: CellCoord,
        /// Upgrade level recorded in the layout.
        level: UpgradeLevel,
        /// Targeting range recorded in the layout.
        range: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the track.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Continuous position the enemy occupies after spawning.
        position: Vec2,
    },
    /// Reports that an enemy ran out of health and was removed.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Gold credited to the player for the kill.
        bounty: f32,
    },
    /// Reports that an enemy reached the end of the track and was removed.
    EnemyEscaped {
        /// Identifier of the enemy that escaped.
        enemy: EnemyId,
    },
    /// Reports that the passive income tick granted gold to the player.
    IncomeGranted {
        /// Amount of gold added to the player's purse.
        amount: f32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Cell occupied by the tower.
        origin: CellCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Origin cell provided in the placement request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower advanced to the next upgrade level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level the tower reached.
        level: UpgradeLevel,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted for the upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower's targeting range grew.
    TowerRangeBoosted {
        /// Identifier of the boosted tower.
        tower: TowerId,
        /// Range the tower now covers, in cells.
        range: f32,
    },
    /// Confirms that a bullet left a tower toward an enemy.
    BulletFired {
        /// Identifier assigned to the bullet.
        bullet: BulletId,
        /// Tower that fired the bullet.
        tower: TowerId,
        /// Enemy the bullet homes toward.
        target: EnemyId,
    },
    /// Reports that a bullet reached its target and applied damage.
    BulletHit {
        /// Identifier of the resolved bullet.
        bullet: BulletId,
        /// Enemy that absorbed the damage.
        target: EnemyId,
    },
    /// Reports that a bullet's target vanished before impact.
    BulletExpired {
        /// Identifier of the expired bullet.
        bullet: BulletId,
    },
    /// Reports that the player's health reached zero.
    PlayerDefeated,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
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

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an in-flight bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the bullet identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Center of the cell expressed in continuous cell units.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }

    /// Top-left corner of the cell expressed in continuous cell units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }
}

/// Classification stored for every cell of the level grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Buildable ground.
    Grass,
    /// Part of the enemy track; never buildable.
    Track,
    /// Occupied by a tower.
    Tower,
}

/// Classification of whatever the pointer currently rests on.
///
/// Mirrors the grid vocabulary plus a `None` state for "no interaction this
/// frame" (pointer outside the grid, nothing selected).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    /// Nothing is selected.
    #[default]
    None,
    /// A buildable grass cell is selected.
    Grass,
    /// The pointer pressed a track cell, clearing the selection.
    Track,
    /// The selected cell hosts a tower.
    Tower,
}

/// Upgrade level of a tower, monotonically non-decreasing and capped.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UpgradeLevel(u8);

impl UpgradeLevel {
    /// Highest level a tower can reach.
    pub const MAX: Self = Self(2);

    /// Creates a level from a raw value, clamping to the supported cap.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric representation of the level.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether further upgrades are impossible.
    #[must_use]
    pub const fn is_maxed(&self) -> bool {
        self.0 >= Self::MAX.0
    }

    /// Returns the next level, saturating at the cap.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self::new(self.0.saturating_add(1))
    }
}

/// Bitmask describing which 4-neighbors of a grid cell are track cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NeighborMask(u8);

impl NeighborMask {
    /// Bit set when the cell above is track.
    pub const NORTH: u8 = 0b0001;
    /// Bit set when the cell to the right is track.
    pub const EAST: u8 = 0b0010;
    /// Bit set when the cell below is track.
    pub const SOUTH: u8 = 0b0100;
    /// Bit set when the cell to the left is track.
    pub const WEST: u8 = 0b1000;

    /// Creates a mask from raw bits; anything above the low nibble is dropped.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Creates a mask from individual neighbor flags.
    #[must_use]
    pub const fn from_flags(north: bool, east: bool, south: bool, west: bool) -> Self {
        let mut bits = 0;
        if north {
            bits |= Self::NORTH;
        }
        if east {
            bits |= Self::EAST;
        }
        if south {
            bits |= Self::SOUTH;
        }
        if west {
            bits |= Self::WEST;
        }
        Self(bits)
    }

    /// Raw bit representation of the mask.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Continuous position expressed in cell units.
    pub position: Vec2,
    /// Remaining hit points.
    pub health: f32,
    /// Hit points the enemy spawned with.
    pub max_health: f32,
    /// Gold credited to the player when the enemy dies.
    pub bounty: f32,
    /// Index of the waypoint the enemy most recently reached.
    pub path_index: usize,
}

/// Read-only snapshot describing all enemies on the track.
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

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Cell that anchors the tower.
    pub origin: CellCoord,
    /// Upgrade level the tower has reached.
    pub level: UpgradeLevel,
    /// Targeting range measured in cells.
    pub range: f32,
    /// Damage applied by each bullet.
    pub damage: f32,
    /// Speed of emitted bullets in cells per second.
    pub bullet_speed: f32,
    /// Whether the fire-rate cooldown has elapsed since the last shot.
    pub ready_to_fire: bool,
}

/// Read-only snapshot describing all towers placed in the level.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a bullet in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Identifier assigned to the bullet.
    pub id: BulletId,
    /// Continuous position expressed in cell units.
    pub position: Vec2,
    /// Enemy the bullet homes toward.
    pub target: EnemyId,
}

/// Read-only snapshot of the player's economy state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Remaining player health.
    pub health: f32,
    /// Gold available for purchases.
    pub gold: f32,
    /// Number of enemies the player's towers have destroyed.
    pub kills: u32,
    /// Whether the player's health has reached zero.
    pub defeated: bool,
}

/// Targeting assignment produced by the tower targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower the assignment belongs to.
    pub tower: TowerId,
    /// Enemy selected as the tower's current target.
    pub enemy: EnemyId,
    /// Tower position used for the distance computation, in cell units.
    pub tower_position: Vec2,
    /// Enemy position observed when the target was chosen, in cell units.
    pub enemy_position: Vec2,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies beyond the configured grid bounds.
    OutOfBounds,
    /// The requested cell is part of the enemy track.
    OnTrack,
    /// The requested cell already hosts a tower.
    Occupied,
    /// The player cannot afford the tower.
    InsufficientGold,
}

/// Reasons a tower upgrade or range boost may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    UnknownTower,
    /// The tower already reached the final upgrade level.
    MaxedOut,
    /// The player cannot afford the action.
    InsufficientGold,
}
