//! Tower records and the upgrade arithmetic applied to them.

use std::time::Duration;

use track_defence_core::{CellCoord, TowerId, UpgradeLevel};

/// Targeting radius of a freshly placed tower, in cells.
pub const BASE_RANGE: f32 = 2.0;
/// Damage applied by a level-zero tower's bullets.
pub const BASE_DAMAGE: f32 = 1.0;
/// Speed of a level-zero tower's bullets, in cells per second.
pub const BASE_BULLET_SPEED: f32 = 12.0;
/// Minimum time between successive shots of a level-zero tower.
pub const BASE_FIRE_INTERVAL: Duration = Duration::from_millis(200);

const UPGRADE_DAMAGE_FACTOR: f32 = 5.0;
const UPGRADE_FIRE_INTERVAL_FACTOR: f32 = 0.4;
const UPGRADE_BULLET_SPEED_FACTOR: f32 = 3.0;

/// Factor applied to a tower's range by a paid range boost.
pub const RANGE_BOOST_FACTOR: f32 = 1.5;

#[derive(Clone, Debug)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    pub(crate) origin: CellCoord,
    pub(crate) level: UpgradeLevel,
    pub(crate) range: f32,
    pub(crate) damage: f32,
    pub(crate) bullet_speed: f32,
    pub(crate) fire_interval: Duration,
    cooldown: Duration,
    ready: bool,
}

impl Tower {
    pub(crate) fn new(id: TowerId, origin: CellCoord) -> Self {
        Self {
            id,
            origin,
            level: UpgradeLevel::default(),
            range: BASE_RANGE,
            damage: BASE_DAMAGE,
            bullet_speed: BASE_BULLET_SPEED,
            fire_interval: BASE_FIRE_INTERVAL,
            cooldown: Duration::ZERO,
            ready: false,
        }
    }

    /// Rebuilds a tower recorded in an imported layout by replaying the
    /// upgrade arithmetic up to the stored level and adopting the stored
    /// range (range boosts are not derivable from the level alone).
    pub(crate) fn restored(id: TowerId, origin: CellCoord, level: UpgradeLevel, range: f32) -> Self {
        let mut tower = Self::new(id, origin);
        for _ in 0..level.get() {
            let _ = tower.upgrade();
        }
        tower.range = range.max(0.0);
        tower
    }

    /// Advances the tower one upgrade level, multiplying its combat stats.
    ///
    /// Returns `false` without touching any stat when the tower is maxed.
    pub(crate) fn upgrade(&mut self) -> bool {
        if self.level.is_maxed() {
            return false;
        }

        self.level = self.level.next();
        self.damage *= UPGRADE_DAMAGE_FACTOR;
        self.bullet_speed *= UPGRADE_BULLET_SPEED_FACTOR;
        self.fire_interval = self.fire_interval.mul_f32(UPGRADE_FIRE_INTERVAL_FACTOR);
        true
    }

    pub(crate) fn boost_range(&mut self) {
        self.range *= RANGE_BOOST_FACTOR;
    }

    /// Accumulates elapsed time toward fire readiness.
    ///
    /// Once the accumulator reaches the fire interval the tower becomes
    /// eligible to shoot and the accumulator resets. Eligibility is sticky
    /// until a bullet is actually fired, so a tower that had no target keeps
    /// its shot banked.
    pub(crate) fn advance_cooldown(&mut self, dt: Duration) {
        self.cooldown = self.cooldown.saturating_add(dt);
        if self.cooldown >= self.fire_interval {
            self.ready = true;
            self.cooldown = Duration::ZERO;
        }
    }

    pub(crate) fn ready_to_fire(&self) -> bool {
        self.ready
    }

    pub(crate) fn clear_ready(&mut self) {
        self.ready = false;
    }
}
