#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Track Defence.
//!
//! All mutation flows through [`apply`]; adapters and systems observe the
//! results through the [`query`] module and the [`Event`] stream. The tick
//! handler performs the whole per-frame simulation pass in a fixed order —
//! enemy advancement, escape handling, bullet resolution, kill bookkeeping,
//! cooldowns, passive income — so rendering never has to mutate anything.

pub mod path;
mod towers;

use std::time::Duration;

use glam::Vec2;

use towers::Tower;
use track_defence_core::{
    BulletId, CellCoord, CellKind, Command, EnemyId, Event, NeighborMask, PlacementError, TowerId,
    UpgradeError, WELCOME_BANNER,
};

pub use towers::{
    BASE_BULLET_SPEED, BASE_DAMAGE, BASE_FIRE_INTERVAL, BASE_RANGE, RANGE_BOOST_FACTOR,
};

/// Number of cell columns in the default level.
pub const DEFAULT_GRID_COLUMNS: u32 = 20;
/// Number of cell rows in the default level.
pub const DEFAULT_GRID_ROWS: u32 = 10;
/// Number of track segments requested for the default level.
pub const DEFAULT_TRACK_SEGMENTS: u32 = 3;

/// Gold price of a new tower.
pub const TOWER_COST: f32 = 20.0;
/// Gold price of a tower upgrade.
pub const UPGRADE_COST: f32 = 50.0;
/// Gold price of a tower range boost.
pub const RANGE_BOOST_COST: f32 = 50.0;

/// Health the player starts with.
pub const STARTING_HEALTH: f32 = 14.0;
/// Gold the player starts with.
pub const STARTING_GOLD: f32 = 50.0;
/// Gold granted by each passive income tick.
pub const INCOME_AMOUNT: f32 = 1.0;
/// Interval between passive income ticks.
pub const INCOME_INTERVAL: Duration = Duration::from_secs(1);

/// Walking speed of enemies, in cells per second.
pub const ENEMY_SPEED: f32 = 3.0;
/// Distance at which a bullet resolves against its target, in cells.
pub const BULLET_HIT_RADIUS: f32 = 1.0;

/// Represents the authoritative Track Defence level state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    waypoints: Vec<Vec2>,
    towers: Vec<Tower>,
    enemies: Vec<Enemy>,
    bullets: Vec<Bullet>,
    player: Player,
    income_accumulator: Duration,
    next_enemy_id: u32,
    next_tower_id: u32,
    next_bullet_id: u32,
}

impl World {
    /// Creates a new level using the default grid and track configuration.
    #[must_use]
    pub fn new() -> Self {
        let waypoints = path::generate(
            DEFAULT_GRID_COLUMNS,
            DEFAULT_GRID_ROWS,
            DEFAULT_TRACK_SEGMENTS,
        );
        let grid = Grid::from_waypoints(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, &waypoints);
        Self {
            banner: WELCOME_BANNER,
            grid,
            waypoints,
            towers: Vec::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            player: Player::new(),
            income_accumulator: Duration::ZERO,
            next_enemy_id: 0,
            next_tower_id: 0,
            next_bullet_id: 0,
        }
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn allocate_tower_id(&mut self) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.wrapping_add(1);
        id
    }

    fn allocate_bullet_id(&mut self) -> BulletId {
        let id = BulletId::new(self.next_bullet_id);
        self.next_bullet_id = self.next_bullet_id.wrapping_add(1);
        id
    }

    fn enemy(&self, enemy_id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == enemy_id)
    }

    fn tower_mut(&mut self, tower_id: TowerId) -> Option<&mut Tower> {
        self.towers.iter_mut().find(|tower| tower.id == tower_id)
    }

    fn placement_obstacle(&self, origin: CellCoord) -> Option<PlacementError> {
        match self.grid.kind(origin) {
            None => Some(PlacementError::OutOfBounds),
            Some(CellKind::Track) => Some(PlacementError::OnTrack),
            Some(CellKind::Tower) => Some(PlacementError::Occupied),
            Some(CellKind::Grass) => None,
        }
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.waypoints.len() < 2 {
            return;
        }

        let last_index = self.waypoints.len() - 1;
        let step = ENEMY_SPEED * dt.as_secs_f32();

        for enemy in &mut self.enemies {
            if enemy.path_index >= last_index {
                continue;
            }

            let target = self.waypoints[enemy.path_index + 1];
            let toward = target - enemy.position;
            let distance = toward.length();
            if distance < step {
                enemy.position = target;
                enemy.path_index = (enemy.path_index + 1).min(last_index);
            } else {
                enemy.position += toward.normalize_or_zero() * step;
            }
        }

        // Escapes are resolved in the same pass that produced them so the
        // player is damaged exactly once per enemy.
        let mut index = 0;
        while index < self.enemies.len() {
            if self.enemies[index].path_index >= last_index {
                let enemy = self.enemies.remove(index);
                self.player.health -= 1.0;
                out_events.push(Event::EnemyEscaped { enemy: enemy.id });
                if self.player.health <= 0.0 && !self.player.defeated {
                    self.player.defeated = true;
                    out_events.push(Event::PlayerDefeated);
                }
            } else {
                index += 1;
            }
        }
    }

    fn advance_bullets(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let step_seconds = dt.as_secs_f32();

        for bullet in &mut self.bullets {
            let Some(target) = self
                .enemies
                .iter()
                .find(|enemy| enemy.id == bullet.target && enemy.health > 0.0)
            else {
                bullet.resolved = true;
                out_events.push(Event::BulletExpired { bullet: bullet.id });
                continue;
            };

            let target_position = target.position;
            let direction = (target_position - bullet.position).normalize_or_zero();
            bullet.position += direction * bullet.speed * step_seconds;

            if bullet.position.distance(target_position) < BULLET_HIT_RADIUS {
                let damage = bullet.damage;
                bullet.resolved = true;
                out_events.push(Event::BulletHit {
                    bullet: bullet.id,
                    target: bullet.target,
                });
                if let Some(enemy) = self
                    .enemies
                    .iter_mut()
                    .find(|enemy| enemy.id == bullet.target)
                {
                    enemy.health -= damage;
                }
            }
        }

        self.bullets.retain(|bullet| !bullet.resolved);
    }

    fn remove_dead_enemies(&mut self, out_events: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.enemies.len() {
            if self.enemies[index].health <= 0.0 {
                let enemy = self.enemies.remove(index);
                self.player.gold += enemy.bounty;
                self.player.kills += 1;
                out_events.push(Event::EnemyKilled {
                    enemy: enemy.id,
                    bounty: enemy.bounty,
                });
            } else {
                index += 1;
            }
        }
    }

    fn accrue_income(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.income_accumulator = self.income_accumulator.saturating_add(dt);
        while self.income_accumulator >= INCOME_INTERVAL {
            self.income_accumulator -= INCOME_INTERVAL;
            self.player.gold += INCOME_AMOUNT;
            out_events.push(Event::IncomeGranted {
                amount: INCOME_AMOUNT,
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid {
            columns,
            rows,
            segments,
        } => {
            world.waypoints = path::generate(columns, rows, segments);
            world.grid = Grid::from_waypoints(columns, rows, &world.waypoints);
            world.towers.clear();
            world.enemies.clear();
            world.bullets.clear();
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_enemies(dt, out_events);
            world.advance_bullets(dt, out_events);
            world.remove_dead_enemies(out_events);
            for tower in &mut world.towers {
                tower.advance_cooldown(dt);
            }
            world.accrue_income(dt, out_events);
        }
        Command::SpawnEnemy { health, bounty } => {
            let Some(start) = world.waypoints.first().copied() else {
                return;
            };
            let id = world.allocate_enemy_id();
            world.enemies.push(Enemy {
                id,
                position: start,
                health,
                max_health: health,
                bounty,
                path_index: 0,
            });
            out_events.push(Event::EnemySpawned {
                enemy: id,
                position: start,
            });
        }
        Command::PlaceTower { origin } => {
            let rejection = world.placement_obstacle(origin).or_else(|| {
                (world.player.gold < TOWER_COST).then_some(PlacementError::InsufficientGold)
            });
            if let Some(reason) = rejection {
                out_events.push(Event::TowerPlacementRejected { origin, reason });
                return;
            }

            world.player.gold -= TOWER_COST;
            let id = world.allocate_tower_id();
            world.towers.push(Tower::new(id, origin));
            world.grid.set_kind(origin, CellKind::Tower);
            out_events.push(Event::TowerPlaced { tower: id, origin });
        }
        Command::RestoreTower {
            origin,
            level,
            range,
        } => {
            if let Some(reason) = world.placement_obstacle(origin) {
                out_events.push(Event::TowerPlacementRejected { origin, reason });
                return;
            }

            let id = world.allocate_tower_id();
            world.towers.push(Tower::restored(id, origin, level, range));
            world.grid.set_kind(origin, CellKind::Tower);
            out_events.push(Event::TowerPlaced { tower: id, origin });
        }
        Command::UpgradeTower { tower } => {
            let Some(index) = world.towers.iter().position(|record| record.id == tower) else {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::UnknownTower,
                });
                return;
            };
            if world.towers[index].level.is_maxed() {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::MaxedOut,
                });
                return;
            }
            if world.player.gold < UPGRADE_COST {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::InsufficientGold,
                });
                return;
            }

            let _ = world.towers[index].upgrade();
            let level = world.towers[index].level;
            world.player.gold -= UPGRADE_COST;
            out_events.push(Event::TowerUpgraded { tower, level });
        }
        Command::BoostTowerRange { tower } => {
            let Some(index) = world.towers.iter().position(|record| record.id == tower) else {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::UnknownTower,
                });
                return;
            };
            if world.player.gold < RANGE_BOOST_COST {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::InsufficientGold,
                });
                return;
            }

            world.towers[index].boost_range();
            let range = world.towers[index].range;
            world.player.gold -= RANGE_BOOST_COST;
            out_events.push(Event::TowerRangeBoosted { tower, range });
        }
        Command::FireBullet { tower, target } => {
            let Some(record) = world.tower_mut(tower) else {
                return;
            };
            if !record.ready_to_fire() {
                return;
            }

            let position = record.origin.position();
            let damage = record.damage;
            let speed = record.bullet_speed;

            if world
                .enemy(target)
                .map_or(true, |enemy| enemy.health <= 0.0)
            {
                return;
            }

            if let Some(record) = world.tower_mut(tower) {
                record.clear_ready();
            }
            let id = world.allocate_bullet_id();
            world.bullets.push(Bullet {
                id,
                position,
                target,
                damage,
                speed,
                resolved: false,
            });
            out_events.push(Event::BulletFired {
                bullet: id,
                tower,
                target,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;

    use super::{Grid, World};
    use track_defence_core::{
        geometry, BulletSnapshot, CellCoord, CellKind, EnemySnapshot, EnemyView, NeighborMask,
        PlayerSnapshot, TowerId, TowerSnapshot, TowerView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the level grid.
    #[must_use]
    pub fn grid(world: &World) -> GridView<'_> {
        GridView { grid: &world.grid }
    }

    /// Waypoints composing the enemy track, in walk order.
    #[must_use]
    pub fn waypoints(world: &World) -> &[Vec2] {
        &world.waypoints
    }

    /// Reports whether the provided point lies on the track polyline.
    #[must_use]
    pub fn track_contains(world: &World, point: Vec2) -> bool {
        geometry::point_on_path(point, &world.waypoints, geometry::CONTAINMENT_TOLERANCE)
    }

    /// Captures a read-only view of the enemies walking the track.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    position: enemy.position,
                    health: enemy.health,
                    max_health: enemy.max_health,
                    bounty: enemy.bounty,
                    path_index: enemy.path_index,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerSnapshot {
                    id: tower.id,
                    origin: tower.origin,
                    level: tower.level,
                    range: tower.range,
                    damage: tower.damage,
                    bullet_speed: tower.bullet_speed,
                    ready_to_fire: tower.ready_to_fire(),
                })
                .collect(),
        )
    }

    /// Captures the bullets currently in flight, ordered by identifier.
    #[must_use]
    pub fn bullet_snapshots(world: &World) -> Vec<BulletSnapshot> {
        let mut snapshots: Vec<BulletSnapshot> = world
            .bullets
            .iter()
            .map(|bullet| BulletSnapshot {
                id: bullet.id,
                position: bullet.position,
                target: bullet.target,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Captures the player's economy state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            health: world.player.health,
            gold: world.player.gold,
            kills: world.player.kills,
            defeated: world.player.defeated,
        }
    }

    /// Returns the tower anchored at the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world
            .towers
            .iter()
            .find(|tower| tower.origin == cell)
            .map(|tower| tower.id)
    }

    /// Read-only view into the level grid.
    #[derive(Clone, Copy, Debug)]
    pub struct GridView<'a> {
        grid: &'a Grid,
    }

    impl GridView<'_> {
        /// Number of cell columns in the grid.
        #[must_use]
        pub fn columns(&self) -> u32 {
            self.grid.columns
        }

        /// Number of cell rows in the grid.
        #[must_use]
        pub fn rows(&self) -> u32 {
            self.grid.rows
        }

        /// Classification of the provided cell, `None` outside the grid.
        #[must_use]
        pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
            self.grid.kind(cell)
        }

        /// Reports whether the provided cell is part of the track.
        #[must_use]
        pub fn is_track(&self, cell: CellCoord) -> bool {
            self.grid.kind(cell) == Some(CellKind::Track)
        }

        /// Which of the cell's 4-neighbors are track cells.
        #[must_use]
        pub fn neighbor_track_mask(&self, cell: CellCoord) -> NeighborMask {
            self.grid.neighbor_track_mask(cell)
        }
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    position: Vec2,
    health: f32,
    max_health: f32,
    bounty: f32,
    path_index: usize,
}

#[derive(Clone, Debug)]
struct Bullet {
    id: BulletId,
    position: Vec2,
    target: EnemyId,
    damage: f32,
    speed: f32,
    resolved: bool,
}

#[derive(Clone, Debug)]
struct Player {
    health: f32,
    gold: f32,
    kills: u32,
    defeated: bool,
}

impl Player {
    fn new() -> Self {
        Self {
            health: STARTING_HEALTH,
            gold: STARTING_GOLD,
            kills: 0,
            defeated: false,
        }
    }
}

#[derive(Clone, Debug)]
struct Grid {
    columns: u32,
    rows: u32,
    kinds: Vec<CellKind>,
}

impl Grid {
    fn from_waypoints(columns: u32, rows: u32, waypoints: &[Vec2]) -> Self {
        let track = path::rasterize(columns, rows, waypoints);
        let kinds = track
            .into_iter()
            .map(|is_track| {
                if is_track {
                    CellKind::Track
                } else {
                    CellKind::Grass
                }
            })
            .collect();
        Self {
            columns,
            rows,
            kinds,
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            Some(cell.row() as usize * self.columns as usize + cell.column() as usize)
        } else {
            None
        }
    }

    fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).and_then(|index| self.kinds.get(index)).copied()
    }

    fn set_kind(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.kinds.get_mut(index) {
                *slot = kind;
            }
        }
    }

    fn is_track_at(&self, column: i64, row: i64) -> bool {
        if column < 0 || row < 0 {
            return false;
        }
        self.kind(CellCoord::new(column as u32, row as u32)) == Some(CellKind::Track)
    }

    fn neighbor_track_mask(&self, cell: CellCoord) -> NeighborMask {
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        NeighborMask::from_flags(
            self.is_track_at(column, row - 1),
            self.is_track_at(column + 1, row),
            self.is_track_at(column, row + 1),
            self.is_track_at(column - 1, row),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_defence_core::UpgradeLevel;

    fn configured_world() -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                columns: 20,
                rows: 10,
                segments: 3,
            },
            &mut events,
        );
        world
    }

    fn tick(world: &mut World, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick { dt }, &mut events);
        events
    }

    fn spawn_enemy(world: &mut World, health: f32, bounty: f32) -> EnemyId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy { health, bounty },
            &mut events,
        );
        events
            .iter()
            .find_map(|event| match event {
                Event::EnemySpawned { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .expect("spawn emits EnemySpawned")
    }

    fn enemy_mut(world: &mut World, id: EnemyId) -> &mut Enemy {
        world
            .enemies
            .iter_mut()
            .find(|enemy| enemy.id == id)
            .expect("enemy exists")
    }

    fn place_tower(world: &mut World, origin: CellCoord) -> TowerId {
        let mut events = Vec::new();
        apply(world, Command::PlaceTower { origin }, &mut events);
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(*tower),
                _ => None,
            })
            .expect("placement succeeds")
    }

    #[test]
    fn configure_grid_marks_the_track_corridor() {
        let world = configured_world();
        let grid = query::grid(&world);

        assert_eq!(grid.columns(), 20);
        assert_eq!(grid.rows(), 10);
        assert!(grid.is_track(CellCoord::new(1, 0)));
        assert!(!grid.is_track(CellCoord::new(10, 5)));
        assert_eq!(query::waypoints(&world).len(), 8);
    }

    #[test]
    fn enemies_spawn_at_the_first_waypoint() {
        let mut world = configured_world();
        let id = spawn_enemy(&mut world, 20.0, 50.0);

        let snapshot = query::enemy_view(&world)
            .into_vec()
            .into_iter()
            .find(|snapshot| snapshot.id == id)
            .expect("enemy exists");
        assert_eq!(snapshot.position, query::waypoints(&world)[0]);
        assert_eq!(snapshot.path_index, 0);
    }

    #[test]
    fn enemies_advance_and_never_exceed_the_final_waypoint() {
        let mut world = configured_world();
        let _ = spawn_enemy(&mut world, 20.0, 50.0);
        let last_index = query::waypoints(&world).len() - 1;

        for _ in 0..2_000 {
            let _ = tick(&mut world, Duration::from_millis(16));
            for snapshot in query::enemy_view(&world).iter() {
                assert!(snapshot.path_index < last_index);
            }
            if query::enemy_view(&world).iter().next().is_none() {
                return;
            }
        }
        panic!("enemy never reached the end of the track");
    }

    #[test]
    fn escaping_enemies_damage_the_player_once_and_vanish() {
        let mut world = configured_world();
        let id = spawn_enemy(&mut world, 20.0, 50.0);

        let mut escaped = 0;
        for _ in 0..2_000 {
            let events = tick(&mut world, Duration::from_millis(16));
            escaped += events
                .iter()
                .filter(|event| matches!(event, Event::EnemyEscaped { enemy } if *enemy == id))
                .count();
        }

        assert_eq!(escaped, 1);
        assert!(query::enemy_view(&world).iter().next().is_none());
        assert!((query::player(&world).health - (STARTING_HEALTH - 1.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn tower_placement_deducts_gold_and_claims_the_cell() {
        let mut world = configured_world();
        let origin = CellCoord::new(5, 4);
        let tower = place_tower(&mut world, origin);

        assert_eq!(query::tower_at(&world, origin), Some(tower));
        assert_eq!(
            query::grid(&world).kind(origin),
            Some(CellKind::Tower)
        );
        assert!((query::player(&world).gold - (STARTING_GOLD - TOWER_COST)).abs() < f32::EPSILON);
    }

    #[test]
    fn tower_placement_rejections_carry_a_reason() {
        let mut world = configured_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                origin: CellCoord::new(99, 99),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceTower {
                origin: CellCoord::new(1, 0),
            },
            &mut events,
        );
        let occupied = CellCoord::new(5, 4);
        let _ = place_tower(&mut world, occupied);
        apply(
            &mut world,
            Command::PlaceTower { origin: occupied },
            &mut events,
        );
        // Drain the purse, then try to buy on open grass.
        apply(
            &mut world,
            Command::PlaceTower {
                origin: CellCoord::new(7, 4),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceTower {
                origin: CellCoord::new(9, 4),
            },
            &mut events,
        );

        let reasons: Vec<PlacementError> = events
            .iter()
            .filter_map(|event| match event {
                Event::TowerPlacementRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                PlacementError::OutOfBounds,
                PlacementError::OnTrack,
                PlacementError::Occupied,
                PlacementError::InsufficientGold,
            ]
        );
        // Rejected placements never change the purse.
        assert!((query::player(&world).gold - (STARTING_GOLD - 2.0 * TOWER_COST)).abs()
            < f32::EPSILON);
    }

    #[test]
    fn upgrades_cost_gold_and_cap_at_the_final_level() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, CellCoord::new(5, 4));
        world.player.gold = 200.0;

        let mut events = Vec::new();
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);

        let upgraded: Vec<UpgradeLevel> = events
            .iter()
            .filter_map(|event| match event {
                Event::TowerUpgraded { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(upgraded, vec![UpgradeLevel::new(1), UpgradeLevel::new(2)]);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::TowerUpgradeRejected {
                reason: UpgradeError::MaxedOut,
                ..
            }
        )));
        assert!((query::player(&world).gold - (200.0 - 2.0 * UPGRADE_COST)).abs() < f32::EPSILON);
    }

    #[test]
    fn range_boost_multiplies_range_each_purchase() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, CellCoord::new(5, 4));
        world.player.gold = 200.0;

        let mut events = Vec::new();
        apply(&mut world, Command::BoostTowerRange { tower }, &mut events);
        apply(&mut world, Command::BoostTowerRange { tower }, &mut events);

        let snapshot = query::tower_view(&world)
            .into_vec()
            .into_iter()
            .find(|snapshot| snapshot.id == tower)
            .expect("tower exists");
        assert!((snapshot.range - BASE_RANGE * RANGE_BOOST_FACTOR * RANGE_BOOST_FACTOR).abs()
            < 1e-5);
    }

    #[test]
    fn bullets_home_hit_and_credit_the_bounty_exactly_once() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, CellCoord::new(5, 4));
        let enemy = spawn_enemy(&mut world, 20.0, 50.0);
        enemy_mut(&mut world, enemy).position = Vec2::new(6.0, 4.0);
        // Park the enemy so movement does not interfere with the shot.
        enemy_mut(&mut world, enemy).path_index = 0;
        world.waypoints[1] = Vec2::new(6.0, 4.0);

        // Bank a shot, then fire.
        let _ = tick(&mut world, BASE_FIRE_INTERVAL);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireBullet {
                tower,
                target: enemy,
            },
            &mut events,
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::BulletFired { .. })));

        let gold_before = query::player(&world).gold;
        let mut killed = 0;
        for _ in 0..60 {
            let events = tick(&mut world, Duration::from_millis(16));
            killed += events
                .iter()
                .filter(|event| matches!(event, Event::EnemyKilled { .. }))
                .count();
        }

        assert_eq!(killed, 1);
        assert_eq!(query::player(&world).kills, 1);
        let income: f32 = query::player(&world).gold - gold_before - 50.0;
        // Anything beyond the bounty is passive income, never a double credit.
        assert!((0.0..2.0).contains(&income));
        assert!(query::bullet_snapshots(&world).is_empty());
    }

    #[test]
    fn firing_requires_a_banked_cooldown() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, CellCoord::new(5, 4));
        let enemy = spawn_enemy(&mut world, 20.0, 50.0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireBullet {
                tower,
                target: enemy,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::bullet_snapshots(&world).is_empty());
    }

    #[test]
    fn a_fired_tower_cannot_fire_again_without_accumulating() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, CellCoord::new(5, 4));
        let enemy = spawn_enemy(&mut world, 1_000.0, 50.0);
        let _ = tick(&mut world, BASE_FIRE_INTERVAL);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireBullet {
                tower,
                target: enemy,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::FireBullet {
                tower,
                target: enemy,
            },
            &mut events,
        );

        let fired = events
            .iter()
            .filter(|event| matches!(event, Event::BulletFired { .. }))
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn bullets_expire_when_their_target_is_gone() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, CellCoord::new(5, 4));
        let enemy = spawn_enemy(&mut world, 20.0, 50.0);
        let _ = tick(&mut world, BASE_FIRE_INTERVAL);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireBullet {
                tower,
                target: enemy,
            },
            &mut events,
        );

        // Remove the enemy out from under the bullet.
        world.enemies.clear();
        let events = tick(&mut world, Duration::from_millis(16));

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::BulletExpired { .. })));
        assert!(query::bullet_snapshots(&world).is_empty());
    }

    #[test]
    fn passive_income_accrues_once_per_interval() {
        let mut world = configured_world();
        let gold_before = query::player(&world).gold;

        let mut granted = 0;
        for _ in 0..25 {
            let events = tick(&mut world, Duration::from_millis(100));
            granted += events
                .iter()
                .filter(|event| matches!(event, Event::IncomeGranted { .. }))
                .count();
        }

        assert_eq!(granted, 2);
        assert!(
            (query::player(&world).gold - gold_before - 2.0 * INCOME_AMOUNT).abs() < f32::EPSILON
        );
    }

    #[test]
    fn defeat_is_announced_exactly_once() {
        let mut world = configured_world();
        world.player.health = 1.0;

        let mut defeats = 0;
        for _ in 0..3 {
            let _ = spawn_enemy(&mut world, 20.0, 0.0);
            for _ in 0..2_000 {
                let events = tick(&mut world, Duration::from_millis(16));
                defeats += events
                    .iter()
                    .filter(|event| matches!(event, Event::PlayerDefeated))
                    .count();
            }
        }

        assert_eq!(defeats, 1);
        assert!(query::player(&world).defeated);
    }
}
