//! Integration test that runs targeting against a live world snapshot.

use std::time::Duration;

use track_defence_core::{CellCoord, Command};
use track_defence_system_tower_targeting::TowerTargeting;
use track_defence_world::{apply, query, World};

#[test]
fn towers_next_to_the_track_acquire_walking_enemies() {
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
    apply(
        &mut world,
        Command::PlaceTower {
            origin: CellCoord::new(2, 0),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::SpawnEnemy {
            health: 20.0,
            bounty: 50.0,
        },
        &mut events,
    );
    // Walk the enemy into the grid; the spawn waypoint sits above it.
    apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(400),
        },
        &mut events,
    );

    let mut targeting = TowerTargeting::new();
    let mut targets = Vec::new();
    targeting.handle(
        &query::tower_view(&world),
        &query::enemy_view(&world),
        &mut targets,
    );

    assert_eq!(targets.len(), 1);
    let enemy = query::enemy_view(&world)
        .into_vec()
        .first()
        .copied()
        .expect("enemy alive");
    assert_eq!(targets[0].enemy, enemy.id);
    assert!(targets[0].tower_position.distance(enemy.position) < 2.0);
}
