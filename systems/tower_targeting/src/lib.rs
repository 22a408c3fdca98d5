#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec2;
use track_defence_core::{EnemyId, EnemyView, TowerTarget, TowerView};

/// Tower targeting system that reuses a scratch buffer to avoid reallocation.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// A tower targets the nearest living enemy strictly within its range;
    /// candidates are visited in identifier order and a strict comparison
    /// keeps the first-found enemy on distance ties. The output buffer is
    /// cleared before it is repopulated.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() {
            return;
        }

        self.enemy_workspace.clear();
        self.enemy_workspace.extend(enemies.iter().filter_map(|snapshot| {
            (snapshot.health > 0.0).then_some(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            })
        }));
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in towers.iter() {
            let tower_position = tower.origin.position();
            let mut best: Option<EnemyCandidate> = None;
            let mut min_distance = tower.range;

            for candidate in &self.enemy_workspace {
                let distance = tower_position.distance(candidate.position);
                if distance < min_distance {
                    min_distance = distance;
                    best = Some(*candidate);
                }
            }

            if let Some(candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: candidate.id,
                    tower_position,
                    enemy_position: candidate.position,
                });
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}
