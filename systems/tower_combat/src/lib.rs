#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits bullet firing commands from targeting data.

use track_defence_core::{Command, TowerId, TowerSnapshot, TowerTarget, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireBullet` entries for towers whose cooldown elapsed.
    ///
    /// Towers without a target keep their banked shot; the world clears the
    /// readiness flag only when a bullet actually spawns.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        let snapshots = towers.iter().copied().collect::<Vec<_>>();
        if snapshots.is_empty() {
            return;
        }

        self.scratch.clear();
        for target in tower_targets {
            if let Some(snapshot) = find_tower(&snapshots, target.tower) {
                if snapshot.ready_to_fire {
                    self.scratch.push(Command::FireBullet {
                        tower: target.tower,
                        target: target.enemy,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_tower(snapshots: &[TowerSnapshot], tower: TowerId) -> Option<&TowerSnapshot> {
    snapshots
        .binary_search_by_key(&tower, |snapshot| snapshot.id)
        .ok()
        .map(|index| &snapshots[index])
}
