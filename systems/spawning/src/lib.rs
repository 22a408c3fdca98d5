#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.
//!
//! The system accumulates `TimeAdvanced` events against the current spawn
//! interval and, on a slower cadence, escalates the difficulty: the interval
//! shrinks while freshly spawned enemies gain health. Both cadences are
//! frame-delta accumulators, so their resolution is bounded by the frame rate.

use std::time::Duration;

use track_defence_core::{Command, Event};

const ESCALATION_INTERVAL: Duration = Duration::from_secs(5);
const ESCALATION_SPAWN_FACTOR: f32 = 0.9;
const ESCALATION_HEALTH_FACTOR: f32 = 1.4;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    enemy_health: f32,
    enemy_bounty: f32,
}

impl Config {
    /// Creates a new configuration with explicit cadence and enemy stats.
    #[must_use]
    pub const fn new(spawn_interval: Duration, enemy_health: f32, enemy_bounty: f32) -> Self {
        Self {
            spawn_interval,
            enemy_health,
            enemy_bounty,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spawn_interval: Duration::from_secs(7),
            enemy_health: 20.0,
            enemy_bounty: 50.0,
        }
    }
}

/// Pure system that deterministically emits spawn commands.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    enemy_health: f32,
    enemy_bounty: f32,
    spawn_accumulator: Duration,
    escalation_accumulator: Duration,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            enemy_health: config.enemy_health,
            enemy_bounty: config.enemy_bounty,
            spawn_accumulator: Duration::ZERO,
            escalation_accumulator: Duration::ZERO,
        }
    }

    /// Current spawn interval after any escalations.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Health the next spawned enemy will receive.
    #[must_use]
    pub fn enemy_health(&self) -> f32 {
        self.enemy_health
    }

    /// Time remaining until the next spawn attempt.
    #[must_use]
    pub fn time_until_spawn(&self) -> Duration {
        self.spawn_interval.saturating_sub(self.spawn_accumulator)
    }

    /// Consumes world events to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.spawn_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.escalate(accumulated);

        self.spawn_accumulator = self.spawn_accumulator.saturating_add(accumulated);
        while self.spawn_accumulator >= self.spawn_interval {
            self.spawn_accumulator -= self.spawn_interval;
            out.push(Command::SpawnEnemy {
                health: self.enemy_health,
                bounty: self.enemy_bounty,
            });
        }
    }

    fn escalate(&mut self, accumulated: Duration) {
        self.escalation_accumulator = self.escalation_accumulator.saturating_add(accumulated);
        while self.escalation_accumulator >= ESCALATION_INTERVAL {
            self.escalation_accumulator -= ESCALATION_INTERVAL;
            self.spawn_interval = self.spawn_interval.mul_f32(ESCALATION_SPAWN_FACTOR);
            self.enemy_health *= ESCALATION_HEALTH_FACTOR;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn no_commands_without_elapsed_time() {
        let mut spawning = Spawning::new(Config::default());
        let mut out = Vec::new();

        spawning.handle(&[], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn spawns_once_per_interval() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(2), 20.0, 50.0));
        let mut out = Vec::new();

        for _ in 0..8 {
            spawning.handle(&ticks(Duration::from_millis(500)), &mut out);
        }

        assert_eq!(out.len(), 2);
        assert!(matches!(
            out[0],
            Command::SpawnEnemy { health, bounty } if health == 20.0 && bounty == 50.0
        ));
    }

    #[test]
    fn a_long_frame_produces_multiple_spawns() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 20.0, 50.0));
        let mut out = Vec::new();

        spawning.handle(&ticks(Duration::from_secs(3)), &mut out);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn escalation_shrinks_the_interval_and_grows_health() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(7), 20.0, 50.0));
        let mut out = Vec::new();

        spawning.handle(&ticks(Duration::from_secs(5)), &mut out);

        assert_eq!(
            spawning.spawn_interval(),
            Duration::from_secs(7).mul_f32(0.9)
        );
        assert!((spawning.enemy_health() - 28.0).abs() < 1e-4);
    }

    #[test]
    fn escalated_health_applies_to_subsequent_spawns() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(6), 20.0, 50.0));
        let mut out = Vec::new();

        // One escalation elapses before the first spawn fires.
        spawning.handle(&ticks(Duration::from_secs(5)), &mut out);
        assert!(out.is_empty());
        spawning.handle(&ticks(Duration::from_secs(1)), &mut out);

        assert_eq!(out.len(), 1);
        assert!(matches!(
            out[0],
            Command::SpawnEnemy { health, .. } if (health - 28.0).abs() < 1e-4
        ));
    }

    #[test]
    fn zero_interval_configuration_stays_silent() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, 20.0, 50.0));
        let mut out = Vec::new();

        spawning.handle(&ticks(Duration::from_secs(10)), &mut out);
        assert!(out.is_empty());
    }
}
