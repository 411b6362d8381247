#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Homing projectile flight.
//!
//! Every tick each projectile re-aims at its target's current position and
//! travels `speed * dt` toward it. Reaching the target requests an impact;
//! a projectile whose target vanished is discarded without effect.

use std::time::Duration;

use glam::Vec3;
use plateau_defence_core::{Command, Event, MonsterRules, MonsterView, ProjectileView};

/// Configuration parameters required to construct the projectile system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    aim_lift: f32,
}

impl Config {
    /// Creates a configuration that aims `aim_lift` above each monster.
    #[must_use]
    pub const fn new(aim_lift: f32) -> Self {
        Self { aim_lift }
    }

    /// Derives the configuration from the monster rules.
    #[must_use]
    pub fn from_rules(rules: &MonsterRules) -> Self {
        Self::new(rules.aim_lift)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_rules(&MonsterRules::default())
    }
}

/// Pure system that advances projectiles in flight.
#[derive(Debug, Default)]
pub struct Projectiles {
    config: Config,
}

impl Projectiles {
    /// Creates a projectile system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits move, impact and discard commands for every projectile.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        monsters: &MonsterView,
        out: &mut Vec<Command>,
    ) {
        let dt = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add)
            .as_secs_f32();

        for projectile in projectiles.iter() {
            let Some(target) = monsters.get(projectile.target) else {
                out.push(Command::DiscardProjectile {
                    projectile: projectile.id,
                });
                continue;
            };
            if dt <= 0.0 {
                continue;
            }

            let aim = target.position + Vec3::Y * self.config.aim_lift;
            let offset = aim - projectile.position;
            let distance = offset.length();
            let travel = projectile.speed * dt;
            if distance <= travel {
                out.push(Command::ImpactProjectile {
                    projectile: projectile.id,
                });
            } else {
                out.push(Command::MoveProjectile {
                    projectile: projectile.id,
                    position: projectile.position + offset / distance * travel,
                });
            }
        }
    }
}
