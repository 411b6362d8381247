#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system for monsters and the hero.
//!
//! Monsters walk waypoint to waypoint along the invasion path. The hero is
//! driven either by a click-to-move target or by the joystick; both feed the
//! same integrator. Every proposed position is probed through a caller
//! supplied contact function before a move is committed.

use std::{f32::consts::FRAC_1_SQRT_2, time::Duration};

use glam::{Vec2, Vec3};
use plateau_defence_core::{
    Command, Contact, Event, HeroRules, HeroSnapshot, MonsterView, TerrainView, UnitKind,
};

/// Ground-plane direction of "up" on screen for the isometric camera.
const SCREEN_UP: Vec3 = Vec3::new(-FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2);
/// Ground-plane direction of "right" on screen for the isometric camera.
const SCREEN_RIGHT: Vec3 = Vec3::new(FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2);

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    arrival_epsilon: f32,
}

impl Config {
    /// Creates a configuration with the distance under which the hero counts
    /// as having reached its click-to-move target.
    #[must_use]
    pub const fn new(arrival_epsilon: f32) -> Self {
        Self { arrival_epsilon }
    }

    /// Derives the configuration from the hero rules.
    #[must_use]
    pub fn from_rules(rules: &HeroRules) -> Self {
        Self::new(rules.arrival_epsilon)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_rules(&HeroRules::default())
    }
}

/// Pure system that reacts to elapsed time and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates a movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Advances every monster toward its current waypoint.
    ///
    /// Reaching the final waypoint or touching the home leaks the monster. A
    /// blocked monster keeps its position and path index and attacks the
    /// structure in its way.
    pub fn handle_monsters<F>(
        &mut self,
        events: &[Event],
        monsters: &MonsterView,
        path_len: usize,
        contact: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(UnitKind, Vec3, f32) -> Contact,
    {
        let dt = elapsed_seconds(events);
        if dt <= 0.0 {
            return;
        }

        for monster in monsters.iter() {
            let offset = monster.waypoint - monster.position;
            let distance = offset.length();
            let travel = monster.speed * dt;

            let (position, path_index) = if distance <= travel {
                let next = monster.path_index + 1;
                if next >= path_len {
                    out.push(Command::LeakMonster {
                        monster: monster.id,
                    });
                    continue;
                }
                (monster.waypoint, next)
            } else {
                (
                    monster.position + offset / distance * travel,
                    monster.path_index,
                )
            };

            match contact(UnitKind::Monster, position, monster.radius) {
                Contact::Clear => out.push(Command::MoveMonster {
                    monster: monster.id,
                    position,
                    path_index,
                }),
                Contact::Home => out.push(Command::LeakMonster {
                    monster: monster.id,
                }),
                Contact::Structure(structure) => out.push(Command::BlockMonster {
                    monster: monster.id,
                    structure,
                    damage: monster.attack * dt,
                }),
            }
        }
    }

    /// Integrates the hero's joystick or click-to-move intent.
    ///
    /// A deflected joystick takes precedence over a click target. Joystick
    /// movement stops at tiles that cannot be walked on.
    pub fn handle_hero<F>(
        &mut self,
        events: &[Event],
        hero: &HeroSnapshot,
        terrain: &TerrainView,
        contact: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(UnitKind, Vec3, f32) -> Contact,
    {
        let dt = elapsed_seconds(events);
        if dt <= 0.0 {
            return;
        }

        if hero.joystick != Vec2::ZERO {
            let heading = SCREEN_RIGHT * hero.joystick.x + SCREEN_UP * hero.joystick.y;
            let mut position = hero.position + heading * hero.speed * dt;
            let tile = terrain.geometry().locate(position);
            let Some(surface) = terrain.tile(tile).filter(|surface| surface.walkable) else {
                return;
            };
            position.y = surface.height;
            if matches!(
                contact(UnitKind::Hero, position, hero.radius),
                Contact::Structure(_)
            ) {
                return;
            }
            out.push(Command::MoveHero {
                position,
                arrived: false,
            });
            return;
        }

        let Some(target) = hero.target else {
            return;
        };
        let destination = terrain.grid_to_world(target, 0.0);
        let offset = destination - hero.position;
        let distance = offset.length();
        if distance <= self.config.arrival_epsilon {
            out.push(Command::MoveHero {
                position: destination,
                arrived: true,
            });
            return;
        }

        let travel = (hero.speed * dt).min(distance);
        let mut position = hero.position + offset / distance * travel;
        position.y = destination.y;
        match contact(UnitKind::Hero, position, hero.radius) {
            Contact::Structure(_) => out.push(Command::BlockHero),
            Contact::Clear | Contact::Home => out.push(Command::MoveHero {
                position,
                arrived: false,
            }),
        }
    }
}

/// Total simulated time carried by the batch, in seconds.
fn elapsed_seconds(events: &[Event]) -> f32 {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
        .as_secs_f32()
}
