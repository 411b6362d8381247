#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Proximity blocking between moving units and placed colliders.
//!
//! Overlap is a full 3D sphere test, so a unit on the ramp can slip past a
//! wall standing on the plateau edge above it.

use std::fmt;

use glam::Vec3;
use plateau_defence_core::{Contact, StructureId, StructureView, UnitKind};

/// Identity of a collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderKind {
    /// The home structure at the end of the path.
    Home,
    /// A tower or wall.
    Structure(StructureId),
}

/// Circular footprint that moving units may not overlap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    /// Identity of the collider.
    pub kind: ColliderKind,
    /// Collider centre.
    pub position: Vec3,
    /// Collider radius.
    pub radius: f32,
}

impl Collider {
    /// Reports whether a unit of `radius` at `position` overlaps the collider.
    #[must_use]
    pub fn overlaps(&self, position: Vec3, radius: f32) -> bool {
        self.position.distance(position) < self.radius + radius
    }
}

/// Colliders captured once per frame, home first, then structures by identifier.
#[derive(Clone, Debug, Default)]
pub struct Colliders {
    entries: Vec<Collider>,
}

impl Colliders {
    /// Captures the home and every structure in the view.
    #[must_use]
    pub fn capture(home: Vec3, home_radius: f32, structures: &StructureView) -> Self {
        let mut entries = Vec::with_capacity(structures.len() + 1);
        entries.push(Collider {
            kind: ColliderKind::Home,
            position: home,
            radius: home_radius,
        });
        entries.extend(structures.iter().map(|structure| Collider {
            kind: ColliderKind::Structure(structure.id),
            position: structure.position,
            radius: structure.radius,
        }));
        Self { entries }
    }

    /// Iterator over the colliders in probe order.
    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.entries.iter()
    }
}

/// Decides what happens when a unit moves to a proposed position.
pub trait BlockingStrategy: fmt::Debug {
    /// Probes the proposed position of a unit against every collider.
    fn resolve(&self, colliders: &Colliders, unit: UnitKind, position: Vec3, radius: f32)
        -> Contact;
}

/// Hard blocking: structures stop units and monsters touching the home leak.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blocking;

impl BlockingStrategy for Blocking {
    fn resolve(
        &self,
        colliders: &Colliders,
        unit: UnitKind,
        position: Vec3,
        radius: f32,
    ) -> Contact {
        for collider in colliders.iter() {
            if !collider.overlaps(position, radius) {
                continue;
            }
            match (collider.kind, unit) {
                (ColliderKind::Home, UnitKind::Monster) => return Contact::Home,
                (ColliderKind::Home, UnitKind::Hero) => continue,
                (ColliderKind::Structure(id), _) => return Contact::Structure(id),
            }
        }
        Contact::Clear
    }
}

/// Units ignore colliders; only reaching the end of the path matters.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl BlockingStrategy for PassThrough {
    fn resolve(
        &self,
        _colliders: &Colliders,
        _unit: UnitKind,
        _position: Vec3,
        _radius: f32,
    ) -> Contact {
        Contact::Clear
    }
}

/// Selector for the blocking strategy a session is built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockingMode {
    /// Structures block units.
    #[default]
    Blocking,
    /// Units pass through structures.
    PassThrough,
}

impl BlockingMode {
    /// Instantiates the selected strategy.
    #[must_use]
    pub fn strategy(self) -> Box<dyn BlockingStrategy> {
        match self {
            Self::Blocking => Box::new(Blocking),
            Self::PassThrough => Box::new(PassThrough),
        }
    }
}
