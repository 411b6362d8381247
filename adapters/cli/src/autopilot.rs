use std::time::Duration;

use log::debug;
use plateau_defence_core::{GridCoord, StructureId, StructureKind, TileKind};
use plateau_defence_session::{Session, TapOutcome};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Counters describing what the autopilot achieved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct AutopilotStats {
    /// Structures built.
    pub(crate) built: u32,
    /// Tower upgrades bought.
    pub(crate) upgraded: u32,
    /// Taps the world refused.
    pub(crate) refused: u32,
}

/// Seeded player stand-in that builds and upgrades while gold allows.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
    elapsed: Duration,
    stats: AutopilotStats,
}

impl Autopilot {
    /// Time between two decisions.
    const DECISION_INTERVAL: Duration = Duration::from_millis(500);
    /// Gold above which upgrades take priority over new structures.
    const UPGRADE_THRESHOLD: u32 = 300;
    /// Probability of choosing a tower over a wall.
    const TOWER_BIAS: f64 = 0.75;

    /// Creates an autopilot whose choices are fully determined by `seed`.
    #[must_use]
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            elapsed: Duration::ZERO,
            stats: AutopilotStats::default(),
        }
    }

    /// Counters accumulated so far.
    #[must_use]
    pub(crate) fn stats(&self) -> AutopilotStats {
        self.stats
    }

    /// Accumulates `dt` and takes one decision per elapsed interval.
    pub(crate) fn act(&mut self, session: &mut Session, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        while self.elapsed >= Self::DECISION_INTERVAL {
            self.elapsed -= Self::DECISION_INTERVAL;
            self.decide(session);
        }
    }

    fn decide(&mut self, session: &mut Session) {
        if session.is_over() {
            return;
        }

        let gold = session.economy().gold;
        if gold >= Self::UPGRADE_THRESHOLD && self.upgrade(session) {
            return;
        }

        let kind = if self.rng.gen_bool(Self::TOWER_BIAS) {
            StructureKind::Tower
        } else {
            StructureKind::Wall
        };
        if gold < session.rules().build_cost(kind) {
            return;
        }
        if session.economy().build_mode != Some(kind) {
            let _ = session.request_build(kind);
        }

        let sites = open_sites(session);
        let Some(&tile) = sites.choose(&mut self.rng) else {
            return;
        };
        match session.tap_tile(tile) {
            Some(TapOutcome::Built(structure)) => {
                self.stats.built += 1;
                debug!(
                    "autopilot built {kind:?} {} at ({}, {})",
                    structure.get(),
                    tile.x(),
                    tile.y()
                );
            }
            Some(TapOutcome::BuildRefused(_) | TapOutcome::MoveRefused(_)) => {
                self.stats.refused += 1;
            }
            Some(TapOutcome::Walking(_)) | None => {}
        }
    }

    fn upgrade(&mut self, session: &mut Session) -> bool {
        let max_level = session.rules().tower.upgrade.max_level;
        let candidates: Vec<StructureId> = session
            .structures()
            .towers()
            .filter(|(_, tower)| tower.level < max_level)
            .map(|(structure, _)| structure.id)
            .collect();
        let Some(&tower) = candidates.choose(&mut self.rng) else {
            return false;
        };
        match session.request_upgrade(tower) {
            Ok(level) => {
                self.stats.upgraded += 1;
                debug!("autopilot upgraded tower {} to level {level}", tower.get());
                true
            }
            Err(_) => {
                self.stats.refused += 1;
                false
            }
        }
    }
}

/// Plateau tiles that currently accept the armed structure.
fn open_sites(session: &Session) -> Vec<GridCoord> {
    session
        .terrain()
        .iter()
        .filter(|tile| tile.kind == TileKind::Plateau)
        .map(|tile| tile.coord)
        .filter(|coord| {
            session
                .preview_at(*coord)
                .is_some_and(|preview| preview.placeable)
        })
        .collect()
}
