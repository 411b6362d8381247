use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::ValueEnum;
use plateau_defence_core::StructureKind;
use plateau_defence_session::Session;
use serde::Serialize;

use crate::{autopilot::AutopilotStats, layout::PlateauLayout};

/// Output format of the end-of-run report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    /// Human readable summary.
    #[default]
    Text,
    /// Single JSON document.
    Json,
}

/// Final state of a headless run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Report {
    seed: u64,
    simulated_seconds: f32,
    wave: u32,
    gold: u32,
    health: u32,
    max_health: u32,
    game_over: bool,
    monsters_alive: usize,
    towers: usize,
    walls: usize,
    autopilot: AutopilotStats,
    layout: String,
}

impl Report {
    /// Captures the report from a finished session.
    pub(crate) fn capture(
        session: &Session,
        seed: u64,
        simulated_seconds: f32,
        autopilot: AutopilotStats,
    ) -> Result<Self> {
        let economy = session.economy();
        let structures = session.structures();
        let count = |kind: StructureKind| {
            structures
                .iter()
                .filter(|structure| structure.kind == kind)
                .count()
        };
        let layout = PlateauLayout::capture(session)
            .encode()
            .context("failed to encode the final layout")?;
        Ok(Self {
            seed,
            simulated_seconds,
            wave: economy.wave,
            gold: economy.gold,
            health: economy.health,
            max_health: economy.max_health,
            game_over: session.is_over(),
            monsters_alive: session.monsters().len(),
            towers: count(StructureKind::Tower),
            walls: count(StructureKind::Wall),
            autopilot,
            layout,
        })
    }

    /// Renders the report in the requested format.
    pub(crate) fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).context("failed to serialise the report")
            }
            ReportFormat::Text => {
                let mut out = String::new();
                writeln!(
                    out,
                    "seed {} after {:.1}s: wave {}, gold {}, health {}/{}",
                    self.seed,
                    self.simulated_seconds,
                    self.wave,
                    self.gold,
                    self.health,
                    self.max_health
                )?;
                writeln!(
                    out,
                    "structures: {} towers, {} walls; {} monsters alive",
                    self.towers, self.walls, self.monsters_alive
                )?;
                writeln!(
                    out,
                    "autopilot: built {}, upgraded {}, refused {}",
                    self.autopilot.built, self.autopilot.upgraded, self.autopilot.refused
                )?;
                if self.game_over {
                    writeln!(out, "the home has fallen")?;
                }
                write!(out, "layout: {}", self.layout)?;
                Ok(out)
            }
        }
    }
}
