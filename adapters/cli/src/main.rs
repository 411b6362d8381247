#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Plateau Defence headless under a seeded autopilot.

mod autopilot;
mod headless;
mod layout;
mod report;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use plateau_defence_core::{Rules, TerrainRules};
use plateau_defence_rendering::{Presentation, RenderingBackend};
use plateau_defence_session::{Config, Session};
use plateau_defence_system_collision::BlockingMode;

use self::{
    autopilot::Autopilot,
    headless::HeadlessBackend,
    layout::PlateauLayout,
    report::{Report, ReportFormat},
};

/// Command-line arguments accepted by the binary.
#[derive(Debug, Parser)]
#[command(name = "plateau-defence", about = "Headless Plateau Defence simulation")]
struct Cli {
    /// TOML file overriding the stock rules; missing keys keep their defaults.
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,
    /// Simulated time to run, in seconds.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Whether structures block units.
    #[arg(long, value_enum, default_value_t = Variant::Blocking)]
    variant: Variant,
    /// Seed for the autopilot's choices.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Layout string from an earlier report to rebuild before the first frame.
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<String>,
    /// Output format of the final report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

/// Collision variant selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Structures block monsters and the hero.
    Blocking,
    /// Units walk through structures.
    PassThrough,
}

impl From<Variant> for BlockingMode {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Blocking => Self::Blocking,
            Variant::PassThrough => Self::PassThrough,
        }
    }
}

/// Entry point for the Plateau Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let rules = match &cli.rules {
        Some(path) => load_rules(path)?,
        None => Rules::default(),
    };
    let mut session = Session::new(Config::new(rules, cli.variant.into()));
    info!("{}", session.welcome_banner());
    if let Some(encoded) = &cli.layout {
        let layout = PlateauLayout::decode(encoded).context("failed to decode --layout")?;
        let rebuilt = layout
            .restore(&mut session)
            .context("failed to rebuild --layout")?;
        info!("rebuilt {rebuilt} structures from the supplied layout");
    }

    let backend = HeadlessBackend::new(cli.fps, cli.seconds)?;
    let presentation = Presentation::new(
        "Plateau Defence",
        Presentation::CLEAR_COLOR,
        session.scene(),
    );
    let mut autopilot = Autopilot::new(cli.seed);
    let mut frames = 0_u32;
    backend.run(presentation, |dt, input, scene| {
        frames += 1;
        autopilot.act(&mut session, dt);
        let _ = session.apply_input(input);
        session.advance(dt.as_secs_f32());
        *scene = session.scene();
        !session.is_over()
    })?;

    let simulated = backend.frame().as_secs_f32() * frames as f32;
    let report = Report::capture(&session, cli.seed, simulated, autopilot.stats())?;
    println!("{}", report.render(cli.report)?);
    Ok(())
}

/// Reads a rules file; keys it leaves out keep their stock values.
fn load_rules(path: &Path) -> Result<Rules> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file at {}", path.display()))?;
    parse_rules(&contents).with_context(|| format!("invalid rules file {}", path.display()))
}

fn parse_rules(contents: &str) -> Result<Rules> {
    let rules: Rules = toml::from_str(contents).context("failed to parse rules toml contents")?;
    ensure!(
        rules.terrain.map_size <= TerrainRules::MAX_MAP_SIZE,
        "map size {} exceeds the limit of {} tiles",
        rules.terrain.map_size,
        TerrainRules::MAX_MAP_SIZE
    );
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_rules_keep_stock_values() {
        let rules = parse_rules(
            r#"
            [economy]
            starting_gold = 900

            [tower]
            range = 36.0
            "#,
        )
        .expect("rules parse");
        assert_eq!(rules.economy.starting_gold, 900);
        assert_eq!(rules.economy.starting_health, 100);
        assert_eq!(rules.tower.range, 36.0);
        assert_eq!(rules.tower.cost, 100);
    }

    #[test]
    fn malformed_rules_report_context() {
        let error = parse_rules("economy = 3").expect_err("type mismatch");
        assert!(error.to_string().contains("rules toml"));
    }

    #[test]
    fn oversized_maps_are_rejected() {
        let error = parse_rules(
            r#"
            [terrain]
            map_size = 50000
            "#,
        )
        .expect_err("map too large");
        assert!(error.to_string().contains("exceeds the limit"));
    }

    #[test]
    fn arguments_parse_with_defaults() {
        let cli = Cli::try_parse_from(["plateau-defence"]).expect("defaults parse");
        assert_eq!(cli.fps, 60);
        assert_eq!(cli.variant, Variant::Blocking);
        assert_eq!(cli.report, ReportFormat::Text);

        let cli = Cli::try_parse_from([
            "plateau-defence",
            "--variant",
            "pass-through",
            "--report",
            "json",
            "--seed",
            "11",
            "-v",
        ])
        .expect("flags parse");
        assert_eq!(BlockingMode::from(cli.variant), BlockingMode::PassThrough);
        assert_eq!(cli.report, ReportFormat::Json);
        assert_eq!(cli.seed, 11);
        assert!(cli.verbose);
    }
}
