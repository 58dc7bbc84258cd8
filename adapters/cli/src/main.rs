#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Path Defence session.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use path_defence_core::{CellCoord, Event, TowerKind};
use path_defence_simulation::{Simulation, SimulationConfig, WavePhase};
use path_defence_world::query;
use tracing_subscriber::EnvFilter;

/// Headless tower-defence runner.
#[derive(Parser, Debug)]
#[command(name = "path-defence")]
#[command(about = "Runs a headless Path Defence session and prints a summary")]
struct Args {
    /// TOML file with simulation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed fixing the spawn order of every wave
    #[arg(long)]
    seed: Option<u64>,

    /// Number of waves to play
    #[arg(long, default_value_t = 3)]
    waves: u32,

    /// Length of one simulation tick in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Upper bound on simulated time in seconds
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,

    /// Tower to build before the first wave, as KIND@COLUMN,ROW
    #[arg(long = "tower", value_parser = parse_tower)]
    towers: Vec<TowerSpec>,
}

#[derive(Clone, Copy, Debug)]
struct TowerSpec {
    kind: TowerKind,
    cell: CellCoord,
}

fn parse_tower(value: &str) -> Result<TowerSpec, String> {
    let (kind, cell) = value
        .split_once('@')
        .ok_or_else(|| format!("expected KIND@COLUMN,ROW, got `{value}`"))?;
    let kind = kind.parse::<TowerKind>().map_err(|error| error.to_string())?;
    let (column, row) = cell
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW, got `{cell}`"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;

    Ok(TowerSpec {
        kind,
        cell: CellCoord::new(column, row),
    })
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.scheduler.seed = seed;
    }
    Ok(config)
}

#[derive(Debug, Default)]
struct Summary {
    waves_completed: u32,
    game_over: bool,
}

impl Summary {
    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveCompleted { wave } => {
                    self.waves_completed = self.waves_completed.max(wave.get());
                }
                Event::TowerPlacementRejected { kind, reason } => {
                    tracing::warn!(%kind, %reason, "tower not built");
                }
                Event::GameOver { .. } => self.game_over = true,
                _ => {}
            }
        }
    }
}

/// Entry point for the Path Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.tick_ms == 0 {
        bail!("--tick-ms must be at least 1");
    }

    let config = load_config(&args)?;
    let mut simulation = Simulation::new(config).context("invalid simulation configuration")?;
    let mut summary = Summary::default();

    for spec in &args.towers {
        let position = query::cell_center(simulation.world(), spec.cell);
        if let Some(tower) = simulation.place_tower(spec.kind, position) {
            tracing::info!(
                tower = tower.get(),
                kind = %spec.kind,
                cell = %spec.cell,
                "tower built"
            );
        }
        summary.observe(&simulation.drain_events());
    }

    let tick = Duration::from_millis(args.tick_ms);
    let limit = Duration::from_secs(args.max_seconds);
    while query::clock(simulation.world()) < limit
        && summary.waves_completed < args.waves
        && !summary.game_over
    {
        if simulation.phase() == WavePhase::Idle && !simulation.auto_start_pending() {
            let _ = simulation.start_wave();
        }
        let _ = simulation.tick(tick);
        summary.observe(&simulation.drain_events());
    }

    let defender = simulation.defender();
    let tally = query::tally(simulation.world());
    println!(
        "wave {} | health {} | money {} | score {} | kills {} | leaks {}",
        simulation.wave(),
        defender.health,
        defender.money,
        defender.score,
        tally.kills,
        tally.leaks,
    );
    if summary.game_over {
        println!("game over");
    }

    Ok(())
}
