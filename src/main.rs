//! Headless runner
//!
//! Loads a scenario (or generates one from a seed), runs it to the end and
//! prints a summary as JSON or as a text board with the event log.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tokio::runtime::Runtime;
use tokio::sync::watch;

use trolley_grid::core::error::Result;
use trolley_grid::core::SimulationConfig;
use trolley_grid::scenario::{random_scenario, Scenario};
use trolley_grid::simulation::{run_paced, run_to_completion, EngineEvent, RunStatus, Simulation};
use trolley_grid::world::EntityCatalog;

/// Run a grid crossing scenario to its end
#[derive(Parser, Debug)]
#[command(name = "trolley-grid")]
#[command(about = "Simulate an autonomous agent crossing a grid of road users")]
struct Args {
    /// Simulation config (TOML); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Entity catalog (TOML); the built-in catalog is used when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Scenario file (TOML); a random scenario is generated when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Seed for the random scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Number of static obstacles in a random scenario
    #[arg(long, default_value_t = 6)]
    obstacles: usize,

    /// Maximum ticks before the run is stopped (overrides the config)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Pace ticks in real time (one tick per tick period, in milliseconds)
    #[arg(long)]
    realtime: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    scenario: String,
    seed: Option<u64>,
    columns: u32,
    rows: u32,
    ticks: u64,
    outcome: RunStatus,
    agent_sacrificed: bool,
    events: Vec<EngineEvent>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trolley_grid=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(max_ticks) = args.max_ticks {
        config.max_ticks = max_ticks;
    }

    let catalog = match &args.catalog {
        Some(path) => EntityCatalog::load(path)?,
        None => EntityCatalog::with_defaults(),
    };

    let (scenario, seed) = match &args.scenario {
        Some(path) => (Scenario::load(path)?, None),
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            (random_scenario(&config, &catalog, seed, args.obstacles), Some(seed))
        }
    };

    let mut sim = scenario.build(&config, catalog)?;
    sim.start()?;

    let status = if args.realtime {
        let rt = Runtime::new()?;
        let period = Duration::from_millis(sim.config().tick_period);
        let (stop_tx, stop_rx) = watch::channel(false);
        rt.block_on(async {
            // Ctrl-C stops the run between ticks
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = stop_tx.send(true);
                }
            });
            run_paced(&mut sim, period, stop_rx, |report| {
                for event in &report.events {
                    eprintln!("{}", event);
                }
            })
            .await
        })
    } else {
        let max_ticks = sim.config().max_ticks;
        run_to_completion(&mut sim, max_ticks)
    };

    let summary = RunSummary {
        scenario: scenario.name.clone().unwrap_or_else(|| "unnamed".to_string()),
        seed,
        columns: sim.config().columns,
        rows: sim.config().rows,
        ticks: sim.current_tick(),
        outcome: status,
        agent_sacrificed: sim
            .registry()
            .agent(sim.catalog())
            .is_some_and(|a| a.sacrificed),
        events: sim.history().to_vec(),
    };

    match args.format.as_str() {
        "text" => print_text(&sim, &summary),
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn print_text(sim: &Simulation, summary: &RunSummary) {
    println!("=== {} ===", summary.scenario);
    if let Some(seed) = summary.seed {
        println!("Seed: {}", seed);
    }
    println!();
    println!("{}", render_board(sim));
    for event in &summary.events {
        println!("{}", event);
    }
    println!();
    println!("Outcome: {:?} after {} ticks", summary.outcome, summary.ticks);
    if summary.agent_sacrificed {
        println!("The agent sacrificed itself.");
    }
}

/// One line per row, finish line on top
fn render_board(sim: &Simulation) -> String {
    let grid = sim.grid();
    let mut out = String::new();
    for row in 1..=grid.rows {
        for column in 1..=grid.columns {
            let position = grid.position_at(row, column);
            let symbol = sim
                .registry()
                .actor_at(position)
                .and_then(|a| sim.catalog().get(&a.type_id))
                .map(|t| t.symbol.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("·");
            out.push_str(&format!("{:^3}", symbol));
        }
        out.push('\n');
    }
    out
}
