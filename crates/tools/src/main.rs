use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use autoplay::sim::{DEFAULT_TICK_RATE, advance_quests};
use autoplay::telemetry::{digest, write_jsonl};
use autoplay::{Agent, QuestTracker, load_scenario};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario TOML file to play
    #[arg(short, long)]
    scenario: PathBuf,
    #[arg(short, long, default_value_t = 2000)]
    ticks: u64,
    /// Write every telemetry record to this file as JSON lines
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Keep playing after the agent reports it is stuck
    #[arg(long)]
    ignore_stuck: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let scenario = load_scenario(&args.scenario)
        .with_context(|| format!("Failed to load scenario: {}", args.scenario.display()))?;

    let mut agent = Agent::new(scenario.agent_config(), scenario.build_world());
    let mut tracker = QuestTracker::new();
    let mut records = Vec::new();
    let delta_time = 1.0 / DEFAULT_TICK_RATE;

    for _ in 0..args.ticks {
        agent.tick(delta_time);
        let drained = agent.drain_telemetry();
        let finished_exploring = drained.iter().any(|r| r.action == "explore:complete");
        let idle = drained.last().is_some_and(|r| r.action == "idle");
        records.extend(drained);

        if let Some(tile) = agent.world().player_tile()
            && advance_quests(&mut tracker, &scenario.quests, tile)
        {
            tracing::info!(tick = records.len(), ?tracker, "quest progress");
            agent.set_quest_tracker(tracker.clone());
        }

        if finished_exploring && agent.config().strategy.explore_all_areas {
            let mut strategy = agent.config().strategy.clone();
            strategy.explore_all_areas = false;
            agent.set_strategy(strategy);
        }
        if idle {
            tracing::info!(tick = records.len(), "nothing left to do");
            break;
        }
        if agent.is_stuck() && !args.ignore_stuck {
            tracing::warn!(tick = records.len(), "agent stuck, stopping scenario");
            break;
        }
    }

    if let Some(path) = &args.out {
        let file = File::create(path)
            .with_context(|| format!("Failed to create telemetry file: {}", path.display()))?;
        write_jsonl(BufWriter::new(file), &records)
            .with_context(|| format!("Failed to write telemetry to {}", path.display()))?;
    }

    let error_count: usize = records.iter().map(|r| r.errors.len()).sum();
    println!("Scenario: {}", scenario.name);
    println!("Ticks: {}", records.len());
    println!("Final goal: {:?}", agent.current_goal());
    println!("Stuck: {}", agent.is_stuck());
    println!("Errors: {error_count}");
    println!("Telemetry digest: {:016x}", digest(&records));

    Ok(())
}
