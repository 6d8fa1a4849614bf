use std::io;

use anyhow::{Result, ensure};
use autoplay::sim::{DEFAULT_TICK_RATE, GridWorld, advance_quests};
use autoplay::{
    ActorId, Agent, AgentConfig, CollisionGrid, CombatState, CombatStyle, Combatant, Objective,
    QuestChain, QuestId, QuestStatus, QuestTracker, Screen, Side, Skill, Strategy, Tile,
};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,
    #[arg(long, default_value_t = 24)]
    width: usize,
    #[arg(long, default_value_t = 16)]
    height: usize,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn chance(rng: &mut ChaCha8Rng, percent: u64) -> bool {
    rng.next_u64() % 100 < percent
}

/// Walled border with roughly a quarter of the interior blocked.
fn random_grid(rng: &mut ChaCha8Rng, width: usize, height: usize) -> CollisionGrid {
    let mut grid = CollisionGrid::open(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let border = x == 0 || y == 0 || x == width as i32 - 1 || y == height as i32 - 1;
            if border || chance(rng, 25) {
                grid.set_blocked(Tile::new(x, y), true);
            }
        }
    }
    grid
}

fn open_tiles(grid: &CollisionGrid) -> Vec<Tile> {
    (0..grid.cells().len())
        .map(|idx| grid.tile_at(idx))
        .filter(|tile| grid.is_traversable(*tile))
        .collect()
}

fn random_quests(rng: &mut ChaCha8Rng, open: &[Tile]) -> Vec<QuestChain> {
    let count = rng.next_u64() % 5;
    let mut chains: Vec<QuestChain> = Vec::new();
    for i in 0..count {
        let dependencies = if !chains.is_empty() && chance(rng, 40) {
            vec![choose(rng, &chains).id]
        } else {
            Vec::new()
        };
        let objectives = (0..1 + rng.next_u64() % 3)
            .map(|step| {
                let tile = choose(rng, open);
                let description = format!("step {step}");
                Objective { target_x: tile.x, target_y: tile.y, description }
            })
            .collect();
        chains.push(QuestChain {
            id: QuestId(format!("q{i}")),
            is_main_quest: chance(rng, 50),
            dependencies,
            objectives,
        });
    }
    chains
}

fn random_battle(rng: &mut ChaCha8Rng) -> CombatState {
    let combatant = |id: u32, side: Side, rng: &mut ChaCha8Rng| Combatant {
        id: ActorId(id),
        side,
        hp: 1 + (rng.next_u64() % 20) as i32,
        max_hp: 20,
        attack: 3,
        mana: (rng.next_u64() % 10) as i32,
        skills: vec![Skill { name: "bolt".to_string(), power: 6, mana_cost: 4 }],
        potions: (rng.next_u64() % 2) as u32,
    };
    let combatants = vec![
        combatant(1, Side::Party, rng),
        combatant(2, Side::Enemy, rng),
        combatant(3, Side::Enemy, rng),
    ];
    CombatState {
        turn_order: combatants.iter().map(|c| c.id).collect(),
        current_turn_index: (rng.next_u64() % 3) as usize,
        combatants,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    ensure!(args.width >= 3 && args.height >= 3, "grid must be at least 3x3");

    println!(
        "Starting fuzz harness on seed {} for {} ticks on a {}x{} grid...",
        args.seed, args.ticks, args.width, args.height
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut grid = random_grid(&mut rng, args.width, args.height);
    let mut open = open_tiles(&grid);
    if open.is_empty() {
        let center = Tile::new(args.width as i32 / 2, args.height as i32 / 2);
        grid.set_blocked(center, false);
        open.push(center);
    }
    let quests = random_quests(&mut rng, &open);
    let strategy = Strategy {
        explore_all_areas: chance(&mut rng, 70),
        prioritize_main_quest: chance(&mut rng, 70),
        combat_style: choose(
            &mut rng,
            &[CombatStyle::Aggressive, CombatStyle::Balanced, CombatStyle::Defensive],
        ),
    };
    let start = choose(&mut rng, &open);

    let config = AgentConfig { strategy, quest_chains: &quests, ..AgentConfig::new(&grid, 16) };
    let mut agent = Agent::new(config, GridWorld::new(16).with_player_at(start));
    let mut tracker = QuestTracker::new();
    let mut battle_ticks = 0u32;

    for tick in 1..=args.ticks {
        if battle_ticks == 0 && chance(&mut rng, 2) {
            battle_ticks = 1 + (rng.next_u64() % 5) as u32;
            agent.set_screen(Screen::Combat);
            agent.set_combat_state(Some(random_battle(&mut rng)));
        }

        let record = agent.tick(1.0 / DEFAULT_TICK_RATE);
        ensure!(record.tick == tick, "expected record for tick {tick}, got {}", record.tick);
        ensure!(record.errors.is_empty(), "tick {tick} reported errors: {:?}", record.errors);
        if battle_ticks > 0 {
            ensure!(
                record.action.starts_with("combat:") || record.action.starts_with("heal:"),
                "tick {tick} ignored combat: {}",
                record.action
            );
            battle_ticks -= 1;
            if battle_ticks == 0 {
                agent.set_screen(Screen::Overworld);
                agent.set_combat_state(None);
            }
        }

        let tile = agent.world().player_tile();
        ensure!(
            tile.is_some_and(|tile| grid.is_traversable(tile)),
            "tick {tick}: player on blocked tile {tile:?}"
        );
        if let Some(tile) = tile
            && advance_quests(&mut tracker, &quests, tile)
        {
            agent.set_quest_tracker(tracker.clone());
        }
        agent.drain_telemetry();
    }

    let completed = tracker.values().filter(|state| state.status == QuestStatus::Completed).count();
    println!(
        "Fuzzing completed: {} quests declared, {} completed, stuck={}",
        quests.len(),
        completed,
        agent.is_stuck()
    );
    Ok(())
}
