//! Autonomous goal-driven traversal agent.
//!
//! One [`Agent::tick`] is a complete read-decide-act cycle: read the player position,
//! update visited tiles and stuck tracking, snapshot the remaining inputs, let the
//! arbiter pick one goal, dispatch it into at most one concrete command, advance the
//! collaborator's movement system, and emit exactly one [`Telemetry`] record.
//!
//! The agent never halts its host. Collaborator failures are caught at the tick
//! boundary and reported in the record's `errors`.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::AgentError;
use crate::grid::CollisionGrid;
use crate::telemetry::{Telemetry, TelemetryLog};
use crate::types::*;
use crate::world::World;

pub mod arbiter;
pub mod combat;
mod dispatch;
pub mod exploration;
pub mod pathfinding;
pub mod quests;
pub mod stuck;

#[cfg(test)]
mod test_support;

pub use arbiter::{Goal, GoalInputs, evaluate_goals};
pub use stuck::StuckDetector;

/// Immutable per-run configuration. Grid and quest chains are borrowed read-only.
#[derive(Clone, Debug)]
pub struct AgentConfig<'a> {
    pub strategy: Strategy,
    pub grid: &'a CollisionGrid,
    pub tile_size: u32,
    pub map_name: String,
    pub quest_chains: &'a [QuestChain],
    pub tuning: Tuning,
}

impl<'a> AgentConfig<'a> {
    pub fn new(grid: &'a CollisionGrid, tile_size: u32) -> Self {
        Self {
            strategy: Strategy::default(),
            grid,
            tile_size,
            map_name: String::new(),
            quest_chains: &[],
            tuning: Tuning::default(),
        }
    }
}

/// Mutable state owned exclusively by one agent.
#[derive(Clone, Debug)]
pub struct AgentState {
    pub screen: Screen,
    pub current_goal: GoalType,
    pub combat_state: Option<CombatState>,
    pub quest_tracker: QuestTracker,
    pub current_path: Path,
    pub path_index: usize,
    pub visited_tiles: BTreeSet<usize>,
    pub tick_count: u64,
    pub facing: Facing,
    pub stuck: StuckDetector,
    pub telemetry: TelemetryLog,
}

/// Inputs read once at the start of a tick and used for the rest of it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TickSnapshot {
    pub(crate) tile: Tile,
    pub(crate) hp_ratio: Option<f64>,
    pub(crate) interactable: Option<EntityRef>,
}

pub struct Agent<'a, W: World> {
    config: AgentConfig<'a>,
    world: W,
    state: AgentState,
}

impl<'a, W: World> Agent<'a, W> {
    pub fn new(config: AgentConfig<'a>, world: W) -> Self {
        let state = AgentState {
            screen: Screen::default(),
            current_goal: GoalType::Idle,
            combat_state: None,
            quest_tracker: QuestTracker::new(),
            current_path: Vec::new(),
            path_index: 0,
            visited_tiles: BTreeSet::new(),
            tick_count: 0,
            facing: Facing::default(),
            stuck: StuckDetector::new(config.tuning.stuck_threshold),
            telemetry: TelemetryLog::new(config.tuning.telemetry_retention),
        };
        Self { config, world, state }
    }

    pub fn tick(&mut self, delta_time: f64) -> Telemetry {
        self.state.tick_count += 1;
        let mut errors = Vec::new();

        let position = match self.world.player_position() {
            Ok(Some(position)) => Some(position),
            Ok(None) => {
                record_error(&mut errors, AgentError::NoPlayerEntity);
                None
            }
            Err(err) => {
                record_error(&mut errors, err.into());
                None
            }
        };

        let mut tile = None;
        let action = match position {
            Some(pixels) => {
                let current = self.pixel_to_tile(pixels);
                tile = Some(current);
                exploration::mark_visited(
                    &mut self.state.visited_tiles,
                    current.x,
                    current.y,
                    self.config.grid.width(),
                    self.config.grid.height(),
                );
                self.observe_stuck(pixels);

                let snapshot = self.read_snapshot(current, &mut errors);
                let goal = self.select_goal(&snapshot);
                self.state.current_goal = goal.kind();
                match self.execute(goal, &snapshot) {
                    Ok(action) => action,
                    Err(err) => {
                        record_error(&mut errors, err);
                        format!("{}:error", goal_label(self.state.current_goal))
                    }
                }
            }
            None => {
                self.state.current_goal = GoalType::Idle;
                "no-player".to_string()
            }
        };

        if let Err(err) = self.world.apply_movement_step(self.config.grid, delta_time) {
            record_error(&mut errors, err.into());
        }

        let record = Telemetry {
            tick: self.state.tick_count,
            position: tile,
            current_goal: self.state.current_goal,
            action,
            quest_state: self.quest_state_summary(),
            errors,
        };
        tracing::debug!(
            tick = record.tick,
            goal = ?record.current_goal,
            action = %record.action,
            "tick complete"
        );
        self.state.telemetry.push(record.clone());
        record
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.config.strategy = strategy;
    }

    pub fn set_screen(&mut self, screen: Screen) {
        self.state.screen = screen;
    }

    pub fn set_combat_state(&mut self, combat_state: Option<CombatState>) {
        self.state.combat_state = combat_state;
    }

    pub fn set_quest_tracker(&mut self, tracker: QuestTracker) {
        self.state.quest_tracker = tracker;
    }

    pub fn current_goal(&self) -> GoalType {
        self.state.current_goal
    }

    pub fn telemetry_log(&self) -> &TelemetryLog {
        &self.state.telemetry
    }

    pub fn drain_telemetry(&mut self) -> Vec<Telemetry> {
        self.state.telemetry.drain()
    }

    pub fn is_stuck(&self) -> bool {
        self.state.stuck.is_stuck()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn config(&self) -> &AgentConfig<'a> {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn into_world(self) -> W {
        self.world
    }

    fn pixel_to_tile(&self, (px, py): (f64, f64)) -> Tile {
        let size = f64::from(self.config.tile_size.max(1));
        Tile::new((px / size).floor() as i32, (py / size).floor() as i32)
    }

    fn observe_stuck(&mut self, pixels: (f64, f64)) {
        let was_stuck = self.state.stuck.is_stuck();
        self.state.stuck.observe(pixels);
        if self.state.stuck.is_stuck() && !was_stuck {
            tracing::info!(
                tick = self.state.tick_count,
                stuck_ticks = self.state.stuck.stuck_ticks(),
                "agent position unchanged past stuck threshold"
            );
        }
    }

    fn read_snapshot(&self, tile: Tile, errors: &mut Vec<String>) -> TickSnapshot {
        let hp_ratio = self.world.player_health().unwrap_or_else(|err| {
            record_error(errors, err.into());
            None
        });
        let interactable =
            self.world.find_interactable(tile, self.state.facing).unwrap_or_else(|err| {
                record_error(errors, err.into());
                None
            });
        TickSnapshot { tile, hp_ratio, interactable }
    }

    fn select_goal(&self, snapshot: &TickSnapshot) -> Goal<'a> {
        let chains = self.config.quest_chains;
        let tracker = &self.state.quest_tracker;
        let prioritize_main = self.config.strategy.prioritize_main_quest;
        let inputs = GoalInputs {
            screen: self.state.screen,
            has_combat_state: self.state.combat_state.is_some(),
            hp_ratio: snapshot.hp_ratio,
            quest: quests::next_objective(tracker, chains, prioritize_main),
            main_quest_available: quests::next_objective(tracker, chains, true)
                .is_some_and(|next| next.is_main_quest),
            explore_all_areas: self.config.strategy.explore_all_areas,
            has_active_path: self.has_active_path(),
            interactable: snapshot.interactable,
        };
        evaluate_goals(&inputs)
    }

    fn has_active_path(&self) -> bool {
        !self.state.current_path.is_empty() && self.state.path_index < self.state.current_path.len()
    }

    fn quest_state_summary(&self) -> BTreeMap<String, String> {
        let mut summary: BTreeMap<String, String> = self
            .config
            .quest_chains
            .iter()
            .map(|chain| {
                let status = quests::quest_status(&self.state.quest_tracker, &chain.id);
                (chain.id.0.clone(), status.label().to_string())
            })
            .collect();
        for (id, state) in &self.state.quest_tracker {
            summary.entry(id.0.clone()).or_insert_with(|| state.status.label().to_string());
        }
        summary
    }
}

fn record_error(errors: &mut Vec<String>, err: AgentError) {
    tracing::warn!(error = %err, "tick error");
    errors.push(err.to_string());
}

pub(crate) fn goal_label(goal: GoalType) -> &'static str {
    match goal {
        GoalType::Idle => "idle",
        GoalType::Navigate => "navigate",
        GoalType::Explore => "explore",
        GoalType::Interact => "interact",
        GoalType::Combat => "combat",
        GoalType::Quest => "quest",
        GoalType::Heal => "heal",
    }
}
