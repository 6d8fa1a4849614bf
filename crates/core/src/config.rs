//! Scenario files: a TOML description of one map, the agent's strategy and the
//! quest chains it should pursue.
//!
//! ```toml
//! [map]
//! name = "meadow"
//! tile_size = 16
//! rows = [
//!     "#######",
//!     "#@..!.#",
//!     "#######",
//! ]
//!
//! [strategy]
//! explore_all_areas = true
//! combat_style = "balanced"
//!
//! [[quests]]
//! id = "delivery"
//! is_main_quest = true
//! [[quests.objectives]]
//! target_x = 5
//! target_y = 1
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::agent::AgentConfig;
use crate::error::ConfigError;
use crate::grid::CollisionGrid;
use crate::sim::GridWorld;
use crate::types::{QuestChain, Strategy, Tile, Tuning};

const BLOCKED: char = '#';
const OPEN: char = '.';
const PLAYER_START: char = '@';
const INTERACTABLE: char = '!';

#[derive(Clone, Debug, Deserialize)]
struct ScenarioFile {
    map: MapSection,
    #[serde(default)]
    strategy: Strategy,
    #[serde(default)]
    tuning: Tuning,
    #[serde(default)]
    player: PlayerStats,
    #[serde(default)]
    quests: Vec<QuestChain>,
}

#[derive(Clone, Debug, Deserialize)]
struct MapSection {
    #[serde(default)]
    name: String,
    #[serde(default = "default_tile_size")]
    tile_size: u32,
    #[serde(default = "default_interactable_kind")]
    interactable_kind: String,
    rows: Vec<String>,
}

fn default_tile_size() -> u32 {
    16
}

fn default_interactable_kind() -> String {
    "sign".to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub hp: i32,
    pub max_hp: i32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self { hp: 20, max_hp: 20 }
    }
}

/// A validated scenario, ready to build an agent configuration and a world from.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: String,
    pub tile_size: u32,
    pub grid: CollisionGrid,
    pub start: Tile,
    /// Single-use interactables marked `!` on the map, in raster order.
    pub interactables: Vec<Tile>,
    pub interactable_kind: String,
    pub strategy: Strategy,
    pub tuning: Tuning,
    pub player: PlayerStats,
    pub quests: Vec<QuestChain>,
}

impl Scenario {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ScenarioFile = toml::from_str(source)?;
        Self::validate(file)
    }

    /// Borrows the grid and quest chains, so the scenario must outlive the agent.
    pub fn agent_config(&self) -> AgentConfig<'_> {
        AgentConfig {
            strategy: self.strategy.clone(),
            grid: &self.grid,
            tile_size: self.tile_size,
            map_name: self.name.clone(),
            quest_chains: &self.quests,
            tuning: self.tuning.clone(),
        }
    }

    pub fn build_world(&self) -> GridWorld {
        let mut world = GridWorld::new(self.tile_size).with_player_at(self.start);
        world.set_health(self.player.hp, self.player.max_hp);
        for tile in &self.interactables {
            world.add_interactable(*tile, &self.interactable_kind, Some(1));
        }
        world
    }

    fn validate(file: ScenarioFile) -> Result<Self, ConfigError> {
        let ScenarioFile { map, strategy, tuning, player, quests } = file;
        if map.tile_size == 0 {
            return Err(ConfigError::InvalidMap("tile_size must be positive".to_string()));
        }

        let (grid, start, interactables) = parse_rows(&map.rows)?;

        let declared: BTreeSet<&str> = quests.iter().map(|chain| chain.id.0.as_str()).collect();
        for chain in &quests {
            if let Some(dependency) =
                chain.dependencies.iter().find(|dep| !declared.contains(dep.0.as_str()))
            {
                return Err(ConfigError::UnknownDependency {
                    quest: chain.id.to_string(),
                    dependency: dependency.to_string(),
                });
            }
            if let Some(objective) =
                chain.objectives.iter().find(|objective| !grid.in_bounds(objective.target()))
            {
                return Err(ConfigError::ObjectiveOutOfBounds {
                    quest: chain.id.to_string(),
                    x: objective.target_x,
                    y: objective.target_y,
                });
            }
        }

        tracing::debug!(
            map = %map.name,
            width = grid.width(),
            height = grid.height(),
            quests = quests.len(),
            "scenario validated"
        );

        Ok(Self {
            name: map.name,
            tile_size: map.tile_size,
            grid,
            start,
            interactables,
            interactable_kind: map.interactable_kind,
            strategy,
            tuning,
            player,
            quests,
        })
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario, ConfigError> {
    let source = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let scenario = Scenario::from_toml_str(&source)?;
    tracing::info!(path = %path.display(), map = %scenario.name, "loaded scenario");
    Ok(scenario)
}

fn parse_rows(rows: &[String]) -> Result<(CollisionGrid, Tile, Vec<Tile>), ConfigError> {
    let width = rows.first().map_or(0, |row| row.chars().count());
    if width == 0 {
        return Err(ConfigError::InvalidMap("map has no tiles".to_string()));
    }

    let mut blocked = Vec::with_capacity(width * rows.len());
    let mut starts = Vec::new();
    let mut interactables = Vec::new();
    for (y, row) in rows.iter().enumerate() {
        let len = row.chars().count();
        if len != width {
            return Err(ConfigError::InvalidMap(format!(
                "row {y} has {len} tiles, expected {width}"
            )));
        }
        for (x, c) in row.chars().enumerate() {
            let tile = Tile::new(x as i32, y as i32);
            match c {
                BLOCKED => blocked.push(true),
                OPEN => blocked.push(false),
                PLAYER_START => {
                    starts.push(tile);
                    blocked.push(false);
                }
                INTERACTABLE => {
                    interactables.push(tile);
                    blocked.push(false);
                }
                other => {
                    return Err(ConfigError::InvalidMap(format!(
                        "unknown tile {other:?} at {tile}"
                    )));
                }
            }
        }
    }

    let [start] = starts.as_slice() else {
        return Err(ConfigError::InvalidMap(format!(
            "expected exactly one '{PLAYER_START}', found {}",
            starts.len()
        )));
    };
    Ok((CollisionGrid::new(blocked, width), *start, interactables))
}
