//! Shared fixtures for the agent test suites.

use crate::grid::CollisionGrid;
use crate::sim::GridWorld;
use crate::types::*;

pub(crate) const TILE: u32 = 16;
pub(crate) const DT: f64 = 1.0 / 60.0;

/// Walled room with an open interior.
pub(crate) fn open_room(width: usize, height: usize) -> CollisionGrid {
    let mut grid = CollisionGrid::open(width, height);
    for x in 0..width as i32 {
        grid.set_blocked(Tile::new(x, 0), true);
        grid.set_blocked(Tile::new(x, height as i32 - 1), true);
    }
    for y in 0..height as i32 {
        grid.set_blocked(Tile::new(0, y), true);
        grid.set_blocked(Tile::new(width as i32 - 1, y), true);
    }
    grid
}

pub(crate) fn world_at(tile: Tile) -> GridWorld {
    GridWorld::new(TILE).with_player_at(tile)
}

pub(crate) fn chain(id: &str, main: bool, deps: &[&str], objectives: &[(i32, i32)]) -> QuestChain {
    QuestChain {
        id: id.into(),
        is_main_quest: main,
        dependencies: deps.iter().map(|dep| QuestId::from(*dep)).collect(),
        objectives: objectives
            .iter()
            .map(|&(target_x, target_y)| Objective {
                target_x,
                target_y,
                description: format!("reach {target_x},{target_y}"),
            })
            .collect(),
    }
}

pub(crate) fn started(objective_index: usize) -> QuestState {
    QuestState { status: QuestStatus::Started, objective_index }
}

pub(crate) fn combatant(id: u32, side: Side, hp: i32, max_hp: i32) -> Combatant {
    Combatant {
        id: ActorId(id),
        side,
        hp,
        max_hp,
        attack: 3,
        mana: 0,
        skills: Vec::new(),
        potions: 0,
    }
}

pub(crate) fn duel(active: u32) -> CombatState {
    CombatState {
        combatants: vec![combatant(1, Side::Party, 20, 20), combatant(2, Side::Enemy, 12, 12)],
        turn_order: vec![ActorId(1), ActorId(2)],
        current_turn_index: if active == 1 { 0 } else { 1 },
    }
}

pub(crate) fn quiet_strategy() -> Strategy {
    Strategy {
        explore_all_areas: false,
        prioritize_main_quest: true,
        combat_style: CombatStyle::Aggressive,
    }
}
